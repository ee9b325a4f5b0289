//! The `Effect` trait.
//!
//! An effect is one unit of gameplay behavior: scale damage, heal, move
//! energy, start a buff. Effects are registered once and applied on every
//! qualifying dispatch, in ascending priority order.
//!
//! ## Contract
//!
//! - `apply` may run zero or more times per dispatch (nested dispatches can
//!   reach the same effect again) and must be safe under that.
//! - An effect decides relevance itself by looking at the event kind and
//!   custom data. Unmet preconditions return `Ok(Skipped)`, never an error.
//! - `Err` is reserved for programming faults. The dispatcher logs it and
//!   skips the effect for the rest of the dispatch.
//! - `priority` and `description` are pure.

use crate::error::EffectError;

use super::context::EffectContext;

/// Priority used when an effect doesn't specify one. Lower runs first.
pub const DEFAULT_PRIORITY: i32 = 100;

/// What happened when an effect was applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EffectOutcome {
    /// The effect did something.
    Applied,
    /// Not relevant to this dispatch, or a precondition was unmet.
    Skipped,
    /// Relevant, but a resource it needed was missing.
    Unavailable(String),
}

impl EffectOutcome {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        EffectOutcome::Unavailable(reason.into())
    }

    /// Map a plain "did anything happen" flag.
    #[must_use]
    pub fn from_applied(applied: bool) -> Self {
        if applied {
            EffectOutcome::Applied
        } else {
            EffectOutcome::Skipped
        }
    }

    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, EffectOutcome::Applied)
    }
}

pub type EffectResult = Result<EffectOutcome, EffectError>;

/// A composable, prioritized unit of behavior.
pub trait Effect {
    /// Stable identifier. Also keys the effect's cooldown.
    fn id(&self) -> &str;

    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    fn apply(&self, ctx: &mut EffectContext<'_>) -> EffectResult;

    /// Human-readable summary for diagnostics and tooling.
    fn description(&self) -> String {
        self.id().to_string()
    }
}

/// Adapter turning a closure into an `Effect`.
///
/// ```
/// use rust_synergy::effects::{Effect, EffectOutcome, EventKind, FnEffect};
///
/// let double = FnEffect::new("double_damage", |ctx| {
///     if ctx.kind() != EventKind::OutgoingDamage {
///         return Ok(EffectOutcome::Skipped);
///     }
///     ctx.set_amount(ctx.amount() * 2.0);
///     Ok(EffectOutcome::Applied)
/// })
/// .with_priority(50);
///
/// assert_eq!(double.id(), "double_damage");
/// assert_eq!(double.priority(), 50);
/// ```
pub struct FnEffect<F> {
    id: String,
    priority: i32,
    description: Option<String>,
    apply: F,
}

impl<F> FnEffect<F> {
    pub fn new(id: impl Into<String>, apply: F) -> Self
    where
        F: Fn(&mut EffectContext<'_>) -> EffectResult,
    {
        Self {
            id: id.into(),
            priority: DEFAULT_PRIORITY,
            description: None,
            apply,
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl<F> Effect for FnEffect<F>
where
    F: Fn(&mut EffectContext<'_>) -> EffectResult,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn apply(&self, ctx: &mut EffectContext<'_>) -> EffectResult {
        (self.apply)(ctx)
    }

    fn description(&self) -> String {
        self.description.clone().unwrap_or_else(|| self.id.clone())
    }
}

impl<F> std::fmt::Debug for FnEffect<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnEffect")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .finish()
    }
}
