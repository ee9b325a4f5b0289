//! The dispatch pass.
//!
//! `EffectDispatcher` orders effects by ascending priority (stable, so ties
//! keep registration order) and applies them one by one against a shared
//! context. Two things can cut a pass short for an individual effect:
//!
//! - **Faults**: an `Err` from `apply` is logged once and the effect is
//!   skipped for the rest of the root dispatch, nested passes included.
//! - **Cancellation**: once the event is cancelled, every effect after the
//!   cancelling one is skipped. This is per dispatch; nothing carries over.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use tracing::{debug, error, trace};

use crate::core::ActorId;
use crate::effects::{CustomData, CustomValue, Effect, EffectContext, EffectOutcome, EventKind};

/// Everything needed to start a dispatch, apart from the event handle.
#[derive(Clone, Debug, PartialEq)]
pub struct DispatchRequest {
    pub kind: EventKind,
    pub actor: ActorId,
    pub target: Option<ActorId>,
    /// Original amount, e.g. raw damage before any modifier.
    pub amount: f32,
    pub custom_data: CustomData,
}

impl DispatchRequest {
    pub fn new(kind: EventKind, actor: ActorId) -> Self {
        Self {
            kind,
            actor,
            target: None,
            amount: 0.0,
            custom_data: CustomData::new(),
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: ActorId) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn with_amount(mut self, amount: f32) -> Self {
        self.amount = amount;
        self
    }

    #[must_use]
    pub fn with_custom(mut self, key: &str, value: impl Into<CustomValue>) -> Self {
        self.custom_data.insert(key.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn with_custom_data(mut self, data: CustomData) -> Self {
        self.custom_data = data;
        self
    }
}

/// What a dispatch pass did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DispatchReport {
    /// Ids of effects whose `apply` ran, in order.
    pub invoked: Vec<String>,
    pub applied: usize,
    pub skipped: usize,
    /// `(effect id, reason)` for effects that lacked a resource.
    pub unavailable: Vec<(String, String)>,
    /// Effects that faulted during this pass.
    pub faulted: Vec<String>,
    /// Effects not invoked because they had already faulted earlier in the root dispatch.
    pub suppressed: usize,
    /// The effect that cancelled the event, if one did.
    pub cancelled_by: Option<String>,
    /// Effects never reached because the event was cancelled.
    pub not_reached: usize,
    pub cancelled: bool,
    /// Event amount after the pass.
    pub final_amount: f32,
}

impl DispatchReport {
    #[must_use]
    pub fn was_invoked(&self, id: &str) -> bool {
        self.invoked.iter().any(|i| i == id)
    }
}

/// Bookkeeping shared by a root dispatch and the passes nested inside it.
#[derive(Debug, Default)]
pub(crate) struct DispatchFrame {
    pub(crate) depth: u8,
    pub(crate) faulted: FxHashSet<String>,
}

impl DispatchFrame {
    pub(crate) fn root() -> Self {
        Self::default()
    }
}

/// Runs dispatch passes.
pub struct EffectDispatcher;

impl EffectDispatcher {
    /// Stable-sort `effects` by ascending priority, then apply them in order.
    pub fn dispatch(effects: &[&dyn Effect], ctx: &mut EffectContext<'_>) -> DispatchReport {
        let mut ordered: SmallVec<[&dyn Effect; 16]> = effects.iter().copied().collect();
        ordered.sort_by_key(|effect| effect.priority());
        Self::run(&ordered, ctx)
    }

    /// Apply already-ordered effects.
    pub(crate) fn run(ordered: &[&dyn Effect], ctx: &mut EffectContext<'_>) -> DispatchReport {
        let mut report = DispatchReport::default();

        for (index, effect) in ordered.iter().enumerate() {
            if ctx.is_cancelled() {
                report.not_reached = ordered.len() - index;
                break;
            }

            let id = effect.id();
            if ctx.is_faulted(id) {
                report.suppressed += 1;
                continue;
            }

            report.invoked.push(id.to_string());
            match effect.apply(ctx) {
                Ok(EffectOutcome::Applied) => {
                    trace!(effect_id = id, actor = %ctx.actor(), "applied");
                    report.applied += 1;
                }
                Ok(EffectOutcome::Skipped) => {
                    trace!(effect_id = id, actor = %ctx.actor(), "skipped");
                    report.skipped += 1;
                }
                Ok(EffectOutcome::Unavailable(reason)) => {
                    trace!(effect_id = id, actor = %ctx.actor(), reason = %reason, "unavailable");
                    report.unavailable.push((id.to_string(), reason));
                }
                Err(err) => {
                    if ctx.mark_faulted(id) {
                        error!(
                            effect_id = id,
                            actor = %ctx.actor(),
                            kind = %ctx.kind(),
                            error = %err,
                            "effect faulted; skipping it for the rest of this dispatch"
                        );
                    }
                    report.faulted.push(id.to_string());
                }
            }

            if ctx.is_cancelled() {
                debug!(effect_id = id, actor = %ctx.actor(), kind = %ctx.kind(), "event cancelled");
                report.cancelled_by = Some(id.to_string());
            }
        }

        report.cancelled = ctx.is_cancelled();
        report.final_amount = ctx.amount();
        report
    }
}
