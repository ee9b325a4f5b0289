//! Keyed attribute modifier ledger.
//!
//! Repeatedly applying "-5% max health" must not stack five modifiers on
//! the host. The ledger keeps a running percent sum and realizes it as a
//! single modifier under one fixed key, replacing the previous instance on
//! every change. A sum that nets to zero removes the modifier entirely.

use tracing::trace;

use crate::bridge::{ActorHost, AttributeKind, AttributeModifier, ModifierKey};
use crate::core::ActorId;
use crate::error::EffectError;

/// Well-known key of the max-health ledger.
pub const MAX_HEALTH_KEY: ModifierKey = ModifierKey::from_static("synergy.max_health");

/// Sums below this magnitude count as zero.
const ZERO_EPSILON: f32 = 1e-4;

/// Running percent sum realized as one keyed modifier.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeModifierLedger {
    key: ModifierKey,
    attribute: AttributeKind,
    percent: f32,
}

impl AttributeModifierLedger {
    pub fn new(key: ModifierKey, attribute: AttributeKind) -> Self {
        Self {
            key,
            attribute,
            percent: 0.0,
        }
    }

    /// The max-health ledger every `ActorState` carries.
    pub fn max_health() -> Self {
        Self::new(MAX_HEALTH_KEY, AttributeKind::MaxHealth)
    }

    #[must_use]
    pub fn key(&self) -> &ModifierKey {
        &self.key
    }

    #[must_use]
    pub fn attribute(&self) -> AttributeKind {
        self.attribute
    }

    /// Current running sum in percent.
    #[must_use]
    pub fn percent(&self) -> f32 {
        self.percent
    }

    /// Add `delta` percent and re-apply the single modifier instance.
    ///
    /// Returns the new sum. Non-finite input is a fault and leaves the
    /// ledger untouched, as does an actor the host does not know.
    pub fn add_percent(&mut self, delta: f32, actor: ActorId, host: &mut dyn ActorHost) -> Result<f32, EffectError> {
        if !delta.is_finite() {
            return Err(EffectError::MalformedPercent { what: "modifier ledger delta", value: delta });
        }
        let sum = self.percent + delta;
        if !sum.is_finite() {
            return Err(EffectError::MalformedPercent { what: "modifier ledger sum", value: sum });
        }
        if host.health(actor).is_none() {
            return Err(EffectError::MissingCollaborator(format!("no host body for {}", actor)));
        }

        self.percent = if sum.abs() < ZERO_EPSILON { 0.0 } else { sum };
        self.apply(actor, host);
        trace!(actor = %actor, key = %self.key, delta, sum = self.percent, "ledger updated");
        Ok(self.percent)
    }

    /// Realize the current sum on the host and clamp health to the new maximum.
    pub fn apply(&self, actor: ActorId, host: &mut dyn ActorHost) {
        if self.percent == 0.0 {
            host.remove_modifier(actor, self.attribute, &self.key);
        } else {
            host.set_modifier(
                actor,
                AttributeModifier::percent(self.key.clone(), self.attribute, self.percent),
            );
        }

        if self.attribute == AttributeKind::MaxHealth {
            if let (Some(health), Some(max)) = (host.health(actor), host.max_health(actor)) {
                if health > max {
                    host.set_health(actor, max);
                }
            }
        }
    }

    /// Zero the sum and detach the modifier.
    pub fn reset(&mut self, actor: ActorId, host: &mut dyn ActorHost) {
        self.percent = 0.0;
        self.apply(actor, host);
    }

    pub(crate) fn restore_percent(&mut self, percent: f32) {
        self.percent = if percent.is_finite() && percent.abs() >= ZERO_EPSILON { percent } else { 0.0 };
    }
}
