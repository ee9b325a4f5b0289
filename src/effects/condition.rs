//! Conditions gating a synergy.
//!
//! Conditions are data, so synergies can be defined in config and compared
//! in tests. They are evaluated against the live `EffectContext`; some
//! (cooldown and timed-state checks) clean up stale entries as they look.

use serde::{Deserialize, Serialize};

use super::context::EffectContext;

/// A condition that must hold for a synergy to apply.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    // === Actor state ===

    /// The named cooldown is not running.
    NotOnCooldown(String),

    /// The named timed state is active.
    StateActive(String),

    /// The named timed state is not active.
    StateInactive(String),

    /// Rejection strictly below the value.
    RejectionBelow(f32),

    /// Rejection at or above the critical threshold.
    RejectionCritical,

    /// Current combo count at least N.
    ComboAtLeast(u32),

    /// Standing still for at least N ticks.
    StandingFor(u64),

    // === Resources and body ===

    /// Energy fill level strictly below a percentage.
    EnergyBelowPercent(f32),

    /// At least this much energy stored.
    EnergyAtLeast(u64),

    /// Health strictly below a percentage of max health.
    HealthBelowPercent(f32),

    // === Event ===

    /// Current event amount at least this value.
    AmountAtLeast(f32),

    /// The dispatch has a target actor.
    HasTarget,

    /// A custom data key holds `Bool(true)`.
    CustomFlag(String),

    // === Modules ===

    /// The module is installed and active.
    ModuleActive(String),

    /// The module is installed at this level or higher.
    ModuleLevelAtLeast { module: String, level: u32 },

    // === Combinators ===

    /// All conditions must be true.
    All(Vec<Condition>),

    /// At least one condition must be true.
    Any(Vec<Condition>),

    /// Condition must be false.
    Not(Box<Condition>),

    // === Special ===

    /// Always matches.
    Always,

    /// Never matches.
    Never,
}

impl Condition {
    pub fn not_on_cooldown(id: impl Into<String>) -> Self {
        Self::NotOnCooldown(id.into())
    }

    pub fn state_active(id: impl Into<String>) -> Self {
        Self::StateActive(id.into())
    }

    pub fn state_inactive(id: impl Into<String>) -> Self {
        Self::StateInactive(id.into())
    }

    pub fn module_level_at_least(module: impl Into<String>, level: u32) -> Self {
        Self::ModuleLevelAtLeast { module: module.into(), level }
    }

    /// Create an AND condition.
    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::All(conditions.into_iter().collect())
    }

    /// Create an OR condition.
    pub fn any(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::Any(conditions.into_iter().collect())
    }

    /// Negate this condition.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Add another condition with AND.
    #[must_use]
    pub fn and(self, other: Condition) -> Self {
        match self {
            Self::All(mut conditions) => {
                conditions.push(other);
                Self::All(conditions)
            }
            _ => Self::All(vec![self, other]),
        }
    }

    /// Add another condition with OR.
    #[must_use]
    pub fn or(self, other: Condition) -> Self {
        match self {
            Self::Any(mut conditions) => {
                conditions.push(other);
                Self::Any(conditions)
            }
            _ => Self::Any(vec![self, other]),
        }
    }

    /// Check the condition against a live dispatch.
    pub fn evaluate(&self, ctx: &mut EffectContext<'_>) -> bool {
        match self {
            Condition::NotOnCooldown(id) => !ctx.is_on_cooldown(id),

            Condition::StateActive(id) => ctx.is_state_active(id),

            Condition::StateInactive(id) => !ctx.is_state_active(id),

            Condition::RejectionBelow(value) => {
                ctx.existing_state().map_or(0.0, |s| s.rejection.value()) < *value
            }

            Condition::RejectionCritical => ctx.state().rejection.is_critical(),

            Condition::ComboAtLeast(n) => {
                let now = ctx.now_ms();
                let state = ctx.state();
                state.expire_combo(now);
                state.combo_count() >= *n
            }

            Condition::StandingFor(ticks) => {
                ctx.existing_state().map_or(0, |s| s.standing_ticks()) >= *ticks
            }

            Condition::EnergyBelowPercent(percent) => {
                let actor = ctx.actor();
                ctx.resources().energy_fraction(actor) * 100.0 < *percent
            }

            Condition::EnergyAtLeast(amount) => {
                let actor = ctx.actor();
                ctx.resources().has_energy(actor, *amount)
            }

            Condition::HealthBelowPercent(percent) => {
                let actor = ctx.actor();
                let host = ctx.host();
                match (host.health(actor), host.max_health(actor)) {
                    (Some(health), Some(max)) if max > 0.0 => health / max * 100.0 < *percent,
                    _ => false,
                }
            }

            Condition::AmountAtLeast(min) => ctx.amount() >= *min,

            Condition::HasTarget => ctx.target().is_some(),

            Condition::CustomFlag(key) => ctx.custom_flag(key),

            Condition::ModuleActive(module) => ctx.has_module(module),

            Condition::ModuleLevelAtLeast { module, level } => {
                ctx.has_module(module) && ctx.module_level(module) >= *level
            }

            Condition::All(conditions) => conditions.iter().all(|c| c.evaluate(ctx)),

            Condition::Any(conditions) => conditions.iter().any(|c| c.evaluate(ctx)),

            Condition::Not(inner) => !inner.evaluate(ctx),

            Condition::Always => true,

            Condition::Never => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_and_flattens() {
        let cond = Condition::HasTarget
            .and(Condition::AmountAtLeast(5.0))
            .and(Condition::not_on_cooldown("dash"));
        match cond {
            Condition::All(parts) => assert_eq!(parts.len(), 3),
            other => panic!("expected All, got {:?}", other),
        }
    }

    #[test]
    fn test_or_and_negate() {
        let cond = Condition::Never.or(Condition::Always).negate();
        assert_eq!(
            cond,
            Condition::Not(Box::new(Condition::Any(vec![Condition::Never, Condition::Always])))
        );
    }

    #[test]
    fn test_serde_roundtrip() {
        let cond = Condition::all([
            Condition::module_level_at_least("kinetic", 2),
            Condition::state_inactive("time_debt"),
            Condition::EnergyBelowPercent(30.0),
        ]);
        let json = serde_json::to_string(&cond).unwrap();
        let back: Condition = serde_json::from_str(&json).unwrap();
        assert_eq!(cond, back);
    }
}
