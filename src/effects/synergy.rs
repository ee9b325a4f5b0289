//! Synergies: effects that switch on when a combination of modules is active.
//!
//! A `Synergy` bundles required modules, trigger kinds and conditions with
//! a list of inner effects. It registers as a single effect. When its gates
//! pass it runs the inner effects in ascending priority order, stopping if
//! one of them cancels the event.
//!
//! ```
//! use rust_synergy::effects::{
//!     Condition, DamageMultiplier, Effect, EventKind, Synergy,
//! };
//!
//! let synergy = Synergy::new("kinetic_overload")
//!     .named("Kinetic Overload")
//!     .requires("kinetic")
//!     .requires("overclock")
//!     .on(EventKind::OutgoingDamage)
//!     .when(Condition::AmountAtLeast(4.0))
//!     .with_effect(Box::new(DamageMultiplier::new("kinetic_overload.damage", 1.25)));
//!
//! assert_eq!(synergy.required_modules(), ["KINETIC", "OVERCLOCK"]);
//! assert_eq!(synergy.description(), "Kinetic Overload [KINETIC + OVERCLOCK]");
//! ```

use crate::bridge::normalize_module_id;

use super::condition::Condition;
use super::context::EffectContext;
use super::effect::{Effect, EffectOutcome, EffectResult, DEFAULT_PRIORITY};
use super::event::EventKind;

/// A module combination and what it does.
pub struct Synergy {
    id: String,
    name: String,
    description: String,
    category: String,
    required_modules: Vec<String>,
    triggers: Vec<EventKind>,
    conditions: Vec<Condition>,
    effects: Vec<Box<dyn Effect>>,
    priority: i32,
    enabled: bool,
}

impl Synergy {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            description: String::new(),
            category: "misc".to_string(),
            required_modules: Vec::new(),
            triggers: Vec::new(),
            conditions: Vec::new(),
            effects: Vec::new(),
            priority: DEFAULT_PRIORITY,
            enabled: true,
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Require an active module. Ids are upper-cased; duplicates are ignored.
    #[must_use]
    pub fn requires(mut self, module_id: &str) -> Self {
        let id = normalize_module_id(module_id);
        if !self.required_modules.contains(&id) {
            self.required_modules.push(id);
        }
        self
    }

    /// Add a trigger kind. With none, every kind triggers.
    #[must_use]
    pub fn on(mut self, kind: EventKind) -> Self {
        if !self.triggers.contains(&kind) {
            self.triggers.push(kind);
        }
        self
    }

    #[must_use]
    pub fn when(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Add an inner effect, kept in ascending priority (stable on ties).
    #[must_use]
    pub fn with_effect(mut self, effect: Box<dyn Effect>) -> Self {
        let priority = effect.priority();
        let pos = self
            .effects
            .iter()
            .position(|e| e.priority() > priority)
            .unwrap_or(self.effects.len());
        self.effects.insert(pos, effect);
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn required_modules(&self) -> &[String] {
        &self.required_modules
    }

    #[must_use]
    pub fn triggers(&self) -> &[EventKind] {
        &self.triggers
    }

    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Inner effect ids in execution order.
    #[must_use]
    pub fn effect_ids(&self) -> Vec<&str> {
        self.effects.iter().map(|e| e.id()).collect()
    }

    /// Whether the actor's active modules satisfy this synergy.
    pub fn is_satisfied_by<'m>(&self, active_modules: impl IntoIterator<Item = &'m str>) -> bool {
        let active: Vec<String> = active_modules.into_iter().map(normalize_module_id).collect();
        self.required_modules.iter().all(|m| active.contains(m))
    }

    fn gates_pass(&self, ctx: &mut EffectContext<'_>) -> bool {
        if !self.enabled {
            return false;
        }
        if !self.triggers.is_empty() && !self.triggers.contains(&ctx.kind()) {
            return false;
        }
        if !self.required_modules.iter().all(|m| ctx.active_modules().contains(m)) {
            return false;
        }
        self.conditions.iter().all(|c| c.evaluate(ctx))
    }
}

impl Effect for Synergy {
    fn id(&self) -> &str {
        &self.id
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn apply(&self, ctx: &mut EffectContext<'_>) -> EffectResult {
        if !self.gates_pass(ctx) {
            return Ok(EffectOutcome::Skipped);
        }

        let mut applied = false;
        let mut unavailable = None;
        for effect in &self.effects {
            if ctx.is_cancelled() {
                break;
            }
            match effect.apply(ctx)? {
                EffectOutcome::Applied => applied = true,
                EffectOutcome::Skipped => {}
                EffectOutcome::Unavailable(reason) => {
                    unavailable.get_or_insert(reason);
                }
            }
        }

        Ok(match (applied, unavailable) {
            (true, _) => EffectOutcome::Applied,
            (false, Some(reason)) => EffectOutcome::Unavailable(reason),
            (false, None) => EffectOutcome::Skipped,
        })
    }

    fn description(&self) -> String {
        let mut text = self.name.clone();
        if !self.description.is_empty() {
            text.push_str(": ");
            text.push_str(&self.description);
        }
        if !self.required_modules.is_empty() {
            text.push_str(&format!(" [{}]", self.required_modules.join(" + ")));
        }
        text
    }
}

impl std::fmt::Debug for Synergy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Synergy")
            .field("id", &self.id)
            .field("required_modules", &self.required_modules)
            .field("triggers", &self.triggers)
            .field("effects", &self.effect_ids())
            .field("priority", &self.priority)
            .field("enabled", &self.enabled)
            .finish()
    }
}
