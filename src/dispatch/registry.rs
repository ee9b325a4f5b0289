//! Effect registry.
//!
//! Effects are kept in dispatch order: ascending priority, and registration
//! order among equal priorities. Insertion finds the first entry with a
//! strictly greater priority, so the list never needs re-sorting.

use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::effects::Effect;
use crate::error::RegistryError;

struct RegisteredEffect {
    effect: Box<dyn Effect>,
    enabled: bool,
}

/// Registered effects in dispatch order.
#[derive(Default)]
pub struct EffectRegistry {
    entries: Vec<RegisteredEffect>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an effect. Ids must be non-empty and unique.
    pub fn register(&mut self, effect: Box<dyn Effect>) -> Result<(), RegistryError> {
        let id = effect.id();
        if id.is_empty() {
            return Err(RegistryError::EmptyId);
        }
        if self.contains(id) {
            warn!(effect_id = id, "duplicate effect registration rejected");
            return Err(RegistryError::Duplicate(id.to_string()));
        }

        let priority = effect.priority();
        let pos = self
            .entries
            .iter()
            .position(|e| e.effect.priority() > priority)
            .unwrap_or(self.entries.len());
        debug!(effect_id = id, priority, position = pos, "registered effect");
        self.entries.insert(pos, RegisteredEffect { effect, enabled: true });
        Ok(())
    }

    /// Remove an effect, returning it.
    pub fn unregister(&mut self, id: &str) -> Option<Box<dyn Effect>> {
        let pos = self.entries.iter().position(|e| e.effect.id() == id)?;
        Some(self.entries.remove(pos).effect)
    }

    /// Enable or disable without losing the registration slot.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> bool {
        match self.entries.iter_mut().find(|e| e.effect.id() == id) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_enabled(&self, id: &str) -> Option<bool> {
        self.entries.iter().find(|e| e.effect.id() == id).map(|e| e.enabled)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&dyn Effect> {
        self.entries
            .iter()
            .find(|e| e.effect.id() == id)
            .map(|e| e.effect.as_ref())
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.effect.id() == id)
    }

    /// Enabled effects in dispatch order.
    pub fn ordered(&self) -> impl Iterator<Item = &dyn Effect> {
        self.entries
            .iter()
            .filter(|e| e.enabled)
            .map(|e| e.effect.as_ref())
    }

    pub(crate) fn ordered_effects(&self) -> SmallVec<[&dyn Effect; 16]> {
        self.ordered().collect()
    }

    /// All ids in dispatch order, disabled ones included.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.effect.id()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl std::fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| (e.effect.id(), e.effect.priority(), e.enabled)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{EffectOutcome, FnEffect};

    fn effect(id: &str, priority: i32) -> Box<dyn Effect> {
        Box::new(FnEffect::new(id, |_| Ok(EffectOutcome::Skipped)).with_priority(priority))
    }

    #[test]
    fn test_priority_order_with_stable_ties() {
        let mut registry = EffectRegistry::new();
        registry.register(effect("late", 200)).unwrap();
        registry.register(effect("tie_a", 100)).unwrap();
        registry.register(effect("early", 10)).unwrap();
        registry.register(effect("tie_b", 100)).unwrap();
        registry.register(effect("tie_c", 100)).unwrap();

        assert_eq!(registry.ids(), vec!["early", "tie_a", "tie_b", "tie_c", "late"]);
    }

    #[test]
    fn test_duplicate_and_empty_rejected() {
        let mut registry = EffectRegistry::new();
        registry.register(effect("shield", 100)).unwrap();
        assert_eq!(
            registry.register(effect("shield", 5)),
            Err(RegistryError::Duplicate("shield".to_string()))
        );
        assert_eq!(registry.register(effect("", 5)), Err(RegistryError::EmptyId));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_disabled_effects_excluded_from_order() {
        let mut registry = EffectRegistry::new();
        registry.register(effect("a", 1)).unwrap();
        registry.register(effect("b", 2)).unwrap();

        assert!(registry.set_enabled("a", false));
        let ids: Vec<_> = registry.ordered().map(|e| e.id()).collect();
        assert_eq!(ids, vec!["b"]);
        assert_eq!(registry.is_enabled("a"), Some(false));

        // Re-enabling keeps its original slot
        registry.set_enabled("a", true);
        let ids: Vec<_> = registry.ordered().map(|e| e.id()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        assert!(!registry.set_enabled("missing", true));
    }

    #[test]
    fn test_unregister() {
        let mut registry = EffectRegistry::new();
        registry.register(effect("a", 1)).unwrap();
        let removed = registry.unregister("a").unwrap();
        assert_eq!(removed.id(), "a");
        assert!(registry.is_empty());
        assert!(registry.unregister("a").is_none());
        assert!(registry.get("a").is_none());
    }
}
