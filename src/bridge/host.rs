//! The host's actor surface.
//!
//! Effects never reach into the host's entity system directly. They go
//! through `ActorHost`, which exposes the handful of things effects need:
//! health, position, and keyed attribute modifiers.
//!
//! ## Keyed modifiers
//!
//! A modifier is identified by `(attribute, key)`. Setting a modifier with a
//! key that is already present replaces it. That is what lets the
//! `AttributeModifierLedger` guarantee a single instance per key no matter
//! how many times it re-applies.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::borrow::Cow;

use crate::core::{ActorId, Position};

/// Stable identity of an attribute modifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModifierKey(pub Cow<'static, str>);

impl ModifierKey {
    /// Key from a static string, usable in `const` items.
    #[must_use]
    pub const fn from_static(key: &'static str) -> Self {
        Self(Cow::Borrowed(key))
    }

    pub fn new(key: impl Into<String>) -> Self {
        Self(Cow::Owned(key.into()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ModifierKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Attributes effects may modify.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeKind {
    MaxHealth,
    AttackDamage,
    MovementSpeed,
    Armor,
}

/// How a modifier's amount combines with the base value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierOperation {
    /// `base + amount`
    Add,
    /// `base * (1 + amount / 100)`, summed with other percent modifiers.
    AddPercent,
}

/// One attribute modifier instance attached to an actor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttributeModifier {
    pub key: ModifierKey,
    pub attribute: AttributeKind,
    pub amount: f32,
    pub operation: ModifierOperation,
}

impl AttributeModifier {
    pub fn percent(key: ModifierKey, attribute: AttributeKind, percent: f32) -> Self {
        Self {
            key,
            attribute,
            amount: percent,
            operation: ModifierOperation::AddPercent,
        }
    }

    pub fn flat(key: ModifierKey, attribute: AttributeKind, amount: f32) -> Self {
        Self {
            key,
            attribute,
            amount,
            operation: ModifierOperation::Add,
        }
    }
}

/// Read/mutate access to actors owned by the host.
///
/// Unknown actors read as `None`; mutations on unknown actors return `false`.
pub trait ActorHost {
    fn health(&self, actor: ActorId) -> Option<f32>;

    /// Set health, clamped by the host to `[0, max_health]`.
    fn set_health(&mut self, actor: ActorId, health: f32) -> bool;

    fn max_health(&self, actor: ActorId) -> Option<f32>;

    fn position(&self, actor: ActorId) -> Option<Position>;

    fn teleport(&mut self, actor: ActorId, to: Position) -> bool;

    /// Attach `modifier`, replacing any existing one with the same attribute and key.
    fn set_modifier(&mut self, actor: ActorId, modifier: AttributeModifier) -> bool;

    /// Detach the modifier with this attribute and key. Returns whether one was present.
    fn remove_modifier(&mut self, actor: ActorId, attribute: AttributeKind, key: &ModifierKey) -> bool;

    /// All modifiers currently attached for `attribute`.
    fn modifiers(&self, actor: ActorId, attribute: AttributeKind) -> Vec<AttributeModifier>;

    fn is_alive(&self, actor: ActorId) -> bool {
        self.health(actor).is_some_and(|h| h > 0.0)
    }

    /// Heal by `amount`, returning the amount actually restored.
    fn heal(&mut self, actor: ActorId, amount: f32) -> f32 {
        let (Some(health), Some(max)) = (self.health(actor), self.max_health(actor)) else {
            return 0.0;
        };
        let target = (health + amount.max(0.0)).min(max);
        if self.set_health(actor, target) {
            target - health
        } else {
            0.0
        }
    }
}

/// Minimal in-memory actor body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActorBody {
    pub position: Position,
    pub health: f32,
    pub base_max_health: f32,
    modifiers: SmallVec<[AttributeModifier; 4]>,
}

impl ActorBody {
    pub fn new(position: Position, base_max_health: f32) -> Self {
        Self {
            position,
            health: base_max_health,
            base_max_health,
            modifiers: SmallVec::new(),
        }
    }

    /// Effective max health: `(base + flat) * (1 + percent / 100)`, never below 1.
    #[must_use]
    pub fn max_health(&self) -> f32 {
        let (flat, percent) = self
            .modifiers
            .iter()
            .filter(|m| m.attribute == AttributeKind::MaxHealth)
            .fold((0.0_f32, 0.0_f32), |(flat, percent), m| match m.operation {
                ModifierOperation::Add => (flat + m.amount, percent),
                ModifierOperation::AddPercent => (flat, percent + m.amount),
            });
        ((self.base_max_health + flat) * (1.0 + percent / 100.0)).max(1.0)
    }
}

/// In-memory `ActorHost` for hosts without their own entity system, and tests.
#[derive(Clone, Debug, Default)]
pub struct SimulatedActors {
    bodies: FxHashMap<ActorId, ActorBody>,
}

impl SimulatedActors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an actor at full health.
    pub fn spawn(&mut self, actor: ActorId, position: Position, max_health: f32) {
        self.bodies.insert(actor, ActorBody::new(position, max_health));
    }

    pub fn despawn(&mut self, actor: ActorId) -> Option<ActorBody> {
        self.bodies.remove(&actor)
    }

    #[must_use]
    pub fn with_actor(mut self, actor: ActorId, position: Position, max_health: f32) -> Self {
        self.spawn(actor, position, max_health);
        self
    }

    #[must_use]
    pub fn body(&self, actor: ActorId) -> Option<&ActorBody> {
        self.bodies.get(&actor)
    }

    pub fn body_mut(&mut self, actor: ActorId) -> Option<&mut ActorBody> {
        self.bodies.get_mut(&actor)
    }
}

impl ActorHost for SimulatedActors {
    fn health(&self, actor: ActorId) -> Option<f32> {
        self.bodies.get(&actor).map(|b| b.health)
    }

    fn set_health(&mut self, actor: ActorId, health: f32) -> bool {
        match self.bodies.get_mut(&actor) {
            Some(body) => {
                body.health = health.clamp(0.0, body.max_health());
                true
            }
            None => false,
        }
    }

    fn max_health(&self, actor: ActorId) -> Option<f32> {
        self.bodies.get(&actor).map(ActorBody::max_health)
    }

    fn position(&self, actor: ActorId) -> Option<Position> {
        self.bodies.get(&actor).map(|b| b.position)
    }

    fn teleport(&mut self, actor: ActorId, to: Position) -> bool {
        match self.bodies.get_mut(&actor) {
            Some(body) => {
                body.position = to;
                true
            }
            None => false,
        }
    }

    fn set_modifier(&mut self, actor: ActorId, modifier: AttributeModifier) -> bool {
        let Some(body) = self.bodies.get_mut(&actor) else {
            return false;
        };
        match body
            .modifiers
            .iter_mut()
            .find(|m| m.attribute == modifier.attribute && m.key == modifier.key)
        {
            Some(existing) => *existing = modifier,
            None => body.modifiers.push(modifier),
        }
        true
    }

    fn remove_modifier(&mut self, actor: ActorId, attribute: AttributeKind, key: &ModifierKey) -> bool {
        let Some(body) = self.bodies.get_mut(&actor) else {
            return false;
        };
        let before = body.modifiers.len();
        body.modifiers.retain(|m| !(m.attribute == attribute && &m.key == key));
        body.modifiers.len() != before
    }

    fn modifiers(&self, actor: ActorId, attribute: AttributeKind) -> Vec<AttributeModifier> {
        self.bodies
            .get(&actor)
            .map(|b| b.modifiers.iter().filter(|m| m.attribute == attribute).cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: ModifierKey = ModifierKey::from_static("test.key");
    const ACTOR: ActorId = ActorId::new(1);

    fn host() -> SimulatedActors {
        SimulatedActors::new().with_actor(ACTOR, Position::default(), 20.0)
    }

    #[test]
    fn test_set_modifier_replaces_same_key() {
        let mut host = host();
        assert!(host.set_modifier(ACTOR, AttributeModifier::percent(KEY, AttributeKind::MaxHealth, -5.0)));
        assert!(host.set_modifier(ACTOR, AttributeModifier::percent(KEY, AttributeKind::MaxHealth, -10.0)));

        let mods = host.modifiers(ACTOR, AttributeKind::MaxHealth);
        assert_eq!(mods.len(), 1);
        assert_eq!(mods[0].amount, -10.0);
        assert_eq!(host.max_health(ACTOR), Some(18.0));
    }

    #[test]
    fn test_same_key_different_attribute_coexist() {
        let mut host = host();
        host.set_modifier(ACTOR, AttributeModifier::percent(KEY, AttributeKind::MaxHealth, 10.0));
        host.set_modifier(ACTOR, AttributeModifier::flat(KEY, AttributeKind::Armor, 2.0));

        assert_eq!(host.modifiers(ACTOR, AttributeKind::MaxHealth).len(), 1);
        assert_eq!(host.modifiers(ACTOR, AttributeKind::Armor).len(), 1);

        assert!(host.remove_modifier(ACTOR, AttributeKind::Armor, &KEY));
        assert!(!host.remove_modifier(ACTOR, AttributeKind::Armor, &KEY));
        assert_eq!(host.modifiers(ACTOR, AttributeKind::MaxHealth).len(), 1);
    }

    #[test]
    fn test_max_health_combines_flat_and_percent() {
        let mut host = host();
        host.set_modifier(ACTOR, AttributeModifier::flat(ModifierKey::new("flat"), AttributeKind::MaxHealth, 4.0));
        host.set_modifier(ACTOR, AttributeModifier::percent(KEY, AttributeKind::MaxHealth, 50.0));
        assert_eq!(host.max_health(ACTOR), Some(36.0)); // (20 + 4) * 1.5

        // Never below 1
        host.set_modifier(ACTOR, AttributeModifier::percent(KEY, AttributeKind::MaxHealth, -500.0));
        assert_eq!(host.max_health(ACTOR), Some(1.0));
    }

    #[test]
    fn test_set_health_clamps() {
        let mut host = host();
        host.set_health(ACTOR, 50.0);
        assert_eq!(host.health(ACTOR), Some(20.0));
        host.set_health(ACTOR, -3.0);
        assert_eq!(host.health(ACTOR), Some(0.0));
        assert!(!host.is_alive(ACTOR));
    }

    #[test]
    fn test_heal_reports_actual_amount() {
        let mut host = host();
        host.set_health(ACTOR, 15.0);
        assert_eq!(host.heal(ACTOR, 10.0), 5.0);
        assert_eq!(host.health(ACTOR), Some(20.0));
        assert_eq!(host.heal(ActorId::new(99), 10.0), 0.0);
    }

    #[test]
    fn test_unknown_actor() {
        let mut host = SimulatedActors::new();
        assert_eq!(host.health(ACTOR), None);
        assert!(!host.teleport(ACTOR, Position::default()));
        assert!(!host.set_modifier(ACTOR, AttributeModifier::percent(KEY, AttributeKind::MaxHealth, 1.0)));
        assert!(host.modifiers(ACTOR, AttributeKind::MaxHealth).is_empty());
    }
}
