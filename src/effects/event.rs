//! The triggering event as the engine sees it.
//!
//! ## Design Philosophy
//!
//! The host owns its event objects (damage events, kill events, the tick).
//! The engine never redefines them. It needs only a kind to filter on and a
//! small read/mutate handle: the amount, and cancellation. Hosts implement
//! `EventHandle` on their own event wrapper, or use `HostEvent`.

use serde::{Deserialize, Serialize};

use crate::core::{ActorId, Position};

/// Host-defined event type for `EventKind::Custom`.
///
/// The engine doesn't interpret these; they're opaque identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventTypeId(pub u32);

impl EventTypeId {
    /// Create a new event type ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for EventTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EventType({})", self.0)
    }
}

/// What kind of occurrence is being dispatched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Periodic per-actor tick.
    Tick,
    /// The actor is about to take damage.
    IncomingDamage,
    /// The actor is about to deal damage.
    OutgoingDamage,
    /// The actor killed something.
    Kill,
    /// Anything else the host dispatches.
    Custom(EventTypeId),
}

impl EventKind {
    #[must_use]
    pub const fn is_damage(self) -> bool {
        matches!(self, EventKind::IncomingDamage | EventKind::OutgoingDamage)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Tick => f.write_str("tick"),
            EventKind::IncomingDamage => f.write_str("incoming_damage"),
            EventKind::OutgoingDamage => f.write_str("outgoing_damage"),
            EventKind::Kill => f.write_str("kill"),
            EventKind::Custom(id) => write!(f, "custom({})", id.raw()),
        }
    }
}

/// Read/mutate contract onto the host's event.
pub trait EventHandle {
    fn amount(&self) -> f32;

    fn set_amount(&mut self, amount: f32);

    /// Request cancellation. Events that cannot be cancelled ignore this.
    fn cancel(&mut self);

    fn is_cancelled(&self) -> bool;
}

/// Plain event value for hosts without their own event type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HostEvent {
    amount: f32,
    cancelled: bool,
    cancellable: bool,
}

impl HostEvent {
    /// A cancellable event carrying `amount` (e.g. damage).
    #[must_use]
    pub const fn new(amount: f32) -> Self {
        Self {
            amount,
            cancelled: false,
            cancellable: true,
        }
    }

    /// A non-cancellable event with no amount, such as a tick.
    #[must_use]
    pub const fn passive() -> Self {
        Self {
            amount: 0.0,
            cancelled: false,
            cancellable: false,
        }
    }
}

impl EventHandle for HostEvent {
    fn amount(&self) -> f32 {
        self.amount
    }

    fn set_amount(&mut self, amount: f32) {
        self.amount = amount;
    }

    fn cancel(&mut self) {
        if self.cancellable {
            self.cancelled = true;
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// A value in a dispatch's custom data bag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CustomValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Actor(ActorId),
    Position(Position),
}

impl CustomValue {
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            CustomValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Floats, and integers widened to floats.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            CustomValue::Float(v) => Some(*v),
            CustomValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CustomValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CustomValue::Text(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_actor(&self) -> Option<ActorId> {
        match self {
            CustomValue::Actor(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_position(&self) -> Option<Position> {
        match self {
            CustomValue::Position(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<i64> for CustomValue {
    fn from(v: i64) -> Self {
        CustomValue::Int(v)
    }
}

impl From<u64> for CustomValue {
    fn from(v: u64) -> Self {
        CustomValue::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f64> for CustomValue {
    fn from(v: f64) -> Self {
        CustomValue::Float(v)
    }
}

impl From<f32> for CustomValue {
    fn from(v: f32) -> Self {
        CustomValue::Float(f64::from(v))
    }
}

impl From<bool> for CustomValue {
    fn from(v: bool) -> Self {
        CustomValue::Bool(v)
    }
}

impl From<&str> for CustomValue {
    fn from(v: &str) -> Self {
        CustomValue::Text(v.to_string())
    }
}

impl From<String> for CustomValue {
    fn from(v: String) -> Self {
        CustomValue::Text(v)
    }
}

impl From<ActorId> for CustomValue {
    fn from(v: ActorId) -> Self {
        CustomValue::Actor(v)
    }
}

impl From<Position> for CustomValue {
    fn from(v: Position) -> Self {
        CustomValue::Position(v)
    }
}

/// Last-write-wins key/value bag carried by a dispatch.
///
/// Persistent map: nested dispatches inherit the parent's data in O(1).
pub type CustomData = im::HashMap<String, CustomValue>;
