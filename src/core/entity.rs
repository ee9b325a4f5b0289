//! Actor identification and spatial position.
//!
//! Every actor the engine tracks state for (players, mobs, anything the
//! host can damage or move) is identified by an `ActorId`. The engine never
//! allocates these: the host hands them in with each dispatch and tears the
//! associated state down through `SynergyEngine::remove_actor`.
//!
//! ```
//! use rust_synergy::core::{ActorId, Position};
//!
//! let actor = ActorId::new(3);
//! assert_eq!(actor.raw(), 3);
//! assert_eq!(actor.to_string(), "Actor(3)");
//!
//! let a = Position::new(0.0, 64.0, 0.0);
//! let b = Position::new(3.0, 64.0, 4.0);
//! assert_eq!(a.distance(b), 5.0);
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u64);

impl ActorId {
    /// Create a new actor ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Actor({})", self.0)
    }
}

/// A point in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Squared euclidean distance. Prefer this for threshold comparisons.
    #[must_use]
    pub fn distance_sq(self, other: Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    #[must_use]
    pub fn distance(self, other: Position) -> f64 {
        self.distance_sq(other).sqrt()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_id_basics() {
        let id = ActorId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(id, ActorId(42));
        assert_eq!(format!("{}", id), "Actor(42)");
    }

    #[test]
    fn test_actor_id_ordering() {
        let mut ids = vec![ActorId(3), ActorId(1), ActorId(2)];
        ids.sort();
        assert_eq!(ids, vec![ActorId(1), ActorId(2), ActorId(3)]);
    }

    #[test]
    fn test_position_distance() {
        let origin = Position::default();
        let p = Position::new(1.0, 2.0, 2.0);
        assert_eq!(origin.distance_sq(p), 9.0);
        assert_eq!(p.distance(origin), 3.0);
        assert_eq!(p.distance(p), 0.0);
    }

    #[test]
    fn test_serde() {
        let id = ActorId::new(9);
        let json = serde_json::to_string(&id).unwrap();
        let back: ActorId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);

        let pos = Position::new(1.5, -2.0, 8.25);
        let json = serde_json::to_string(&pos).unwrap();
        let back: Position = serde_json::from_str(&json).unwrap();
        assert_eq!(pos, back);
    }
}
