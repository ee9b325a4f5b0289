//! Core engine types: actor IDs, positions, clock, RNG, configuration.
//!
//! Nothing in here knows about effects. Hosts configure the engine via
//! `EngineConfig` rather than by modifying the core.

pub mod entity;
pub mod clock;
pub mod rng;
pub mod config;

pub use entity::{ActorId, Position};
pub use clock::GameClock;
pub use rng::{GameRng, GameRngState};
pub use config::{EngineConfig, MaintenanceConfig, MAX_DISPATCH_DEPTH};
