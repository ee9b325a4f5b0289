//! Collaborator interfaces the engine consumes.
//!
//! ## Design Philosophy
//!
//! The engine owns effect ordering and per-actor state. Everything else
//! (the energy economy, module installation, the host's actors) belongs to
//! other subsystems and is reached through a narrow trait:
//!
//! - `ResourceBridge`: add, consume and read energy
//! - `ModuleView`: which modules an actor has, at what level
//! - `ActorHost`: health, position and keyed attribute modifiers
//!
//! Each trait ships with a small in-memory implementation (`EnergyPool`,
//! `InstalledModules`, `SimulatedActors`) usable by hosts that have nothing
//! better, and by tests.

pub mod host;
pub mod modules;
pub mod resource;

pub use host::{
    ActorBody, ActorHost, AttributeKind, AttributeModifier, ModifierKey, ModifierOperation,
    SimulatedActors,
};
pub use modules::{normalize_module_id, InstalledModule, InstalledModules, ModuleView};
pub use resource::{EnergyAccount, EnergyPool, ResourceBridge};
