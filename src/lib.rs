//! # rust-synergy
//!
//! A tick-driven effect dispatch engine with per-actor gameplay state.
//!
//! Many independently written effects (damage modifiers, healing, energy
//! transfer, timed buffs, cooldown gates, teleports, attribute modifiers)
//! are registered once and applied in priority order whenever the host
//! reports a qualifying event.
//!
//! ## Design Principles
//!
//! 1. **Deterministic Ordering**: Effects run in ascending priority; ties
//!    keep registration order.
//!
//! 2. **Fault Isolation**: A faulting effect is logged and skipped for the
//!    rest of the dispatch. No effect fault reaches the host's tick loop.
//!
//! 3. **Replace, Don't Stack**: Derived attribute modifiers live under one
//!    stable key and are recomputed from a running sum.
//!
//! 4. **Explicit Lifecycle**: Per-actor state is created lazily and dropped
//!    through an explicit removal hook, never left in global maps.
//!
//! ## Modules
//!
//! - `core`: Actor IDs, positions, clock, RNG, configuration
//! - `effects`: The `Effect` trait, context, built-in variants, synergies
//! - `state`: Cooldowns, timed states, modifier ledger, rejection, history
//! - `bridge`: Energy economy, module view and host actor interfaces
//! - `dispatch`: Registry, dispatcher, world and engine facade
//! - `error`: Error types

pub mod bridge;
pub mod core;
pub mod dispatch;
pub mod effects;
pub mod error;
pub mod state;

// Re-export commonly used types
pub use crate::core::{ActorId, EngineConfig, GameClock, GameRng, GameRngState, MaintenanceConfig, Position};

pub use crate::bridge::{
    ActorHost, AttributeKind, AttributeModifier, EnergyPool, InstalledModule, InstalledModules, ModifierKey,
    ModuleView, ResourceBridge, SimulatedActors,
};

pub use crate::effects::{
    Condition, CustomValue, Effect, EffectContext, EffectOutcome, EffectResult, EventHandle, EventKind,
    EventTypeId, FnEffect, HostEvent, Synergy,
};

pub use crate::state::{
    ActorState, ActorStateSnapshot, ActorStateStore, AttributeModifierLedger, CooldownTable, HistorySnapshot,
    PositionHistoryRing, RejectionAccumulator, TimedStateTable,
};

pub use crate::dispatch::{
    DispatchReport, DispatchRequest, EffectDispatcher, EffectRegistry, MaintenanceOutcome, SynergyEngine,
    TickReport, World,
};

pub use crate::error::{ConfigError, DispatchError, EffectError, RegistryError, SnapshotError};
