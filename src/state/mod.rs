//! Per-actor state.
//!
//! ## Design Philosophy
//!
//! Cooldowns, timed states and modifiers used to be the sort of thing kept
//! in global maps keyed by actor, growing forever. Here they live in one
//! `ActorState` per actor, owned by an `ActorStateStore`, created lazily on
//! first access and dropped through an explicit lifecycle hook.
//!
//! - `CooldownTable`: wall-clock cooldowns keyed by effect id
//! - `TimedStateTable`: tick-based states with exactly-once expiry callbacks
//! - `AttributeModifierLedger`: percent sum realized as one keyed modifier
//! - `RejectionAccumulator`: non-negative value with a critical threshold
//! - `PositionHistoryRing`: fixed window of past positions and health
//!
//! All mutation happens on the simulation thread during a tick, so nothing
//! here is locked.

pub mod actor;
pub mod cooldown;
pub mod history;
pub mod ledger;
pub mod rejection;
pub mod snapshot;
pub mod store;
pub mod timed;

pub use actor::ActorState;
pub use cooldown::CooldownTable;
pub use history::{HistorySnapshot, PositionHistoryRing};
pub use ledger::{AttributeModifierLedger, MAX_HEALTH_KEY};
pub use rejection::RejectionAccumulator;
pub use snapshot::ActorStateSnapshot;
pub use store::ActorStateStore;
pub use timed::{ExpireCallback, ExpiredState, ExpiryScope, TimedStateTable};
