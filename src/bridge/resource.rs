//! Interface to the external energy economy.
//!
//! Energy production, storage aggregation and efficiency curves live in a
//! collaborating subsystem. The engine only needs to add, consume, and read
//! energy, so that is all `ResourceBridge` asks for.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::ActorId;

/// Minimal energy contract consumed by effects.
///
/// All calls are synchronous and cheap; they run inside the tick.
pub trait ResourceBridge {
    /// Add energy, returning how much was actually added (capacity may clamp it).
    fn add_energy(&mut self, actor: ActorId, amount: u64) -> u64;

    /// Consume exactly `amount`. Returns `false` and changes nothing when short.
    fn consume_energy(&mut self, actor: ActorId, amount: u64) -> bool;

    fn current_energy(&self, actor: ActorId) -> u64;

    fn max_energy(&self, actor: ActorId) -> u64;

    fn has_energy(&self, actor: ActorId, amount: u64) -> bool {
        self.current_energy(actor) >= amount
    }

    /// Fill level in `[0, 1]`. Zero capacity reads as empty.
    fn energy_fraction(&self, actor: ActorId) -> f32 {
        let max = self.max_energy(actor);
        if max == 0 {
            return 0.0;
        }
        (self.current_energy(actor) as f64 / max as f64) as f32
    }
}

/// One actor's energy storage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyAccount {
    pub current: u64,
    pub capacity: u64,
}

/// In-memory `ResourceBridge`.
#[derive(Clone, Debug, Default)]
pub struct EnergyPool {
    accounts: FxHashMap<ActorId, EnergyAccount>,
}

impl EnergyPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace an actor's account. `current` is clamped to `capacity`.
    pub fn open(&mut self, actor: ActorId, current: u64, capacity: u64) {
        self.accounts.insert(
            actor,
            EnergyAccount {
                current: current.min(capacity),
                capacity,
            },
        );
    }

    #[must_use]
    pub fn with_account(mut self, actor: ActorId, current: u64, capacity: u64) -> Self {
        self.open(actor, current, capacity);
        self
    }

    #[must_use]
    pub fn account(&self, actor: ActorId) -> Option<EnergyAccount> {
        self.accounts.get(&actor).copied()
    }
}

impl ResourceBridge for EnergyPool {
    fn add_energy(&mut self, actor: ActorId, amount: u64) -> u64 {
        let Some(account) = self.accounts.get_mut(&actor) else {
            return 0;
        };
        let added = amount.min(account.capacity.saturating_sub(account.current));
        account.current += added;
        added
    }

    fn consume_energy(&mut self, actor: ActorId, amount: u64) -> bool {
        match self.accounts.get_mut(&actor) {
            Some(account) if account.current >= amount => {
                account.current -= amount;
                true
            }
            _ => amount == 0,
        }
    }

    fn current_energy(&self, actor: ActorId) -> u64 {
        self.accounts.get(&actor).map_or(0, |a| a.current)
    }

    fn max_energy(&self, actor: ActorId) -> u64 {
        self.accounts.get(&actor).map_or(0, |a| a.capacity)
    }
}
