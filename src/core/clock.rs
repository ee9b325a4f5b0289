//! Simulation clock.
//!
//! The host drives time. Timed states count in ticks, cooldowns in
//! milliseconds, so the clock carries both and the host advances them
//! together once per simulation step.

use serde::{Deserialize, Serialize};

/// Current simulation time as seen by the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameClock {
    tick: u64,
    now_ms: u64,
}

impl GameClock {
    #[must_use]
    pub const fn new(tick: u64, now_ms: u64) -> Self {
        Self { tick, now_ms }
    }

    #[must_use]
    pub const fn tick(self) -> u64 {
        self.tick
    }

    #[must_use]
    pub const fn now_ms(self) -> u64 {
        self.now_ms
    }

    /// Jump to an explicit time. Hosts with their own clock use this.
    pub fn set(&mut self, tick: u64, now_ms: u64) {
        self.tick = tick;
        self.now_ms = now_ms;
    }

    /// Advance by one tick of `ms_per_tick` milliseconds.
    pub fn advance(&mut self, ms_per_tick: u64) {
        self.tick = self.tick.saturating_add(1);
        self.now_ms = self.now_ms.saturating_add(ms_per_tick);
    }
}
