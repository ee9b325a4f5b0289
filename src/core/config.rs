//! Engine configuration.
//!
//! Hosts configure the engine at startup with an `EngineConfig`. Every
//! tunable constant the engine consults lives here rather than being
//! hardcoded in the effect or state code. The struct is serde-friendly so
//! the host can load it from whatever config format it already uses.
//!
//! ```
//! use rust_synergy::core::EngineConfig;
//!
//! let config = EngineConfig::default()
//!     .with_history_capacity(200)
//!     .with_max_dispatch_depth(2);
//! assert!(config.validate().is_ok());
//! assert_eq!(config.history_capacity, 200);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Hard ceiling on `EngineConfig::max_dispatch_depth`.
pub const MAX_DISPATCH_DEPTH: u8 = 32;

/// Energy upkeep charged for keeping modules active.
///
/// Cost for `n` active modules is `n * (base_cost + n * scaling_cost)`,
/// so running many modules at once gets progressively more expensive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    /// Flat cost per active module.
    pub base_cost: u64,
    /// Additional cost per module, per active module.
    pub scaling_cost: u64,
    /// How often the host should charge upkeep, in ticks.
    pub interval_ticks: u64,
}

impl MaintenanceConfig {
    /// Upkeep for `active_count` simultaneously active modules.
    #[must_use]
    pub fn cost_for(&self, active_count: u64) -> u64 {
        if active_count == 0 {
            return 0;
        }
        let per_module = self.base_cost.saturating_add(active_count.saturating_mul(self.scaling_cost));
        active_count.saturating_mul(per_module)
    }
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            base_cost: 25,
            scaling_cost: 5,
            interval_ticks: 100,
        }
    }
}

/// Complete engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum nesting of re-entrant dispatches. The root dispatch is depth 0.
    /// At most `MAX_DISPATCH_DEPTH`.
    pub max_dispatch_depth: u8,

    /// Rejection at or above this value is critical.
    pub rejection_threshold: f32,

    /// Rejection removed per tick during housekeeping.
    pub rejection_decay_per_tick: f32,

    /// Position history ring capacity in ticks.
    pub history_capacity: usize,

    /// Combo counter resets after this long without a hit.
    pub combo_timeout_ms: u64,

    /// Movement below this distance (blocks) per tick counts as standing still.
    pub standing_epsilon: f64,

    /// `Tick` effects are dispatched every this many ticks.
    pub tick_dispatch_interval: u64,

    /// Milliseconds per tick, used by `SynergyEngine::advance_tick`.
    pub ms_per_tick: u64,

    /// Seed for the engine RNG.
    pub rng_seed: u64,

    /// Module upkeep.
    pub maintenance: MaintenanceConfig,
}

impl EngineConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self {
            max_dispatch_depth: 4,
            rejection_threshold: 100.0,
            rejection_decay_per_tick: 0.025,
            history_capacity: 100,
            combo_timeout_ms: 3_000,
            standing_epsilon: 0.1,
            tick_dispatch_interval: 20,
            ms_per_tick: 50,
            rng_seed: 0,
            maintenance: MaintenanceConfig::default(),
        }
    }

    #[must_use]
    pub fn with_max_dispatch_depth(mut self, depth: u8) -> Self {
        self.max_dispatch_depth = depth;
        self
    }

    #[must_use]
    pub fn with_rejection_threshold(mut self, threshold: f32) -> Self {
        self.rejection_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_rejection_decay(mut self, per_tick: f32) -> Self {
        self.rejection_decay_per_tick = per_tick;
        self
    }

    #[must_use]
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_combo_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.combo_timeout_ms = timeout_ms;
        self
    }

    #[must_use]
    pub fn with_tick_dispatch_interval(mut self, interval: u64) -> Self {
        self.tick_dispatch_interval = interval;
        self
    }

    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }

    #[must_use]
    pub fn with_maintenance(mut self, maintenance: MaintenanceConfig) -> Self {
        self.maintenance = maintenance;
        self
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_dispatch_depth > MAX_DISPATCH_DEPTH {
            return Err(ConfigError::TooLarge {
                field: "max_dispatch_depth",
                value: u64::from(self.max_dispatch_depth),
                max: u64::from(MAX_DISPATCH_DEPTH),
            });
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::Zero { field: "history_capacity" });
        }
        if self.tick_dispatch_interval == 0 {
            return Err(ConfigError::Zero { field: "tick_dispatch_interval" });
        }
        if self.ms_per_tick == 0 {
            return Err(ConfigError::Zero { field: "ms_per_tick" });
        }
        for (field, value) in [
            ("rejection_threshold", self.rejection_threshold),
            ("rejection_decay_per_tick", self.rejection_decay_per_tick),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }
        if !self.standing_epsilon.is_finite() || self.standing_epsilon < 0.0 {
            return Err(ConfigError::Negative {
                field: "standing_epsilon",
                value: self.standing_epsilon as f32,
            });
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
