//! Everything the engine remembers about one actor.

use rustc_hash::FxHashMap;

use crate::core::{ActorId, EngineConfig, Position};

use super::cooldown::CooldownTable;
use super::history::PositionHistoryRing;
use super::ledger::AttributeModifierLedger;
use super::rejection::RejectionAccumulator;
use super::timed::TimedStateTable;

/// Consecutive hits inside a timeout window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ComboCounter {
    pub(crate) count: u32,
    pub(crate) last_hit_ms: Option<u64>,
}

/// Per-actor state, created lazily and dropped by `SynergyEngine::remove_actor`.
///
/// The component tables are public: effects work on them directly through
/// `EffectContext::state`.
#[derive(Debug)]
pub struct ActorState {
    actor: ActorId,
    pub cooldowns: CooldownTable,
    pub timed: TimedStateTable,
    pub max_health: AttributeModifierLedger,
    pub rejection: RejectionAccumulator,
    pub history: PositionHistoryRing,
    pub(crate) combo: ComboCounter,
    combo_timeout_ms: u64,
    last_position: Option<Position>,
    standing_ticks: u64,
    temp_modifiers: FxHashMap<String, f32>,
    pub(crate) overflow_reported: bool,
}

impl ActorState {
    pub fn new(actor: ActorId, config: &EngineConfig) -> Self {
        Self {
            actor,
            cooldowns: CooldownTable::new(),
            timed: TimedStateTable::new(),
            max_health: AttributeModifierLedger::max_health(),
            rejection: RejectionAccumulator::new(config.rejection_threshold),
            history: PositionHistoryRing::new(config.history_capacity),
            combo: ComboCounter::default(),
            combo_timeout_ms: config.combo_timeout_ms,
            last_position: None,
            standing_ticks: 0,
            temp_modifiers: FxHashMap::default(),
            overflow_reported: false,
        }
    }

    #[must_use]
    pub fn actor(&self) -> ActorId {
        self.actor
    }

    // === Combo ===

    /// Count a hit at `now_ms`. A gap longer than the timeout starts a new combo.
    pub fn register_hit(&mut self, now_ms: u64) -> u32 {
        self.expire_combo(now_ms);
        self.combo.count = self.combo.count.saturating_add(1);
        self.combo.last_hit_ms = Some(now_ms);
        self.combo.count
    }

    /// Reset the combo if the timeout has passed. Returns whether it reset.
    pub fn expire_combo(&mut self, now_ms: u64) -> bool {
        match self.combo.last_hit_ms {
            Some(last) if now_ms.saturating_sub(last) > self.combo_timeout_ms => {
                self.reset_combo();
                true
            }
            _ => false,
        }
    }

    pub fn reset_combo(&mut self) {
        self.combo = ComboCounter::default();
    }

    #[must_use]
    pub fn combo_count(&self) -> u32 {
        self.combo.count
    }

    // === Standing still ===

    /// Feed the current position. Returns consecutive ticks spent within
    /// `epsilon` blocks of the previous position.
    pub fn update_standing(&mut self, position: Position, epsilon: f64) -> u64 {
        match self.last_position {
            Some(last) if last.distance_sq(position) <= epsilon * epsilon => {
                self.standing_ticks = self.standing_ticks.saturating_add(1);
            }
            _ => self.standing_ticks = 0,
        }
        self.last_position = Some(position);
        self.standing_ticks
    }

    #[must_use]
    pub fn standing_ticks(&self) -> u64 {
        self.standing_ticks
    }

    // === Temporary modifiers ===

    /// Scratch values effects keep between dispatches (e.g. a stored bonus).
    pub fn set_temp_modifier(&mut self, key: &str, value: f32) {
        self.temp_modifiers.insert(key.to_string(), value);
    }

    #[must_use]
    pub fn temp_modifier(&self, key: &str) -> Option<f32> {
        self.temp_modifiers.get(key).copied()
    }

    pub fn remove_temp_modifier(&mut self, key: &str) -> Option<f32> {
        self.temp_modifiers.remove(key)
    }

    pub(crate) fn temp_modifiers(&self) -> impl Iterator<Item = (&str, f32)> {
        self.temp_modifiers.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Whether a dispatch depth overflow has already been reported for this actor.
    #[must_use]
    pub fn overflow_reported(&self) -> bool {
        self.overflow_reported
    }
}
