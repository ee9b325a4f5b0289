//! Persisting actor state across sessions.
//!
//! Durations are stored as *remaining* time so a snapshot taken on one
//! server clock restores correctly on another. Expiry callbacks are code,
//! not data: restored timed states expire silently.

use serde::{Deserialize, Serialize};

use crate::core::{ActorId, EngineConfig, GameClock};
use crate::error::SnapshotError;

use super::actor::{ActorState, ComboCounter};
use super::history::HistorySnapshot;

/// Serializable form of an `ActorState`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActorStateSnapshot {
    pub actor: ActorId,
    /// Tick the snapshot was taken at; history ticks are relative to it.
    pub taken_at_tick: u64,
    /// `(effect id, remaining ms)`, sorted by id.
    pub cooldowns: Vec<(String, u64)>,
    /// `(state id, remaining ticks)`, sorted by id.
    pub timed_states: Vec<(String, u64)>,
    pub max_health_percent: f32,
    pub rejection: f32,
    pub history: Vec<HistorySnapshot>,
    pub combo_count: u32,
    /// Sorted by key.
    pub temp_modifiers: Vec<(String, f32)>,
}

impl ActorStateSnapshot {
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

impl ActorState {
    /// Capture everything persistable at `clock`. Expired entries are left out.
    #[must_use]
    pub fn snapshot(&self, clock: GameClock) -> ActorStateSnapshot {
        let mut cooldowns: Vec<_> = self
            .cooldowns
            .iter()
            .filter(|&(_, expiry)| expiry > clock.now_ms())
            .map(|(id, expiry)| (id.to_string(), expiry - clock.now_ms()))
            .collect();
        cooldowns.sort();

        let mut timed_states: Vec<_> = self
            .timed
            .iter()
            .filter(|&(_, expiry)| expiry > clock.tick())
            .map(|(id, expiry)| (id.to_string(), expiry - clock.tick()))
            .collect();
        timed_states.sort();

        let mut temp_modifiers: Vec<_> = self.temp_modifiers().map(|(k, v)| (k.to_string(), v)).collect();
        temp_modifiers.sort_by(|a, b| a.0.cmp(&b.0));

        ActorStateSnapshot {
            actor: self.actor(),
            taken_at_tick: clock.tick(),
            cooldowns,
            timed_states,
            max_health_percent: self.max_health.percent(),
            rejection: self.rejection.value(),
            history: self.history.iter().copied().collect(),
            combo_count: self.combo.count,
            temp_modifiers,
        }
    }

    /// Rebuild a state from `snapshot`, rebasing durations on `clock`.
    ///
    /// The ledger sum is restored but not applied to the host; the caller
    /// does that (see `SynergyEngine::restore_actor`).
    pub fn restore(snapshot: &ActorStateSnapshot, config: &EngineConfig, clock: GameClock) -> Self {
        let mut state = ActorState::new(snapshot.actor, config);

        for (id, remaining) in &snapshot.cooldowns {
            state.cooldowns.set_cooldown(id, *remaining, clock.now_ms());
        }
        for (id, remaining) in &snapshot.timed_states {
            state.timed.activate(id, *remaining, clock.tick());
        }
        state.max_health.restore_percent(snapshot.max_health_percent);
        state.rejection.set(snapshot.rejection);

        // Entries that would land before tick 0 on the new clock are dropped
        for entry in &snapshot.history {
            let ago = snapshot.taken_at_tick.saturating_sub(entry.tick);
            if let Some(tick) = clock.tick().checked_sub(ago) {
                state.history.record(HistorySnapshot { tick, ..*entry });
            }
        }

        if snapshot.combo_count > 0 {
            state.combo = ComboCounter {
                count: snapshot.combo_count,
                last_hit_ms: Some(clock.now_ms()),
            };
        }
        for (key, value) in &snapshot.temp_modifiers {
            state.set_temp_modifier(key, *value);
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Position;

    fn populated(clock: GameClock) -> ActorState {
        let config = EngineConfig::default();
        let mut state = ActorState::new(ActorId::new(4), &config);
        state.cooldowns.set_cooldown("dash", 2_000, clock.now_ms());
        state.cooldowns.set_cooldown("expired", 10, 0);
        state.timed.activate_with("shield", 40, clock.tick(), |_| {});
        state.max_health.restore_percent(-15.0);
        state.rejection.set(42.0);
        for tick in 95..=100 {
            state.history.record(HistorySnapshot::new(tick, Position::new(tick as f64, 0.0, 0.0), 18.0));
        }
        state.register_hit(clock.now_ms());
        state.set_temp_modifier("stored", 3.5);
        state
    }

    #[test]
    fn test_snapshot_contents() {
        let clock = GameClock::new(100, 10_000);
        let snapshot = populated(clock).snapshot(clock);

        assert_eq!(snapshot.cooldowns, vec![("dash".to_string(), 2_000)]);
        assert_eq!(snapshot.timed_states, vec![("shield".to_string(), 40)]);
        assert_eq!(snapshot.max_health_percent, -15.0);
        assert_eq!(snapshot.rejection, 42.0);
        assert_eq!(snapshot.history.len(), 6);
        assert_eq!(snapshot.combo_count, 1);
    }

    #[test]
    fn test_restore_rebases_on_new_clock() {
        let clock = GameClock::new(100, 10_000);
        let bytes = populated(clock).snapshot(clock).to_bytes().unwrap();
        let snapshot = ActorStateSnapshot::from_bytes(&bytes).unwrap();

        let later = GameClock::new(5_000, 900_000);
        let mut state = ActorState::restore(&snapshot, &EngineConfig::default(), later);

        assert_eq!(state.cooldowns.remaining_ms("dash", later.now_ms()), 2_000);
        assert_eq!(state.timed.remaining_ticks("shield", later.tick()), 40);
        assert!(state.timed.is_active("shield", later.tick()));
        assert_eq!(state.max_health.percent(), -15.0);
        assert_eq!(state.rejection.value(), 42.0);
        assert_eq!(state.combo_count(), 1);
        assert_eq!(state.temp_modifier("stored"), Some(3.5));

        // "5 ticks ago" still means the same moment
        let five_ago = state.history.snapshot_at(5, later.tick()).unwrap();
        assert_eq!(five_ago.position, Position::new(95.0, 0.0, 0.0));
        assert_eq!(five_ago.tick, 4_995);
    }

    #[test]
    fn test_restore_on_early_clock_keeps_spacing() {
        let clock = GameClock::new(100, 10_000);
        let snapshot = populated(clock).snapshot(clock);

        let early = GameClock::new(3, 150);
        let state = ActorState::restore(&snapshot, &EngineConfig::default(), early);

        // Ticks 95 and 96 would precede tick 0; the rest keep one tick apart
        let restored: Vec<_> = state.history.iter().map(|s| (s.tick, s.position.x)).collect();
        assert_eq!(restored, vec![(0, 97.0), (1, 98.0), (2, 99.0), (3, 100.0)]);
        assert_eq!(state.history.snapshot_at(3, early.tick()).map(|s| s.position.x), Some(97.0));
    }

    #[test]
    fn test_corrupt_bytes_error() {
        assert!(ActorStateSnapshot::from_bytes(&[1, 2, 3]).is_err());
    }
}
