//! Tick-based timed states (buffs, debuffs, windows) with expiry callbacks.
//!
//! ## Semantics
//!
//! - `activate` overwrites: the last activation wins and its timer restarts.
//!   A callback registered by an overwritten activation is dropped unfired.
//! - `sweep(tick)` removes every entry with `expiry_tick <= tick` and hands
//!   back its callback, to be invoked exactly once by the caller.
//! - A check that finds a stale entry removes it on the spot. Its callback
//!   is queued and returned by the next sweep, so it still fires once.
//! - `deactivate` removes an entry without firing its callback.

use rustc_hash::FxHashMap;

use crate::bridge::{ActorHost, ResourceBridge};
use crate::core::ActorId;

use super::actor::ActorState;

/// What an expiry callback can touch.
pub struct ExpiryScope<'a> {
    pub actor: ActorId,
    /// Tick at which the sweep ran.
    pub tick: u64,
    pub now_ms: u64,
    pub state: &'a mut ActorState,
    pub host: &'a mut dyn ActorHost,
    pub resources: &'a mut dyn ResourceBridge,
}

/// Callback run once when a timed state expires.
pub type ExpireCallback = Box<dyn FnOnce(&mut ExpiryScope<'_>)>;

struct TimedEntry {
    expiry_tick: u64,
    on_expire: Option<ExpireCallback>,
}

/// A state removed by a sweep.
pub struct ExpiredState {
    pub id: String,
    pub expiry_tick: u64,
    pub on_expire: Option<ExpireCallback>,
}

impl std::fmt::Debug for ExpiredState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiredState")
            .field("id", &self.id)
            .field("expiry_tick", &self.expiry_tick)
            .field("has_callback", &self.on_expire.is_some())
            .finish()
    }
}

/// Map of state id to expiry tick and optional callback.
#[derive(Default)]
pub struct TimedStateTable {
    entries: FxHashMap<String, TimedEntry>,
    pending: Vec<ExpiredState>,
}

impl TimedStateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate `id` for `duration_ticks` from `current_tick`, without a callback.
    pub fn activate(&mut self, id: &str, duration_ticks: u64, current_tick: u64) {
        self.insert(id, current_tick.saturating_add(duration_ticks), None);
    }

    /// Activate `id` and run `on_expire` once when it expires.
    pub fn activate_with<F>(&mut self, id: &str, duration_ticks: u64, current_tick: u64, on_expire: F)
    where
        F: FnOnce(&mut ExpiryScope<'_>) + 'static,
    {
        self.insert(id, current_tick.saturating_add(duration_ticks), Some(Box::new(on_expire)));
    }

    pub(crate) fn insert(&mut self, id: &str, expiry_tick: u64, on_expire: Option<ExpireCallback>) {
        self.entries.insert(id.to_string(), TimedEntry { expiry_tick, on_expire });
    }

    /// True iff `id` is present and `current_tick < expiry_tick`.
    pub fn is_active(&mut self, id: &str, current_tick: u64) -> bool {
        match self.entries.get(id) {
            Some(entry) if current_tick < entry.expiry_tick => true,
            Some(_) => {
                if let Some((id, entry)) = self.entries.remove_entry(id) {
                    self.pending.push(ExpiredState {
                        id,
                        expiry_tick: entry.expiry_tick,
                        on_expire: entry.on_expire,
                    });
                }
                false
            }
            None => false,
        }
    }

    /// Ticks until expiry, zero when absent or already expired.
    #[must_use]
    pub fn remaining_ticks(&self, id: &str, current_tick: u64) -> u64 {
        self.entries
            .get(id)
            .map_or(0, |entry| entry.expiry_tick.saturating_sub(current_tick))
    }

    #[must_use]
    pub fn expiry_tick(&self, id: &str) -> Option<u64> {
        self.entries.get(id).map(|entry| entry.expiry_tick)
    }

    /// Push an active state's expiry back by `extra_ticks`, keeping the
    /// remaining duration at or under `max_remaining` when given.
    /// Returns whether the state existed.
    pub fn extend(&mut self, id: &str, extra_ticks: u64, max_remaining: Option<u64>, current_tick: u64) -> bool {
        let Some(entry) = self.entries.get_mut(id) else {
            return false;
        };
        let mut expiry = entry.expiry_tick.saturating_add(extra_ticks);
        if let Some(max) = max_remaining {
            expiry = expiry.min(current_tick.saturating_add(max));
        }
        entry.expiry_tick = expiry;
        true
    }

    /// Remove `id` without firing its callback.
    pub fn deactivate(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Remove everything with `expiry_tick <= current_tick`.
    ///
    /// Also returns entries queued by earlier stale checks. Results are
    /// ordered by expiry tick, then id.
    pub fn sweep(&mut self, current_tick: u64) -> Vec<ExpiredState> {
        let mut expired = std::mem::take(&mut self.pending);

        let due: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.expiry_tick <= current_tick)
            .map(|(id, _)| id.clone())
            .collect();

        for id in due {
            if let Some(entry) = self.entries.remove(&id) {
                expired.push(ExpiredState {
                    id,
                    expiry_tick: entry.expiry_tick,
                    on_expire: entry.on_expire,
                });
            }
        }

        expired.sort_by(|a, b| a.expiry_tick.cmp(&b.expiry_tick).then_with(|| a.id.cmp(&b.id)));
        expired
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(id, expiry_tick)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(id, entry)| (id.as_str(), entry.expiry_tick))
    }
}

impl std::fmt::Debug for TimedStateTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counter_callback(counter: &Rc<Cell<u32>>) -> impl FnOnce(&mut ExpiryScope<'_>) + 'static {
        let counter = Rc::clone(counter);
        move |_| counter.set(counter.get() + 1)
    }

    #[test]
    fn test_sweep_removes_at_expiry_tick() {
        let mut table = TimedStateTable::new();
        table.activate("haste", 10, 100);

        assert!(table.sweep(109).is_empty());
        let expired = table.sweep(110);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, "haste");
        assert_eq!(expired[0].expiry_tick, 110);
        assert!(table.is_empty());
        assert!(table.sweep(200).is_empty());
    }

    #[test]
    fn test_activate_overwrites_and_restarts() {
        let mut table = TimedStateTable::new();
        table.activate_with("shield", 10, 0, |_| {});
        table.activate("shield", 30, 5);

        assert_eq!(table.len(), 1);
        assert_eq!(table.expiry_tick("shield"), Some(35));
        // The overwritten activation's callback is gone
        let expired = table.sweep(35);
        assert_eq!(expired.len(), 1);
        assert!(expired[0].on_expire.is_none());
    }

    #[test]
    fn test_stale_check_removes_and_queues_callback() {
        let fired = Rc::new(Cell::new(0));
        let mut table = TimedStateTable::new();
        table.activate_with("window", 5, 0, counter_callback(&fired));

        assert!(table.is_active("window", 4));
        assert!(!table.is_active("window", 5));
        assert!(table.is_empty());

        let expired = table.sweep(5);
        assert_eq!(expired.len(), 1);
        assert!(expired[0].on_expire.is_some());
        assert!(table.sweep(6).is_empty());
        assert_eq!(fired.get(), 0); // sweep only hands callbacks back
    }

    #[test]
    fn test_remaining_and_extend() {
        let mut table = TimedStateTable::new();
        table.activate("overdrive", 20, 0);
        assert_eq!(table.remaining_ticks("overdrive", 5), 15);

        assert!(table.extend("overdrive", 10, None, 5));
        assert_eq!(table.remaining_ticks("overdrive", 5), 25);

        // Capped at 20 remaining from tick 5
        assert!(table.extend("overdrive", 100, Some(20), 5));
        assert_eq!(table.expiry_tick("overdrive"), Some(25));

        assert!(!table.extend("missing", 1, None, 5));
        assert_eq!(table.remaining_ticks("missing", 5), 0);
    }

    #[test]
    fn test_deactivate_drops_callback() {
        let mut table = TimedStateTable::new();
        table.activate_with("debt", 5, 0, |_| {});
        assert!(table.deactivate("debt"));
        assert!(!table.deactivate("debt"));
        assert!(table.sweep(100).is_empty());
    }

    #[test]
    fn test_sweep_order_is_deterministic() {
        let mut table = TimedStateTable::new();
        table.activate("c", 3, 0);
        table.activate("a", 3, 0);
        table.activate("b", 1, 0);

        let ids: Vec<_> = table.sweep(10).into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }
}
