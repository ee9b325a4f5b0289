//! Per-actor cooldowns keyed by effect id.
//!
//! Cooldowns are wall-clock (milliseconds) rather than ticks, so a lagging
//! server does not stretch them. Entries store the absolute expiry instant.
//! An expired entry is deleted by the first check that notices it.

use rustc_hash::FxHashMap;

/// Map of effect id to expiry instant in milliseconds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CooldownTable {
    expiries: FxHashMap<String, u64>,
}

impl CooldownTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) a cooldown of `duration_ms` from `now_ms`.
    pub fn set_cooldown(&mut self, id: &str, duration_ms: u64, now_ms: u64) {
        self.expiries.insert(id.to_string(), now_ms.saturating_add(duration_ms));
    }

    /// True iff `id` has an entry and `now_ms < expiry`.
    ///
    /// A stale entry is removed as a side effect and reported as not on cooldown.
    pub fn is_on_cooldown(&mut self, id: &str, now_ms: u64) -> bool {
        match self.expiries.get(id) {
            Some(&expiry) if now_ms < expiry => true,
            Some(_) => {
                self.expiries.remove(id);
                false
            }
            None => false,
        }
    }

    /// `max(0, expiry - now)`. Zero when absent.
    #[must_use]
    pub fn remaining_ms(&self, id: &str, now_ms: u64) -> u64 {
        self.expiries.get(id).map_or(0, |&expiry| expiry.saturating_sub(now_ms))
    }

    /// Shorten a running cooldown. Does nothing if `id` has no entry.
    pub fn reduce(&mut self, id: &str, by_ms: u64) {
        if let Some(expiry) = self.expiries.get_mut(id) {
            *expiry = expiry.saturating_sub(by_ms);
        }
    }

    /// Drop a cooldown regardless of remaining time.
    pub fn clear(&mut self, id: &str) -> bool {
        self.expiries.remove(id).is_some()
    }

    /// Remove every expired entry. Returns how many were removed.
    pub fn purge_expired(&mut self, now_ms: u64) -> usize {
        let before = self.expiries.len();
        self.expiries.retain(|_, &mut expiry| now_ms < expiry);
        before - self.expiries.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.expiries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expiries.is_empty()
    }

    /// Iterate `(id, expiry_ms)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.expiries.iter().map(|(id, &expiry)| (id.as_str(), expiry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_is_exclusive() {
        let mut table = CooldownTable::new();
        table.set_cooldown("dash", 1_000, 5_000);

        assert!(table.is_on_cooldown("dash", 5_000));
        assert!(table.is_on_cooldown("dash", 5_999));
        assert!(!table.is_on_cooldown("dash", 6_000));
        // Removed by the check above
        assert!(table.is_empty());
        assert!(!table.is_on_cooldown("dash", 5_500));
    }

    #[test]
    fn test_remaining() {
        let mut table = CooldownTable::new();
        table.set_cooldown("dash", 1_000, 0);
        assert_eq!(table.remaining_ms("dash", 250), 750);
        assert_eq!(table.remaining_ms("dash", 2_000), 0);
        assert_eq!(table.remaining_ms("missing", 0), 0);
    }

    #[test]
    fn test_restart_overwrites() {
        let mut table = CooldownTable::new();
        table.set_cooldown("dash", 1_000, 0);
        table.set_cooldown("dash", 200, 500);
        assert_eq!(table.len(), 1);
        assert_eq!(table.remaining_ms("dash", 500), 200);
    }

    #[test]
    fn test_reduce_and_clear() {
        let mut table = CooldownTable::new();
        table.set_cooldown("dash", 1_000, 0);
        table.reduce("dash", 400);
        assert_eq!(table.remaining_ms("dash", 0), 600);
        table.reduce("dash", 10_000);
        assert!(!table.is_on_cooldown("dash", 0));

        table.set_cooldown("blink", 100, 0);
        assert!(table.clear("blink"));
        assert!(!table.clear("blink"));
    }

    #[test]
    fn test_purge_expired() {
        let mut table = CooldownTable::new();
        table.set_cooldown("a", 100, 0);
        table.set_cooldown("b", 200, 0);
        table.set_cooldown("c", 300, 0);
        assert_eq!(table.purge_expired(200), 2);
        assert_eq!(table.len(), 1);
        assert!(table.is_on_cooldown("c", 200));
    }
}
