//! Fixed-capacity ring of past positions and health, one entry per tick.
//!
//! Rewind-style effects look back a number of ticks and restore what they
//! find. Once the ring is full the oldest entry is overwritten, so lookups
//! further back than the retained window return `None` and the calling
//! effect picks its own fallback.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::core::Position;

/// One recorded moment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub tick: u64,
    pub position: Position,
    pub health: f32,
}

impl HistorySnapshot {
    #[must_use]
    pub const fn new(tick: u64, position: Position, health: f32) -> Self {
        Self { tick, position, health }
    }
}

/// Ring buffer of `HistorySnapshot`s ordered by tick.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionHistoryRing {
    entries: VecDeque<HistorySnapshot>,
    capacity: usize,
}

impl PositionHistoryRing {
    /// Create a ring. A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a snapshot.
    ///
    /// A second record for the latest tick replaces it; a record older than
    /// the latest tick is dropped. Returns whether the snapshot was kept.
    pub fn record(&mut self, snapshot: HistorySnapshot) -> bool {
        if let Some(last) = self.entries.back_mut() {
            if snapshot.tick < last.tick {
                return false;
            }
            if snapshot.tick == last.tick {
                *last = snapshot;
                return true;
            }
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(snapshot);
        true
    }

    /// The snapshot at or nearest before `now - ticks_ago`.
    ///
    /// `None` when that instant is older than the oldest retained entry.
    #[must_use]
    pub fn snapshot_at(&self, ticks_ago: u64, now: u64) -> Option<&HistorySnapshot> {
        let target = now.checked_sub(ticks_ago)?;
        let oldest = self.entries.front()?;
        if target < oldest.tick {
            return None;
        }
        self.entries.iter().rev().find(|s| s.tick <= target)
    }

    #[must_use]
    pub fn latest(&self) -> Option<&HistorySnapshot> {
        self.entries.back()
    }

    #[must_use]
    pub fn oldest(&self) -> Option<&HistorySnapshot> {
        self.entries.front()
    }

    /// Up to `count` most recent snapshots, newest first.
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &HistorySnapshot> {
        self.entries.iter().rev().take(count)
    }

    /// All snapshots, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistorySnapshot> {
        self.entries.iter()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
