//! Rejection accumulator.
//!
//! Rejection is the body's intolerance for installed modules. It only
//! matters whether it has reached the critical threshold; warning the player
//! when it gets there is the host's job.

use tracing::warn;

/// Non-negative accumulator with a critical threshold. No ceiling.
#[derive(Clone, Debug, PartialEq)]
pub struct RejectionAccumulator {
    value: f32,
    threshold: f32,
}

impl RejectionAccumulator {
    pub fn new(threshold: f32) -> Self {
        Self { value: 0.0, threshold }
    }

    /// Add `amount` (may be negative), flooring the result at 0.
    ///
    /// Non-finite amounts are ignored. Returns the new value.
    pub fn add(&mut self, amount: f32) -> f32 {
        if !amount.is_finite() {
            warn!(amount, "ignoring non-finite rejection change");
            return self.value;
        }
        self.value = (self.value + amount).max(0.0);
        self.value
    }

    /// Overwrite the value, flooring at 0.
    pub fn set(&mut self, value: f32) {
        self.value = if value.is_finite() { value.max(0.0) } else { 0.0 };
    }

    /// Remove up to `amount`, never going below 0.
    pub fn decay(&mut self, amount: f32) -> f32 {
        self.add(-amount.abs())
    }

    #[must_use]
    pub fn value(&self) -> f32 {
        self.value
    }

    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    #[must_use]
    pub fn is_critical(&self) -> bool {
        self.value >= self.threshold
    }

    /// Fraction of the threshold reached, capped at 1. Effects scale penalties by it.
    #[must_use]
    pub fn penalty(&self) -> f32 {
        if self.threshold <= 0.0 {
            return 1.0;
        }
        (self.value / self.threshold).min(1.0)
    }
}

impl Default for RejectionAccumulator {
    fn default() -> Self {
        Self::new(100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_floor_at_zero() {
        let mut r = RejectionAccumulator::default();
        r.add(10.0);
        assert_eq!(r.add(-1000.0), 0.0);
        assert_eq!(r.value(), 0.0);
    }

    #[test]
    fn test_no_ceiling() {
        let mut r = RejectionAccumulator::default();
        r.add(250.0);
        assert_eq!(r.value(), 250.0);
        assert_eq!(r.penalty(), 1.0);
    }

    #[test]
    fn test_critical_at_threshold() {
        let mut r = RejectionAccumulator::new(50.0);
        r.add(49.9);
        assert!(!r.is_critical());
        r.add(0.1);
        assert!(r.is_critical());
    }

    #[test]
    fn test_decay_and_non_finite() {
        let mut r = RejectionAccumulator::default();
        r.set(1.0);
        r.decay(0.25);
        assert_eq!(r.value(), 0.75);
        r.decay(-5.0); // sign ignored
        assert_eq!(r.value(), 0.0);

        r.add(f32::NAN);
        assert_eq!(r.value(), 0.0);
        r.set(f32::INFINITY);
        assert_eq!(r.value(), 0.0);
    }

    proptest! {
        #[test]
        fn test_never_negative(steps in proptest::collection::vec(-500.0f32..500.0, 0..64)) {
            let mut r = RejectionAccumulator::default();
            for step in steps {
                r.add(step);
                prop_assert!(r.value() >= 0.0);
            }
        }
    }
}
