//! Deterministic random number generation for chance-gated effects.
//!
//! ## Key Features
//!
//! - **Deterministic**: Same seed produces identical proc rolls
//! - **Serializable**: O(1) state capture and restore, so a saved session
//!   resumes the exact roll sequence
//!
//! ```
//! use rust_synergy::core::GameRng;
//!
//! let mut rng = GameRng::new(42);
//! assert!(rng.roll(1.0));
//! assert!(!rng.roll(0.0));
//!
//! let state = rng.state();
//! let mut resumed = GameRng::from_state(&state);
//! assert_eq!(rng.roll(0.5), resumed.roll(0.5));
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Deterministic RNG owned by the engine world.
///
/// Uses ChaCha8 for speed with a serializable word position.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Roll against a probability in `[0, 1]`. Out-of-range values clamp;
    /// NaN never succeeds.
    pub fn roll(&mut self, probability: f64) -> bool {
        if probability.is_nan() {
            return false;
        }
        self.inner.gen_bool(probability.clamp(0.0, 1.0))
    }

    /// Get the current state for serialization.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore from a saved state.
    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self { inner, seed: state.seed }
    }
}

/// Serializable RNG state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    /// Original seed
    pub seed: u64,
    /// ChaCha8 word position
    pub word_pos: u128,
}
