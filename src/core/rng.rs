//! Deterministic random number generation for trials.
//!
//! ## Key Features
//!
//! - **Deterministic**: Same seed produces identical sequence
//! - **Context streams**: Independent sequences for different purposes
//!
//! ## Usage
//!
//! ```
//! use rust_goldfish::core::TrialRng;
//!
//! let rng = TrialRng::new(42);
//!
//! // Shuffling and mulligans draw from separate streams
//! let mut shuffle = rng.for_context("library");
//! let mut mulligan = rng.for_context("mulligan");
//!
//! let mut a = vec![1, 2, 3, 4, 5];
//! let mut b = a.clone();
//! shuffle.shuffle(&mut a);
//! mulligan.shuffle(&mut b);
//!
//! // The same context always reproduces the same stream
//! let mut again = TrialRng::new(42).for_context("library");
//! let mut c = vec![1, 2, 3, 4, 5];
//! again.shuffle(&mut c);
//! assert_eq!(a, c);
//! ```

use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHasher;

/// Multiplier used to spread consecutive seeds across the seed space.
pub const SEED_SPREAD: u64 = 0x9E37_79B9_7F4A_7C15;

/// Deterministic RNG for a single trial.
///
/// Uses ChaCha8 for speed while maintaining high quality randomness.
#[derive(Clone, Debug)]
pub struct TrialRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl TrialRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this RNG was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Create an independent stream for a specific context.
    ///
    /// Uses `FxHasher` so the derived seed is stable across platforms and
    /// toolchains.
    #[must_use]
    pub fn for_context(&self, context: &str) -> Self {
        let mut hasher = FxHasher::default();
        self.seed.hash(&mut hasher);
        context.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }
}
