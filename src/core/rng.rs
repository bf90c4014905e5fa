//! Injectable Randomness
//!
//! Side assignment, board-size selection and credential generation all draw
//! from a [`RandomSource`] owned by the registry. Tests and seeded runs use
//! [`DeterministicRng`]; production uses [`EntropyRng`].

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// A source of random 64-bit values.
pub trait RandomSource: Send {
    /// Generate the next 64-bit random value.
    fn next_u64(&mut self) -> u64;

    /// Generate a random integer in range [0, bound).
    ///
    /// Returns 0 when `bound` is 0.
    fn next_below(&mut self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        // Simple modulo - slight bias for very large bounds, but acceptable
        self.next_u64() % bound
    }

    /// Flip a fair coin.
    fn next_bool(&mut self) -> bool {
        self.next_u64() & 1 == 1
    }
}

/// Deterministic PRNG (Xoroshiro128+ core, SplitMix64 seeding).
///
/// Given the same seed, produces the same sequence on every platform.
///
/// # Example
///
/// ```
/// use breakthrough::core::rng::{DeterministicRng, RandomSource};
///
/// let mut a = DeterministicRng::new(12345);
/// let mut b = DeterministicRng::new(12345);
/// assert_eq!(a.next_u64(), b.next_u64());
/// ```
#[derive(Clone, Debug)]
pub struct DeterministicRng {
    state: [u64; 2],
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Create a new RNG from a 64-bit seed.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let state0 = splitmix64(&mut s);
        let state1 = splitmix64(&mut s);

        // Ensure state is never all zeros
        let state = if state0 == 0 && state1 == 0 {
            [1, 1]
        } else {
            [state0, state1]
        };

        Self { state }
    }

    /// Select a random element from a slice.
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        if slice.is_empty() {
            None
        } else {
            let idx = self.next_below(slice.len() as u64) as usize;
            slice.get(idx)
        }
    }
}

impl RandomSource for DeterministicRng {
    #[inline]
    fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.state[1] = s1.rotate_left(37);

        result
    }
}

/// OS-seeded generator for production use.
pub struct EntropyRng {
    inner: StdRng,
}

impl EntropyRng {
    /// Seed from operating-system entropy.
    pub fn new() -> Self {
        Self {
            inner: StdRng::from_entropy(),
        }
    }
}

impl Default for EntropyRng {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for EntropyRng {
    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }
}

/// Build the registry's randomness source: seeded when a seed is given.
pub fn source_from_seed(seed: Option<u64>) -> Box<dyn RandomSource> {
    match seed {
        Some(seed) => Box::new(DeterministicRng::new(seed)),
        None => Box::new(EntropyRng::new()),
    }
}

/// SplitMix64 step.
/// Produces well-distributed values from sequential inputs.
#[inline]
pub fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

// =============================================================================
// TESTS
// =============================================================================
