//! Randomness sources.

use crate::arbitrary::{Arbitrary, Factory, Generate, Source};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

/// Mulberry32 state increment.
const MULBERRY_INCREMENT: u32 = 0x6D2B_79F5;

/// 2^32, to normalize a `u32` into `[0, 1)`.
const U32_RANGE: f64 = 4_294_967_296.0;

static DEFAULT_SOURCE: OnceLock<Source> = OnceLock::new();

/// Process-wide default source of randomness.
///
/// Backed by the thread-local RNG of the `rand` crate and created on first
/// use. Pass a seeded [`Prng`] instead wherever reproducibility matters.
pub fn default_source() -> Source {
    DEFAULT_SOURCE
        .get_or_init(|| Randomizer::default().to_arbitrary())
        .clone()
}

/// Seed derived from the wall clock, in milliseconds truncated to 32 bits.
pub fn time_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u32)
        .unwrap_or_default()
}

/// Generator of numbers in `[0, 1)`.
#[derive(Clone, Debug)]
pub struct Randomizer {
    arbitrary: Arbitrary<f64>,
}

impl Randomizer {
    /// Wrap a numeric rule.
    pub fn new(factory: impl Into<Factory<f64>>) -> Self {
        Self {
            arbitrary: Arbitrary::new(factory, None),
        }
    }
}

impl Default for Randomizer {
    fn default() -> Self {
        Self::new(Arbitrary::from_fn(rand::random::<f64>))
    }
}

impl Generate for Randomizer {
    type Output = f64;

    fn invoke(&self, source: Option<&Source>) -> f64 {
        self.arbitrary.invoke(source)
    }

    fn to_arbitrary(&self) -> Arbitrary<f64> {
        self.arbitrary.clone()
    }
}

/// Seeded pseudo-random source (Mulberry32).
///
/// Two instances built from the same seed produce the same sequence.
/// Clones share one state: drawing from a clone advances the original.
#[derive(Clone, Debug)]
pub struct Prng {
    state: Arc<AtomicU32>,
    seed: u32,
}

impl Prng {
    /// Create a source from `seed`, or from the clock when `None`.
    pub fn new(seed: Option<u32>) -> Self {
        Self::from_seed(seed.unwrap_or_else(time_seed))
    }

    /// Create a source from an explicit seed.
    pub fn from_seed(seed: u32) -> Self {
        Self {
            state: Arc::new(AtomicU32::new(seed)),
            seed,
        }
    }

    /// The seed this source was created with.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Advance the state and return the next number in `[0, 1)`.
    pub fn next_f64(&self) -> f64 {
        let s = self
            .state
            .fetch_add(MULBERRY_INCREMENT, Ordering::Relaxed)
            .wrapping_add(MULBERRY_INCREMENT);
        let mut t = (s ^ (s >> 15)).wrapping_mul(1 | s);
        t = t.wrapping_add((t ^ (t >> 7)).wrapping_mul(61 | t) ^ t);
        (t ^ (t >> 14)) as f64 / U32_RANGE
    }
}

impl Generate for Prng {
    type Output = f64;

    fn invoke(&self, _source: Option<&Source>) -> f64 {
        self.next_f64()
    }

    fn to_arbitrary(&self) -> Arbitrary<f64> {
        let prng = self.clone();
        Arbitrary::from_fn(move || prng.next_f64())
    }
}
