//! Numeric randomness: raw sources and the distributions built on them.
//!
//! [`Prng`] is the seeded leaf every distribution draws from. The
//! distributions accept their parameters as [`Factory`](crate::Factory)
//! values, so a mean or a bound may itself be generated.

pub mod distributions;
pub mod prng;

pub use distributions::{Exponential, Gaussian, Uniform};
pub use prng::{default_source, time_seed, Prng, Randomizer};
