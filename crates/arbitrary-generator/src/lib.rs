//! Lazy, composable generators of arbitrary values.
//!
//! This crate provides the generator algebra of the arbitrary-factory
//! toolkit. Generators are cheap handles: building a pipeline performs no
//! work, and every invocation derives exactly one value.
//!
//! # Architecture
//!
//! ```text
//!  Prng (Mulberry32, seeded)      Randomizer / default_source()
//!        │
//!        ▼
//!  Uniform · Gaussian · Exponential        parameters: Factory<f64>
//!        │
//!        ▼
//!  Arbitrary<T> ── map · filter · repeat · sample · coerce
//!        │
//!        ▼
//!  Mimic (per-field projection) ── pick · take · shuffle · compose
//!        │
//!        ▼
//!  RecipeCompiler (YAML recipe ──► CompiledRecipe)
//! ```
//!
//! # Example
//!
//! ```rust
//! use arbitrary_core::Value;
//! use arbitrary_generator::{compose, pick, Gaussian, Generate};
//!
//! let age = Gaussian::new(35.0, 10.0, Some(1234))
//!     .unwrap()
//!     .map(|x| x.floor() as i64);
//! let name = pick(vec![Value::from("John"), Value::from("Jane")], Some(1234));
//!
//! let profile = compose("{} is {} years old", [name.stringify(), age.stringify()]).unwrap();
//! for line in profile.sample(3) {
//!     assert!(line.ends_with("years old"));
//! }
//! ```
//!
//! # Sources
//!
//! Every invocation may receive a [`Source`], a generator of numbers the
//! rule can draw from instead of its own randomness. Handing one source to
//! several generators correlates their draws. A source bound at
//! construction with [`Arbitrary::new`] takes precedence over the caller's.

pub mod arbitrary;
pub mod error;
pub mod mimic;
pub mod pool;
pub mod random;
pub mod recipe;

// Re-exports for convenience
pub use arbitrary::{Arbitrary, Draws, Factory, Generate, Hint, Primitive, Source, ToNumber};
pub use error::FactoryError;
pub use mimic::{IntoMimic, Mimic, Projection};
pub use pool::{compose, pick, shuffle, take};
pub use random::{default_source, time_seed, Exponential, Gaussian, Prng, Randomizer, Uniform};
pub use recipe::{CompiledRecipe, RecipeCompiler};
