//! Core types for the arbitrary-factory toolkit.
//!
//! This crate provides the foundational types shared by the generator
//! crate and the command-line front end:
//!
//! - [`Value`] - Dynamically shaped generated value (scalars, arrays, objects)
//! - [`Key`] - Address of a field inside a composite value
//! - [`Recipe`] - Declarative generator graph loaded from YAML
//!
//! # Architecture
//!
//! ```text
//! arbitrary-core (this crate)
//!    │
//!    └─── arbitrary-generator  (generators, projections, recipe compiler)
//!            │
//!            └─── arbitrary-factory  (CLI: sample recipes as JSON lines)
//! ```
//!
//! # Example
//!
//! ```rust
//! use arbitrary_core::{Key, Value};
//!
//! let card = Value::from_iter([("suit", "♠"), ("rank", "A")]);
//! assert_eq!(card.project(&Key::from("rank")), Value::from("A"));
//! assert_eq!(card.project(&Key::from("joker")), Value::Null);
//! ```

pub mod recipe;
pub mod value;

// Re-exports for convenience
pub use recipe::{Count, GeneratorConfig, PathSegment, Param, Pool, Recipe, RecipeError};
pub use value::{Key, Value};
