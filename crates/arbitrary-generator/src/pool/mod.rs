//! Pool combinators built on projections and uniform indexes.
//!
//! A pool is anything convertible into a [`Mimic`](crate::Mimic) over an
//! array: a literal `Vec<Value>`, a generator of arrays, or an existing
//! projection. Every draw works on one snapshot of the pool, taken by
//! invoking it, so generated pools are fresh per draw and never mixed
//! within one. When a caller passes a source, its draws are used as raw indexes
//! (floored) instead of the combinator's own uniform draws.

pub mod compose;
pub mod pick;
pub mod shuffle;
pub mod take;

pub use compose::compose;
pub use pick::pick;
pub use shuffle::shuffle;
pub use take::take;

use crate::arbitrary::{Generate, Source};
use crate::random::Prng;
use arbitrary_core::Value;

/// The pool's elements for one draw.
///
/// Generated pools are drawn anew; a pool that is not an array has no
/// elements.
fn snapshot(pool: &impl Generate<Output = Value>) -> Vec<Value> {
    match pool.invoke(None) {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

/// Next index into a pool of `len` elements, from the caller's source when
/// given, otherwise uniform over `[0, len)`.
fn draw_index(source: Option<&Source>, prng: &Prng, len: usize) -> usize {
    to_index(match source {
        Some(source) => source.call(),
        None => len as f64 * prng.next_f64(),
    })
}

/// Floor a draw into an index.
///
/// Negative and non-finite draws map to `usize::MAX`, which no pool holds,
/// so they project to `Null`.
fn to_index(x: f64) -> usize {
    if x.is_finite() && x >= 0.0 {
        x.floor() as usize
    } else {
        usize::MAX
    }
}
