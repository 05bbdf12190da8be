//! Sampling without replacement.

use super::{draw_index, snapshot};
use crate::arbitrary::Factory;
use crate::mimic::{IntoMimic, Mimic};
use crate::random::Prng;
use arbitrary_core::Value;
use std::collections::HashSet;
use tracing::warn;

/// Arrays of `count` elements at distinct positions of one pool draw.
///
/// `count` is evaluated once per draw, without the caller's source. A count
/// larger than the pool is clamped to the pool length. Positions are drawn
/// by rejection, so a caller source that keeps repeating taken positions
/// makes the draw spin.
pub fn take(
    count: impl Into<Factory<usize>>,
    pool: impl IntoMimic,
    seed: Option<u32>,
) -> Mimic {
    let count = count.into();
    let pool = Mimic::wrap(pool);
    let prng = Prng::new(seed);

    Mimic::new(Factory::from_source_fn(move |source| {
        let items = snapshot(&pool);
        let len = items.len();
        let requested = count.produce(None);
        let n = if requested > len {
            warn!(
                "Requested {} distinct element(s) from a pool of {}, taking {}",
                requested, len, len
            );
            len
        } else {
            requested
        };

        let mut taken = HashSet::with_capacity(n);
        let mut result = Vec::with_capacity(n);
        while result.len() < n {
            let index = draw_index(source, &prng, len);
            if taken.insert(index) {
                result.push(items.get(index).cloned().unwrap_or(Value::Null));
            }
        }
        Value::Array(result)
    }))
}
