//! Random permutations of a pool.

use super::to_index;
use crate::arbitrary::{Factory, Generate, Source};
use crate::mimic::{IntoMimic, Mimic};
use crate::random::Prng;
use arbitrary_core::Value;

/// A Fisher-Yates permutation of a fresh pool draw, projected per position.
///
/// With a caller source, the swap partner of position `i` is
/// `floor(source) mod (i + 1)`. A pool that is not an array is returned
/// unchanged.
pub fn shuffle(pool: impl IntoMimic, seed: Option<u32>) -> Mimic {
    let pool = Mimic::wrap(pool);
    let prng = Prng::new(seed);

    Mimic::new(Factory::from_source_fn(move |source: Option<&Source>| {
        let mut items = match pool.invoke(None) {
            Value::Array(items) => items,
            other => return other,
        };
        for i in (1..items.len()).rev() {
            let j = match source {
                Some(source) => to_index(source.call()) % (i + 1),
                None => (prng.next_f64() * (i + 1) as f64) as usize,
            };
            items.swap(i, j);
        }
        Value::Array(items)
    }))
}
