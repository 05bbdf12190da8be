//! Pick one element of a pool.

use super::{draw_index, snapshot};
use crate::arbitrary::Arbitrary;
use crate::mimic::{IntoMimic, Mimic};
use crate::random::Prng;
use arbitrary_core::Value;

/// One uniformly chosen element per draw.
///
/// Generated pools are drawn again for every pick. An index outside the
/// pool, or any pick from an empty pool, yields `Null`.
pub fn pick(pool: impl IntoMimic, seed: Option<u32>) -> Arbitrary<Value> {
    let pool = Mimic::wrap(pool);
    let prng = Prng::new(seed);

    Arbitrary::from_source_fn(move |source| {
        let items = snapshot(&pool);
        let index = draw_index(source, &prng, items.len());
        items.get(index).cloned().unwrap_or(Value::Null)
    })
}
