//! Structural projection over composite-valued generators.
//!
//! A [`Mimic`] wraps a generator of [`Value`]s and hands out one child
//! generator per field. Children read through to the last materialized
//! composite (the buffer), so fields read in the same epoch are coherent:
//!
//! ```rust
//! use arbitrary_core::Value;
//! use arbitrary_generator::{Generate, Mimic};
//!
//! let profile = Mimic::new(Value::from_iter([("name", "Jane"), ("city", "Oslo")]));
//! let name = profile.field("name");
//! assert_eq!(name.call(), Value::from("Jane"));
//! ```
//!
//! Reading a field that was already read in the current epoch regenerates
//! the whole composite first. Every other child then sees the new buffer.

use crate::arbitrary::{Arbitrary, Factory, Generate, Source};
use arbitrary_core::{Key, Value};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Buffer and fresh set of one projection node.
#[derive(Debug, Default)]
struct Epoch {
    buffer: Value,
    fresh: HashSet<Key>,
}

/// Shared state of a projection node.
///
/// Children capture the core of their parent, never the parent's child
/// cache, so there are no reference cycles.
struct MimicCore {
    factory: Factory<Value>,
    epoch: Mutex<Epoch>,
}

impl MimicCore {
    fn regenerate(&self, source: Option<&Source>) -> Value {
        // The factory may read other projections; no lock is held while it runs.
        let value = self.factory.produce(source);
        let mut epoch = self.epoch.lock();
        trace!(
            "Regenerated projection, {} fresh field(s) cleared",
            epoch.fresh.len()
        );
        epoch.buffer = value.clone();
        epoch.fresh.clear();
        value
    }

    fn read(&self, key: &Key) -> Value {
        let stale = self.epoch.lock().fresh.contains(key);
        if stale {
            self.regenerate(None);
        }
        let mut epoch = self.epoch.lock();
        epoch.fresh.insert(key.clone());
        epoch.buffer.project(key)
    }

    fn current(&self) -> Value {
        self.epoch.lock().buffer.clone()
    }
}

/// Lazy, cached per-field view over a generator of composite values.
///
/// Clones are handles to the same node: they share the buffer, the fresh
/// set and the child cache.
#[derive(Clone)]
pub struct Mimic {
    core: Arc<MimicCore>,
    children: Arc<Mutex<HashMap<Key, Projection>>>,
}

impl Mimic {
    /// Wrap a generator and materialize its first composite.
    pub fn new(factory: impl Into<Factory<Value>>) -> Self {
        let mimic = Self::empty(factory.into());
        mimic.core.regenerate(None);
        mimic
    }

    /// Wrap a generator, seeding the buffer with `sample` instead of drawing.
    pub fn with_sample(factory: impl Into<Factory<Value>>, sample: Value) -> Self {
        let mimic = Self::empty(factory.into());
        mimic.core.epoch.lock().buffer = sample;
        mimic
    }

    /// Wrap anything projectable. Wrapping a `Mimic` returns it unchanged.
    pub fn wrap(source: impl IntoMimic) -> Self {
        source.into_mimic()
    }

    fn empty(factory: Factory<Value>) -> Self {
        Self {
            core: Arc::new(MimicCore {
                factory,
                epoch: Mutex::new(Epoch::default()),
            }),
            children: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Child generator for `key`, created on first access and cached.
    ///
    /// The child is a nested `Mimic` when the field currently holds a
    /// composite, a plain generator otherwise. Invoking it reads the field
    /// from the live buffer.
    pub fn get(&self, key: impl Into<Key>) -> Projection {
        let key = key.into();
        if let Some(child) = self.children.lock().get(&key) {
            return child.clone();
        }

        let sample = self.core.current().project(&key);
        let core = Arc::clone(&self.core);
        let field = key.clone();
        let factory = Factory::from_fn(move || core.read(&field));
        let child = if sample.is_composite() {
            Projection::Nested(Self::with_sample(factory, sample))
        } else {
            Projection::Scalar(Arbitrary::new(factory, None))
        };

        self.children.lock().entry(key).or_insert(child).clone()
    }

    /// Child generator for an object field.
    pub fn field(&self, name: &str) -> Projection {
        self.get(Key::from(name))
    }

    /// Child generator for an array element.
    pub fn index(&self, index: usize) -> Projection {
        self.get(Key::Index(index))
    }

    /// Child generator for the length of the composite.
    pub fn length(&self) -> Projection {
        self.get(Key::Length)
    }

    /// Follow `path` one key at a time.
    pub fn path<'a>(&self, path: impl IntoIterator<Item = &'a Key>) -> Projection {
        path.into_iter().fold(
            Projection::Nested(self.clone()),
            |projection, key| projection.get(key.clone()),
        )
    }

    /// Read `key` from the live buffer, regenerating first if it was
    /// already read in this epoch.
    pub fn read(&self, key: impl Into<Key>) -> Value {
        self.core.read(&key.into())
    }

    /// Whether the current buffer carries `key`.
    pub fn has(&self, key: impl Into<Key>) -> bool {
        self.core.epoch.lock().buffer.has(&key.into())
    }

    /// Keys of the current buffer.
    pub fn keys(&self) -> Vec<Key> {
        self.core.epoch.lock().buffer.keys()
    }

    /// The current buffer, without touching the fresh set.
    pub fn current(&self) -> Value {
        self.core.current()
    }

    /// Plain generator of whole composites, without the per-field view.
    pub fn as_arbitrary(&self) -> Arbitrary<Value> {
        let core = Arc::clone(&self.core);
        Arbitrary::from_source_fn(move |source| core.regenerate(source))
    }
}

impl fmt::Debug for Mimic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mimic")
            .field("buffer", &self.core.epoch.lock().buffer)
            .finish_non_exhaustive()
    }
}

impl Generate for Mimic {
    type Output = Value;

    fn invoke(&self, source: Option<&Source>) -> Value {
        self.core.regenerate(source)
    }

    fn to_arbitrary(&self) -> Arbitrary<Value> {
        self.as_arbitrary()
    }
}

impl From<Mimic> for Factory<Value> {
    fn from(mimic: Mimic) -> Self {
        Self::Arbitrary(mimic.as_arbitrary())
    }
}

/// Conversion into a [`Mimic`].
pub trait IntoMimic {
    fn into_mimic(self) -> Mimic;
}

impl IntoMimic for Mimic {
    fn into_mimic(self) -> Mimic {
        self
    }
}

impl IntoMimic for Value {
    fn into_mimic(self) -> Mimic {
        Mimic::new(self)
    }
}

impl IntoMimic for Vec<Value> {
    fn into_mimic(self) -> Mimic {
        Mimic::new(self)
    }
}

impl IntoMimic for Arbitrary<Value> {
    fn into_mimic(self) -> Mimic {
        Mimic::new(self)
    }
}

impl IntoMimic for Factory<Value> {
    fn into_mimic(self) -> Mimic {
        Mimic::new(self)
    }
}

/// Child of a [`Mimic`]: a nested projection or a scalar generator.
#[derive(Clone, Debug)]
pub enum Projection {
    /// The field held a composite when the child was created
    Nested(Mimic),

    /// The field held a scalar when the child was created
    Scalar(Arbitrary<Value>),
}

impl Projection {
    /// Project further. Scalars have no fields: every key yields `Null`.
    pub fn get(&self, key: impl Into<Key>) -> Projection {
        match self {
            Self::Nested(mimic) => mimic.get(key),
            Self::Scalar(_) => Self::Scalar(Arbitrary::constant(Value::Null)),
        }
    }

    pub fn is_nested(&self) -> bool {
        matches!(self, Self::Nested(_))
    }
}

impl Generate for Projection {
    type Output = Value;

    fn invoke(&self, source: Option<&Source>) -> Value {
        match self {
            Self::Nested(mimic) => mimic.invoke(source),
            Self::Scalar(arbitrary) => arbitrary.invoke(source),
        }
    }

    fn to_arbitrary(&self) -> Arbitrary<Value> {
        match self {
            Self::Nested(mimic) => mimic.as_arbitrary(),
            Self::Scalar(arbitrary) => arbitrary.clone(),
        }
    }
}

impl From<Projection> for Factory<Value> {
    fn from(projection: Projection) -> Self {
        Self::Arbitrary(projection.to_arbitrary())
    }
}

impl IntoMimic for Projection {
    fn into_mimic(self) -> Mimic {
        match self {
            Self::Nested(mimic) => mimic,
            Self::Scalar(arbitrary) => Mimic::new(arbitrary),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::Prng;
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

    /// Generator of `{a: n, b: n}` with `n` counting up from 0.
    fn pairs() -> (Arc<AtomicUsize>, Arbitrary<Value>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let next = AtomicI64::new(0);
        let arbitrary = Arbitrary::from_fn(move || {
            c.fetch_add(1, Ordering::SeqCst);
            let n = next.fetch_add(1, Ordering::SeqCst);
            Value::from_iter([("a", n), ("b", n)])
        });
        (calls, arbitrary)
    }

    #[test]
    fn test_new_materializes_once() {
        let (calls, arbitrary) = pairs();
        let mimic = Mimic::new(arbitrary);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(mimic.current(), Value::from_iter([("a", 0), ("b", 0)]));
    }

    #[test]
    fn test_with_sample_does_not_draw() {
        let (calls, arbitrary) = pairs();
        let mimic = Mimic::with_sample(arbitrary, Value::from_iter([("a", 7)]));

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(mimic.field("a").call(), Value::Int(7));
    }

    #[test]
    fn test_wrap_is_idempotent() {
        let (calls, arbitrary) = pairs();
        let mimic = Mimic::new(arbitrary);
        let wrapped = Mimic::wrap(mimic.clone());

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&mimic.core, &wrapped.core));
    }

    #[test]
    fn test_epoch_coherence() {
        let (calls, arbitrary) = pairs();
        let mimic = Mimic::new(arbitrary);
        let a = mimic.field("a");
        let b = mimic.field("b");

        assert_eq!(a.call(), Value::Int(0));
        assert_eq!(b.call(), Value::Int(0));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // a was already read: the composite is regenerated
        assert_eq!(a.call(), Value::Int(1));
        assert_eq!(b.call(), Value::Int(1));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_correlated_fields_stay_equal() {
        let prng = Prng::from_seed(42);
        let mimic = Mimic::new(Arbitrary::from_fn(move || {
            let x = prng.next_f64();
            Value::from_iter([("x", x), ("double", x * 2.0)])
        }));
        let x = mimic.field("x");
        let double = mimic.field("double");

        for _ in 0..50 {
            let x = x.call().as_f64().unwrap();
            let double = double.call().as_f64().unwrap();
            assert_eq!(double, x * 2.0);
        }
    }

    #[test]
    fn test_children_are_cached() {
        let (_, arbitrary) = pairs();
        let mimic = Mimic::new(arbitrary);
        let first = mimic.field("a");
        let second = mimic.field("a");
        mimic.field("b");

        assert_eq!(mimic.children.lock().len(), 2);
        // Both handles read the same key, so the second read starts a new epoch
        assert_eq!(first.call(), Value::Int(0));
        assert_eq!(second.call(), Value::Int(1));
    }

    #[test]
    fn test_missing_field_is_null() {
        let mimic = Mimic::new(Value::from_iter([("a", 1)]));

        assert_eq!(mimic.field("missing").call(), Value::Null);
        assert!(!mimic.has("missing"));
        assert!(mimic.has("a"));
    }

    #[test]
    fn test_scalar_projection_yields_null() {
        let mimic = Mimic::new(Value::from_iter([("a", 1)]));
        let deeper = mimic.field("a").get("b").get(0_usize);

        assert!(!deeper.is_nested());
        assert_eq!(deeper.call(), Value::Null);
    }

    #[test]
    fn test_nested_projection() {
        let card = Arbitrary::from_fn(|| {
            Value::from_iter([(
                "hobbies",
                Value::from(vec!["reading", "coding", "gaming"]),
            )])
        });
        let mimic = Mimic::new(card);
        let hobbies = mimic.field("hobbies");

        assert!(hobbies.is_nested());
        assert_eq!(hobbies.get(1_usize).call(), Value::from("coding"));
        assert_eq!(hobbies.get(Key::Length).call(), Value::Int(3));
        assert_eq!(
            mimic.path(&[Key::from("hobbies"), Key::Index(2)]).call(),
            Value::from("gaming")
        );
    }

    #[test]
    fn test_nested_reads_through_to_parent() {
        let next = Arc::new(AtomicI64::new(0));
        let n = Arc::clone(&next);
        let mimic = Mimic::new(Arbitrary::from_fn(move || {
            let i = n.fetch_add(1, Ordering::SeqCst);
            Value::from_iter([("inner", Value::from_iter([("x", i), ("y", -i)]))])
        }));
        let inner = mimic.field("inner");
        let x = inner.get("x");
        let y = inner.get("y");

        assert_eq!(x.call(), Value::Int(0));
        assert_eq!(y.call(), Value::Int(0));
        // Re-reading x regenerates the inner node, which re-reads the parent field
        assert_eq!(x.call(), Value::Int(0));
        assert_eq!(x.call(), Value::Int(1));
        assert_eq!(y.call(), Value::Int(-1));
    }

    #[test]
    fn test_escape_accessor_returns_whole_composite() {
        let (calls, arbitrary) = pairs();
        let mimic = Mimic::new(arbitrary);
        let raw = mimic.as_arbitrary();

        assert_eq!(raw.call(), Value::from_iter([("a", 1), ("b", 1)]));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        // The regeneration cleared the fresh set and updated the buffer
        assert_eq!(mimic.field("a").call(), Value::Int(1));
    }

    #[test]
    fn test_invoke_passes_source() {
        let mimic = Mimic::new(Factory::from_source_fn(|source: Option<&Source>| {
            Value::from(vec![source.map_or(-1.0, |s| s.call())])
        }));
        let source = Arbitrary::constant(0.5);

        assert_eq!(mimic.current(), Value::from(vec![-1.0]));
        assert_eq!(mimic.invoke(Some(&source)), Value::from(vec![0.5]));
        assert_eq!(mimic.index(0).call(), Value::Float(0.5));
    }

    #[test]
    fn test_keys_and_length() {
        let mimic = Mimic::new(vec![Value::Int(1), Value::Int(2)]);

        assert_eq!(mimic.keys(), vec![Key::Index(0), Key::Index(1)]);
        assert_eq!(mimic.length().call(), Value::Int(2));
    }
}
