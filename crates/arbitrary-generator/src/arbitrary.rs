//! The generator abstraction and its combinators.
//!
//! An [`Arbitrary<T>`] is a cheap, shareable handle around a derivation
//! rule. Nothing is computed until the generator is invoked; every
//! combinator returns a new handle that closes over the previous one.
//!
//! Every invocation may receive a [`Source`]: another generator whose
//! draws the rule is allowed to consume instead of its own randomness.
//! Passing the same source to several generators keeps their draws
//! correlated.

use arbitrary_core::Value;
use std::fmt;
use std::sync::Arc;

/// A generator used as a source of randomness by another generator.
pub type Source = Arbitrary<f64>;

type Rule<T> = dyn Fn(Option<&Source>) -> T + Send + Sync;

/// Lazy generator of values of type `T`.
pub struct Arbitrary<T> {
    rule: Arc<Rule<T>>,
}

impl<T> Clone for Arbitrary<T> {
    fn clone(&self) -> Self {
        Self {
            rule: Arc::clone(&self.rule),
        }
    }
}

impl<T> fmt::Debug for Arbitrary<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Arbitrary<{}>", std::any::type_name::<T>())
    }
}

/// Derivation rule accepted by generator constructors.
pub enum Factory<T> {
    /// Fixed value, cloned on every draw
    Constant(T),

    /// Computation that may consume the caller's source
    Function(Arc<Rule<T>>),

    /// Another generator
    Arbitrary(Arbitrary<T>),
}

impl<T: Clone> Clone for Factory<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Constant(value) => Self::Constant(value.clone()),
            Self::Function(rule) => Self::Function(Arc::clone(rule)),
            Self::Arbitrary(arbitrary) => Self::Arbitrary(arbitrary.clone()),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Factory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::Function(_) => f.write_str("Function"),
            Self::Arbitrary(arbitrary) => f.debug_tuple("Arbitrary").field(arbitrary).finish(),
        }
    }
}

impl<T> Factory<T> {
    /// Wrap a fixed value.
    pub fn constant(value: T) -> Self {
        Self::Constant(value)
    }

    /// Wrap a zero-argument computation.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::Function(Arc::new(move |_: Option<&Source>| f()))
    }

    /// Wrap a computation that receives the caller's source.
    pub fn from_source_fn<F>(f: F) -> Self
    where
        F: Fn(Option<&Source>) -> T + Send + Sync + 'static,
    {
        Self::Function(Arc::new(f))
    }

    /// The fixed value, if this factory is one.
    pub fn as_constant(&self) -> Option<&T> {
        match self {
            Self::Constant(value) => Some(value),
            _ => None,
        }
    }

    /// Produce one value, handing `source` to the rule.
    pub fn produce(&self, source: Option<&Source>) -> T
    where
        T: Clone + 'static,
    {
        match self {
            Self::Constant(value) => value.clone(),
            Self::Function(rule) => rule(source),
            Self::Arbitrary(arbitrary) => arbitrary.invoke(source),
        }
    }
}

impl<T> From<Arbitrary<T>> for Factory<T> {
    fn from(arbitrary: Arbitrary<T>) -> Self {
        Self::Arbitrary(arbitrary)
    }
}

impl From<f64> for Factory<f64> {
    fn from(value: f64) -> Self {
        Self::Constant(value)
    }
}

impl From<usize> for Factory<usize> {
    fn from(value: usize) -> Self {
        Self::Constant(value)
    }
}

impl From<Value> for Factory<Value> {
    fn from(value: Value) -> Self {
        Self::Constant(value)
    }
}

impl From<Vec<Value>> for Factory<Value> {
    fn from(values: Vec<Value>) -> Self {
        Self::Constant(Value::Array(values))
    }
}

impl<T: 'static> Arbitrary<T> {
    /// Create a generator from a zero-argument computation.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::from_source_fn(move |_| f())
    }

    /// Create a generator from a computation that receives the caller's source.
    pub fn from_source_fn<F>(f: F) -> Self
    where
        F: Fn(Option<&Source>) -> T + Send + Sync + 'static,
    {
        Self { rule: Arc::new(f) }
    }
}

impl<T: Clone + Send + Sync + 'static> Arbitrary<T> {
    /// Create a generator from a rule, optionally binding a source.
    ///
    /// A bound source replaces whatever source callers pass to
    /// [`Generate::invoke`]. Constants ignore sources entirely.
    pub fn new(factory: impl Into<Factory<T>>, bound: Option<Source>) -> Self {
        match (factory.into(), bound) {
            (Factory::Constant(value), _) => Self::constant(value),
            (Factory::Arbitrary(arbitrary), None) => arbitrary,
            (factory, Some(bound)) => {
                Self::from_source_fn(move |_| factory.produce(Some(&bound)))
            }
            (factory, None) => Self::from_source_fn(move |source| factory.produce(source)),
        }
    }

    /// Create a generator that yields a fresh clone of `value` on every draw.
    pub fn constant(value: T) -> Self {
        Self::from_source_fn(move |_| value.clone())
    }
}

/// Conversion hint for [`Generate::coerce`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hint {
    /// String representation
    String,
    /// Numeric representation
    Number,
    /// The raw value
    Default,
}

/// Result of [`Generate::coerce`].
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive<T> {
    String(String),
    Number(f64),
    Value(T),
}

/// Numeric view of a generated value.
///
/// Values without a sensible numeric form convert to `NaN`.
pub trait ToNumber {
    fn to_number(&self) -> f64;
}

macro_rules! impl_to_number {
    ($($t:ty),*) => {
        $(impl ToNumber for $t {
            fn to_number(&self) -> f64 {
                *self as f64
            }
        })*
    };
}

impl_to_number!(f64, f32, i64, i32, i16, i8, u64, u32, u16, u8, usize, isize);

impl ToNumber for bool {
    fn to_number(&self) -> f64 {
        if *self {
            1.0
        } else {
            0.0
        }
    }
}

impl ToNumber for str {
    fn to_number(&self) -> f64 {
        let trimmed = self.trim();
        if trimmed.is_empty() {
            0.0
        } else {
            trimmed.parse().unwrap_or(f64::NAN)
        }
    }
}

impl ToNumber for String {
    fn to_number(&self) -> f64 {
        self.as_str().to_number()
    }
}

impl ToNumber for Value {
    fn to_number(&self) -> f64 {
        match self {
            Value::Bool(b) => b.to_number(),
            Value::Int(i) => *i as f64,
            Value::Float(x) => *x,
            Value::String(s) => s.to_number(),
            Value::Null => 0.0,
            // Arrays go through their string form: `[]` is 0, `[x]` is x
            Value::Array(items) => match items.as_slice() {
                [] | [Value::Null] => 0.0,
                [item] => item.to_string().to_number(),
                _ => f64::NAN,
            },
            Value::Object(_) => f64::NAN,
        }
    }
}

/// Common interface of everything that generates values.
///
/// Implementors provide [`invoke`](Generate::invoke) and a conversion to a
/// plain [`Arbitrary`]; the combinators are derived from those two.
pub trait Generate: Send + Sync {
    /// Type of generated values.
    type Output: 'static;

    /// Produce one value, optionally drawing from `source`.
    fn invoke(&self, source: Option<&Source>) -> Self::Output;

    /// A plain generator handle with the same behaviour.
    fn to_arbitrary(&self) -> Arbitrary<Self::Output>;

    /// Produce one value using the generator's own randomness.
    fn call(&self) -> Self::Output {
        self.invoke(None)
    }

    /// Transform generated values. The transform runs once per draw.
    fn map<U, F>(&self, transform: F) -> Arbitrary<U>
    where
        U: 'static,
        F: Fn(Self::Output) -> U + Send + Sync + 'static,
    {
        let this = self.to_arbitrary();
        Arbitrary::from_source_fn(move |source| transform(this.invoke(source)))
    }

    /// Keep drawing until `predicate` holds.
    ///
    /// There is no attempt limit: a predicate that (almost) never holds
    /// makes every draw spin.
    fn filter<F>(&self, predicate: F) -> Arbitrary<Self::Output>
    where
        F: Fn(&Self::Output) -> bool + Send + Sync + 'static,
    {
        let this = self.to_arbitrary();
        Arbitrary::from_source_fn(move |source| loop {
            let value = this.invoke(source);
            if predicate(&value) {
                return value;
            }
        })
    }

    /// Eagerly draw `count` values.
    fn sample(&self, count: usize) -> Vec<Self::Output> {
        (0..count).map(|_| self.invoke(None)).collect()
    }

    /// Eagerly draw values, handing `source` to every draw.
    ///
    /// A generated `count` is evaluated once, without the source.
    fn sample_with(
        &self,
        count: impl Into<Factory<usize>>,
        source: Option<&Source>,
    ) -> Vec<Self::Output> {
        let count = count.into().produce(None);
        (0..count).map(|_| self.invoke(source)).collect()
    }

    /// Lazy counterpart of [`sample_with`](Generate::sample_with): each draw
    /// is a whole batch.
    fn repeat(&self, times: impl Into<Factory<usize>>) -> Arbitrary<Vec<Self::Output>> {
        let this = self.to_arbitrary();
        let times = times.into();
        Arbitrary::from_source_fn(move |source| this.sample_with(times.clone(), source))
    }

    /// Infinite iterator of draws.
    fn iter(&self) -> Draws<Self::Output> {
        Draws {
            arbitrary: self.to_arbitrary(),
        }
    }

    /// Lazily convert draws to their string form.
    fn stringify(&self) -> Arbitrary<String>
    where
        Self::Output: fmt::Display,
    {
        self.map(|value| value.to_string())
    }

    /// Draw once and convert to a string.
    fn coerce_string(&self) -> String
    where
        Self::Output: fmt::Display,
    {
        self.call().to_string()
    }

    /// Draw once and convert to a number.
    fn coerce_number(&self) -> f64
    where
        Self::Output: ToNumber,
    {
        self.call().to_number()
    }

    /// Draw once and convert according to `hint`.
    fn coerce(&self, hint: Hint) -> Primitive<Self::Output>
    where
        Self::Output: fmt::Display + ToNumber,
    {
        let value = self.call();
        match hint {
            Hint::String => Primitive::String(value.to_string()),
            Hint::Number => Primitive::Number(value.to_number()),
            Hint::Default => Primitive::Value(value),
        }
    }
}

impl<T: 'static> Generate for Arbitrary<T> {
    type Output = T;

    fn invoke(&self, source: Option<&Source>) -> T {
        (self.rule)(source)
    }

    fn to_arbitrary(&self) -> Arbitrary<T> {
        self.clone()
    }
}

/// Infinite iterator over the draws of a generator.
pub struct Draws<T> {
    arbitrary: Arbitrary<T>,
}

impl<T: 'static> Iterator for Draws<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        Some(self.arbitrary.invoke(None))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

impl<T: 'static> IntoIterator for &Arbitrary<T> {
    type Item = T;
    type IntoIter = Draws<T>;

    fn into_iter(self) -> Draws<T> {
        self.iter()
    }
}
