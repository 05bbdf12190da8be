//! Continuous distributions driven by a seeded [`Prng`].
//!
//! Every parameter is a [`Factory<f64>`], so bounds, means or rates can be
//! generators themselves. Parameters are re-evaluated on every draw.

use crate::arbitrary::{Arbitrary, Factory, Generate, Source};
use crate::error::FactoryError;
use crate::random::Prng;
use std::f64::consts::PI;

/// Reject constant parameters that fail `valid`.
fn check_constant(
    name: &'static str,
    factory: &Factory<f64>,
    valid: impl Fn(f64) -> bool,
    reason: &'static str,
) -> Result<(), FactoryError> {
    match factory.as_constant() {
        Some(&value) if !valid(value) => Err(FactoryError::InvalidParameter {
            name,
            value,
            reason,
        }),
        _ => Ok(()),
    }
}

fn check_finite(name: &'static str, factory: &Factory<f64>) -> Result<(), FactoryError> {
    check_constant(name, factory, f64::is_finite, "must be finite")
}

/// Uniform distribution over `[min, max)`.
#[derive(Clone, Debug)]
pub struct Uniform {
    min: Factory<f64>,
    max: Factory<f64>,
    prng: Prng,
}

impl Uniform {
    /// Create a uniform distribution with its own PRNG.
    pub fn new(
        min: impl Into<Factory<f64>>,
        max: impl Into<Factory<f64>>,
        seed: Option<u32>,
    ) -> Result<Self, FactoryError> {
        Self::with_prng(min, max, Prng::new(seed))
    }

    /// Create a uniform distribution drawing from an existing PRNG.
    pub fn with_prng(
        min: impl Into<Factory<f64>>,
        max: impl Into<Factory<f64>>,
        prng: Prng,
    ) -> Result<Self, FactoryError> {
        let (min, max) = (min.into(), max.into());
        check_finite("min", &min)?;
        check_finite("max", &max)?;
        Ok(Self { min, max, prng })
    }

    /// Draw one value.
    pub fn draw(&self) -> f64 {
        let min = self.min.produce(None);
        let max = self.max.produce(None);
        min + (max - min) * self.prng.next_f64()
    }
}

/// Normal distribution, sampled with the Box-Muller transform.
#[derive(Clone, Debug)]
pub struct Gaussian {
    mean: Factory<f64>,
    std: Factory<f64>,
    prng: Prng,
}

impl Gaussian {
    /// Create a normal distribution with its own PRNG.
    pub fn new(
        mean: impl Into<Factory<f64>>,
        std: impl Into<Factory<f64>>,
        seed: Option<u32>,
    ) -> Result<Self, FactoryError> {
        Self::with_prng(mean, std, Prng::new(seed))
    }

    /// Create a normal distribution drawing from an existing PRNG.
    pub fn with_prng(
        mean: impl Into<Factory<f64>>,
        std: impl Into<Factory<f64>>,
        prng: Prng,
    ) -> Result<Self, FactoryError> {
        let (mean, std) = (mean.into(), std.into());
        check_finite("mean", &mean)?;
        check_constant(
            "std",
            &std,
            |s| s.is_finite() && s >= 0.0,
            "must be finite and non-negative",
        )?;
        Ok(Self { mean, std, prng })
    }

    /// Draw one value.
    pub fn draw(&self) -> f64 {
        // [0, 1) -> (0, 1] keeps ln(u) finite
        let u = 1.0 - self.prng.next_f64();
        let v = self.prng.next_f64();
        let z = (-2.0 * u.ln()).sqrt() * (2.0 * PI * v).cos();
        self.mean.produce(None) + self.std.produce(None) * z
    }
}

/// Exponential distribution, sampled by inverting its CDF.
#[derive(Clone, Debug)]
pub struct Exponential {
    lambda: Factory<f64>,
    prng: Prng,
}

impl Exponential {
    /// Create an exponential distribution with its own PRNG.
    pub fn new(lambda: impl Into<Factory<f64>>, seed: Option<u32>) -> Result<Self, FactoryError> {
        Self::with_prng(lambda, Prng::new(seed))
    }

    /// Create an exponential distribution drawing from an existing PRNG.
    pub fn with_prng(lambda: impl Into<Factory<f64>>, prng: Prng) -> Result<Self, FactoryError> {
        let lambda = lambda.into();
        check_constant(
            "lambda",
            &lambda,
            |l| l.is_finite() && l > 0.0,
            "must be finite and positive",
        )?;
        Ok(Self { lambda, prng })
    }

    /// Draw one value.
    pub fn draw(&self) -> f64 {
        let u = 1.0 - self.prng.next_f64();
        -u.ln() / self.lambda.produce(None)
    }
}

macro_rules! impl_generate {
    ($($t:ty),*) => {
        $(impl Generate for $t {
            type Output = f64;

            fn invoke(&self, _source: Option<&Source>) -> f64 {
                self.draw()
            }

            fn to_arbitrary(&self) -> Arbitrary<f64> {
                let distribution = self.clone();
                Arbitrary::from_fn(move || distribution.draw())
            }
        })*
    };
}

impl_generate!(Uniform, Gaussian, Exponential);

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn mean_and_std(values: &[f64]) -> (f64, f64) {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        (mean, variance.sqrt())
    }

    #[test]
    fn test_uniform_range() {
        let uniform = Uniform::new(0.0, 10.0, Some(42)).unwrap();
        for value in uniform.sample(1000) {
            assert!((0.0..10.0).contains(&value));
        }
    }

    #[test]
    fn test_uniform_unseeded_range() {
        let uniform = Uniform::new(-10.0, 10.0, None).unwrap();
        for value in uniform.sample(1000) {
            assert!((-10.0..10.0).contains(&value));
        }
    }

    #[test]
    fn test_uniform_matches_prng() {
        let uniform = Uniform::new(5.0, 7.0, Some(9)).unwrap();
        let raw = Prng::from_seed(9).sample(20);

        for (value, x) in uniform.sample(20).into_iter().zip(raw) {
            assert_abs_diff_eq!(value, 5.0 + 2.0 * x, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_uniform_generated_bounds() {
        let max = Arbitrary::from_fn(|| 2.0_f64);
        let uniform = Uniform::new(1.0, max, Some(3)).unwrap();
        for value in uniform.sample(200) {
            assert!((1.0..2.0).contains(&value));
        }
    }

    #[test]
    fn test_uniform_rejects_non_finite() {
        let result = Uniform::new(f64::NEG_INFINITY, 1.0, None);
        assert!(matches!(
            result,
            Err(FactoryError::InvalidParameter { name: "min", .. })
        ));
    }

    #[test]
    fn test_gaussian_moments() {
        let gaussian = Gaussian::new(0.0, 1.0, Some(42)).unwrap();
        let (mean, std) = mean_and_std(&gaussian.sample(10_000));

        assert_abs_diff_eq!(mean, 0.0, epsilon = 0.1);
        assert_abs_diff_eq!(std, 1.0, epsilon = 0.1);
    }

    #[test]
    fn test_gaussian_shifted_moments() {
        let gaussian = Gaussian::new(30.0, 10.0, Some(1234)).unwrap();
        let (mean, std) = mean_and_std(&gaussian.sample(10_000));

        assert_abs_diff_eq!(mean, 30.0, epsilon = 1.0);
        assert_abs_diff_eq!(std, 10.0, epsilon = 1.0);
    }

    #[test]
    fn test_gaussian_is_finite() {
        let gaussian = Gaussian::new(0.0, 1.0, Some(0)).unwrap();
        assert!(gaussian.sample(1000).iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_gaussian_rejects_negative_std() {
        assert!(matches!(
            Gaussian::new(0.0, -1.0, None),
            Err(FactoryError::InvalidParameter { name: "std", .. })
        ));
    }

    #[test]
    fn test_exponential_mean() {
        let exponential = Exponential::new(0.5, Some(42)).unwrap();
        let values = exponential.sample(10_000);
        let (mean, _) = mean_and_std(&values);

        assert!(values.iter().all(|x| *x >= 0.0 && x.is_finite()));
        assert_abs_diff_eq!(mean, 2.0, epsilon = 0.15);
    }

    #[test]
    fn test_exponential_rejects_zero_rate() {
        assert!(matches!(
            Exponential::new(0.0, None),
            Err(FactoryError::InvalidParameter { name: "lambda", .. })
        ));
    }

    #[test]
    fn test_meta_distribution() {
        let mean = Uniform::new(100.0, 200.0, Some(1)).unwrap().to_arbitrary();
        let gaussian = Gaussian::new(mean, 0.0, Some(2)).unwrap();

        for value in gaussian.sample(100) {
            assert!((100.0..200.0).contains(&value));
        }
    }

    #[test]
    fn test_shared_prng_interleaves() {
        let prng = Prng::from_seed(11);
        let a = Uniform::with_prng(0.0, 1.0, prng.clone()).unwrap();
        let b = Uniform::with_prng(0.0, 1.0, prng).unwrap();
        let reference = Prng::from_seed(11).sample(2);

        assert_eq!(a.call(), reference[0]);
        assert_eq!(b.call(), reference[1]);
    }

    #[test]
    fn test_seeded_distributions_reproduce() {
        let first = Gaussian::new(50.0, 10.0, Some(42)).unwrap().sample(10);
        let second = Gaussian::new(50.0, 10.0, Some(42)).unwrap().sample(10);

        assert_eq!(first, second);
    }
}
