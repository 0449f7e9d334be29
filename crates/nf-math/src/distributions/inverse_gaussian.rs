//! Inverse Gaussian (Wald) distribution.
//!
//! ```text
//! f(x; μ, λ) = √(λ / (2π x³)) · exp(−λ (x − μ)² / (2 μ² x)),   x > 0
//! ```
//!
//! The first time `ν t + σ W_t` reaches a level `a > 0` (with `ν > 0`) is
//! inverse Gaussian with mean `a / ν` and shape `a² / σ²`.

use crate::distributions::normal::{log_normal_cdf, normal_cdf};
use crate::random_numbers::seeded_rng;
use nf_core::{ensure, Real, Result};
use rand::Rng;
use rand_distr::StandardNormal;
use std::f64::consts::PI;

/// Inverse Gaussian distribution with mean `μ` and shape `λ`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InverseGaussian {
    mean: Real,
    shape: Real,
}

impl InverseGaussian {
    /// Create a distribution with mean `mean > 0` and shape `shape > 0`.
    pub fn new(mean: Real, shape: Real) -> Result<Self> {
        ensure!(
            mean > 0.0 && mean.is_finite(),
            "mean must be positive and finite, got {mean}"
        );
        ensure!(
            shape > 0.0 && shape.is_finite(),
            "shape must be positive and finite, got {shape}"
        );
        Ok(Self { mean, shape })
    }

    /// Law of the first passage time of `drift · t + volatility · W_t`
    /// through `level`.
    pub fn first_passage(level: Real, drift: Real, volatility: Real) -> Result<Self> {
        ensure!(level > 0.0, "barrier level must be positive, got {level}");
        ensure!(
            drift > 0.0,
            "drift must be positive for an almost surely finite passage time, got {drift}"
        );
        ensure!(volatility > 0.0, "volatility must be positive, got {volatility}");
        Self::new(level / drift, level * level / (volatility * volatility))
    }

    /// Mean `μ`.
    pub fn mean(&self) -> Real {
        self.mean
    }

    /// Shape `λ`.
    pub fn shape(&self) -> Real {
        self.shape
    }

    /// Variance `μ³ / λ`.
    pub fn variance(&self) -> Real {
        self.mean.powi(3) / self.shape
    }

    /// Skewness `3 √(μ / λ)`.
    pub fn skewness(&self) -> Real {
        3.0 * (self.mean / self.shape).sqrt()
    }

    /// Mode `μ (√(1 + 9μ²/(4λ²)) − 3μ/(2λ))`.
    pub fn mode(&self) -> Real {
        let r = self.mean / self.shape;
        self.mean * ((1.0 + 2.25 * r * r).sqrt() - 1.5 * r)
    }

    /// Probability density; zero for `x ≤ 0`.
    pub fn pdf(&self, x: Real) -> Real {
        if x <= 0.0 {
            return 0.0;
        }
        let (mu, lambda) = (self.mean, self.shape);
        (lambda / (2.0 * PI * x.powi(3))).sqrt()
            * (-lambda * (x - mu).powi(2) / (2.0 * mu * mu * x)).exp()
    }

    /// Cumulative distribution function; zero for `x ≤ 0`.
    pub fn cdf(&self, x: Real) -> Real {
        if x <= 0.0 {
            return 0.0;
        }
        let (mu, lambda) = (self.mean, self.shape);
        let s = (lambda / x).sqrt();
        let first = normal_cdf(s * (x / mu - 1.0));
        // exp(2λ/μ) overflows long before the product does
        let second = (2.0 * lambda / mu + log_normal_cdf(-s * (x / mu + 1.0))).exp();
        (first + second).min(1.0)
    }

    /// Draw one variate with the Michael–Schucany–Haas transformation.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Real {
        let (mu, lambda) = (self.mean, self.shape);
        let nu: Real = rng.sample(StandardNormal);
        let y = nu * nu;
        let x = mu + mu * mu * y / (2.0 * lambda)
            - mu / (2.0 * lambda) * (4.0 * mu * lambda * y + mu * mu * y * y).sqrt();
        let z: Real = rng.gen();
        if z <= mu / (mu + x) {
            x
        } else {
            mu * mu / x
        }
    }

    /// Draw `n` variates from a generator seeded with `seed`.
    pub fn sample_n(&self, n: usize, seed: Option<u64>) -> Vec<Real> {
        let mut rng = seeded_rng(seed);
        (0..n).map(|_| self.sample(&mut rng)).collect()
    }
}
