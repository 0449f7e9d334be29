//! Univariate Gaussian mixture models.
//!
//! ```text
//! f(x) = Σᵢ wᵢ φ((x − μᵢ) / σᵢ) / σᵢ,   Σᵢ wᵢ = 1
//! ```
//!
//! Mixtures of two or three normals are the usual first model for fat-tailed,
//! skewed return distributions.

use nf_core::{ensure, errors::Error, Real, Result};
use nf_math::random_numbers::seeded_rng;
use nf_math::{normal_cdf, normal_pdf};
use rand::Rng;
use rand_distr::StandardNormal;
use tracing::{debug, warn};

/// Tolerance on `|Σ wᵢ − 1|`.
pub const WEIGHT_SUM_TOLERANCE: Real = 1e-10;

const LN_SQRT_2PI: Real = 0.918_938_533_204_672_8;

/// A mixture of univariate normal distributions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaussianMixture {
    weights: Vec<Real>,
    means: Vec<Real>,
    variances: Vec<Real>,
}

impl GaussianMixture {
    /// Create a mixture from component weights, means and variances.
    ///
    /// All three must have the same non-zero length; weights must be
    /// non-negative and sum to one, variances positive.
    pub fn new(weights: Vec<Real>, means: Vec<Real>, variances: Vec<Real>) -> Result<Self> {
        let k = weights.len();
        ensure!(k >= 1, "a mixture needs at least one component");
        if means.len() != k {
            return Err(Error::DimensionMismatch {
                expected: k,
                actual: means.len(),
            });
        }
        if variances.len() != k {
            return Err(Error::DimensionMismatch {
                expected: k,
                actual: variances.len(),
            });
        }
        ensure!(
            weights.iter().all(|&w| w >= 0.0 && w.is_finite()),
            "weights must be non-negative"
        );
        let total: Real = weights.iter().sum();
        ensure!(
            (total - 1.0).abs() <= WEIGHT_SUM_TOLERANCE,
            "weights must sum to 1, got {total}"
        );
        ensure!(
            variances.iter().all(|&v| v > 0.0 && v.is_finite()),
            "variances must be positive"
        );
        ensure!(means.iter().all(|m| m.is_finite()), "means must be finite");
        Ok(Self {
            weights,
            means,
            variances,
        })
    }

    /// Number of components.
    pub fn n_components(&self) -> usize {
        self.weights.len()
    }

    /// Component weights.
    pub fn weights(&self) -> &[Real] {
        &self.weights
    }

    /// Component means.
    pub fn means(&self) -> &[Real] {
        &self.means
    }

    /// Component variances.
    pub fn variances(&self) -> &[Real] {
        &self.variances
    }

    fn components(&self) -> impl Iterator<Item = (Real, Real, Real)> + '_ {
        self.weights
            .iter()
            .zip(&self.means)
            .zip(&self.variances)
            .map(|((&w, &m), &v)| (w, m, v.sqrt()))
    }

    /// Density at `x`.
    pub fn pdf(&self, x: Real) -> Real {
        self.components()
            .map(|(w, m, s)| w * normal_pdf((x - m) / s) / s)
            .sum()
    }

    /// Density at each point of `xs`.
    pub fn pdf_many(&self, xs: &[Real]) -> Vec<Real> {
        xs.iter().map(|&x| self.pdf(x)).collect()
    }

    /// Distribution function at `x`.
    pub fn cdf(&self, x: Real) -> Real {
        self.components()
            .map(|(w, m, s)| w * normal_cdf((x - m) / s))
            .sum()
    }

    /// Mixture mean `Σ wᵢ μᵢ`.
    pub fn mean(&self) -> Real {
        self.components().map(|(w, m, _)| w * m).sum()
    }

    /// Mixture variance `Σ wᵢ (σᵢ² + μᵢ²) − mean²`.
    pub fn variance(&self) -> Real {
        let mean = self.mean();
        let second: Real = self.components().map(|(w, m, s)| w * (s * s + m * m)).sum();
        second - mean * mean
    }

    /// `ln(wᵢ φᵢ(x))` for every component.
    fn log_weighted_densities(&self, x: Real, out: &mut [Real]) {
        for (o, (w, m, s)) in out.iter_mut().zip(self.components()) {
            let z = (x - m) / s;
            *o = w.ln() - s.ln() - LN_SQRT_2PI - 0.5 * z * z;
        }
    }

    /// Total log-likelihood of `data`.
    pub fn log_likelihood(&self, data: &[Real]) -> Real {
        let mut buf = vec![0.0; self.n_components()];
        data.iter()
            .map(|&x| {
                self.log_weighted_densities(x, &mut buf);
                log_sum_exp(&buf)
            })
            .sum()
    }

    /// Posterior component probabilities given an observation `x`.
    pub fn responsibilities(&self, x: Real) -> Vec<Real> {
        let mut buf = vec![0.0; self.n_components()];
        self.log_weighted_densities(x, &mut buf);
        let total = log_sum_exp(&buf);
        buf.iter().map(|l| (l - total).exp()).collect()
    }

    /// Draw `n` samples.
    pub fn sample_n(&self, n: usize, seed: Option<u64>) -> Vec<Real> {
        let mut rng = seeded_rng(seed);
        let last = self.n_components() - 1;
        (0..n)
            .map(|_| {
                let u: Real = rng.gen();
                let mut acc = 0.0;
                let mut k = last;
                for (i, &w) in self.weights.iter().enumerate() {
                    acc += w;
                    if u < acc {
                        k = i;
                        break;
                    }
                }
                let z: Real = rng.sample(StandardNormal);
                self.means[k] + self.variances[k].sqrt() * z
            })
            .collect()
    }

    /// Fit a `n_components` mixture to `data` by expectation–maximisation.
    ///
    /// Means start at evenly spaced sample quantiles, variances at the
    /// sample variance and weights at `1/k`. Iteration stops once the mean
    /// log-likelihood per observation changes by less than
    /// `config.tolerance`.
    pub fn fit_em(data: &[Real], n_components: usize, config: &EmConfig) -> Result<EmFit> {
        let n = data.len();
        let k = n_components;
        ensure!(k >= 1, "need at least one component");
        ensure!(n > k, "need more observations ({n}) than components ({k})");
        ensure!(data.iter().all(|x| x.is_finite()), "data must be finite");

        let mut sorted = data.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let sample_mean = data.iter().sum::<Real>() / n as Real;
        let sample_var = (data.iter().map(|x| (x - sample_mean).powi(2)).sum::<Real>()
            / n as Real)
            .max(config.variance_floor);

        let mut weights = vec![1.0 / k as Real; k];
        let mut means: Vec<Real> = (0..k)
            .map(|i| {
                let q = (i as Real + 0.5) / k as Real;
                sorted[((q * n as Real) as usize).min(n - 1)]
            })
            .collect();
        let mut variances = vec![sample_var; k];

        let mut resp = vec![0.0; n * k];
        let mut buf = vec![0.0; k];
        let mut previous = Real::NEG_INFINITY;
        let mut log_likelihood = previous;

        for iteration in 1..=config.max_iterations {
            let current = Self {
                weights: weights.clone(),
                means: means.clone(),
                variances: variances.clone(),
            };

            // E-step
            log_likelihood = 0.0;
            for (i, &x) in data.iter().enumerate() {
                current.log_weighted_densities(x, &mut buf);
                let total = log_sum_exp(&buf);
                log_likelihood += total;
                for j in 0..k {
                    resp[i * k + j] = (buf[j] - total).exp();
                }
            }

            // M-step
            for j in 0..k {
                let nj: Real = (0..n).map(|i| resp[i * k + j]).sum();
                if nj <= Real::EPSILON {
                    // empty component: leave it where it is with negligible weight
                    weights[j] = 0.0;
                    continue;
                }
                let mj = (0..n).map(|i| resp[i * k + j] * data[i]).sum::<Real>() / nj;
                let vj = (0..n)
                    .map(|i| resp[i * k + j] * (data[i] - mj).powi(2))
                    .sum::<Real>()
                    / nj;
                weights[j] = nj / n as Real;
                means[j] = mj;
                variances[j] = vj.max(config.variance_floor);
            }
            let total: Real = weights.iter().sum();
            weights.iter_mut().for_each(|w| *w /= total);

            let per_obs = log_likelihood / n as Real;
            debug!(iteration, log_likelihood, "EM iteration");
            if (per_obs - previous).abs() < config.tolerance {
                let mixture = Self::new(weights, means, variances)?;
                let log_likelihood = mixture.log_likelihood(data);
                return Ok(EmFit {
                    mixture,
                    log_likelihood,
                    iterations: iteration,
                    converged: true,
                });
            }
            previous = per_obs;
        }

        warn!(
            max_iterations = config.max_iterations,
            log_likelihood, "EM stopped at the iteration cap"
        );
        let mixture = Self::new(weights, means, variances)?;
        let log_likelihood = mixture.log_likelihood(data);
        Ok(EmFit {
            mixture,
            log_likelihood,
            iterations: config.max_iterations,
            converged: false,
        })
    }
}

fn log_sum_exp(xs: &[Real]) -> Real {
    let max = xs.iter().copied().fold(Real::NEG_INFINITY, Real::max);
    if max == Real::NEG_INFINITY {
        return max;
    }
    max + xs.iter().map(|x| (x - max).exp()).sum::<Real>().ln()
}

/// Settings for [`GaussianMixture::fit_em`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EmConfig {
    /// Iteration cap.
    pub max_iterations: usize,
    /// Stop when the mean log-likelihood changes by less than this.
    pub tolerance: Real,
    /// Lower bound on component variances.
    pub variance_floor: Real,
}

impl Default for EmConfig {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1e-10,
            variance_floor: 1e-10,
        }
    }
}

impl EmConfig {
    /// Set the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the convergence tolerance.
    pub fn with_tolerance(mut self, tolerance: Real) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the variance floor.
    pub fn with_variance_floor(mut self, variance_floor: Real) -> Self {
        self.variance_floor = variance_floor;
        self
    }
}

/// Result of an EM fit.
#[derive(Debug, Clone)]
pub struct EmFit {
    /// Fitted mixture.
    pub mixture: GaussianMixture,
    /// Log-likelihood of the data under the fitted mixture.
    pub log_likelihood: Real,
    /// Iterations performed.
    pub iterations: usize,
    /// Whether the tolerance was reached before the cap.
    pub converged: bool,
}
