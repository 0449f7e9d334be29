//! FastICA blind source separation.
//!
//! The data are centred and whitened with the leading principal axes, then
//! all unmixing directions are updated together with the fixed-point rule
//!
//! ```text
//! w⁺ = E[z g(wᵀz)] − E[g'(wᵀz)] w
//! ```
//!
//! followed by the symmetric decorrelation `W ← (W Wᵀ)^{-1/2} W`. Sources
//! are recovered up to order, sign and scale; they are returned with unit
//! variance.

use nf_core::{ensure, errors::Error, Real, Result};
use nf_math::linalg::{center_columns, covariance_matrix, inverse_sqrt, symmetric_eigen_sorted};
use nf_math::random_numbers::{seeded_rng, standard_normal_matrix};
use nf_math::{Array, Matrix};
use tracing::{debug, warn};

/// Contrast function `G` whose derivative `g` drives the fixed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Contrast {
    /// `G(u) = log cosh u`, `g(u) = tanh u`. A good general-purpose choice.
    #[default]
    LogCosh,
    /// `G(u) = −exp(−u²/2)`, robust for very super-Gaussian sources.
    Exp,
}

impl Contrast {
    /// `(g(u), g'(u))`.
    fn eval(self, u: Real) -> (Real, Real) {
        match self {
            Contrast::LogCosh => {
                let t = u.tanh();
                (t, 1.0 - t * t)
            }
            Contrast::Exp => {
                let e = (-0.5 * u * u).exp();
                (u * e, (1.0 - u * u) * e)
            }
        }
    }
}

/// Settings for [`FastIca::fit`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FastIcaConfig {
    /// Number of sources to extract; all variables when `None`.
    pub n_components: Option<usize>,
    /// Iteration cap.
    pub max_iterations: usize,
    /// Stop when every direction moves by less than this
    /// (`1 − |⟨w⁺, w⟩|`).
    pub tolerance: Real,
    /// Seed of the random initial unmixing matrix.
    pub seed: Option<u64>,
    /// Contrast function.
    pub contrast: Contrast,
}

impl Default for FastIcaConfig {
    fn default() -> Self {
        Self {
            n_components: None,
            max_iterations: 200,
            tolerance: 1e-4,
            seed: None,
            contrast: Contrast::LogCosh,
        }
    }
}

impl FastIcaConfig {
    /// Set the number of sources.
    pub fn with_n_components(mut self, n_components: usize) -> Self {
        self.n_components = Some(n_components);
        self
    }

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

    /// Fix the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the contrast function.
    pub fn with_contrast(mut self, contrast: Contrast) -> Self {
        self.contrast = contrast;
        self
    }
}

/// A fitted FastICA decomposition.
#[derive(Debug, Clone)]
pub struct FastIca {
    mean: Array,
    unmixing: Matrix,
    mixing: Matrix,
    sources: Matrix,
    iterations: usize,
    converged: bool,
}

/// `(W Wᵀ)^{-1/2} W`
fn symmetric_decorrelation(w: &Matrix) -> Result<Matrix> {
    Ok(inverse_sqrt(&(w * w.transpose()))? * w)
}

impl FastIca {
    /// Separate the columns of `data` (observations × variables) into
    /// independent sources.
    pub fn fit(data: &Matrix, config: &FastIcaConfig) -> Result<Self> {
        let (n, p) = data.shape();
        let k = config.n_components.unwrap_or(p);
        ensure!(k >= 1 && k <= p, "n_components must lie in 1..={p}, got {k}");
        ensure!(n > k, "need more observations ({n}) than components ({k})");

        let (centred, mean) = center_columns(data);
        let (d, e) = symmetric_eigen_sorted(&covariance_matrix(data)?)?;
        if d[k - 1] <= 1e-12 * d[0].abs().max(Real::MIN_POSITIVE) {
            return Err(Error::Singular(format!(
                "covariance has rank below {k}; cannot whiten"
            )));
        }

        // whitening K (k × p) and its right inverse (p × k)
        let mut whitening = Matrix::zeros(k, p);
        let mut dewhitening = Matrix::zeros(p, k);
        for i in 0..k {
            let s = d[i].sqrt();
            whitening.set_row(i, &(e.column(i).transpose() / s));
            dewhitening.set_column(i, &(e.column(i) * s));
        }
        let z = &centred * whitening.transpose();

        let mut rng = seeded_rng(config.seed);
        let mut w = symmetric_decorrelation(&standard_normal_matrix(k, k, &mut rng))?;

        let n_real = n as Real;
        let mut converged = false;
        let mut iterations = config.max_iterations;
        for iteration in 1..=config.max_iterations {
            let y = &z * w.transpose();
            let mut g = Matrix::zeros(n, k);
            let mut g_prime_mean = vec![0.0; k];
            for j in 0..k {
                for t in 0..n {
                    let (gv, dv) = config.contrast.eval(y[(t, j)]);
                    g[(t, j)] = gv;
                    g_prime_mean[j] += dv;
                }
                g_prime_mean[j] /= n_real;
            }

            let mut next = g.transpose() * &z / n_real;
            for i in 0..k {
                let row = next.row(i) - w.row(i) * g_prime_mean[i];
                next.set_row(i, &row);
            }
            let next = symmetric_decorrelation(&next)?;

            let change = (0..k)
                .map(|i| (1.0 - next.row(i).dot(&w.row(i)).abs()).abs())
                .fold(0.0, Real::max);
            w = next;
            debug!(iteration, change, "FastICA iteration");
            if change < config.tolerance {
                converged = true;
                iterations = iteration;
                break;
            }
        }
        if !converged {
            warn!(
                max_iterations = config.max_iterations,
                "FastICA stopped at the iteration cap"
            );
        }

        let unmixing = &w * &whitening;
        let mixing = &dewhitening * w.transpose();
        let sources = &centred * unmixing.transpose();
        Ok(Self {
            mean,
            unmixing,
            mixing,
            sources,
            iterations,
            converged,
        })
    }

    /// Unmixing matrix in the original coordinates (k × variables).
    pub fn unmixing(&self) -> &Matrix {
        &self.unmixing
    }

    /// Mixing matrix (variables × k); `mixing · sourcesᵀ` rebuilds the
    /// centred data when `k` equals the number of variables.
    pub fn mixing(&self) -> &Matrix {
        &self.mixing
    }

    /// Column means of the training data.
    pub fn mean(&self) -> &Array {
        &self.mean
    }

    /// Estimated sources of the training data (observations × k).
    pub fn sources(&self) -> &Matrix {
        &self.sources
    }

    /// Iterations performed.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Whether the tolerance was reached.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Apply the unmixing to new data.
    pub fn transform(&self, data: &Matrix) -> Result<Matrix> {
        if data.ncols() != self.mean.len() {
            return Err(Error::DimensionMismatch {
                expected: self.mean.len(),
                actual: data.ncols(),
            });
        }
        let mut centred = data.clone();
        for (j, mut col) in centred.column_iter_mut().enumerate() {
            col.add_scalar_mut(-self.mean[j]);
        }
        Ok(centred * self.unmixing.transpose())
    }
}
