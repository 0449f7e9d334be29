//! Nelson–Siegel yield curve.
//!
//! $$y(\tau) = \beta_0 + \beta_1 \frac{1 - e^{-\lambda\tau}}{\lambda\tau}
//!   + \beta_2 \left(\frac{1 - e^{-\lambda\tau}}{\lambda\tau} - e^{-\lambda\tau}\right)$$
//!
//! `β0` is the long-run level, `β1` the slope (short minus long) and `β2`
//! the curvature, whose hump peaks near `τ ≈ 1.8/λ`. At `τ = 0` the
//! loadings take their limits `[1, 1, 0]`.

use nf_core::{ensure, fail, Rate, Real, Result, Time};
use nf_math::linalg::least_squares;
use nf_math::{Array, Matrix};
use tracing::debug;

/// `(1 − e^{−x})/x`, equal to 1 at `x = 0`.
fn decay_ratio(x: Real) -> Real {
    if x == 0.0 {
        1.0
    } else {
        -(-x).exp_m1() / x
    }
}

/// Factor loadings `[1, (1 − e^{−λτ})/(λτ), (1 − e^{−λτ})/(λτ) − e^{−λτ}]`.
pub fn nelson_siegel_loadings(tau: Time, lambda: Real) -> [Real; 3] {
    let x = lambda * tau;
    let slope = decay_ratio(x);
    [1.0, slope, slope - (-x).exp()]
}

/// Candidate decay parameters searched by [`NelsonSiegel::fit`]: `n_points`
/// values evenly spaced over `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LambdaGrid {
    /// Smallest λ.
    pub min: Real,
    /// Largest λ.
    pub max: Real,
    /// Number of grid points.
    pub n_points: usize,
}

impl Default for LambdaGrid {
    fn default() -> Self {
        Self {
            min: 0.05,
            max: 3.0,
            n_points: 60,
        }
    }
}

impl LambdaGrid {
    /// Grid over `[min, max]` with `n_points` points.
    pub fn new(min: Real, max: Real, n_points: usize) -> Result<Self> {
        let grid = Self { min, max, n_points };
        grid.validate()?;
        Ok(grid)
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.min > 0.0, "lambda grid must be positive, got min {}", self.min);
        ensure!(
            self.max >= self.min,
            "lambda grid max {} below min {}",
            self.max,
            self.min
        );
        ensure!(self.n_points >= 1, "lambda grid needs at least one point");
        Ok(())
    }

    /// The grid values in increasing order.
    pub fn values(&self) -> Vec<Real> {
        if self.n_points == 1 {
            return vec![self.min];
        }
        let step = (self.max - self.min) / (self.n_points - 1) as Real;
        (0..self.n_points)
            .map(|i| self.min + step * i as Real)
            .collect()
    }
}

/// A Nelson–Siegel curve with positive decay `λ`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawNelsonSiegel")
)]
pub struct NelsonSiegel {
    beta0: Real,
    beta1: Real,
    beta2: Real,
    lambda: Real,
}

/// Unchecked wire form, validated through [`NelsonSiegel::new`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawNelsonSiegel {
    beta0: Real,
    beta1: Real,
    beta2: Real,
    lambda: Real,
}

#[cfg(feature = "serde")]
impl TryFrom<RawNelsonSiegel> for NelsonSiegel {
    type Error = nf_core::Error;

    fn try_from(raw: RawNelsonSiegel) -> Result<Self> {
        Self::new(raw.beta0, raw.beta1, raw.beta2, raw.lambda)
    }
}

fn check_maturities(taus: &[Time]) -> Result<()> {
    ensure!(
        taus.iter().all(|t| t.is_finite() && *t >= 0.0),
        "maturities must be finite and non-negative"
    );
    Ok(())
}

impl NelsonSiegel {
    /// Create a curve; `λ` must be positive.
    pub fn new(beta0: Real, beta1: Real, beta2: Real, lambda: Real) -> Result<Self> {
        ensure!(lambda > 0.0, "lambda must be positive, got {lambda}");
        Ok(Self {
            beta0,
            beta1,
            beta2,
            lambda,
        })
    }

    /// Level `β0`.
    pub fn beta0(&self) -> Real {
        self.beta0
    }

    /// Slope `β1`.
    pub fn beta1(&self) -> Real {
        self.beta1
    }

    /// Curvature `β2`.
    pub fn beta2(&self) -> Real {
        self.beta2
    }

    /// Decay `λ`.
    pub fn lambda(&self) -> Real {
        self.lambda
    }

    /// Zero yield at maturity `τ`.
    pub fn yield_at(&self, tau: Time) -> Rate {
        let [l0, l1, l2] = nelson_siegel_loadings(tau, self.lambda);
        self.beta0 * l0 + self.beta1 * l1 + self.beta2 * l2
    }

    /// Zero yields at each maturity.
    pub fn yields(&self, taus: &[Time]) -> Vec<Rate> {
        taus.iter().map(|&t| self.yield_at(t)).collect()
    }

    /// Instantaneous forward rate `β0 + β1 e^{−λτ} + β2 λτ e^{−λτ}`.
    pub fn forward_rate(&self, tau: Time) -> Rate {
        let e = (-self.lambda * tau).exp();
        self.beta0 + self.beta1 * e + self.beta2 * self.lambda * tau * e
    }

    /// Discount factor `exp(−y(τ)·τ)`.
    pub fn discount(&self, tau: Time) -> Real {
        (-self.yield_at(tau) * tau).exp()
    }

    /// Loadings for each maturity as a `len × 3` matrix.
    pub fn loadings_matrix(taus: &[Time], lambda: Real) -> Matrix {
        Matrix::from_fn(taus.len(), 3, |i, j| nelson_siegel_loadings(taus[i], lambda)[j])
    }

    /// Sum of squared yield errors against observed yields.
    pub fn sse(&self, taus: &[Time], yields: &[Rate]) -> Real {
        taus.iter()
            .zip(yields)
            .map(|(&t, &y)| (self.yield_at(t) - y).powi(2))
            .sum()
    }

    /// Least-squares betas for a fixed `λ`.
    pub fn fit_fixed_lambda(taus: &[Time], yields: &[Rate], lambda: Real) -> Result<Self> {
        ensure!(lambda > 0.0, "lambda must be positive, got {lambda}");
        ensure!(
            taus.len() == yields.len(),
            "{} maturities but {} yields",
            taus.len(),
            yields.len()
        );
        ensure!(taus.len() >= 3, "need at least three maturities, got {}", taus.len());
        check_maturities(taus)?;

        let design = Self::loadings_matrix(taus, lambda);
        let beta = least_squares(&design, &Array::from_column_slice(yields))?;
        Self::new(beta[0], beta[1], beta[2], lambda)
    }

    /// Fit betas and `λ`, choosing the grid value with the smallest SSE.
    pub fn fit(taus: &[Time], yields: &[Rate], grid: &LambdaGrid) -> Result<Self> {
        grid.validate()?;
        let mut best: Option<(Real, Self)> = None;
        for lambda in grid.values() {
            let curve = Self::fit_fixed_lambda(taus, yields, lambda)?;
            let sse = curve.sse(taus, yields);
            if best.as_ref().map_or(true, |(b, _)| sse < *b) {
                best = Some((sse, curve));
            }
        }
        let Some((sse, curve)) = best else {
            fail!("lambda grid {grid:?} produced no candidates");
        };
        debug!(lambda = curve.lambda, sse, "Nelson-Siegel grid fit");
        Ok(curve)
    }
}
