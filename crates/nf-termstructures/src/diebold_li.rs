//! Diebold–Li dynamic Nelson–Siegel factors.
//!
//! With `λ` held fixed, the loadings are the same on every date, so each
//! row of a yield panel reduces to an ordinary least-squares regression on
//! the `maturities × 3` loadings matrix. The resulting level, slope and
//! curvature series are the inputs of the Diebold–Li factor model.

use nf_core::{ensure, errors::Error, Real, Result, Time};
use nf_math::linalg::least_squares;
use nf_math::Matrix;
use tracing::debug;

use crate::nelson_siegel::NelsonSiegel;

/// Extract `[β0, β1, β2]` for each date of `panel` (dates × maturities).
///
/// Returns a `dates × 3` matrix.
pub fn diebold_li_factors(taus: &[Time], panel: &Matrix, lambda: Real) -> Result<Matrix> {
    ensure!(lambda > 0.0, "lambda must be positive, got {lambda}");
    if panel.ncols() != taus.len() {
        return Err(Error::DimensionMismatch {
            expected: taus.len(),
            actual: panel.ncols(),
        });
    }
    ensure!(taus.len() >= 3, "need at least three maturities, got {}", taus.len());
    ensure!(
        taus.iter().all(|t| t.is_finite() && *t >= 0.0),
        "maturities must be finite and non-negative"
    );

    let design = NelsonSiegel::loadings_matrix(taus, lambda);
    let mut factors = Matrix::zeros(panel.nrows(), 3);
    for (i, row) in panel.row_iter().enumerate() {
        let beta = least_squares(&design, &row.transpose())?;
        factors.set_row(i, &beta.transpose());
    }
    debug!(dates = panel.nrows(), maturities = taus.len(), lambda, "Diebold-Li factors");
    Ok(factors)
}
