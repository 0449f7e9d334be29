//! Matrix decompositions and column statistics over nalgebra.
//!
//! Data matrices follow the convention *rows are observations, columns are
//! variables*; simulated path sets are stored *rows are dates, columns are
//! paths*.

use nalgebra::{DMatrix, DVector};
use nf_core::{
    ensure,
    errors::{Error, Result},
    Real,
};
use tracing::debug;

/// A dynamically-sized vector of reals.
pub type Array = DVector<Real>;

/// A dynamically-sized matrix of reals.
pub type Matrix = DMatrix<Real>;

/// Cholesky decomposition of a symmetric positive-definite matrix.
///
/// Returns the lower-triangular factor `L` such that `A = L * Lᵀ`.
pub fn cholesky_decomposition(m: &Matrix) -> Result<Matrix> {
    ensure!(
        m.is_square(),
        "matrix must be square, got {}×{}",
        m.nrows(),
        m.ncols()
    );
    match m.clone().cholesky() {
        Some(chol) => Ok(chol.l()),
        None => Err(Error::Singular(
            "Cholesky decomposition failed, matrix is not positive definite".into(),
        )),
    }
}

/// Eigen-decomposition of a symmetric matrix with eigenvalues sorted in
/// descending order.
///
/// Column `i` of the returned matrix is the eigenvector of eigenvalue `i`.
pub fn symmetric_eigen_sorted(m: &Matrix) -> Result<(Array, Matrix)> {
    ensure!(
        m.is_square(),
        "matrix must be square, got {}×{}",
        m.nrows(),
        m.ncols()
    );
    let eigen = m.clone().symmetric_eigen();
    let n = eigen.eigenvalues.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| eigen.eigenvalues[j].total_cmp(&eigen.eigenvalues[i]));

    let values = Array::from_iterator(n, order.iter().map(|&i| eigen.eigenvalues[i]));
    let mut vectors = Matrix::zeros(n, n);
    for (dst, &src) in order.iter().enumerate() {
        vectors.set_column(dst, &eigen.eigenvectors.column(src));
    }
    Ok((values, vectors))
}

/// Pseudo square-root of a symmetric positive-semidefinite matrix.
///
/// Computes `S` such that `S * Sᵀ ≈ M` from the eigen-decomposition,
/// flooring negative eigenvalues at zero.
pub fn pseudo_sqrt(m: &Matrix) -> Result<Matrix> {
    let (values, mut vectors) = symmetric_eigen_sorted(m)?;
    let floored = values.iter().filter(|&&ev| ev < 0.0).count();
    if floored > 0 {
        debug!(floored, smallest = values.min(), "pseudo_sqrt: flooring negative eigenvalues");
    }
    for (j, &ev) in values.iter().enumerate() {
        let scale = if ev > 0.0 { ev.sqrt() } else { 0.0 };
        vectors.column_mut(j).scale_mut(scale);
    }
    Ok(vectors)
}

/// Inverse square root `M^{-1/2}` of a symmetric positive-definite matrix.
pub fn inverse_sqrt(m: &Matrix) -> Result<Matrix> {
    let (values, vectors) = symmetric_eigen_sorted(m)?;
    ensure!(
        values.iter().all(|&v| v > 0.0),
        "matrix must be positive definite, smallest eigenvalue is {}",
        values.min()
    );
    let scaled = DMatrix::from_diagonal(&values.map(|v| 1.0 / v.sqrt()));
    Ok(&vectors * scaled * vectors.transpose())
}

/// Mean of each column.
pub fn column_means(data: &Matrix) -> Array {
    let n = data.nrows().max(1) as Real;
    Array::from_iterator(data.ncols(), data.column_iter().map(|c| c.sum() / n))
}

/// Subtract each column's mean; returns the centred matrix and the means.
pub fn center_columns(data: &Matrix) -> (Matrix, Array) {
    let means = column_means(data);
    let mut centred = data.clone();
    for (j, mut col) in centred.column_iter_mut().enumerate() {
        col.add_scalar_mut(-means[j]);
    }
    (centred, means)
}

/// Sample covariance of the columns of `data` (unbiased, `n − 1`).
pub fn covariance_matrix(data: &Matrix) -> Result<Matrix> {
    let n = data.nrows();
    ensure!(n >= 2, "need at least 2 observations, got {n}");
    let (centred, _) = center_columns(data);
    Ok(centred.transpose() * &centred / (n as Real - 1.0))
}

/// Least-squares solution of `design · β ≈ y` via SVD.
pub fn least_squares(design: &Matrix, y: &Array) -> Result<Array> {
    let (n, m) = design.shape();
    if y.len() != n {
        return Err(Error::DimensionMismatch {
            expected: n,
            actual: y.len(),
        });
    }
    ensure!(n >= m, "more regressors ({m}) than observations ({n})");
    design
        .clone()
        .svd(true, true)
        .solve(y, 1e-12)
        .map_err(|e| Error::Runtime(e.to_string()))
}
