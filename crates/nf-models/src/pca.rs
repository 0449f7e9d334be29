//! Principal component analysis.
//!
//! Data matrices have one row per observation and one column per variable.
//! Components are the leading eigenvectors of the sample covariance; each is
//! signed so that its largest absolute loading is positive, which makes the
//! decomposition deterministic.

use nf_core::{ensure, errors::Error, Real, Result};
use nf_math::linalg::{column_means, covariance_matrix, symmetric_eigen_sorted};
use nf_math::{Array, Matrix};

/// A fitted PCA.
#[derive(Debug, Clone)]
pub struct Pca {
    mean: Array,
    components: Matrix,
    explained_variance: Array,
    explained_variance_ratio: Array,
}

impl Pca {
    /// Fit the first `n_components` principal components of `data`.
    pub fn fit(data: &Matrix, n_components: usize) -> Result<Self> {
        let p = data.ncols();
        ensure!(
            n_components >= 1 && n_components <= p,
            "n_components must lie in 1..={p}, got {n_components}"
        );
        let cov = covariance_matrix(data)?;
        let (values, vectors) = symmetric_eigen_sorted(&cov)?;
        let total: Real = values.iter().map(|v| v.max(0.0)).sum();
        ensure!(total > 0.0, "data has zero variance");

        let mut components = vectors.columns(0, n_components).into_owned();
        for mut col in components.column_iter_mut() {
            let mut pivot: Real = 0.0;
            for &x in col.iter() {
                if x.abs() > pivot.abs() {
                    pivot = x;
                }
            }
            if pivot < 0.0 {
                col.neg_mut();
            }
        }

        let explained_variance = values.rows(0, n_components).map(|v| v.max(0.0));
        let explained_variance_ratio = &explained_variance / total;
        Ok(Self {
            mean: column_means(data),
            components,
            explained_variance,
            explained_variance_ratio,
        })
    }

    /// Number of retained components.
    pub fn n_components(&self) -> usize {
        self.components.ncols()
    }

    /// Column means of the training data.
    pub fn mean(&self) -> &Array {
        &self.mean
    }

    /// Loadings: one unit-norm column per component (variables × k).
    pub fn components(&self) -> &Matrix {
        &self.components
    }

    /// Variance along each component, descending.
    pub fn explained_variance(&self) -> &Array {
        &self.explained_variance
    }

    /// Share of the total variance explained by each component.
    pub fn explained_variance_ratio(&self) -> &Array {
        &self.explained_variance_ratio
    }

    fn check_columns(&self, cols: usize, expected: usize) -> Result<()> {
        if cols != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: cols,
            });
        }
        Ok(())
    }

    /// Scores `(X − mean) · components` (observations × k).
    pub fn transform(&self, data: &Matrix) -> Result<Matrix> {
        self.check_columns(data.ncols(), self.mean.len())?;
        let mut centred = data.clone();
        for (j, mut col) in centred.column_iter_mut().enumerate() {
            col.add_scalar_mut(-self.mean[j]);
        }
        Ok(centred * &self.components)
    }

    /// Map scores back to the original variables.
    pub fn inverse_transform(&self, scores: &Matrix) -> Result<Matrix> {
        self.check_columns(scores.ncols(), self.n_components())?;
        let mut data = scores * self.components.transpose();
        for (j, mut col) in data.column_iter_mut().enumerate() {
            col.add_scalar_mut(self.mean[j]);
        }
        Ok(data)
    }
}
