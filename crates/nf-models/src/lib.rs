//! # nf-models
//!
//! Statistical models used alongside the pricing and simulation crates.
//!
//! * [`kalman`] — linear-Gaussian state space filter and RTS smoother
//! * [`gaussian_mixture`] — univariate Gaussian mixtures and EM fitting
//! * [`pca`] — principal component analysis
//! * [`ica`] — FastICA blind source separation

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Filtering ────────────────────────────────────────────────────────────
pub mod kalman;

// ── Density models ───────────────────────────────────────────────────────
pub mod gaussian_mixture;

// ── Factor decompositions ────────────────────────────────────────────────
pub mod ica;
pub mod pca;

// ── Re-exports ───────────────────────────────────────────────────────────
pub use gaussian_mixture::{EmConfig, EmFit, GaussianMixture};
pub use ica::{Contrast, FastIca, FastIcaConfig};
pub use kalman::{FilterOutput, GaussianState, KalmanFilter, KalmanUpdate};
pub use pca::Pca;
