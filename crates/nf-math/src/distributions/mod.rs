//! Probability distributions.
//!
//! The standard normal functions are used by every pricing and filtering
//! routine; the inverse Gaussian covers first-passage times of drifted
//! Brownian motion.

pub mod inverse_gaussian;
pub mod normal;

pub use inverse_gaussian::InverseGaussian;
pub use normal::{log_normal_cdf, normal_cdf, normal_cdf_inverse, normal_pdf};
