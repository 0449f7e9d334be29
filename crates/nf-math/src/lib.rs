//! # nf-math
//!
//! Mathematical utilities: probability distributions, the Gauss
//! hypergeometric function (over statrs' gamma), dense linear algebra over nalgebra,
//! seeded random number generation and a statistics accumulator.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Probability distributions.
pub mod distributions;

/// Matrix decompositions and column statistics.
pub mod linalg;

/// Random number generators.
pub mod random_numbers;

/// Special functions.
pub mod special;

/// Statistics accumulators.
pub mod statistics;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use distributions::{normal_cdf, normal_cdf_inverse, normal_pdf, InverseGaussian};
pub use linalg::{Array, Matrix};
pub use random_numbers::{seeded_rng, NormalRng};
pub use special::hypergeometric_2f1;
pub use statistics::Statistics;
