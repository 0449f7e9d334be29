//! # nf-termstructures
//!
//! Parametric yield curves. Maturities are in years and yields are
//! continuously compounded decimals.
//!
//! - [`NelsonSiegel`] — level, slope and curvature factors with exponential
//!   decay `λ`
//! - [`diebold_li_factors`] — per-date factor extraction over a yield panel

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Nelson–Siegel curve, loadings and fitting.
pub mod nelson_siegel;

/// Dynamic Nelson–Siegel factors over a panel of curves.
pub mod diebold_li;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use diebold_li::diebold_li_factors;
pub use nelson_siegel::{nelson_siegel_loadings, LambdaGrid, NelsonSiegel};
