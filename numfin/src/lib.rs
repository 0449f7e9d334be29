//! # numfin
//!
//! Numerical methods for quantitative finance: Brownian and fractional
//! Brownian path simulation, Euler/Milstein SDE schemes, Monte Carlo and
//! Fourier-cosine option pricing, Kalman filtering, Gaussian mixtures,
//! PCA/FastICA and Nelson–Siegel yield curves.
//!
//! This crate is a **façade** that re-exports the workspace crates.
//!
//! ```rust
//! use numfin::pricingengines::{black_scholes_price, BlackScholesModel, CosEngine, OptionType};
//!
//! let model = BlackScholesModel::new(0.05, 0.0, 0.2).unwrap();
//! let cos = CosEngine::default().price(&model, OptionType::Call, 100.0, 100.0, 1.0).unwrap();
//! let exact = black_scholes_price(OptionType::Call, 100.0, 100.0, 0.05, 0.0, 0.2, 1.0).unwrap();
//! assert!((cos - exact).abs() < 1e-8);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use nf_core as core;

/// Distributions, linear algebra, random numbers and statistics.
pub use nf_math as math;

/// Stochastic process definitions.
pub use nf_processes as processes;

/// Path simulation, SDE schemes and Monte Carlo.
pub use nf_methods as methods;

/// Kalman filter, Gaussian mixtures, PCA and FastICA.
pub use nf_models as models;

/// Black–Scholes and COS pricing engines.
pub use nf_pricingengines as pricingengines;

/// Nelson–Siegel yield curves.
pub use nf_termstructures as termstructures;
