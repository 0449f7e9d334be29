//! # nf-methods
//!
//! Path simulation and Monte Carlo.
//!
//! # Modules
//!
//! * [`paths`] — time grids and path sets (dates × paths)
//! * [`brownian`] — Brownian motion and conditioned Brownian bridges
//! * [`brownian_bridge`] — bisection construction of Wiener paths
//! * [`fbm`] — fractional Brownian motion by Cholesky factorisation
//! * [`sde`] — Euler and Milstein schemes for one-dimensional SDEs
//! * [`monte_carlo`] — path pricers, the MC model orchestrator, estimates

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Brownian motion and Brownian bridge path simulation.
pub mod brownian;

/// Brownian-bridge path construction.
pub mod brownian_bridge;

/// Fractional Brownian motion.
pub mod fbm;

/// Monte Carlo simulation: path pricing, statistics.
pub mod monte_carlo;

/// Time grids and simulated path sets.
pub mod paths;

/// Euler and Milstein discretisation schemes.
pub mod sde;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use brownian::{brownian_increments, simulate_brownian_bridge, simulate_brownian_motion};
pub use brownian_bridge::BrownianBridge;
pub use fbm::{covariance_levy_fbm, covariance_standard_fbm, simulate_fbm, FbmKind};
pub use monte_carlo::{
    AsianArithmeticPathPricer, EuropeanPathPricer, MonteCarloEstimate, MonteCarloModel,
    PathPricer,
};
pub use paths::{PathSet, TimeGrid};
pub use sde::{simulate_sde, simulate_sde_with_increments, strong_error, Scheme};
