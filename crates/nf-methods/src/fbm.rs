//! Fractional Brownian motion.
//!
//! Two Gaussian processes with Hurst index `H ∈ (0, 1)` share the name:
//!
//! * the Riemann–Liouville (Lévy) process `√(2H) ∫₀ᵗ (t − s)^{H−½} dW_s`,
//!   whose increments are not stationary;
//! * the Mandelbrot–van Ness process with covariance
//!   `½(u^{2H} + v^{2H} − |u − v|^{2H})` and stationary increments.
//!
//! Both have `Var[X_t] = t^{2H}` and reduce to standard Brownian motion at
//! `H = ½`. Paths are simulated exactly on a grid by factoring the covariance
//! matrix, which costs `O(n³)` once per call.

use crate::paths::{PathSet, TimeGrid};
use nf_core::{ensure, Real, Result, Time};
use nf_math::linalg::{cholesky_decomposition, pseudo_sqrt};
use nf_math::random_numbers::{seeded_rng, standard_normal_matrix};
use nf_math::{hypergeometric_2f1, Matrix};
use tracing::{debug, warn};

/// Which fractional Brownian motion to simulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FbmKind {
    /// Riemann–Liouville (Lévy) fBm, a fractional integral of `W` from 0.
    RiemannLiouville,
    /// Mandelbrot–van Ness fBm with stationary increments.
    MandelbrotVanNess,
}

fn check_hurst(hurst: Real) -> Result<()> {
    ensure!(
        hurst > 0.0 && hurst < 1.0,
        "Hurst index must lie in (0, 1), got {hurst}"
    );
    Ok(())
}

/// Covariance of Riemann–Liouville fBm at times `u` and `v`.
///
/// ```text
/// 2H/(H + ½) · m^{H+½} · M^{H−½} · ₂F₁(1, ½ − H; 3/2 + H; m/M)
/// ```
/// with `m = min(u, v)` and `M = max(u, v)`; zero when either time is zero.
pub fn covariance_levy_fbm(u: Time, v: Time, hurst: Real) -> Result<Real> {
    check_hurst(hurst)?;
    ensure!(u >= 0.0 && v >= 0.0, "times must be non-negative, got ({u}, {v})");
    let (lo, hi) = if u <= v { (u, v) } else { (v, u) };
    if lo == 0.0 {
        return Ok(0.0);
    }
    let f = hypergeometric_2f1(1.0, 0.5 - hurst, 1.5 + hurst, lo / hi)?;
    Ok(2.0 * hurst / (hurst + 0.5) * lo.powf(hurst + 0.5) * hi.powf(hurst - 0.5) * f)
}

/// Covariance of Mandelbrot–van Ness fBm,
/// `½(u^{2H} + v^{2H} − |u − v|^{2H})`.
pub fn covariance_standard_fbm(u: Time, v: Time, hurst: Real) -> Real {
    let h2 = 2.0 * hurst;
    0.5 * (u.powf(h2) + v.powf(h2) - (u - v).abs().powf(h2))
}

/// Covariance matrix of `kind` fBm on the given dates.
pub fn covariance_matrix(times: &[Time], hurst: Real, kind: FbmKind) -> Result<Matrix> {
    check_hurst(hurst)?;
    let n = times.len();
    let mut cov = Matrix::zeros(n, n);
    for i in 0..n {
        for j in 0..=i {
            let c = match kind {
                FbmKind::RiemannLiouville => covariance_levy_fbm(times[i], times[j], hurst)?,
                FbmKind::MandelbrotVanNess => covariance_standard_fbm(times[i], times[j], hurst),
            };
            cov[(i, j)] = c;
            cov[(j, i)] = c;
        }
    }
    Ok(cov)
}

/// Simulate `n_paths` fBm paths on `[0, horizon]`.
///
/// The covariance on `t_1 … t_n` is factored by Cholesky; if that fails
/// (near-singular grids at small `H`) the eigenvalue pseudo square root is
/// used instead. Every path starts at 0.
pub fn simulate_fbm(
    horizon: Time,
    hurst: Real,
    n_steps: usize,
    n_paths: usize,
    kind: FbmKind,
    seed: Option<u64>,
) -> Result<PathSet> {
    check_hurst(hurst)?;
    let grid = TimeGrid::from_horizon(horizon, n_steps)?;
    let times = grid.times();
    let cov = covariance_matrix(&times[1..], hurst, kind)?;
    let factor = match cholesky_decomposition(&cov) {
        Ok(l) => l,
        Err(e) => {
            warn!(%e, hurst, n_steps, "fBm covariance not positive definite, using pseudo square root");
            pseudo_sqrt(&cov)?
        }
    };
    debug!(?kind, hurst, n_steps, n_paths, "simulating fractional Brownian motion");

    let mut rng = seeded_rng(seed);
    let normals = standard_normal_matrix(n_steps, n_paths, &mut rng);
    let correlated = factor * normals;

    let mut values = Matrix::zeros(n_steps + 1, n_paths);
    values.rows_mut(1, n_steps).copy_from(&correlated);
    PathSet::new(times, values)
}
