//! Euler–Maruyama and Milstein schemes for one-dimensional SDEs.
//!
//! For `dX = a(t, X) dt + b(t, X) dW` and a Brownian increment
//! `ΔW ~ N(0, Δt)`:
//!
//! ```text
//! Euler:    X' = X + a Δt + b ΔW
//! Milstein: X' = X + a Δt + b ΔW + ½ b b' (ΔW² − Δt)
//! ```
//!
//! Euler has strong order ½, Milstein strong order 1.

use crate::brownian::gaussian_increments;
use crate::paths::{PathSet, TimeGrid};
use nf_core::{ensure, errors::Error, Real, Result, Time};
use nf_math::random_numbers::seeded_rng;
use nf_math::Matrix;
use nf_processes::StochasticProcess;

/// Discretisation scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// Euler–Maruyama.
    Euler,
    /// Milstein, with the `½ b b' (ΔW² − Δt)` correction.
    Milstein,
}

/// Advance `x` from `t` to `t + dt` given the Brownian increment `dw`.
pub fn step<P: StochasticProcess + ?Sized>(
    process: &P,
    scheme: Scheme,
    t: Time,
    x: Real,
    dt: Time,
    dw: Real,
) -> Real {
    let a = process.drift(t, x);
    let b = process.diffusion(t, x);
    let euler = x + a * dt + b * dw;
    match scheme {
        Scheme::Euler => euler,
        Scheme::Milstein => {
            euler + 0.5 * b * process.diffusion_derivative(t, x) * (dw * dw - dt)
        }
    }
}

/// Simulate `n_paths` paths of `process` on `[0, horizon]`.
pub fn simulate_sde<P: StochasticProcess + ?Sized>(
    process: &P,
    scheme: Scheme,
    horizon: Time,
    n_steps: usize,
    n_paths: usize,
    seed: Option<u64>,
) -> Result<PathSet> {
    let grid = TimeGrid::from_horizon(horizon, n_steps)?;
    let mut rng = seeded_rng(seed);
    let increments = gaussian_increments(&grid, n_paths, &mut rng);
    simulate_sde_with_increments(process, scheme, &grid.times(), &increments)
}

/// Drive the scheme with given Brownian increments.
///
/// `increments` is `(times.len() − 1) × n_paths`; row `i` holds
/// `W(times[i+1]) − W(times[i])` for every path.
pub fn simulate_sde_with_increments<P: StochasticProcess + ?Sized>(
    process: &P,
    scheme: Scheme,
    times: &[Time],
    increments: &Matrix,
) -> Result<PathSet> {
    ensure!(times.len() >= 2, "need at least two dates");
    ensure!(
        times.windows(2).all(|w| w[1] > w[0]),
        "times must be strictly increasing"
    );
    let n_steps = times.len() - 1;
    if increments.nrows() != n_steps {
        return Err(Error::DimensionMismatch {
            expected: n_steps,
            actual: increments.nrows(),
        });
    }

    let n_paths = increments.ncols();
    let mut values = Matrix::zeros(n_steps + 1, n_paths);
    let x0 = process.x0();
    for j in 0..n_paths {
        let mut x = x0;
        values[(0, j)] = x;
        for i in 0..n_steps {
            let dt = times[i + 1] - times[i];
            x = step(process, scheme, times[i], x, dt, increments[(i, j)]);
            values[(i + 1, j)] = x;
        }
    }
    PathSet::new(times.to_vec(), values)
}

/// Mean absolute difference between simulated terminal values and the exact
/// terminal values on the same Brownian paths.
pub fn strong_error(simulated: &PathSet, exact: &[Real]) -> Result<Real> {
    let terminal = simulated.terminal_values();
    if terminal.len() != exact.len() {
        return Err(Error::DimensionMismatch {
            expected: terminal.len(),
            actual: exact.len(),
        });
    }
    ensure!(!exact.is_empty(), "need at least one path");
    let total: Real = terminal
        .iter()
        .zip(exact)
        .map(|(s, e)| (s - e).abs())
        .sum();
    Ok(total / exact.len() as Real)
}
