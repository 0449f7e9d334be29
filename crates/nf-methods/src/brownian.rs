//! Brownian motion and Brownian bridge paths.
//!
//! Both simulators draw `n_steps × n_paths` Gaussian increments with
//! variance `Δt`, cumulate them along the time axis and prepend `B_0 = 0`.
//! The bridge then pins the endpoint by subtracting the linear interpolant of
//! the terminal miss:
//!
//! ```text
//! X_t = a + B_t − (t − t0)/(t1 − t0) · (B_{t1} − (b − a))
//! ```

use crate::paths::{PathSet, TimeGrid};
use nf_core::{Real, Result, Time};
use nf_math::random_numbers::{seeded_rng, standard_normal_matrix};
use nf_math::Matrix;
use rand::Rng;

/// `n_steps × n_paths` independent N(0, Δt) increments on `grid`.
pub(crate) fn gaussian_increments<R: Rng + ?Sized>(
    grid: &TimeGrid,
    n_paths: usize,
    rng: &mut R,
) -> Matrix {
    standard_normal_matrix(grid.steps(), n_paths, rng) * grid.dt().sqrt()
}

/// Cumulative sums down each column with a leading row of zeros.
pub(crate) fn cumulate(increments: &Matrix) -> Matrix {
    let (steps, n_paths) = increments.shape();
    let mut values = Matrix::zeros(steps + 1, n_paths);
    for j in 0..n_paths {
        let mut acc = 0.0;
        for i in 0..steps {
            acc += increments[(i, j)];
            values[(i + 1, j)] = acc;
        }
    }
    values
}

/// Simulate standard Brownian motion paths on `[0, horizon]`.
///
/// Returns `n_steps + 1` dates and `n_paths` paths, all starting at zero.
pub fn simulate_brownian_motion(
    horizon: Time,
    n_steps: usize,
    n_paths: usize,
    seed: Option<u64>,
) -> Result<PathSet> {
    let grid = TimeGrid::from_horizon(horizon, n_steps)?;
    let mut rng = seeded_rng(seed);
    let increments = gaussian_increments(&grid, n_paths, &mut rng);
    PathSet::new(grid.times(), cumulate(&increments))
}

/// Simulate Brownian bridge paths from `a` at `t0` to `b` at `t1`.
pub fn simulate_brownian_bridge(
    a: Real,
    b: Real,
    t0: Time,
    t1: Time,
    n_steps: usize,
    n_paths: usize,
    seed: Option<u64>,
) -> Result<PathSet> {
    let grid = TimeGrid::new(t0, t1, n_steps)?;
    let mut rng = seeded_rng(seed);
    let increments = gaussian_increments(&grid, n_paths, &mut rng);
    let mut values = cumulate(&increments);

    let times = grid.times();
    let span = t1 - t0;
    for j in 0..n_paths {
        let miss = values[(n_steps, j)] - (b - a);
        for (i, &t) in times.iter().enumerate() {
            values[(i, j)] += a - (t - t0) / span * miss;
        }
        // pin the endpoint against rounding in the interpolant
        values[(n_steps, j)] = b;
    }
    PathSet::new(times, values)
}

/// First differences of every path along the time axis
/// (`n_steps × n_paths`).
pub fn brownian_increments(paths: &PathSet) -> Matrix {
    let v = paths.values();
    let (rows, cols) = v.shape();
    Matrix::from_fn(rows - 1, cols, |i, j| v[(i + 1, j)] - v[(i, j)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn motion_starts_at_zero_with_linear_variance() {
        let paths = simulate_brownian_motion(2.0, 20, 20_000, Some(1234)).unwrap();
        assert_eq!(paths.values().shape(), (21, 20_000));
        assert_eq!(paths.times()[20], 2.0);
        assert!(paths.initial_values().iter().all(|&x| x == 0.0));
        for i in [5, 10, 20] {
            let t = paths.times()[i];
            let var = paths.variance_at(i);
            assert!((var / t - 1.0).abs() < 0.05, "Var[B_{t}] = {var}");
            assert!(paths.mean_at(i).abs() < 4.0 * (t / 20_000.0).sqrt());
        }
    }

    #[test]
    fn motion_is_reproducible() {
        let a = simulate_brownian_motion(1.0, 8, 3, Some(7)).unwrap();
        let b = simulate_brownian_motion(1.0, 8, 3, Some(7)).unwrap();
        let c = simulate_brownian_motion(1.0, 8, 3, Some(8)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn increments_invert_cumulation() {
        let paths = simulate_brownian_motion(1.0, 10, 4, Some(3)).unwrap();
        let inc = brownian_increments(&paths);
        assert_abs_diff_eq!(cumulate(&inc), paths.values().clone(), epsilon = 1e-12);
    }

    #[test]
    fn bridge_variance_profile() {
        // Var[X_t] = (t − t0)(t1 − t)/(t1 − t0)
        let paths = simulate_brownian_bridge(0.0, 0.0, 0.0, 1.0, 10, 20_000, Some(11)).unwrap();
        for i in [2, 5, 8] {
            let t = paths.times()[i];
            let expected = t * (1.0 - t);
            let var = paths.variance_at(i);
            assert!((var / expected - 1.0).abs() < 0.05, "t={t}: {var} vs {expected}");
        }
    }

    #[test]
    fn bridge_mean_is_linear_interpolant() {
        let (a, b) = (1.0, 3.0);
        let paths = simulate_brownian_bridge(a, b, 0.0, 2.0, 8, 20_000, Some(5)).unwrap();
        let mid = paths.mean_at(4);
        assert!((mid - 2.0).abs() < 0.03, "bridge mean at midpoint {mid}");
    }

    proptest! {
        #[test]
        fn bridge_hits_both_endpoints(
            a in -5.0f64..5.0,
            b in -5.0f64..5.0,
            t0 in 0.0f64..2.0,
            span in 0.1f64..3.0,
            steps in 1usize..40,
            seed in 0u64..1000,
        ) {
            let paths = simulate_brownian_bridge(a, b, t0, t0 + span, steps, 5, Some(seed)).unwrap();
            for &x in paths.initial_values().iter() {
                prop_assert!((x - a).abs() < 1e-12);
            }
            for &x in paths.terminal_values().iter() {
                prop_assert!((x - b).abs() < 1e-12);
            }
        }
    }
}
