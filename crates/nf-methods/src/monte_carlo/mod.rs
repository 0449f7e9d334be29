//! Monte Carlo simulation framework.
//!
//! * [`MonteCarloEstimate`] — sample mean with its standard error
//! * [`PathPricer`] — discounted payoff of one simulated path
//! * [`MonteCarloModel`] — simulates a process with an SDE scheme and
//!   averages a pricer over the paths, optionally with antithetic variates

use crate::brownian::gaussian_increments;
use crate::paths::{PathSet, TimeGrid};
use crate::sde::{simulate_sde_with_increments, Scheme};
use nf_core::{ensure, Real, Result, Time};
use nf_math::random_numbers::seeded_rng;
use nf_math::Statistics;
use nf_processes::StochasticProcess;
use tracing::debug;

// ─── Estimate ─────────────────────────────────────────────────────────────────

/// A Monte Carlo estimate: sample mean and the standard error of the mean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonteCarloEstimate {
    /// Sample mean.
    pub mean: Real,
    /// Standard error, `s / √n`.
    pub std_error: Real,
    /// Number of samples.
    pub samples: usize,
}

impl MonteCarloEstimate {
    /// Read mean and error estimate off an accumulator (at least two samples).
    pub fn from_statistics(stats: &Statistics) -> Result<Self> {
        ensure!(
            stats.samples() >= 2,
            "need at least two samples, got {}",
            stats.samples()
        );
        Ok(Self {
            mean: stats.mean().unwrap_or(0.0),
            std_error: stats.error_estimate().unwrap_or(0.0),
            samples: stats.samples(),
        })
    }

    /// Symmetric interval `mean ± z · std_error`.
    pub fn confidence_interval(&self, z: Real) -> (Real, Real) {
        (self.mean - z * self.std_error, self.mean + z * self.std_error)
    }
}

/// Mean and standard error of `values`.
pub fn estimate(values: &[Real]) -> Result<MonteCarloEstimate> {
    let mut stats = Statistics::new();
    stats.extend(values.iter().copied());
    MonteCarloEstimate::from_statistics(&stats)
}

/// Estimate of `df · E[payoff(S_T)]` from simulated terminal values.
pub fn discounted_payoff_estimate<F: Fn(Real) -> Real>(
    terminal: &[Real],
    payoff: F,
    discount: Real,
) -> Result<MonteCarloEstimate> {
    let mut stats = Statistics::new();
    stats.extend(terminal.iter().map(|&s| discount * payoff(s)));
    MonteCarloEstimate::from_statistics(&stats)
}

// ─── PathPricer ───────────────────────────────────────────────────────────────

/// Discounted payoff of a single path.
///
/// `path` holds the process values on every date of the simulation grid,
/// starting with the initial value.
pub trait PathPricer: Send + Sync {
    /// Evaluate the discounted payoff for one path.
    fn value(&self, path: &[Real]) -> Real;
}

/// European payoff `payoff(S_T) · discount`.
pub struct EuropeanPathPricer<F> {
    payoff: F,
    discount: Real,
}

impl<F: Fn(Real) -> Real + Send + Sync> EuropeanPathPricer<F> {
    /// Create a European pricer with payoff function and discount factor.
    pub fn new(payoff: F, discount: Real) -> Self {
        Self { payoff, discount }
    }
}

impl<F: Fn(Real) -> Real + Send + Sync> PathPricer for EuropeanPathPricer<F> {
    fn value(&self, path: &[Real]) -> Real {
        match path.last() {
            Some(&s) => (self.payoff)(s) * self.discount,
            None => 0.0,
        }
    }
}

/// Arithmetic-average Asian payoff over the dates after the first.
pub struct AsianArithmeticPathPricer<F> {
    payoff: F,
    discount: Real,
}

impl<F: Fn(Real) -> Real + Send + Sync> AsianArithmeticPathPricer<F> {
    /// Create an Asian arithmetic-average pricer.
    pub fn new(payoff: F, discount: Real) -> Self {
        Self { payoff, discount }
    }
}

impl<F: Fn(Real) -> Real + Send + Sync> PathPricer for AsianArithmeticPathPricer<F> {
    fn value(&self, path: &[Real]) -> Real {
        let fixings = path.get(1..).unwrap_or(&[]);
        if fixings.is_empty() {
            return 0.0;
        }
        let avg = fixings.iter().sum::<Real>() / fixings.len() as Real;
        (self.payoff)(avg) * self.discount
    }
}

// ─── MonteCarloModel ──────────────────────────────────────────────────────────

/// Prices path-dependent payoffs by simulating a process with an SDE scheme.
#[derive(Debug)]
pub struct MonteCarloModel<'a, P: StochasticProcess + ?Sized> {
    process: &'a P,
    scheme: Scheme,
    grid: TimeGrid,
    seed: Option<u64>,
}

impl<'a, P: StochasticProcess + ?Sized> MonteCarloModel<'a, P> {
    /// Create a model simulating `process` on `n_steps` equal steps up to
    /// `horizon`.
    pub fn new(
        process: &'a P,
        scheme: Scheme,
        horizon: Time,
        n_steps: usize,
        seed: Option<u64>,
    ) -> Result<Self> {
        Ok(Self {
            process,
            scheme,
            grid: TimeGrid::from_horizon(horizon, n_steps)?,
            seed,
        })
    }

    /// Simulate `n_paths` paths.
    pub fn simulate(&self, n_paths: usize) -> Result<PathSet> {
        let mut rng = seeded_rng(self.seed);
        let increments = gaussian_increments(&self.grid, n_paths, &mut rng);
        simulate_sde_with_increments(self.process, self.scheme, &self.grid.times(), &increments)
    }

    /// Average `pricer` over `n_paths` independent paths.
    pub fn price(&self, pricer: &dyn PathPricer, n_paths: usize) -> Result<MonteCarloEstimate> {
        let paths = self.simulate(n_paths)?;
        let mut stats = Statistics::new();
        let mut buffer = Vec::with_capacity(paths.n_steps() + 1);
        for column in paths.values().column_iter() {
            buffer.clear();
            buffer.extend(column.iter().copied());
            stats.add(pricer.value(&buffer));
        }
        let est = MonteCarloEstimate::from_statistics(&stats)?;
        debug!(n_paths, mean = est.mean, std_error = est.std_error, "Monte Carlo price");
        Ok(est)
    }

    /// Average `pricer` over `n_pairs` antithetic pairs.
    ///
    /// Each sample is the mean of the payoff on a path and on the path driven
    /// by the negated increments.
    pub fn price_antithetic(
        &self,
        pricer: &dyn PathPricer,
        n_pairs: usize,
    ) -> Result<MonteCarloEstimate> {
        let mut rng = seeded_rng(self.seed);
        let increments = gaussian_increments(&self.grid, n_pairs, &mut rng);
        let times = self.grid.times();
        let plus = simulate_sde_with_increments(self.process, self.scheme, &times, &increments)?;
        let minus = simulate_sde_with_increments(self.process, self.scheme, &times, &(-increments))?;

        let mut stats = Statistics::new();
        let mut a = Vec::with_capacity(times.len());
        let mut b = Vec::with_capacity(times.len());
        for (up, down) in plus.values().column_iter().zip(minus.values().column_iter()) {
            a.clear();
            a.extend(up.iter().copied());
            b.clear();
            b.extend(down.iter().copied());
            stats.add(0.5 * (pricer.value(&a) + pricer.value(&b)));
        }
        let est = MonteCarloEstimate::from_statistics(&stats)?;
        debug!(n_pairs, mean = est.mean, std_error = est.std_error, "antithetic Monte Carlo price");
        Ok(est)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
