//! Time grids and simulated path sets.

use nf_core::{ensure, errors::Error, Real, Result, Time};
use nf_math::{Array, Matrix};

/// An equally spaced time grid `t0 = s_0 < s_1 < … < s_n = t1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeGrid {
    start: Time,
    end: Time,
    steps: usize,
}

impl TimeGrid {
    /// Grid of `steps + 1` points on `[start, end]`.
    pub fn new(start: Time, end: Time, steps: usize) -> Result<Self> {
        ensure!(steps >= 1, "need at least one time step");
        ensure!(
            end > start && start.is_finite() && end.is_finite(),
            "time interval must be non-empty, got [{start}, {end}]"
        );
        Ok(Self { start, end, steps })
    }

    /// Grid on `[0, horizon]`.
    pub fn from_horizon(horizon: Time, steps: usize) -> Result<Self> {
        Self::new(0.0, horizon, steps)
    }

    /// First point.
    pub fn start(&self) -> Time {
        self.start
    }

    /// Last point.
    pub fn end(&self) -> Time {
        self.end
    }

    /// Number of steps (points − 1).
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Step width.
    pub fn dt(&self) -> Time {
        (self.end - self.start) / self.steps as Real
    }

    /// All `steps + 1` points; the last one equals `end` exactly.
    pub fn times(&self) -> Vec<Time> {
        let dt = self.dt();
        let mut t: Vec<Time> = (0..=self.steps)
            .map(|i| self.start + i as Real * dt)
            .collect();
        t[self.steps] = self.end;
        t
    }
}

/// A set of simulated paths sharing one time grid.
///
/// `values` has one row per date and one column per path, so
/// `values[(i, j)]` is path `j` at `times[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSet {
    times: Vec<Time>,
    values: Matrix,
}

impl PathSet {
    /// Bundle a grid with a `times.len() × n_paths` value matrix.
    pub fn new(times: Vec<Time>, values: Matrix) -> Result<Self> {
        if values.nrows() != times.len() {
            return Err(Error::DimensionMismatch {
                expected: times.len(),
                actual: values.nrows(),
            });
        }
        ensure!(times.len() >= 2, "a path needs at least two dates");
        Ok(Self { times, values })
    }

    /// The time grid.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// The value matrix (dates × paths).
    pub fn values(&self) -> &Matrix {
        &self.values
    }

    /// Consume and return `(times, values)`.
    pub fn into_parts(self) -> (Vec<Time>, Matrix) {
        (self.times, self.values)
    }

    /// Number of time steps.
    pub fn n_steps(&self) -> usize {
        self.times.len() - 1
    }

    /// Number of paths.
    pub fn n_paths(&self) -> usize {
        self.values.ncols()
    }

    /// Path `j` as a vector of `n_steps + 1` values.
    ///
    /// # Panics
    /// Panics if `j >= n_paths()`.
    pub fn path(&self, j: usize) -> Vec<Real> {
        assert!(j < self.n_paths(), "path {j} out of range ({} paths)", self.n_paths());
        self.values.column(j).iter().copied().collect()
    }

    /// Values of every path at the initial date.
    pub fn initial_values(&self) -> Array {
        self.values.row(0).transpose()
    }

    /// Values of every path at the final date.
    pub fn terminal_values(&self) -> Array {
        self.values.row(self.n_steps()).transpose()
    }

    /// Cross-sectional mean at date `i`.
    ///
    /// # Panics
    /// Panics if `i > n_steps()`.
    pub fn mean_at(&self, i: usize) -> Real {
        self.check_date(i);
        self.values.row(i).mean()
    }

    /// Cross-sectional sample variance (`n − 1`) at date `i`; zero for a
    /// single path.
    ///
    /// # Panics
    /// Panics if `i > n_steps()`.
    pub fn variance_at(&self, i: usize) -> Real {
        self.check_date(i);
        let n = self.n_paths();
        if n < 2 {
            return 0.0;
        }
        let m = self.mean_at(i);
        self.values
            .row(i)
            .iter()
            .map(|x| (x - m) * (x - m))
            .sum::<Real>()
            / (n as Real - 1.0)
    }

    fn check_date(&self, i: usize) {
        assert!(
            i < self.times.len(),
            "date {i} out of range ({} dates)",
            self.times.len()
        );
    }
}
