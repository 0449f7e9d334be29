//! Brownian-bridge path construction.
//!
//! A Brownian bridge fills in a Wiener path by bisection: the first normal
//! variate sets the terminal value, each following variate sets the
//! midpoint of the leftmost unfilled interval, conditioned on its two
//! already-known neighbours. The most significant (longest-span) increments
//! therefore consume the first variates, which is what makes the bridge
//! useful with low-discrepancy sequences.

use nf_core::{ensure, errors::Error, Real, Result, Time};

/// Bisection construction of Wiener paths on a fixed time grid.
#[derive(Debug, Clone)]
pub struct BrownianBridge {
    /// Grid points `t_1 < … < t_n` (the origin `t_0 = 0` is implicit).
    t: Vec<Time>,
    /// `bridge_index[i]` is the grid index filled at construction step `i`.
    bridge_index: Vec<usize>,
    /// One past the left neighbour (0 means the origin).
    left_index: Vec<usize>,
    right_index: Vec<usize>,
    left_weight: Vec<Real>,
    right_weight: Vec<Real>,
    std_dev: Vec<Real>,
}

impl BrownianBridge {
    /// Bridge over `steps` equally spaced points on `(0, 1]`.
    pub fn new(steps: usize) -> Result<Self> {
        ensure!(steps >= 1, "need at least one step");
        let t: Vec<Time> = (1..=steps).map(|i| i as Real / steps as Real).collect();
        Self::with_times(&t)
    }

    /// Bridge over an arbitrary strictly increasing grid of positive times.
    pub fn with_times(times: &[Time]) -> Result<Self> {
        let size = times.len();
        ensure!(size >= 1, "need at least one time point");
        ensure!(times[0] > 0.0, "first time must be positive, got {}", times[0]);
        ensure!(
            times.windows(2).all(|w| w[1] > w[0]),
            "times must be strictly increasing"
        );

        let t = times.to_vec();
        let mut bridge_index = vec![0usize; size];
        let mut left_index = vec![0usize; size];
        let mut right_index = vec![0usize; size];
        let mut left_weight = vec![0.0; size];
        let mut right_weight = vec![0.0; size];
        let mut std_dev = vec![0.0; size];

        // map[k] != 0 once grid point k has been assigned a construction step
        let mut map = vec![0usize; size];
        map[size - 1] = 1;
        bridge_index[0] = size - 1;
        std_dev[0] = t[size - 1].sqrt();

        let mut j = 0;
        for i in 1..size {
            // first unfilled point
            while map[j] != 0 {
                j += 1;
            }
            // next filled point to its right
            let mut k = j;
            while map[k] == 0 {
                k += 1;
            }
            // midpoint of the unfilled run j..k-1
            let l = j + (k - 1 - j) / 2;
            map[l] = i;
            bridge_index[i] = l;
            left_index[i] = j;
            right_index[i] = k;
            let t_left = if j == 0 { 0.0 } else { t[j - 1] };
            let span = t[k] - t_left;
            left_weight[i] = (t[k] - t[l]) / span;
            right_weight[i] = (t[l] - t_left) / span;
            std_dev[i] = ((t[l] - t_left) * (t[k] - t[l]) / span).sqrt();

            j = k + 1;
            if j >= size {
                j = 0;
            }
        }

        Ok(Self {
            t,
            bridge_index,
            left_index,
            right_index,
            left_weight,
            right_weight,
            std_dev,
        })
    }

    /// Number of time steps.
    pub fn size(&self) -> usize {
        self.t.len()
    }

    /// The grid `t_1 … t_n`.
    pub fn times(&self) -> &[Time] {
        &self.t
    }

    /// Map `size()` i.i.d. standard normals to `W(t_1) … W(t_n)`.
    pub fn transform(&self, normals: &[Real], output: &mut [Real]) -> Result<()> {
        let n = self.size();
        for len in [normals.len(), output.len()] {
            if len != n {
                return Err(Error::DimensionMismatch {
                    expected: n,
                    actual: len,
                });
            }
        }
        output[n - 1] = self.std_dev[0] * normals[0];
        for i in 1..n {
            let j = self.left_index[i];
            let k = self.right_index[i];
            let l = self.bridge_index[i];
            let left = if j == 0 { 0.0 } else { output[j - 1] };
            output[l] = self.left_weight[i] * left
                + self.right_weight[i] * output[k]
                + self.std_dev[i] * normals[i];
        }
        Ok(())
    }

    /// Like [`transform`](Self::transform) but returns the increments
    /// `W(t_i) − W(t_{i−1})`.
    pub fn transform_increments(&self, normals: &[Real]) -> Result<Vec<Real>> {
        let mut path = vec![0.0; self.size()];
        self.transform(normals, &mut path)?;
        let mut previous = 0.0;
        Ok(path
            .into_iter()
            .map(|w| {
                let dw = w - previous;
                previous = w;
                dw
            })
            .collect())
    }
}
