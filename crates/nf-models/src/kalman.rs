//! Linear-Gaussian state space model: Kalman filter and
//! Rauch–Tung–Striebel smoother.
//!
//! ```text
//! x_t = F x_{t−1} + w_t,   w_t ~ N(0, Q)
//! y_t = H x_t     + v_t,   v_t ~ N(0, R)
//! ```
//!
//! The filter takes the prior of `x_0` (before `y_0` is seen) and returns,
//! for every date, the one-step prediction and the filtered state.
//! Inversions go through Cholesky solves (the smoother falls back to a
//! pseudo-inverse when a prediction is singular) and the covariance update
//! uses the Joseph form, which keeps it symmetric positive semi-definite.

use nalgebra::Cholesky;
use nf_core::{ensure, errors::Error, Real, Result};
use nf_math::{Array, Matrix};
use std::f64::consts::PI;
use tracing::warn;

/// Mean and covariance of a Gaussian state.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianState {
    /// State mean.
    pub mean: Array,
    /// State covariance.
    pub covariance: Matrix,
}

impl GaussianState {
    /// Build a state, checking that the covariance matches the mean.
    pub fn new(mean: Array, covariance: Matrix) -> Result<Self> {
        check_shape(&covariance, mean.len(), mean.len())?;
        Ok(Self { mean, covariance })
    }

    /// Dimension of the state.
    pub fn dim(&self) -> usize {
        self.mean.len()
    }
}

/// Result of a measurement update.
#[derive(Debug, Clone)]
pub struct KalmanUpdate {
    /// Posterior state.
    pub state: GaussianState,
    /// Innovation `y − H m` (zeros when the observation was skipped).
    pub innovation: Array,
    /// Innovation covariance `H P Hᵀ + R`.
    pub innovation_covariance: Matrix,
    /// Gaussian log-density of the observation under the prediction
    /// (zero when skipped).
    pub log_likelihood: Real,
    /// Whether the observation contained NaN and was ignored.
    pub skipped: bool,
}

/// Output of [`KalmanFilter::filter`].
#[derive(Debug, Clone)]
pub struct FilterOutput {
    /// `x_t | y_0 … y_{t−1}`; the first entry is the prior.
    pub predicted: Vec<GaussianState>,
    /// `x_t | y_0 … y_t`.
    pub filtered: Vec<GaussianState>,
    /// Sum of the per-date log-likelihood contributions.
    pub log_likelihood: Real,
}

/// A time-invariant linear-Gaussian state space model.
#[derive(Debug, Clone)]
pub struct KalmanFilter {
    transition: Matrix,
    observation: Matrix,
    process_noise: Matrix,
    observation_noise: Matrix,
}

fn check_shape(m: &Matrix, rows: usize, cols: usize) -> Result<()> {
    if m.nrows() != rows {
        return Err(Error::DimensionMismatch {
            expected: rows,
            actual: m.nrows(),
        });
    }
    if m.ncols() != cols {
        return Err(Error::DimensionMismatch {
            expected: cols,
            actual: m.ncols(),
        });
    }
    Ok(())
}

/// Singular values below this fraction of the largest entry are dropped
/// when a predicted covariance has to be pseudo-inverted.
const PSEUDO_INVERSE_TOLERANCE: Real = 1e-12;

fn cholesky(m: Matrix, what: &str) -> Result<Cholesky<Real, nalgebra::Dyn>> {
    Cholesky::new(m).ok_or_else(|| Error::Singular(format!("{what} is not positive definite")))
}

impl KalmanFilter {
    /// Create a model from `F` (n × n), `H` (m × n), `Q` (n × n) and
    /// `R` (m × m).
    pub fn new(
        transition: Matrix,
        observation: Matrix,
        process_noise: Matrix,
        observation_noise: Matrix,
    ) -> Result<Self> {
        let n = transition.nrows();
        let m = observation.nrows();
        check_shape(&transition, n, n)?;
        check_shape(&observation, m, n)?;
        check_shape(&process_noise, n, n)?;
        check_shape(&observation_noise, m, m)?;
        Ok(Self {
            transition,
            observation,
            process_noise,
            observation_noise,
        })
    }

    /// Random walk observed with noise: `F = H = 1`, `Q = q`, `R = r`.
    pub fn local_level(q: Real, r: Real) -> Result<Self> {
        ensure!(q >= 0.0 && r > 0.0, "need q >= 0 and r > 0, got q={q}, r={r}");
        Self::new(
            Matrix::identity(1, 1),
            Matrix::identity(1, 1),
            Matrix::from_element(1, 1, q),
            Matrix::from_element(1, 1, r),
        )
    }

    /// State dimension `n`.
    pub fn state_dim(&self) -> usize {
        self.transition.nrows()
    }

    /// Observation dimension `m`.
    pub fn obs_dim(&self) -> usize {
        self.observation.nrows()
    }

    /// Time update: `(F m, F P Fᵀ + Q)`.
    pub fn predict(&self, state: &GaussianState) -> Result<GaussianState> {
        if state.dim() != self.state_dim() {
            return Err(Error::DimensionMismatch {
                expected: self.state_dim(),
                actual: state.dim(),
            });
        }
        let mean = &self.transition * &state.mean;
        let covariance =
            &self.transition * &state.covariance * self.transition.transpose() + &self.process_noise;
        Ok(GaussianState { mean, covariance })
    }

    /// Measurement update of a predicted state with observation `y`.
    pub fn update(&self, predicted: &GaussianState, y: &Array) -> Result<KalmanUpdate> {
        let m = self.obs_dim();
        if y.len() != m {
            return Err(Error::DimensionMismatch {
                expected: m,
                actual: y.len(),
            });
        }
        if predicted.dim() != self.state_dim() {
            return Err(Error::DimensionMismatch {
                expected: self.state_dim(),
                actual: predicted.dim(),
            });
        }

        let h = &self.observation;
        let p = &predicted.covariance;
        let s = h * p * h.transpose() + &self.observation_noise;

        if y.iter().any(|v| v.is_nan()) {
            warn!("missing observation, skipping Kalman update");
            return Ok(KalmanUpdate {
                state: predicted.clone(),
                innovation: Array::zeros(m),
                innovation_covariance: s,
                log_likelihood: 0.0,
                skipped: true,
            });
        }

        let innovation = y - h * &predicted.mean;
        let chol = cholesky(s.clone(), "innovation covariance")?;
        // K = P Hᵀ S⁻¹, obtained from S Kᵀ = H P
        let gain = chol.solve(&(h * p)).transpose();
        let mean = &predicted.mean + &gain * &innovation;

        let n = self.state_dim();
        let i_kh = Matrix::identity(n, n) - &gain * h;
        let covariance = &i_kh * p * i_kh.transpose()
            + &gain * &self.observation_noise * gain.transpose();

        let log_det: Real = chol.l().diagonal().iter().map(|d| 2.0 * d.ln()).sum();
        let mahalanobis = innovation.dot(&chol.solve(&innovation));
        let log_likelihood = -0.5 * (m as Real * (2.0 * PI).ln() + log_det + mahalanobis);

        Ok(KalmanUpdate {
            state: GaussianState { mean, covariance },
            innovation,
            innovation_covariance: s,
            log_likelihood,
            skipped: false,
        })
    }

    /// Run the filter over `observations`, starting from the prior of `x_0`.
    pub fn filter(&self, initial: &GaussianState, observations: &[Array]) -> Result<FilterOutput> {
        let mut predicted = Vec::with_capacity(observations.len());
        let mut filtered: Vec<GaussianState> = Vec::with_capacity(observations.len());
        let mut log_likelihood = 0.0;
        for y in observations {
            let prior = match filtered.last() {
                Some(prev) => self.predict(prev)?,
                None => initial.clone(),
            };
            let upd = self.update(&prior, y)?;
            log_likelihood += upd.log_likelihood;
            predicted.push(prior);
            filtered.push(upd.state);
        }
        Ok(FilterOutput {
            predicted,
            filtered,
            log_likelihood,
        })
    }

    /// `C = P_f Fᵀ P_p⁻¹`, from `P_p Cᵀ = F P_f`. A singular prediction
    /// (no process noise and an exactly known state) falls back to the
    /// pseudo-inverse, which sets the gain to zero along the directions the
    /// prediction already pins down.
    fn smoother_gain(&self, filtered: &Matrix, predicted: &Matrix, t: usize) -> Result<Matrix> {
        let rhs = &self.transition * filtered;
        if let Ok(chol) = cholesky(predicted.clone(), "predicted covariance") {
            return Ok(chol.solve(&rhs).transpose());
        }
        warn!(t, "predicted covariance is singular, smoothing with its pseudo-inverse");
        let eps = PSEUDO_INVERSE_TOLERANCE * predicted.amax();
        let inverse = predicted
            .clone()
            .pseudo_inverse(eps)
            .map_err(|e| Error::Singular(e.to_string()))?;
        Ok((inverse * rhs).transpose())
    }

    /// Rauch–Tung–Striebel backward pass over a filter run.
    pub fn smooth(&self, output: &FilterOutput) -> Result<Vec<GaussianState>> {
        let len = output.filtered.len();
        if output.predicted.len() != len {
            return Err(Error::DimensionMismatch {
                expected: len,
                actual: output.predicted.len(),
            });
        }
        let Some(last) = output.filtered.last() else {
            return Ok(Vec::new());
        };

        let mut smoothed = vec![last.clone(); len];
        for t in (0..len - 1).rev() {
            let filt = &output.filtered[t];
            let pred = &output.predicted[t + 1];
            let next = &smoothed[t + 1];
            let gain = self.smoother_gain(&filt.covariance, &pred.covariance, t)?;
            let mean = &filt.mean + &gain * (&next.mean - &pred.mean);
            let covariance =
                &filt.covariance + &gain * (&next.covariance - &pred.covariance) * gain.transpose();
            smoothed[t] = GaussianState { mean, covariance };
        }
        Ok(smoothed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nf_math::random_numbers::NormalRng;

    fn scalar(x: Real) -> Array {
        Array::from_element(1, x)
    }

    fn diffuse_prior() -> GaussianState {
        GaussianState::new(scalar(0.0), Matrix::from_element(1, 1, 1e8)).unwrap()
    }

    #[test]
    fn single_update_by_hand() {
        let kf = KalmanFilter::local_level(0.0, 1.0).unwrap();
        let prior = GaussianState::new(scalar(0.0), Matrix::identity(1, 1)).unwrap();
        let upd = kf.update(&prior, &scalar(2.0)).unwrap();
        assert_abs_diff_eq!(upd.state.mean[0], 1.0, epsilon = 1e-14);
        assert_abs_diff_eq!(upd.state.covariance[(0, 0)], 0.5, epsilon = 1e-14);
        assert_abs_diff_eq!(upd.innovation[0], 2.0, epsilon = 1e-14);
        assert_abs_diff_eq!(upd.innovation_covariance[(0, 0)], 2.0, epsilon = 1e-14);
        let expected = -0.5 * ((2.0 * PI).ln() + 2.0_f64.ln() + 2.0);
        assert_abs_diff_eq!(upd.log_likelihood, expected, epsilon = 1e-12);
    }

    #[test]
    fn constant_level_filters_to_running_mean() {
        let kf = KalmanFilter::local_level(0.0, 1.0).unwrap();
        let ys: Vec<Array> = [1.0, 2.0, 3.0, 4.0, 5.0].iter().map(|&y| scalar(y)).collect();
        let out = kf.filter(&diffuse_prior(), &ys).unwrap();
        for (t, state) in out.filtered.iter().enumerate() {
            let n = (t + 1) as Real;
            let running_mean = (1..=t + 1).sum::<usize>() as Real / n;
            assert_abs_diff_eq!(state.mean[0], running_mean, epsilon = 1e-6);
            assert_abs_diff_eq!(state.covariance[(0, 0)], 1.0 / n, epsilon = 1e-6);
        }
    }

    #[test]
    fn constant_level_smooths_to_final_estimate() {
        let kf = KalmanFilter::local_level(0.0, 1.0).unwrap();
        let ys: Vec<Array> = [0.3, -0.2, 1.1, 0.4].iter().map(|&y| scalar(y)).collect();
        let out = kf.filter(&diffuse_prior(), &ys).unwrap();
        let smoothed = kf.smooth(&out).unwrap();
        let last = out.filtered.last().unwrap();
        for s in &smoothed {
            assert_abs_diff_eq!(s.mean[0], last.mean[0], epsilon = 1e-6);
            assert_abs_diff_eq!(s.covariance[(0, 0)], last.covariance[(0, 0)], epsilon = 1e-6);
        }
    }

    #[test]
    fn smoothing_never_increases_variance() {
        let kf = KalmanFilter::local_level(0.5, 1.0).unwrap();
        let mut rng = NormalRng::new(17);
        let mut level = 0.0;
        let ys: Vec<Array> = (0..50)
            .map(|_| {
                level += 0.5_f64.sqrt() * rng.next_real();
                scalar(level + rng.next_real())
            })
            .collect();
        let out = kf.filter(&diffuse_prior(), &ys).unwrap();
        let smoothed = kf.smooth(&out).unwrap();
        assert_eq!(smoothed.len(), 50);
        for (s, f) in smoothed.iter().zip(&out.filtered) {
            assert!(s.covariance[(0, 0)] <= f.covariance[(0, 0)] + 1e-12);
        }
        assert_abs_diff_eq!(
            smoothed[49].mean[0],
            out.filtered[49].mean[0],
            epsilon = 1e-14
        );
    }

    #[test]
    fn exactly_known_state_smooths_without_error() {
        // no process noise and a point-mass prior: every prediction is singular
        let kf = KalmanFilter::local_level(0.0, 1.0).unwrap();
        let prior = GaussianState::new(scalar(2.0), Matrix::zeros(1, 1)).unwrap();
        let ys: Vec<Array> = [1.0, 3.5, 2.2].iter().map(|&y| scalar(y)).collect();
        let out = kf.filter(&prior, &ys).unwrap();
        let smoothed = kf.smooth(&out).unwrap();
        assert_eq!(smoothed.len(), 3);
        for (s, f) in smoothed.iter().zip(&out.filtered) {
            assert_abs_diff_eq!(f.mean[0], 2.0, epsilon = 1e-15);
            assert_abs_diff_eq!(s.mean[0], 2.0, epsilon = 1e-15);
            assert_abs_diff_eq!(s.covariance[(0, 0)], 0.0, epsilon = 1e-15);
        }
    }

    #[test]
    fn partly_singular_prediction_matches_the_known_block() {
        // first coordinate is known exactly and never moves, second is a
        // random walk; the smoother must reproduce the scalar local-level
        // smoother on the second coordinate
        let f = Matrix::identity(2, 2);
        let h = Matrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 1.0]);
        let q = Matrix::from_row_slice(2, 2, &[0.0, 0.0, 0.0, 0.3]);
        let r = Matrix::identity(2, 2);
        let kf = KalmanFilter::new(f, h, q, r).unwrap();
        let prior = GaussianState::new(
            Array::from_column_slice(&[1.5, 0.0]),
            Matrix::from_row_slice(2, 2, &[0.0, 0.0, 0.0, 4.0]),
        )
        .unwrap();
        let raw = [(0.9, 0.4), (2.1, -0.3), (1.2, 0.8), (1.7, 1.1)];
        let ys: Vec<Array> = raw.iter().map(|&(a, b)| Array::from_column_slice(&[a, b])).collect();
        let smoothed = kf.smooth(&kf.filter(&prior, &ys).unwrap()).unwrap();

        let scalar_kf = KalmanFilter::local_level(0.3, 1.0).unwrap();
        let scalar_prior = GaussianState::new(scalar(0.0), Matrix::from_element(1, 1, 4.0)).unwrap();
        let scalar_ys: Vec<Array> = raw.iter().map(|&(_, b)| scalar(b)).collect();
        let expected = scalar_kf
            .smooth(&scalar_kf.filter(&scalar_prior, &scalar_ys).unwrap())
            .unwrap();
        for (s, e) in smoothed.iter().zip(&expected) {
            assert_abs_diff_eq!(s.mean[0], 1.5, epsilon = 1e-14);
            assert_abs_diff_eq!(s.mean[1], e.mean[0], epsilon = 1e-12);
            assert_abs_diff_eq!(s.covariance[(1, 1)], e.covariance[(0, 0)], epsilon = 1e-12);
        }
    }

    #[test]
    fn missing_observation_is_skipped() {
        let kf = KalmanFilter::local_level(0.1, 1.0).unwrap();
        let ys = vec![scalar(1.0), scalar(Real::NAN), scalar(1.5)];
        let out = kf.filter(&diffuse_prior(), &ys).unwrap();
        assert_eq!(out.filtered[1], out.predicted[1]);
        assert!(out.log_likelihood.is_finite());
    }

    #[test]
    fn tracks_constant_velocity() {
        // state (position, velocity), position observed
        let f = Matrix::from_row_slice(2, 2, &[1.0, 1.0, 0.0, 1.0]);
        let h = Matrix::from_row_slice(1, 2, &[1.0, 0.0]);
        let q = Matrix::from_diagonal_element(2, 2, 1e-10);
        let r = Matrix::from_element(1, 1, 0.25);
        let kf = KalmanFilter::new(f, h, q, r).unwrap();

        let mut rng = NormalRng::new(5);
        let ys: Vec<Array> = (0..200)
            .map(|t| scalar(2.0 + 0.5 * t as Real + 0.5 * rng.next_real()))
            .collect();
        let prior =
            GaussianState::new(Array::zeros(2), Matrix::from_diagonal_element(2, 2, 1e6)).unwrap();
        let out = kf.filter(&prior, &ys).unwrap();
        let last = out.filtered.last().unwrap();
        assert!((last.mean[1] - 0.5).abs() < 0.01, "velocity {}", last.mean[1]);
        let p = &last.covariance;
        assert_abs_diff_eq!(p[(0, 1)], p[(1, 0)], epsilon = 1e-12);
        assert!(p[(0, 0)] > 0.0 && p[(1, 1)] > 0.0);
    }

    #[test]
    fn dimension_checks() {
        let bad = KalmanFilter::new(
            Matrix::identity(2, 2),
            Matrix::zeros(1, 3),
            Matrix::identity(2, 2),
            Matrix::identity(1, 1),
        );
        assert!(matches!(bad, Err(Error::DimensionMismatch { .. })));
        let kf = KalmanFilter::local_level(0.1, 1.0).unwrap();
        let prior = diffuse_prior();
        assert!(kf.update(&prior, &Array::zeros(2)).is_err());
        assert!(KalmanFilter::local_level(0.1, 0.0).is_err());
        assert!(GaussianState::new(Array::zeros(2), Matrix::zeros(3, 3)).is_err());
    }
}
