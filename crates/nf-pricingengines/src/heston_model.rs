//! Heston stochastic-variance model.
//!
//! $$dS = (r-q) S \, dt + \sqrt{v} S \, dW_1$$
//! $$dv = \kappa(\theta - v) \, dt + \sigma \sqrt{v} \, dW_2$$
//! $$dW_1 dW_2 = \rho \, dt$$
//!
//! The characteristic function uses the Albrecher et al. rearrangement,
//! which stays on the principal branch of the complex logarithm for long
//! maturities.

use nf_core::{ensure, Rate, Real, Result, Time};
use num_complex::Complex64;

use crate::characteristic_function::CharacteristicFunction;

/// Heston model parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HestonModel {
    rate: Rate,
    dividend_yield: Rate,
    v0: Real,
    kappa: Real,
    theta: Real,
    sigma: Real,
    rho: Real,
}

impl HestonModel {
    /// Create a model from the initial variance `v0`, mean-reversion speed
    /// `κ`, long-run variance `θ`, volatility of variance `σ` and
    /// correlation `ρ`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rate: Rate,
        dividend_yield: Rate,
        v0: Real,
        kappa: Real,
        theta: Real,
        sigma: Real,
        rho: Real,
    ) -> Result<Self> {
        ensure!(v0 >= 0.0, "initial variance must be non-negative, got {v0}");
        ensure!(kappa > 0.0, "kappa must be positive, got {kappa}");
        ensure!(theta >= 0.0, "theta must be non-negative, got {theta}");
        ensure!(sigma > 0.0, "vol of variance must be positive, got {sigma}");
        ensure!(
            (-1.0..=1.0).contains(&rho),
            "correlation must lie in [-1, 1], got {rho}"
        );
        Ok(Self {
            rate,
            dividend_yield,
            v0,
            kappa,
            theta,
            sigma,
            rho,
        })
    }

    /// Initial variance.
    pub fn v0(&self) -> Real {
        self.v0
    }

    /// Mean-reversion speed κ.
    pub fn kappa(&self) -> Real {
        self.kappa
    }

    /// Long-run variance θ.
    pub fn theta(&self) -> Real {
        self.theta
    }

    /// Volatility of variance σ.
    pub fn sigma(&self) -> Real {
        self.sigma
    }

    /// Correlation ρ.
    pub fn rho(&self) -> Real {
        self.rho
    }

    /// Whether `2κθ ≥ σ²`, i.e. the variance never reaches zero.
    pub fn feller_condition(&self) -> bool {
        2.0 * self.kappa * self.theta >= self.sigma * self.sigma
    }

    pub(crate) fn log_phi(&self, u: Real, t: Time) -> Complex64 {
        let (kappa, theta, sigma, rho) = (self.kappa, self.theta, self.sigma, self.rho);
        let iu = Complex64::new(0.0, u);
        let sigma2 = sigma * sigma;

        let beta = kappa - rho * sigma * iu;
        let d = (beta * beta + sigma2 * (iu + u * u)).sqrt();
        let g = (beta - d) / (beta + d);
        let e = (-d * t).exp();
        let one = Complex64::new(1.0, 0.0);

        let c = kappa * theta / sigma2 * ((beta - d) * t - 2.0 * ((one - g * e) / (one - g)).ln());
        let v = self.v0 / sigma2 * (beta - d) * (one - e) / (one - g * e);
        iu * (self.rate - self.dividend_yield) * t + c + v
    }
}

impl CharacteristicFunction for HestonModel {
    fn phi(&self, u: Real, t: Time) -> Complex64 {
        self.log_phi(u, t).exp()
    }

    /// `c1` is the Fang–Oosterlee mean. `c2` is the exact variance, obtained by
    /// writing `ln(S_T/S_0) = μT + a·I + (ρ/σ)·v_T + √(1−ρ²)·∫√v dB` with
    /// `I = ∫v dt` and `a = ρκ/σ − ½`, then using the CIR covariance
    /// `Cov(v_s, v_t) = e^{−κ(t−s)} Var(v_s)`. `c4` is set to zero.
    fn cumulants(&self, t: Time) -> (Real, Real, Real) {
        let (kappa, theta, sigma, rho, v0) = (self.kappa, self.theta, self.sigma, self.rho, self.v0);
        let x = kappa * t;
        let e = (-x).exp();
        let p1 = relative_decay(x);
        let s2 = sigma * sigma;

        let c1 = (self.rate - self.dividend_yield) * t + 0.5 * t * p1 * (theta - v0) - 0.5 * theta * t;

        let k = CirKernels::new(x);
        let var_vt = s2 * t * (v0 * e * p1 + 0.5 * theta * x * p1 * p1);
        let cov_i_vt = s2 * t * t * (v0 * k.cov_v0 + 0.5 * theta * x * k.var_v0);
        let var_i = s2 * t * t * t * (v0 * k.var_v0 + theta * k.var_theta);
        let mean_i = t * (theta + (v0 - theta) * p1);

        let a = rho * kappa / sigma - 0.5;
        let r = rho / sigma;
        let c2 = a * a * var_i + r * r * var_vt + 2.0 * a * r * cov_i_vt + (1.0 - rho * rho) * mean_i;

        (c1, c2, 0.0)
    }

    fn rate(&self) -> Rate {
        self.rate
    }

    fn dividend_yield(&self) -> Rate {
        self.dividend_yield
    }
}

/// `(1 − e^{−x})/x`, equal to 1 at `x = 0`.
fn relative_decay(x: Real) -> Real {
    if x == 0.0 {
        1.0
    } else {
        -(-x).exp_m1() / x
    }
}

/// Below this `κT` the closed-form CIR kernels cancel and their Taylor
/// series is summed instead.
const SMALL_KAPPA_T: Real = 0.1;

const COV_V0_SERIES: [Real; 10] = [
    1.0 / 2.0,
    -2.0 / 3.0,
    11.0 / 24.0,
    -13.0 / 60.0,
    19.0 / 240.0,
    -1.0 / 42.0,
    247.0 / 40320.0,
    -251.0 / 181440.0,
    1013.0 / 3628800.0,
    -509.0 / 9979200.0,
];

const VAR_V0_SERIES: [Real; 10] = [
    1.0 / 3.0,
    -1.0 / 3.0,
    11.0 / 60.0,
    -13.0 / 180.0,
    19.0 / 840.0,
    -1.0 / 168.0,
    247.0 / 181440.0,
    -251.0 / 907200.0,
    1013.0 / 19958400.0,
    -509.0 / 59875200.0,
];

const VAR_THETA_SERIES: [Real; 10] = [
    0.0,
    1.0 / 12.0,
    -1.0 / 15.0,
    11.0 / 360.0,
    -13.0 / 1260.0,
    19.0 / 6720.0,
    -1.0 / 1512.0,
    247.0 / 1814400.0,
    -251.0 / 9979200.0,
    1013.0 / 239500800.0,
];

fn horner(coefficients: &[Real], x: Real) -> Real {
    coefficients.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// Dimensionless moments of the integrated CIR variance `I = ∫v dt` as
/// functions of `x = κT`:
///
/// - `Cov(I, v_T) = σ²T² (v0·cov_v0 + θ·x·var_v0/2)`
/// - `Var(I) = σ²T³ (v0·var_v0 + θ·var_theta)`
#[derive(Debug, Clone, Copy)]
struct CirKernels {
    cov_v0: Real,
    var_v0: Real,
    var_theta: Real,
}

impl CirKernels {
    fn new(x: Real) -> Self {
        if x < SMALL_KAPPA_T {
            return Self {
                cov_v0: horner(&COV_V0_SERIES, x),
                var_v0: horner(&VAR_V0_SERIES, x),
                var_theta: horner(&VAR_THETA_SERIES, x),
            };
        }
        let e = (-x).exp();
        let (x2, x3) = (x * x, x * x * x);
        Self {
            cov_v0: e * (x - 1.0 + e) / x2,
            var_v0: (1.0 - e * e - 2.0 * x * e) / x3,
            var_theta: (2.0 * x - 5.0 + 4.0 * (1.0 + x) * e + e * e) / (2.0 * x3),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn model() -> HestonModel {
        HestonModel::new(0.0, 0.0, 0.0175, 1.5768, 0.0398, 0.5751, -0.5711).unwrap()
    }

    #[test]
    fn phi_at_zero_is_one() {
        let v = model().phi(0.0, 1.0);
        assert_abs_diff_eq!(v.re, 1.0, epsilon = 1e-14);
        assert_abs_diff_eq!(v.im, 0.0, epsilon = 1e-14);
    }

    #[test]
    fn cumulants_match_derivatives_of_log_phi() {
        let m = HestonModel::new(0.03, 0.01, 0.04, 2.0, 0.05, 0.4, -0.7).unwrap();
        let t = 2.0;
        let h = 1e-3;
        let (c1, c2, c4) = m.cumulants(t);
        let lp = m.log_phi(h, t);
        let lm = m.log_phi(-h, t);
        assert_abs_diff_eq!((lp.im - lm.im) / (2.0 * h), c1, epsilon = 1e-6);
        assert_abs_diff_eq!(-(lp.re + lm.re) / (h * h), c2, epsilon = 1e-6);
        assert_eq!(c4, 0.0);
    }

    #[test]
    fn variance_cumulant_is_stable_for_slow_mean_reversion() {
        let t = 1.0;
        let mut previous: Option<Real> = None;
        for &kappa in &[1e-2, 1e-4, 1e-6, 1e-8, 1e-12] {
            let m = HestonModel::new(0.0, 0.0, 0.04, kappa, 0.04, 0.3, -0.7).unwrap();
            let (_, c2, _) = m.cumulants(t);
            let lp = m.log_phi(1e-3, t);
            let lm = m.log_phi(-1e-3, t);
            assert_abs_diff_eq!(-(lp.re + lm.re) / 1e-6, c2, epsilon = 1e-6);
            if let Some(p) = previous {
                assert_abs_diff_eq!(c2, p, epsilon = 5e-5);
            }
            previous = Some(c2);
        }
        // κ → 0 limit: v0T − ρσv0T²/2 + σ²v0T³/12
        let limit = 0.04 - 0.5 * (-0.7) * 0.3 * 0.04 + 0.09 * 0.04 / 12.0;
        assert_abs_diff_eq!(previous.unwrap(), limit, epsilon = 1e-10);
    }

    #[test]
    fn variance_cumulant_is_continuous_across_series_switch() {
        let t = 2.0;
        let below = HestonModel::new(0.0, 0.0, 0.03, 0.05 * (1.0 - 1e-9), 0.05, 0.5, -0.5).unwrap();
        let above = HestonModel::new(0.0, 0.0, 0.03, 0.05 * (1.0 + 1e-9), 0.05, 0.5, -0.5).unwrap();
        let (_, lo, _) = below.cumulants(t);
        let (_, hi, _) = above.cumulants(t);
        assert_abs_diff_eq!(lo, hi, epsilon = 1e-12);
    }

    #[test]
    fn stays_bounded_for_long_maturities() {
        let m = model();
        for &u in &[0.5, 5.0, 50.0, 500.0] {
            let v = m.phi(u, 30.0);
            assert!(v.norm() <= 1.0 + 1e-12, "|phi({u})| = {}", v.norm());
        }
    }

    #[test]
    fn parameter_checks() {
        assert!(HestonModel::new(0.0, 0.0, -0.01, 1.0, 0.04, 0.3, 0.0).is_err());
        assert!(HestonModel::new(0.0, 0.0, 0.04, 0.0, 0.04, 0.3, 0.0).is_err());
        assert!(HestonModel::new(0.0, 0.0, 0.04, 1.0, 0.04, 0.3, 1.5).is_err());
        assert!(!model().feller_condition());
        let m = HestonModel::new(0.0, 0.0, 0.04, 2.0, 0.04, 0.3, 0.0).unwrap();
        assert!(m.feller_condition());
    }
}
