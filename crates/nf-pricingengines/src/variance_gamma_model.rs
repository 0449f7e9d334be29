//! Variance Gamma model.
//!
//! The log-price is a Brownian motion with drift `θ` and volatility `σ`
//! evaluated at a gamma-distributed business time of unit mean rate and
//! variance rate `ν`. The drift carries the martingale correction
//!
//! $$\omega = \frac{1}{\nu}\ln\left(1 - \theta\nu - \tfrac12\sigma^2\nu\right)$$
//!
//! so that `E[S_T] = S_0 e^{(r-q)T}`.

use nf_core::{ensure, Rate, Real, Result, Time, Volatility};
use num_complex::Complex64;

use crate::characteristic_function::CharacteristicFunction;

/// Variance Gamma model parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VarianceGammaModel {
    rate: Rate,
    dividend_yield: Rate,
    sigma: Volatility,
    nu: Real,
    theta: Real,
}

impl VarianceGammaModel {
    /// Create a model; requires `σ > 0`, `ν > 0` and
    /// `1 − θν − σ²ν/2 > 0`.
    pub fn new(
        rate: Rate,
        dividend_yield: Rate,
        sigma: Volatility,
        nu: Real,
        theta: Real,
    ) -> Result<Self> {
        ensure!(sigma > 0.0, "sigma must be positive, got {sigma}");
        ensure!(nu > 0.0, "nu must be positive, got {nu}");
        let arg = 1.0 - theta * nu - 0.5 * sigma * sigma * nu;
        ensure!(
            arg > 0.0,
            "1 - theta*nu - sigma^2*nu/2 must be positive, got {arg}"
        );
        Ok(Self {
            rate,
            dividend_yield,
            sigma,
            nu,
            theta,
        })
    }

    /// Volatility σ of the subordinated Brownian motion.
    pub fn sigma(&self) -> Volatility {
        self.sigma
    }

    /// Variance rate ν of the gamma clock.
    pub fn nu(&self) -> Real {
        self.nu
    }

    /// Drift θ of the subordinated Brownian motion.
    pub fn theta(&self) -> Real {
        self.theta
    }

    /// Martingale correction ω.
    pub fn omega(&self) -> Real {
        (1.0 - self.theta * self.nu - 0.5 * self.sigma * self.sigma * self.nu).ln() / self.nu
    }

    fn mu(&self) -> Real {
        self.rate - self.dividend_yield + self.omega()
    }

    pub(crate) fn log_phi(&self, u: Real, t: Time) -> Complex64 {
        let base = Complex64::new(
            1.0 + 0.5 * self.sigma * self.sigma * self.nu * u * u,
            -u * self.theta * self.nu,
        );
        Complex64::new(0.0, u * self.mu() * t) - (t / self.nu) * base.ln()
    }
}

impl CharacteristicFunction for VarianceGammaModel {
    fn phi(&self, u: Real, t: Time) -> Complex64 {
        self.log_phi(u, t).exp()
    }

    fn cumulants(&self, t: Time) -> (Real, Real, Real) {
        let (s2, nu, th) = (self.sigma * self.sigma, self.nu, self.theta);
        let c1 = (self.mu() + th) * t;
        let c2 = (s2 + nu * th * th) * t;
        let c4 = 3.0 * (s2 * s2 * nu + 2.0 * th.powi(4) * nu.powi(3) + 4.0 * s2 * th * th * nu * nu) * t;
        (c1, c2, c4)
    }

    fn rate(&self) -> Rate {
        self.rate
    }

    fn dividend_yield(&self) -> Rate {
        self.dividend_yield
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn model() -> VarianceGammaModel {
        VarianceGammaModel::new(0.1, 0.0, 0.12, 0.2, -0.14).unwrap()
    }

    #[test]
    fn martingale_correction() {
        // E[S_T/S_0] = exp(μT) · (1 − θν − σ²ν/2)^{−T/ν} = e^{(r−q)T}
        let m = model();
        let t = 1.0;
        let mgf = (m.mu() * t).exp()
            * (1.0 - m.theta() * m.nu() - 0.5 * m.sigma().powi(2) * m.nu()).powf(-t / m.nu());
        assert_abs_diff_eq!(mgf, (0.1_f64).exp(), epsilon = 1e-14);
    }

    #[test]
    fn cumulants_match_derivatives_of_log_phi() {
        let m = model();
        let t = 0.5;
        let h = 1e-3;
        let (c1, c2, c4) = m.cumulants(t);
        let lp = m.log_phi(h, t);
        let lm = m.log_phi(-h, t);
        assert_abs_diff_eq!((lp.im - lm.im) / (2.0 * h), c1, epsilon = 1e-7);
        assert_abs_diff_eq!(-(lp.re + lm.re) / (h * h), c2, epsilon = 1e-6);
        assert!(c4 > 0.0);
    }

    #[test]
    fn phi_at_zero_is_one() {
        let v = model().phi(0.0, 1.0);
        assert_abs_diff_eq!(v.re, 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(v.im, 0.0, epsilon = 1e-15);
    }

    #[test]
    fn rejects_explosive_parameters() {
        assert!(VarianceGammaModel::new(0.0, 0.0, 0.12, 0.0, -0.14).is_err());
        assert!(VarianceGammaModel::new(0.0, 0.0, 0.0, 0.2, -0.14).is_err());
        // θν + σ²ν/2 ≥ 1
        assert!(VarianceGammaModel::new(0.0, 0.0, 0.5, 2.0, 0.5).is_err());
    }
}
