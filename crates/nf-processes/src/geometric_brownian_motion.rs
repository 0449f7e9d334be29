//! Geometric Brownian motion.
//!
//! ```text
//! dS/S = μ dt + σ dW
//! ```
//!
//! The simplest continuous-time model for asset prices with constant drift
//! and volatility, and the usual benchmark for SDE schemes because its
//! strong solution is known in closed form.

use crate::stochastic_process::StochasticProcess;
use nf_core::{ensure, Real, Result, Time};

/// Geometric Brownian motion with constant drift and volatility.
///
/// `dS = μ·S·dt + σ·S·dW`
///
/// Closed-form solution: `S(t) = S₀ exp((μ − σ²/2)t + σW(t))`
#[derive(Debug, Clone)]
pub struct GeometricBrownianMotion {
    x0: Real,
    mu: Real,
    sigma: Real,
}

impl GeometricBrownianMotion {
    /// Create a new GBM process.
    ///
    /// # Arguments
    /// * `x0` — initial asset price (must be > 0)
    /// * `mu` — drift (growth rate)
    /// * `sigma` — volatility (must be ≥ 0)
    pub fn new(x0: Real, mu: Real, sigma: Real) -> Result<Self> {
        ensure!(x0 > 0.0, "initial value must be positive, got {x0}");
        ensure!(sigma >= 0.0, "volatility must be non-negative, got {sigma}");
        Ok(Self { x0, mu, sigma })
    }

    /// Drift `μ`.
    pub fn mu(&self) -> Real {
        self.mu
    }

    /// Volatility `σ`.
    pub fn sigma(&self) -> Real {
        self.sigma
    }

    /// Strong solution at time `t` given the Brownian value `W(t)`.
    pub fn exact_value(&self, t: Time, w_t: Real) -> Real {
        self.x0 * ((self.mu - 0.5 * self.sigma * self.sigma) * t + self.sigma * w_t).exp()
    }

    /// `E[S(t)] = S₀ e^{μt}`.
    pub fn mean_at(&self, t: Time) -> Real {
        self.x0 * (self.mu * t).exp()
    }

    /// `Var[S(t)] = S₀² e^{2μt} (e^{σ²t} − 1)`.
    pub fn variance_at(&self, t: Time) -> Real {
        self.x0 * self.x0 * (2.0 * self.mu * t).exp() * ((self.sigma * self.sigma * t).exp() - 1.0)
    }
}

impl StochasticProcess for GeometricBrownianMotion {
    fn x0(&self) -> Real {
        self.x0
    }

    fn drift(&self, _t: Time, x: Real) -> Real {
        self.mu * x
    }

    fn diffusion(&self, _t: Time, x: Real) -> Real {
        self.sigma * x
    }

    fn diffusion_derivative(&self, _t: Time, _x: Real) -> Real {
        self.sigma
    }

    /// Exact expectation: `x · exp(μ · dt)`.
    fn expectation(&self, _t: Time, x: Real, dt: Time) -> Real {
        x * (self.mu * dt).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn gbm_drift_proportional() {
        let p = GeometricBrownianMotion::new(100.0, 0.05, 0.2).unwrap();
        assert_abs_diff_eq!(p.drift(0.0, 100.0), 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.drift(0.0, 200.0), 10.0, epsilon = 1e-12);
    }

    #[test]
    fn gbm_diffusion_proportional() {
        let p = GeometricBrownianMotion::new(100.0, 0.05, 0.2).unwrap();
        assert_abs_diff_eq!(p.diffusion(0.0, 100.0), 20.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.diffusion_derivative(0.0, 100.0), 0.2, epsilon = 1e-15);
    }

    #[test]
    fn gbm_zero_noise_step() {
        let p = GeometricBrownianMotion::new(100.0, 0.05, 0.2).unwrap();
        let x_new = p.evolve(0.0, 100.0, 1.0, 0.0);
        let expected = 100.0 * (0.05_f64).exp();
        assert_abs_diff_eq!(x_new, expected, epsilon = 1e-10);
    }

    #[test]
    fn gbm_exact_solution() {
        let p = GeometricBrownianMotion::new(50.0, 0.1, 0.3).unwrap();
        assert_abs_diff_eq!(p.exact_value(0.0, 0.0), 50.0, epsilon = 1e-12);
        let expected = 50.0 * ((0.1 - 0.045) * 2.0 + 0.3 * 0.7_f64).exp();
        assert_abs_diff_eq!(p.exact_value(2.0, 0.7), expected, epsilon = 1e-10);
    }

    #[test]
    fn gbm_rejects_bad_parameters() {
        assert!(GeometricBrownianMotion::new(0.0, 0.05, 0.2).is_err());
        assert!(GeometricBrownianMotion::new(100.0, 0.05, -0.2).is_err());
    }
}
