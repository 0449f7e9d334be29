//! Cox–Ingersoll–Ross square-root process.
//!
//! ```text
//! dX = a(b − X) dt + σ √X dW
//! ```
//!
//! Used for short rates and as the variance process of the Heston model.
//! The diffusion is evaluated at `max(X, 0)` (full truncation), so
//! discretisations that step below zero keep producing finite values.

use crate::stochastic_process::StochasticProcess;
use nf_core::{ensure, Real, Result, Time};

/// A square-root (CIR) process.
///
/// `dX = speed · (level − X) dt + volatility · √X · dW`
#[derive(Debug, Clone)]
pub struct CoxIngersollRoss {
    x0: Real,
    speed: Real,
    level: Real,
    volatility: Real,
}

impl CoxIngersollRoss {
    /// Create a new square-root process.
    ///
    /// # Arguments
    /// * `x0` — initial value (must be ≥ 0)
    /// * `speed` — mean-reversion speed `a` (must be > 0)
    /// * `level` — long-run level `b` (must be ≥ 0)
    /// * `volatility` — volatility `σ` (must be ≥ 0)
    pub fn new(x0: Real, speed: Real, level: Real, volatility: Real) -> Result<Self> {
        ensure!(x0 >= 0.0, "initial value must be non-negative, got {x0}");
        ensure!(speed > 0.0, "mean-reversion speed must be positive, got {speed}");
        ensure!(level >= 0.0, "long-run level must be non-negative, got {level}");
        ensure!(
            volatility >= 0.0,
            "volatility must be non-negative, got {volatility}"
        );
        Ok(Self {
            x0,
            speed,
            level,
            volatility,
        })
    }

    /// Mean-reversion speed.
    pub fn speed(&self) -> Real {
        self.speed
    }

    /// Long-run level.
    pub fn level(&self) -> Real {
        self.level
    }

    /// Volatility.
    pub fn volatility(&self) -> Real {
        self.volatility
    }

    /// `2ab ≥ σ²`: the process never reaches zero.
    pub fn feller_condition_holds(&self) -> bool {
        2.0 * self.speed * self.level >= self.volatility * self.volatility
    }
}

impl StochasticProcess for CoxIngersollRoss {
    fn x0(&self) -> Real {
        self.x0
    }

    fn drift(&self, _t: Time, x: Real) -> Real {
        self.speed * (self.level - x)
    }

    fn diffusion(&self, _t: Time, x: Real) -> Real {
        self.volatility * x.max(0.0).sqrt()
    }

    fn diffusion_derivative(&self, _t: Time, x: Real) -> Real {
        if x > 0.0 {
            0.5 * self.volatility / x.sqrt()
        } else {
            0.0
        }
    }

    fn expectation(&self, _t: Time, x: Real, dt: Time) -> Real {
        self.level + (x - self.level) * (-self.speed * dt).exp()
    }

    fn variance(&self, _t: Time, x: Real, dt: Time) -> Real {
        let (a, b, s2) = (self.speed, self.level, self.volatility * self.volatility);
        let e1 = (-a * dt).exp();
        x.max(0.0) * s2 / a * (e1 - e1 * e1) + b * s2 / (2.0 * a) * (1.0 - e1).powi(2)
    }

    fn std_deviation(&self, t: Time, x: Real, dt: Time) -> Real {
        self.variance(t, x, dt).sqrt()
    }

    /// Moment-matched step, floored at zero.
    fn evolve(&self, t: Time, x: Real, dt: Time, dw: Real) -> Real {
        (self.expectation(t, x, dt) + self.std_deviation(t, x, dt) * dw).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn drift_vanishes_at_level() {
        let p = CoxIngersollRoss::new(0.04, 1.0, 0.04, 0.3).unwrap();
        assert_abs_diff_eq!(p.drift(0.0, 0.04), 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(p.diffusion(0.0, 0.04), 0.06, epsilon = 1e-15);
    }

    #[test]
    fn diffusion_truncated_below_zero() {
        let p = CoxIngersollRoss::new(0.04, 1.0, 0.04, 0.3).unwrap();
        assert_eq!(p.diffusion(0.0, -0.01), 0.0);
        assert_eq!(p.diffusion_derivative(0.0, -0.01), 0.0);
        assert_eq!(p.evolve(0.0, 0.0, 0.1, -50.0), 0.0);
    }

    #[test]
    fn analytic_derivative_matches_finite_difference() {
        #[derive(Debug)]
        struct Wrapped(CoxIngersollRoss);
        impl StochasticProcess for Wrapped {
            fn x0(&self) -> Real {
                self.0.x0()
            }
            fn drift(&self, t: Time, x: Real) -> Real {
                self.0.drift(t, x)
            }
            fn diffusion(&self, t: Time, x: Real) -> Real {
                self.0.diffusion(t, x)
            }
        }
        let p = CoxIngersollRoss::new(0.04, 1.5, 0.05, 0.4).unwrap();
        let fd = Wrapped(p.clone()).diffusion_derivative(0.0, 0.09);
        assert_abs_diff_eq!(p.diffusion_derivative(0.0, 0.09), fd, epsilon = 1e-6);
    }

    #[test]
    fn feller_condition() {
        assert!(CoxIngersollRoss::new(0.04, 2.0, 0.04, 0.3).unwrap().feller_condition_holds());
        assert!(!CoxIngersollRoss::new(0.04, 0.5, 0.04, 0.3).unwrap().feller_condition_holds());
    }

    #[test]
    fn long_run_variance() {
        let p = CoxIngersollRoss::new(0.1, 2.0, 0.05, 0.2).unwrap();
        // stationary variance b σ² / (2a)
        assert_abs_diff_eq!(p.variance(0.0, 0.1, 100.0), 0.05 * 0.04 / 4.0, epsilon = 1e-12);
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(CoxIngersollRoss::new(-0.1, 1.0, 0.04, 0.3).is_err());
        assert!(CoxIngersollRoss::new(0.1, 0.0, 0.04, 0.3).is_err());
    }
}
