//! `StochasticProcess` — the one-dimensional Itô process trait.
//!
//! A process `dX = μ(t,X) dt + σ(t,X) dW` is described by its drift (`μ`),
//! its diffusion (`σ`) and, for the Milstein scheme, the state derivative of
//! the diffusion (`∂σ/∂x`).

use nf_core::{Real, Time};

/// A one-dimensional stochastic process `dX = μ(t,X) dt + σ(t,X) dW`.
pub trait StochasticProcess: std::fmt::Debug + Send + Sync {
    /// Initial value of the process.
    fn x0(&self) -> Real;

    /// Drift `μ(t, x)`.
    fn drift(&self, t: Time, x: Real) -> Real;

    /// Diffusion `σ(t, x)`.
    fn diffusion(&self, t: Time, x: Real) -> Real;

    /// `∂σ/∂x (t, x)`, used by the Milstein correction.
    ///
    /// Default: central finite difference.
    fn diffusion_derivative(&self, t: Time, x: Real) -> Real {
        let h = 1e-6 * x.abs().max(1.0);
        (self.diffusion(t, x + h) - self.diffusion(t, x - h)) / (2.0 * h)
    }

    /// Expected value `E[x(t+Δt) | x(t) = x]`.
    ///
    /// Default: first-order Euler `x + μ(t,x)·Δt`.
    fn expectation(&self, t: Time, x: Real, dt: Time) -> Real {
        x + self.drift(t, x) * dt
    }

    /// Standard deviation of `x(t+Δt)` given `x(t) = x`.
    ///
    /// Default: `σ(t,x) · √Δt`.
    fn std_deviation(&self, t: Time, x: Real, dt: Time) -> Real {
        self.diffusion(t, x) * dt.sqrt()
    }

    /// Variance of `x(t+Δt)` given `x(t) = x`.
    fn variance(&self, t: Time, x: Real, dt: Time) -> Real {
        let s = self.std_deviation(t, x, dt);
        s * s
    }

    /// Advance the state: `E + std · dw` where `dw` is a standard normal draw.
    fn evolve(&self, t: Time, x: Real, dt: Time, dw: Real) -> Real {
        self.expectation(t, x, dt) + self.std_deviation(t, x, dt) * dw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// dX = 0.05·dt + 0.20·√X·dW
    #[derive(Debug)]
    struct RootProcess {
        x0: Real,
        mu: Real,
        sigma: Real,
    }

    impl StochasticProcess for RootProcess {
        fn x0(&self) -> Real {
            self.x0
        }

        fn drift(&self, _t: Time, _x: Real) -> Real {
            self.mu
        }

        fn diffusion(&self, _t: Time, x: Real) -> Real {
            self.sigma * x.sqrt()
        }
    }

    fn process() -> RootProcess {
        RootProcess {
            x0: 4.0,
            mu: 0.05,
            sigma: 0.20,
        }
    }

    #[test]
    fn euler_step_without_noise() {
        let p = process();
        let x_new = p.evolve(0.0, p.x0(), 1.0, 0.0);
        assert_abs_diff_eq!(x_new, 4.05, epsilon = 1e-12);
    }

    #[test]
    fn euler_step_with_noise() {
        let p = process();
        // 4 + 0.05·0.25 + 0.2·2·0.5·1
        let x_new = p.evolve(0.0, 4.0, 0.25, 1.0);
        assert_abs_diff_eq!(x_new, 4.2125, epsilon = 1e-12);
    }

    #[test]
    fn variance_over_step() {
        let p = process();
        // σ²·x·Δt = 0.04 · 4 · 0.25
        assert_abs_diff_eq!(p.variance(0.0, 4.0, 0.25), 0.04, epsilon = 1e-15);
    }

    #[test]
    fn finite_difference_derivative() {
        let p = process();
        // d/dx (0.2 √x) = 0.1 / √x
        assert_abs_diff_eq!(p.diffusion_derivative(0.0, 4.0), 0.05, epsilon = 1e-8);
    }
}
