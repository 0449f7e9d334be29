//! Arithmetic Brownian motion `dX = μ dt + σ dW`.

use crate::stochastic_process::StochasticProcess;
use nf_core::{ensure, Real, Result, Time};

/// Brownian motion with constant drift and volatility.
///
/// Euler and Milstein are exact for this process.
#[derive(Debug, Clone)]
pub struct ArithmeticBrownianMotion {
    x0: Real,
    mu: Real,
    sigma: Real,
}

impl ArithmeticBrownianMotion {
    /// Create a new process; `sigma` must be non-negative.
    pub fn new(x0: Real, mu: Real, sigma: Real) -> Result<Self> {
        ensure!(sigma >= 0.0, "volatility must be non-negative, got {sigma}");
        Ok(Self { x0, mu, sigma })
    }

    /// Standard Brownian motion started at 0.
    pub fn standard() -> Self {
        Self {
            x0: 0.0,
            mu: 0.0,
            sigma: 1.0,
        }
    }
}

impl StochasticProcess for ArithmeticBrownianMotion {
    fn x0(&self) -> Real {
        self.x0
    }

    fn drift(&self, _t: Time, _x: Real) -> Real {
        self.mu
    }

    fn diffusion(&self, _t: Time, _x: Real) -> Real {
        self.sigma
    }

    fn diffusion_derivative(&self, _t: Time, _x: Real) -> Real {
        0.0
    }
}
