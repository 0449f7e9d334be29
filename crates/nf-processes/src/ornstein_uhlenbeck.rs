//! Ornstein-Uhlenbeck mean-reverting process.
//!
//! ```text
//! dX = a(b − X) dt + σ dW
//! ```
//!
//! where `a` is the speed of mean reversion, `b` is the long-run level,
//! and `σ` is the constant volatility.

use crate::stochastic_process::StochasticProcess;
use nf_core::{ensure, Real, Result, Time};

/// An Ornstein-Uhlenbeck mean-reverting process.
///
/// `dX = speed · (level − X) dt + volatility · dW`
///
/// Closed-form conditional moments:
/// ```text
/// E[X(t+dt) | X(t)] = level + (X(t) − level) · exp(−speed · dt)
/// Var[X(t+dt) | X(t)] = σ² / (2·speed) · (1 − exp(−2·speed·dt))
/// ```
#[derive(Debug, Clone)]
pub struct OrnsteinUhlenbeck {
    x0: Real,
    speed: Real,
    level: Real,
    volatility: Real,
}

impl OrnsteinUhlenbeck {
    /// Create a new Ornstein-Uhlenbeck process.
    ///
    /// # Arguments
    /// * `x0` — initial value
    /// * `speed` — mean-reversion speed `a` (must be ≥ 0)
    /// * `level` — long-run mean level `b`
    /// * `volatility` — diffusion coefficient `σ` (must be ≥ 0)
    pub fn new(x0: Real, speed: Real, level: Real, volatility: Real) -> Result<Self> {
        ensure!(
            speed >= 0.0,
            "mean-reversion speed must be non-negative, got {speed}"
        );
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

    /// Speed of mean reversion.
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

    /// Variance of the stationary distribution, `σ² / (2a)`.
    ///
    /// Infinite when there is no mean reversion.
    pub fn stationary_variance(&self) -> Real {
        if self.speed < 1e-15 {
            Real::INFINITY
        } else {
            self.volatility * self.volatility / (2.0 * self.speed)
        }
    }
}

impl StochasticProcess for OrnsteinUhlenbeck {
    fn x0(&self) -> Real {
        self.x0
    }

    fn drift(&self, _t: Time, x: Real) -> Real {
        self.speed * (self.level - x)
    }

    fn diffusion(&self, _t: Time, _x: Real) -> Real {
        self.volatility
    }

    fn diffusion_derivative(&self, _t: Time, _x: Real) -> Real {
        0.0
    }

    fn expectation(&self, _t: Time, x: Real, dt: Time) -> Real {
        self.level + (x - self.level) * (-self.speed * dt).exp()
    }

    fn std_deviation(&self, t: Time, x: Real, dt: Time) -> Real {
        self.variance(t, x, dt).sqrt()
    }

    fn variance(&self, _t: Time, _x: Real, dt: Time) -> Real {
        if self.speed < 1e-15 {
            // no mean reversion: plain Brownian motion
            self.volatility * self.volatility * dt
        } else {
            self.volatility * self.volatility * (1.0 - (-2.0 * self.speed * dt).exp())
                / (2.0 * self.speed)
        }
    }
}
