//! Characteristic functions of the log-return and the lognormal model.
//!
//! Every model exposes `φ(u; T) = E[exp(iu · ln(S_T / S_0))]` under the
//! pricing measure, together with the first, second and fourth cumulants
//! of the same log-return used to size the COS truncation range.

use std::fmt::Debug;

use nf_core::{ensure, Rate, Real, Result, Time, Volatility};
use num_complex::Complex64;

/// A model of the log-return `ln(S_T / S_0)` known through its
/// characteristic function.
pub trait CharacteristicFunction: Debug + Send + Sync {
    /// `E[exp(iu · ln(S_T / S_0))]`.
    fn phi(&self, u: Real, t: Time) -> Complex64;

    /// Cumulants `(c1, c2, c4)` of `ln(S_T / S_0)`.
    fn cumulants(&self, t: Time) -> (Real, Real, Real);

    /// Continuously compounded risk-free rate.
    fn rate(&self) -> Rate;

    /// Continuously compounded dividend yield.
    fn dividend_yield(&self) -> Rate;
}

/// Geometric Brownian motion with constant volatility.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlackScholesModel {
    rate: Rate,
    dividend_yield: Rate,
    volatility: Volatility,
}

impl BlackScholesModel {
    /// Lognormal model with rate `r`, dividend yield `q` and volatility `σ`.
    pub fn new(rate: Rate, dividend_yield: Rate, volatility: Volatility) -> Result<Self> {
        ensure!(volatility >= 0.0, "volatility must be non-negative, got {volatility}");
        Ok(Self {
            rate,
            dividend_yield,
            volatility,
        })
    }

    /// Volatility σ.
    pub fn volatility(&self) -> Volatility {
        self.volatility
    }

    fn drift(&self) -> Real {
        self.rate - self.dividend_yield - 0.5 * self.volatility * self.volatility
    }
}

impl CharacteristicFunction for BlackScholesModel {
    fn phi(&self, u: Real, t: Time) -> Complex64 {
        let var = self.volatility * self.volatility * t;
        Complex64::new(-0.5 * var * u * u, self.drift() * t * u).exp()
    }

    fn cumulants(&self, t: Time) -> (Real, Real, Real) {
        (self.drift() * t, self.volatility * self.volatility * t, 0.0)
    }

    fn rate(&self) -> Rate {
        self.rate
    }

    fn dividend_yield(&self) -> Rate {
        self.dividend_yield
    }
}
