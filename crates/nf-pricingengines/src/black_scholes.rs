//! Black–Scholes–Merton closed form for European options.
//!
//! $$C = S e^{-qT} N(d_1) - K e^{-rT} N(d_2)$$
//! $$P = K e^{-rT} N(-d_2) - S e^{-qT} N(-d_1)$$
//!
//! where $d_{1,2} = \frac{\ln(S/K) + (r - q \pm \sigma^2/2)T}{\sigma\sqrt{T}}$.

use crate::option::OptionType;
use nf_core::{ensure, Rate, Real, Result, Time, Volatility};
use nf_math::{normal_cdf, normal_pdf};

/// Price and first/second-order sensitivities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackScholesGreeks {
    /// Present value.
    pub price: Real,
    /// ∂V/∂S.
    pub delta: Real,
    /// ∂²V/∂S².
    pub gamma: Real,
    /// ∂V/∂σ (per 1.0 absolute vol).
    pub vega: Real,
    /// ∂V/∂t (per year).
    pub theta: Real,
    /// ∂V/∂r (per 1.0 rate shift).
    pub rho: Real,
}

/// Black–Scholes–Merton price and Greeks.
///
/// Expired options (`T ≤ 0`) return the intrinsic value with zero Greeks;
/// zero volatility returns the discounted forward intrinsic value.
pub fn black_scholes_merton(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    risk_free_rate: Rate,
    dividend_yield: Rate,
    volatility: Volatility,
    time_to_expiry: Time,
) -> BlackScholesGreeks {
    let phi = option_type.sign();
    let t = time_to_expiry;

    if t <= 0.0 {
        return BlackScholesGreeks {
            price: option_type.payoff(spot, strike),
            delta: 0.0,
            gamma: 0.0,
            vega: 0.0,
            theta: 0.0,
            rho: 0.0,
        };
    }

    let r = risk_free_rate;
    let q = dividend_yield;
    let sigma = volatility;
    let sqrt_t = t.sqrt();
    let std_dev = sigma * sqrt_t;
    let df_r = (-r * t).exp();
    let df_q = (-q * t).exp();
    let fwd = spot * ((r - q) * t).exp();

    let (d1, d2) = if std_dev > 1e-15 {
        let d1 = ((spot / strike).ln() + (r - q + 0.5 * sigma * sigma) * t) / std_dev;
        (d1, d1 - std_dev)
    } else {
        let big = if fwd > strike { 1e15 } else { -1e15 };
        (big, big)
    };

    let nd1 = normal_cdf(phi * d1);
    let nd2 = normal_cdf(phi * d2);
    let npd1 = normal_pdf(d1);

    let gamma = if std_dev > 1e-15 {
        df_q * npd1 / (spot * std_dev)
    } else {
        0.0
    };
    let theta = -(spot * df_q * npd1 * sigma) / (2.0 * sqrt_t) - phi * r * strike * df_r * nd2
        + phi * q * spot * df_q * nd1;

    BlackScholesGreeks {
        price: phi * (spot * df_q * nd1 - strike * df_r * nd2),
        delta: phi * df_q * nd1,
        gamma,
        vega: spot * df_q * npd1 * sqrt_t,
        theta,
        rho: phi * strike * t * df_r * nd2,
    }
}

/// Black–Scholes–Merton price with input validation.
pub fn black_scholes_price(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    risk_free_rate: Rate,
    dividend_yield: Rate,
    volatility: Volatility,
    time_to_expiry: Time,
) -> Result<Real> {
    ensure!(spot > 0.0, "spot must be positive, got {spot}");
    ensure!(strike > 0.0, "strike must be positive, got {strike}");
    ensure!(volatility >= 0.0, "volatility must be non-negative, got {volatility}");
    ensure!(
        time_to_expiry >= 0.0,
        "time to expiry must be non-negative, got {time_to_expiry}"
    );
    Ok(black_scholes_merton(
        option_type,
        spot,
        strike,
        risk_free_rate,
        dividend_yield,
        volatility,
        time_to_expiry,
    )
    .price)
}
