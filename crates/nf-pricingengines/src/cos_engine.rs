//! Fourier-cosine (COS) pricing of European options.
//!
//! With `x = ln(S/K)` and `y = ln(S_T/K)`, the density of `y` is expanded in
//! a cosine series on a truncated range `[a, b]`. The series coefficients
//! come straight from the characteristic function, and the payoff
//! coefficients have closed forms, so
//!
//! $$V = e^{-rT} \sum_{k=0}^{N-1}{}' \mathrm{Re}\left\{\varphi\left(\tfrac{k\pi}{b-a}\right)
//!       e^{ik\pi\frac{x-a}{b-a}}\right\} V_k$$
//!
//! where the prime halves the first term. The range is
//! `x + c1 ± L·√(c2 + √c4)` built from the cumulants of the log-return.
//!
//! Reference: Fang & Oosterlee, *A novel pricing method for European
//! options based on Fourier-cosine series expansions* (2008).

use std::f64::consts::PI;

use nf_core::{ensure, ensure_post, Real, Result, Time};
use num_complex::Complex64;
use tracing::debug;

use crate::characteristic_function::CharacteristicFunction;
use crate::option::OptionType;

/// COS engine settings.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CosEngine {
    /// Number of cosine terms `N`.
    pub n_terms: usize,
    /// Truncation width `L` in cumulant standard deviations.
    pub truncation: Real,
    /// Price calls as puts plus the forward (the put payoff is bounded, so
    /// its coefficients are less sensitive to the upper truncation).
    pub use_put_call_parity: bool,
}

impl Default for CosEngine {
    fn default() -> Self {
        Self {
            n_terms: 256,
            truncation: 10.0,
            use_put_call_parity: true,
        }
    }
}

/// `χ_k(c, d) = ∫_c^d e^y cos(kπ(y−a)/(b−a)) dy`
fn chi(k: usize, a: Real, b: Real, c: Real, d: Real) -> Real {
    let w = k as Real * PI / (b - a);
    let (ed, ec) = (d.exp(), c.exp());
    let (sd, cd) = (w * (d - a)).sin_cos();
    let (sc, cc) = (w * (c - a)).sin_cos();
    (cd * ed - cc * ec + w * (sd * ed - sc * ec)) / (1.0 + w * w)
}

/// `ψ_k(c, d) = ∫_c^d cos(kπ(y−a)/(b−a)) dy`
fn psi(k: usize, a: Real, b: Real, c: Real, d: Real) -> Real {
    if k == 0 {
        return d - c;
    }
    let w = k as Real * PI / (b - a);
    ((w * (d - a)).sin() - (w * (c - a)).sin()) / w
}

impl CosEngine {
    /// Set the number of cosine terms.
    pub fn with_n_terms(mut self, n_terms: usize) -> Self {
        self.n_terms = n_terms;
        self
    }

    /// Set the truncation width `L`.
    pub fn with_truncation(mut self, truncation: Real) -> Self {
        self.truncation = truncation;
        self
    }

    /// Enable or disable pricing calls through put–call parity.
    pub fn with_put_call_parity(mut self, enabled: bool) -> Self {
        self.use_put_call_parity = enabled;
        self
    }

    /// Truncation range `[a, b]` for `y = ln(S_T/K)` given `x = ln(S/K)`.
    pub fn truncation_range(
        &self,
        model: &dyn CharacteristicFunction,
        x: Real,
        t: Time,
    ) -> Result<(Real, Real)> {
        let (c1, c2, c4) = model.cumulants(t);
        let spread = c2 + c4.max(0.0).sqrt();
        ensure!(
            spread.is_finite() && spread > 0.0,
            "log-return cumulants give a degenerate range (c2 = {c2}, c4 = {c4})"
        );
        let half = self.truncation * spread.sqrt();
        Ok((x + c1 - half, x + c1 + half))
    }

    /// Price a European option.
    pub fn price(
        &self,
        model: &dyn CharacteristicFunction,
        option_type: OptionType,
        spot: Real,
        strike: Real,
        t: Time,
    ) -> Result<Real> {
        ensure!(spot > 0.0, "spot must be positive, got {spot}");
        ensure!(strike > 0.0, "strike must be positive, got {strike}");
        ensure!(t > 0.0, "time to expiry must be positive, got {t}");
        ensure!(self.n_terms >= 1, "n_terms must be at least 1");
        ensure!(
            self.truncation > 0.0,
            "truncation must be positive, got {}",
            self.truncation
        );

        let x = (spot / strike).ln();
        let (a, b) = self.truncation_range(model, x, t)?;
        debug!(a, b, n_terms = self.n_terms, "COS truncation range");

        let via_parity = self.use_put_call_parity && option_type == OptionType::Call;
        let expand_as = if via_parity { OptionType::Put } else { option_type };
        let value = self.expand(model, expand_as, x, strike, a, b, t);

        let price = if via_parity {
            let forward = spot * (-model.dividend_yield() * t).exp()
                - strike * (-model.rate() * t).exp();
            value + forward
        } else {
            value
        };
        ensure_post!(price.is_finite(), "COS price is not finite: {price}");
        Ok(price)
    }

    /// Price a strip of strikes sharing spot, maturity and model.
    pub fn price_strikes(
        &self,
        model: &dyn CharacteristicFunction,
        option_type: OptionType,
        spot: Real,
        strikes: &[Real],
        t: Time,
    ) -> Result<Vec<Real>> {
        strikes
            .iter()
            .map(|&k| self.price(model, option_type, spot, k, t))
            .collect()
    }

    #[allow(clippy::too_many_arguments)]
    fn expand(
        &self,
        model: &dyn CharacteristicFunction,
        option_type: OptionType,
        x: Real,
        strike: Real,
        a: Real,
        b: Real,
        t: Time,
    ) -> Real {
        // payoff support in y
        let (c, d) = match option_type {
            OptionType::Put => (a, b.min(0.0)),
            OptionType::Call => (a.max(0.0), b),
        };
        if c >= d {
            return 0.0;
        }

        let scale = 2.0 / (b - a) * strike;
        let mut sum = 0.0;
        for k in 0..self.n_terms {
            let v_k = match option_type {
                OptionType::Put => scale * (psi(k, a, b, c, d) - chi(k, a, b, c, d)),
                OptionType::Call => scale * (chi(k, a, b, c, d) - psi(k, a, b, c, d)),
            };
            let u = k as Real * PI / (b - a);
            let term = (model.phi(u, t) * Complex64::new(0.0, u * (x - a)).exp()).re * v_k;
            sum += if k == 0 { 0.5 * term } else { term };
        }
        (-model.rate() * t).exp() * sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::black_scholes::black_scholes_price;
    use crate::characteristic_function::BlackScholesModel;
    use crate::heston_model::HestonModel;
    use crate::variance_gamma_model::VarianceGammaModel;
    use approx::assert_abs_diff_eq;

    #[test]
    fn black_scholes_converges_exponentially() {
        let model = BlackScholesModel::new(0.05, 0.02, 0.25).unwrap();
        let exact = black_scholes_price(OptionType::Call, 100.0, 110.0, 0.05, 0.02, 0.25, 0.5).unwrap();
        let err = |n| {
            let p = CosEngine::default()
                .with_n_terms(n)
                .price(&model, OptionType::Call, 100.0, 110.0, 0.5)
                .unwrap();
            (p - exact).abs()
        };
        assert!(err(64) < 1e-8, "N=64 error {}", err(64));
        assert!(err(16) > err(64));
    }

    #[test]
    fn direct_call_agrees_with_parity_call() {
        let model = BlackScholesModel::new(0.03, 0.0, 0.2).unwrap();
        let engine = CosEngine::default();
        let parity = engine.price(&model, OptionType::Call, 100.0, 95.0, 1.0).unwrap();
        let direct = engine
            .with_put_call_parity(false)
            .price(&model, OptionType::Call, 100.0, 95.0, 1.0)
            .unwrap();
        assert_abs_diff_eq!(parity, direct, epsilon = 1e-7);
    }

    #[test]
    fn heston_reference_call() {
        // Fang & Oosterlee (2008), T = 1. The left tail is heavy enough that
        // L = 10 leaves a truncation error of about 3e-4.
        let model = HestonModel::new(0.0, 0.0, 0.0175, 1.5768, 0.0398, 0.5751, -0.5711).unwrap();
        let engine = CosEngine::default().with_truncation(18.0).with_n_terms(512);
        let price = engine.price(&model, OptionType::Call, 100.0, 100.0, 1.0).unwrap();
        assert_abs_diff_eq!(price, 5.785_155_450, epsilon = 1e-6);

        let rough = CosEngine::default()
            .price(&model, OptionType::Call, 100.0, 100.0, 1.0)
            .unwrap();
        assert_abs_diff_eq!(rough, 5.785_155_450, epsilon = 1e-3);
    }

    #[test]
    fn heston_slow_mean_reversion_keeps_a_tight_range() {
        let engine = CosEngine::default();
        let price_at = |kappa: Real| {
            let model = HestonModel::new(0.0, 0.0, 0.04, kappa, 0.04, 0.3, -0.7).unwrap();
            let (a, b) = engine.truncation_range(&model, 0.0, 1.0).unwrap();
            assert!(b - a < 5.0, "range [{a}, {b}] at kappa {kappa}");
            engine.price(&model, OptionType::Call, 100.0, 100.0, 1.0).unwrap()
        };
        let reference = price_at(1e-4);
        assert_abs_diff_eq!(reference, 7.052_196_873, epsilon = 1e-6);
        for kappa in [1e-6, 1e-8, 1e-12] {
            assert_abs_diff_eq!(price_at(kappa), reference, epsilon = 1e-4);
        }
    }

    #[test]
    fn variance_gamma_reference_calls() {
        let model = VarianceGammaModel::new(0.1, 0.0, 0.12, 0.2, -0.14).unwrap();
        let long = CosEngine::default()
            .with_n_terms(1024)
            .price(&model, OptionType::Call, 100.0, 90.0, 1.0)
            .unwrap();
        assert_abs_diff_eq!(long, 19.099_354_724, epsilon = 1e-6);

        // short maturity: the density has a kink and convergence is algebraic
        let short = CosEngine::default()
            .with_n_terms(4096)
            .price(&model, OptionType::Call, 100.0, 90.0, 0.1)
            .unwrap();
        assert_abs_diff_eq!(short, 10.993_703_187, epsilon = 1e-2);
    }

    #[test]
    fn strike_strip_is_monotone() {
        let model = HestonModel::new(0.02, 0.0, 0.04, 1.5, 0.04, 0.3, -0.6).unwrap();
        let strikes = [80.0, 90.0, 100.0, 110.0, 120.0];
        let calls = CosEngine::default()
            .price_strikes(&model, OptionType::Call, 100.0, &strikes, 1.0)
            .unwrap();
        let puts = CosEngine::default()
            .price_strikes(&model, OptionType::Put, 100.0, &strikes, 1.0)
            .unwrap();
        for i in 1..strikes.len() {
            assert!(calls[i] < calls[i - 1]);
            assert!(puts[i] > puts[i - 1]);
        }
        for (i, &k) in strikes.iter().enumerate() {
            let parity = 100.0 - k * (-0.02_f64).exp();
            assert_abs_diff_eq!(calls[i] - puts[i], parity, epsilon = 1e-9);
        }
    }

    #[test]
    fn rejects_bad_inputs() {
        let model = BlackScholesModel::new(0.0, 0.0, 0.2).unwrap();
        let engine = CosEngine::default();
        assert!(engine.price(&model, OptionType::Put, -1.0, 100.0, 1.0).is_err());
        assert!(engine.price(&model, OptionType::Put, 100.0, 100.0, 0.0).is_err());
        assert!(engine
            .with_n_terms(0)
            .price(&model, OptionType::Put, 100.0, 100.0, 1.0)
            .is_err());
        let flat = BlackScholesModel::new(0.0, 0.0, 0.0).unwrap();
        assert!(engine.price(&flat, OptionType::Put, 100.0, 100.0, 1.0).is_err());
    }
}
