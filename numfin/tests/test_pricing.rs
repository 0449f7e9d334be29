//! Cross-checks between the closed form, the COS engine and Monte Carlo.

use approx::assert_abs_diff_eq;
use numfin::methods::{EuropeanPathPricer, MonteCarloModel, Scheme};
use numfin::pricingengines::{
    black_scholes_price, BlackScholesModel, CharacteristicFunction, CosEngine, HestonModel,
    OptionType, VarianceGammaModel,
};
use numfin::processes::GeometricBrownianMotion;

const STRIKES: [f64; 5] = [80.0, 90.0, 100.0, 110.0, 120.0];

#[test]
fn cos_matches_black_scholes_across_strikes() {
    let model = BlackScholesModel::new(0.03, 0.01, 0.2).unwrap();
    for option_type in [OptionType::Call, OptionType::Put] {
        let cos = CosEngine::default()
            .price_strikes(&model, option_type, 100.0, &STRIKES, 1.0)
            .unwrap();
        for (k, p) in STRIKES.iter().zip(cos) {
            let exact = black_scholes_price(option_type, 100.0, *k, 0.03, 0.01, 0.2, 1.0).unwrap();
            assert_abs_diff_eq!(p, exact, epsilon = 1e-9);
        }
    }
}

#[test]
fn heston_with_frozen_variance_is_black_scholes() {
    // v0 = θ and negligible vol of variance: constant 20% volatility
    let heston = HestonModel::new(0.03, 0.01, 0.04, 1.0, 0.04, 1e-3, 0.0).unwrap();
    let prices = CosEngine::default()
        .price_strikes(&heston, OptionType::Call, 100.0, &STRIKES, 1.0)
        .unwrap();
    for (k, p) in STRIKES.iter().zip(prices) {
        let exact = black_scholes_price(OptionType::Call, 100.0, *k, 0.03, 0.01, 0.2, 1.0).unwrap();
        assert_abs_diff_eq!(p, exact, epsilon = 1e-4);
    }
}

#[test]
fn monte_carlo_agrees_with_closed_form() {
    let gbm = GeometricBrownianMotion::new(100.0, 0.05, 0.2).unwrap();
    let model = MonteCarloModel::new(&gbm, Scheme::Milstein, 1.0, 100, Some(2024)).unwrap();
    let pricer = EuropeanPathPricer::new(|s: f64| (s - 100.0).max(0.0), (-0.05_f64).exp());
    let mc = model.price_antithetic(&pricer, 20_000).unwrap();
    let exact = black_scholes_price(OptionType::Call, 100.0, 100.0, 0.05, 0.0, 0.2, 1.0).unwrap();
    assert!(
        (mc.mean - exact).abs() < 4.0 * mc.std_error + 0.05,
        "MC {} ± {} vs {}",
        mc.mean,
        mc.std_error,
        exact
    );
    let (lo, hi) = mc.confidence_interval(6.0);
    assert!(lo < exact + 0.05 && exact - 0.05 < hi);
}

#[test]
fn variance_gamma_prices_are_arbitrage_free() {
    let model = VarianceGammaModel::new(0.05, 0.0, 0.2, 0.3, -0.1).unwrap();
    let engine = CosEngine::default().with_n_terms(512);
    let calls = engine
        .price_strikes(&model, OptionType::Call, 100.0, &STRIKES, 0.5)
        .unwrap();
    for w in calls.windows(3) {
        // decreasing and convex in strike
        assert!(w[1] < w[0]);
        assert!(w[0] - 2.0 * w[1] + w[2] > 0.0);
    }
    for (k, c) in STRIKES.iter().zip(&calls) {
        let lower = (100.0 - k * (-model.rate() * 0.5).exp()).max(0.0);
        assert!(*c >= lower - 1e-8 && *c <= 100.0);
    }
}
