//! # nf-pricingengines
//!
//! European option pricing: the Black–Scholes–Merton closed form and the
//! Fourier-cosine (COS) expansion over any model with a known
//! characteristic function.
//!
//! ## Engines
//!
//! - [`black_scholes_price`] — Black–Scholes–Merton closed form with Greeks
//! - [`CosEngine`] — Fang–Oosterlee cosine expansion
//!
//! ## Models
//!
//! - [`BlackScholesModel`] — lognormal
//! - [`HestonModel`] — square-root stochastic variance
//! - [`VarianceGammaModel`] — Brownian motion time-changed by a gamma process

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod black_scholes;
pub mod characteristic_function;
pub mod cos_engine;
pub mod heston_model;
pub mod option;
pub mod variance_gamma_model;

pub use black_scholes::{black_scholes_merton, black_scholes_price, BlackScholesGreeks};
pub use characteristic_function::{BlackScholesModel, CharacteristicFunction};
pub use cos_engine::CosEngine;
pub use heston_model::HestonModel;
pub use option::OptionType;
pub use variance_gamma_model::VarianceGammaModel;
