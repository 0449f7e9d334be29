//! # nf-processes
//!
//! One-dimensional Itô processes `dX = μ(t, X) dt + σ(t, X) dW`
//! (arithmetic and geometric Brownian motion, Ornstein–Uhlenbeck,
//! Cox–Ingersoll–Ross) consumed by the Euler and Milstein schemes in
//! `nf-methods`.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod arithmetic_brownian_motion;
pub mod cox_ingersoll_ross;
pub mod geometric_brownian_motion;
pub mod ornstein_uhlenbeck;
pub mod stochastic_process;

pub use arithmetic_brownian_motion::ArithmeticBrownianMotion;
pub use cox_ingersoll_ross::CoxIngersollRoss;
pub use geometric_brownian_motion::GeometricBrownianMotion;
pub use ornstein_uhlenbeck::OrnsteinUhlenbeck;
pub use stochastic_process::StochasticProcess;
