//! Option type.

use nf_core::Real;
use std::fmt;

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OptionType {
    /// A call option (right to buy).
    Call,
    /// A put option (right to sell).
    Put,
}

impl OptionType {
    /// +1 for Call, −1 for Put.
    pub fn sign(self) -> Real {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }

    /// Payoff `max(φ(S − K), 0)`.
    pub fn payoff(self, spot: Real, strike: Real) -> Real {
        (self.sign() * (spot - strike)).max(0.0)
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "Call"),
            OptionType::Put => write!(f, "Put"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signs_and_payoffs() {
        assert_eq!(OptionType::Call.sign(), 1.0);
        assert_eq!(OptionType::Put.sign(), -1.0);
        assert_eq!(OptionType::Call.payoff(110.0, 100.0), 10.0);
        assert_eq!(OptionType::Put.payoff(110.0, 100.0), 0.0);
        assert_eq!(OptionType::Put.to_string(), "Put");
    }
}
