//! Error types for numfin.
//!
//! Every fallible routine in the workspace returns [`Result`]. Argument
//! checks go through the [`ensure!`](crate::ensure) macro, internal
//! consistency checks through [`ensure_post!`](crate::ensure_post), and
//! unconditional failures through [`fail!`](crate::fail).

use thiserror::Error;

/// The top-level error type used throughout numfin.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// General runtime error.
    #[error("{0}")]
    Runtime(String),

    /// Precondition violated (raised by `ensure!`).
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Postcondition violated (raised by `ensure_post!`).
    #[error("postcondition not satisfied: {0}")]
    Postcondition(String),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Two operands have incompatible shapes.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The expected dimension.
        expected: usize,
        /// The dimension actually supplied.
        actual: usize,
    },

    /// A matrix that must be invertible (or positive definite) is not.
    #[error("singular matrix: {0}")]
    Singular(String),

    /// An iterative algorithm did not reach its tolerance.
    #[error("no convergence after {iterations} iterations")]
    NotConverged {
        /// Number of iterations performed.
        iterations: usize,
    },
}

/// Shorthand `Result` type used throughout numfin.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use nf_core::{ensure, errors::Error};
/// fn positive(x: f64) -> nf_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(matches!(positive(-1.0), Err(Error::Precondition(_))));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Postcondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use nf_core::{ensure_post, errors::Error};
/// fn compute(x: f64) -> nf_core::errors::Result<f64> {
///     let result = x * 2.0;
///     ensure_post!(result.is_finite(), "result must be finite, got {result}");
///     Ok(result)
/// }
/// assert!(compute(1.0).is_ok());
/// assert!(compute(f64::INFINITY).is_err());
/// ```
#[macro_export]
macro_rules! ensure_post {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Postcondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use nf_core::{fail, errors::Error};
/// fn always_err() -> nf_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}
