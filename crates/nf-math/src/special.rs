//! Special functions.
//!
//! Only the Gauss hypergeometric function on the unit interval is needed:
//! it appears in the covariance of Riemann–Liouville fractional Brownian
//! motion.

use std::f64::consts::PI;

use nf_core::{ensure, errors::Error, Real, Result};
use statrs::function::gamma::gamma;

const SERIES_TOLERANCE: Real = 1e-16;
const MAX_SERIES_TERMS: usize = 200_000;

/// Within this distance of an integer `c − a − b` the two terms of the
/// linear transformation cancel, so the direct series is preferred.
const NEAR_INTEGER: Real = 1e-3;

/// Gauss hypergeometric function `₂F₁(a, b; c; z)` for `z ∈ [0, 1]`.
///
/// For `z ≤ 1/2` the power series is summed directly. Above that the
/// argument is mapped to `1 − z` with the standard linear transformation
/// (Abramowitz & Stegun 15.3.6), unless `c − a − b` is within `1e-3` of an
/// integer, in which case the direct series is summed (and the transformation
/// is only used if that series is too slow to converge). At `z = 1` the
/// result is Gauss's summation, valid for `c − a − b > 0`.
pub fn hypergeometric_2f1(a: Real, b: Real, c: Real, z: Real) -> Result<Real> {
    ensure!(
        (0.0..=1.0).contains(&z),
        "hypergeometric argument must lie in [0, 1], got {z}"
    );
    ensure!(
        !is_non_positive_integer(c),
        "c must not be a non-positive integer, got {c}"
    );
    if a == 0.0 || b == 0.0 || z == 0.0 {
        return Ok(1.0);
    }
    let s = c - a - b;
    if z == 1.0 {
        ensure!(s > 0.0, "series diverges at z = 1 when c - a - b <= 0 (got {s})");
    }
    if z <= 0.5 || (z < 1.0 && is_integer(s)) {
        return series(a, b, c, z);
    }
    if z < 1.0 && (s - s.round()).abs() < NEAR_INTEGER {
        match series(a, b, c, z) {
            Err(Error::NotConverged { .. }) => {}
            direct => return direct,
        }
    }
    reflected(a, b, c, z)
}

/// Γ(x), reflected through `Γ(x)Γ(1 − x) = π / sin(πx)` below ½. The sine
/// is taken of the distance to the nearest integer so that arguments next
/// to a pole keep their relative accuracy.
fn gamma_fn(x: Real) -> Real {
    if x >= 0.5 {
        return gamma(x);
    }
    let n = x.round();
    let parity = if n % 2.0 == 0.0 { 1.0 } else { -1.0 };
    let sin_pi_x = parity * (PI * (x - n)).sin();
    PI / (sin_pi_x * gamma(1.0 - x))
}

fn is_integer(x: Real) -> bool {
    (x - x.round()).abs() < 1e-12
}

fn is_non_positive_integer(x: Real) -> bool {
    x <= 0.0 && is_integer(x)
}

/// `Σ (a)ₙ (b)ₙ / ((c)ₙ n!) zⁿ`
fn series(a: Real, b: Real, c: Real, z: Real) -> Result<Real> {
    let mut term = 1.0;
    let mut sum = 1.0;
    for n in 0..MAX_SERIES_TERMS {
        let n = n as Real;
        term *= (a + n) * (b + n) / ((c + n) * (n + 1.0)) * z;
        sum += term;
        if term == 0.0 || term.abs() < SERIES_TOLERANCE * sum.abs() {
            return Ok(sum);
        }
    }
    Err(Error::NotConverged {
        iterations: MAX_SERIES_TERMS,
    })
}

/// A&S 15.3.6, valid when `c − a − b` is not an integer.
fn reflected(a: Real, b: Real, c: Real, z: Real) -> Result<Real> {
    let s = c - a - b;
    let w = 1.0 - z;
    let first = if is_non_positive_integer(c - a) || is_non_positive_integer(c - b) {
        0.0
    } else {
        let tail = if w == 0.0 { 1.0 } else { series(a, b, 1.0 - s, w)? };
        gamma_fn(c) * gamma_fn(s) / (gamma_fn(c - a) * gamma_fn(c - b)) * tail
    };
    let second = if w == 0.0 || is_non_positive_integer(a) || is_non_positive_integer(b) {
        0.0
    } else {
        w.powf(s) * gamma_fn(c) * gamma_fn(-s) / (gamma_fn(a) * gamma_fn(b))
            * series(c - a, c - b, 1.0 + s, w)?
    };
    Ok(first + second)
}
