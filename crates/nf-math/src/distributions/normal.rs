//! Standard normal distribution.

use nf_core::{ensure, Real, Result};
use std::f64::consts::{PI, SQRT_2};

/// The standard normal probability density function.
///
/// `φ(x) = exp(-x²/2) / √(2π)`
#[inline]
pub fn normal_pdf(x: Real) -> Real {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// The standard normal cumulative distribution function Φ(x).
///
/// W. J. Cody's rational Chebyshev approximations (*Math. Comp.* 23, 1969),
/// in three bands of `|x|`. The smaller tail is computed directly, so the
/// lower tail keeps full relative precision until Φ underflows near
/// `x = −38`.
pub fn normal_cdf(x: Real) -> Real {
    let y = x.abs();
    if y <= CODY_CENTRAL {
        let xsq = x * x;
        let mut num = CODY_A[4] * xsq;
        let mut den = xsq;
        for i in 0..3 {
            num = (num + CODY_A[i]) * xsq;
            den = (den + CODY_B[i]) * xsq;
        }
        return 0.5 + x * (num + CODY_A[3]) / (den + CODY_B[3]);
    }

    let ratio = if y <= CODY_INTERMEDIATE {
        let mut num = CODY_C[8] * y;
        let mut den = y;
        for i in 0..7 {
            num = (num + CODY_C[i]) * y;
            den = (den + CODY_D[i]) * y;
        }
        (num + CODY_C[7]) / (den + CODY_D[7])
    } else {
        let xsq = 1.0 / (x * x);
        let mut num = CODY_P[5] * xsq;
        let mut den = xsq;
        for i in 0..4 {
            num = (num + CODY_P[i]) * xsq;
            den = (den + CODY_Q[i]) * xsq;
        }
        let r = xsq * (num + CODY_P[4]) / (den + CODY_Q[4]);
        (1.0 / (2.0 * PI).sqrt() - r) / y
    };

    // exp(−y²/2) split as exp(−s²/2)·exp(−(y−s)(y+s)/2) with s = ⌊16y⌋/16
    let s = (16.0 * y).trunc() / 16.0;
    let tail = (-0.5 * s * s).exp() * (-0.5 * (y - s) * (y + s)).exp() * ratio;
    if x > 0.0 {
        1.0 - tail
    } else {
        tail
    }
}

const CODY_CENTRAL: Real = 0.674_489_75;
const CODY_INTERMEDIATE: Real = 5.656_854_249_492_38; // √32

const CODY_A: [Real; 5] = [
    2.235_252_035_460_683_7,
    161.028_231_068_555_87,
    1_067.689_485_460_370_9,
    18_154.981_253_343_56,
    0.065_682_337_918_207_45,
];
const CODY_B: [Real; 4] = [
    47.202_581_904_688_245,
    976.098_551_737_776_7,
    10_260.932_208_618_979,
    45_507.789_335_026_73,
];
const CODY_C: [Real; 9] = [
    0.398_941_512_088_134_66,
    8.883_149_794_388_377,
    93.506_656_132_177_85,
    597.270_276_394_800_2,
    2_494.537_585_290_372_6,
    6_848.190_450_536_283,
    11_602.651_437_647_35,
    9_842.714_838_383_978,
    1.076_557_677_372_019_2e-08,
];
const CODY_D: [Real; 8] = [
    22.266_688_044_328_117,
    235.387_901_782_625,
    1_519.377_599_407_554_7,
    6_485.558_298_266_761,
    18_615.571_640_885_097,
    34_900.952_721_145_98,
    38_912.003_286_093_27,
    19_685.429_676_859_992,
];
const CODY_P: [Real; 6] = [
    0.215_898_534_057_957,
    0.127_401_161_160_247_36,
    0.022_235_277_870_649_807,
    0.001_421_619_193_227_893_4,
    2.911_287_495_116_879_3e-05,
    0.023_073_441_764_940_174,
];
const CODY_Q: [Real; 5] = [
    1.284_260_096_144_911,
    0.468_238_212_480_865_1,
    0.065_988_137_868_928_56,
    0.003_782_396_332_027_582_4,
    7.297_515_550_839_662e-05,
];

/// Natural logarithm of Φ(x).
///
/// Below `x = −20` the asymptotic expansion
/// `ln φ(x) − ln(−x) + ln(1 − x⁻² + 3x⁻⁴ − 15x⁻⁶ + 105x⁻⁸)` is used so that the
/// result stays finite where Φ itself underflows.
pub fn log_normal_cdf(x: Real) -> Real {
    if x > -20.0 {
        return normal_cdf(x).ln();
    }
    let z = 1.0 / (x * x);
    let series = 1.0 - z * (1.0 - z * (3.0 - z * (15.0 - 105.0 * z)));
    -0.5 * x * x - 0.5 * (2.0 * PI).ln() - (-x).ln() + series.ln()
}

/// The inverse standard normal CDF (probit function).
///
/// Peter J. Acklam's rational approximation followed by one Halley step,
/// giving close to machine precision over `(0, 1)`.
pub fn normal_cdf_inverse(p: Real) -> Result<Real> {
    ensure!(p > 0.0 && p < 1.0, "probability must lie in (0, 1), got {p}");
    let x = acklam_inverse(p);
    // Halley refinement
    let e = normal_cdf(x) - p;
    let u = e * (2.0 * PI).sqrt() * (0.5 * x * x).exp();
    Ok(x - u / (1.0 + 0.5 * x * u))
}

/// Maximum absolute error < 1.15e-9.
fn acklam_inverse(p: Real) -> Real {
    const A: [f64; 6] = [
        -3.969_683_028_665_376e+01,
        2.209_460_984_245_205e+02,
        -2.759_285_104_469_687e+02,
        1.383_577_518_672_69e2,
        -3.066_479_806_614_716e+01,
        2.506_628_277_459_239e+00,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e+01,
        1.615_858_368_580_409e+02,
        -1.556_989_798_598_866e+02,
        6.680_131_188_771_972e+01,
        -1.328_068_155_288_572e+01,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-03,
        -3.223_964_580_411_365e-01,
        -2.400_758_277_161_838e+00,
        -2.549_732_539_343_734e+00,
        4.374_664_141_464_968e+00,
        2.938_163_982_698_783e+00,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-03,
        3.224_671_290_700_398e-01,
        2.445_134_137_142_996e+00,
        3.754_408_661_907_416e+00,
    ];

    const P_LOW: f64 = 0.02425;
    const P_HIGH: f64 = 1.0 - P_LOW;

    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= P_HIGH {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn normal_pdf_at_zero() {
        let expected = 1.0 / (2.0 * PI).sqrt();
        assert_abs_diff_eq!(normal_pdf(0.0), expected, epsilon = 1e-15);
    }

    #[test]
    fn normal_cdf_known_values() {
        assert_abs_diff_eq!(normal_cdf(0.0), 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(normal_cdf(1.0), 0.841_344_746_068_542_9, epsilon = 1e-14);
        assert_abs_diff_eq!(normal_cdf(-1.96), 0.024_997_895_148_220_43, epsilon = 1e-14);
    }

    #[test]
    fn normal_cdf_band_edges() {
        let cases = [
            (-0.674_489_75, 0.250_000_000_062_310_18),
            (-0.674_49, 0.249_999_920_618_173_7),
            (-3.0, 0.001_349_898_031_630_094_5),
            (-5.656_854, 7.708_640_151_118_109_5e-9),
            (-5.657, 7.702_088_172_177_602e-9),
            (-8.0, 6.220_960_574_271_784e-16),
        ];
        for (x, expected) in cases {
            let got = normal_cdf(x);
            assert!(
                ((got - expected) / expected).abs() < 1e-14,
                "normal_cdf({x}) = {got}, expected {expected}"
            );
        }
        // symmetry
        for x in [0.3, 1.0, 2.5, 6.0] {
            assert_abs_diff_eq!(normal_cdf(x) + normal_cdf(-x), 1.0, epsilon = 1e-15);
        }
    }

    #[test]
    fn normal_cdf_tails() {
        assert_abs_diff_eq!(normal_cdf(10.0), 1.0, epsilon = 1e-15);
        assert!(normal_cdf(-10.0) > 0.0);
        assert!(normal_cdf(-10.0) < 1e-22);
    }

    #[test]
    fn log_cdf_matches_direct_evaluation() {
        for x in [-19.0, -5.0, 0.0, 2.0] {
            assert_abs_diff_eq!(log_normal_cdf(x), normal_cdf(x).ln(), epsilon = 1e-10);
        }
        // continuity across the switch to the expansion
        let below = log_normal_cdf(-20.000_001);
        let above = normal_cdf(-19.999_999).ln();
        assert!((below - above).abs() < 1e-4);
        assert!(log_normal_cdf(-100.0).is_finite());
    }

    #[test]
    fn inverse_cdf_roundtrip() {
        for p in [1e-10, 0.01, 0.1, 0.25, 0.5, 0.75, 0.9, 0.99, 1.0 - 1e-10] {
            let x = normal_cdf_inverse(p).unwrap();
            let p2 = normal_cdf(x);
            assert!(
                ((p2 - p) / p).abs() < 1e-12,
                "roundtrip failed for p={p}: got {p2}"
            );
        }
    }

    #[test]
    fn inverse_cdf_rejects_boundary() {
        assert!(normal_cdf_inverse(0.0).is_err());
        assert!(normal_cdf_inverse(1.0).is_err());
        assert!(normal_cdf_inverse(f64::NAN).is_err());
    }
}
