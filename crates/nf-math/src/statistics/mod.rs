//! Running moments of Monte Carlo samples.
//!
//! Moments are updated one sample at a time with West's weighted form of
//! Welford's recurrence (D. H. D. West, *Commun. ACM* 22, 1979):
//!
//! ```text
//! W  ← W + w
//! μ  ← μ + (w / W)(x − μ)
//! M₂ ← M₂ + w (x − μ_old)(x − μ)
//! ```
//!
//! so the variance never subtracts two large sums and samples sitting on a
//! large offset keep their spread.

use nf_core::Real;

/// Incremental accumulator of weighted samples.
#[derive(Debug, Clone)]
pub struct Statistics {
    count: usize,
    weight: Real,
    mean: Real,
    m2: Real,
    min: Real,
    max: Real,
}

impl Statistics {
    /// An empty accumulator.
    pub fn new() -> Self {
        Self {
            count: 0,
            weight: 0.0,
            mean: 0.0,
            m2: 0.0,
            min: Real::INFINITY,
            max: Real::NEG_INFINITY,
        }
    }

    /// Add a sample with unit weight.
    pub fn add(&mut self, x: Real) {
        self.add_weighted(x, 1.0);
    }

    /// Add a sample with weight `w`; samples with `w ≤ 0` are ignored.
    pub fn add_weighted(&mut self, x: Real, w: Real) {
        if w.is_nan() || w <= 0.0 {
            return;
        }
        self.count += 1;
        self.min = self.min.min(x);
        self.max = self.max.max(x);
        self.weight += w;
        let delta = x - self.mean;
        self.mean += delta * w / self.weight;
        self.m2 += w * delta * (x - self.mean);
    }

    /// Add every value of an iterator with unit weight.
    pub fn extend<I: IntoIterator<Item = Real>>(&mut self, values: I) {
        for x in values {
            self.add(x);
        }
    }

    /// Number of samples added.
    pub fn samples(&self) -> usize {
        self.count
    }

    /// Weighted mean.
    pub fn mean(&self) -> Option<Real> {
        (self.count > 0).then_some(self.mean)
    }

    /// Weighted variance `M₂/W · n/(n − 1)`, which is the usual unbiased
    /// estimator for unit weights. `None` for fewer than two samples.
    pub fn variance(&self) -> Option<Real> {
        if self.count < 2 {
            return None;
        }
        let n = self.count as Real;
        Some(self.m2 / self.weight * n / (n - 1.0))
    }

    /// Square root of [`variance`](Self::variance).
    pub fn std_dev(&self) -> Option<Real> {
        self.variance().map(Real::sqrt)
    }

    /// Standard error of the mean, `std_dev / √n`.
    pub fn error_estimate(&self) -> Option<Real> {
        self.std_dev().map(|s| s / (self.count as Real).sqrt())
    }

    /// Smallest sample.
    pub fn minimum(&self) -> Option<Real> {
        (self.count > 0).then_some(self.min)
    }

    /// Largest sample.
    pub fn maximum(&self) -> Option<Real> {
        (self.count > 0).then_some(self.max)
    }

    /// Forget every sample.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Statistics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn unit_weight_moments() {
        let mut s = Statistics::new();
        s.extend([1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(s.samples(), 5);
        assert_abs_diff_eq!(s.mean().unwrap(), 3.0, epsilon = 1e-15);
        assert_abs_diff_eq!(s.variance().unwrap(), 2.5, epsilon = 1e-15);
        assert_abs_diff_eq!(s.std_dev().unwrap(), 2.5_f64.sqrt(), epsilon = 1e-15);
        assert_eq!(s.minimum(), Some(1.0));
        assert_eq!(s.maximum(), Some(5.0));
    }

    #[test]
    fn error_estimate_scales_with_samples() {
        let mut s = Statistics::new();
        s.extend([1.0, 3.0, 1.0, 3.0]);
        // sample variance 4/3
        let expected = (4.0_f64 / 3.0).sqrt() / 2.0;
        assert_abs_diff_eq!(s.error_estimate().unwrap(), expected, epsilon = 1e-15);
        s.reset();
        assert_eq!(s.samples(), 0);
        assert!(s.mean().is_none());
    }

    #[test]
    fn weighted_mean_and_variance() {
        // weights 1, 2, 1 on 0, 3, 6: μ = 3, M₂/W = (9 + 0 + 9)/4
        let mut s = Statistics::new();
        s.add_weighted(0.0, 1.0);
        s.add_weighted(3.0, 2.0);
        s.add_weighted(6.0, 1.0);
        assert_abs_diff_eq!(s.mean().unwrap(), 3.0, epsilon = 1e-15);
        assert_abs_diff_eq!(s.variance().unwrap(), 4.5 * 1.5, epsilon = 1e-14);

        // integer weights agree with repeating the sample
        let mut repeated = Statistics::new();
        repeated.extend([0.0, 3.0, 3.0, 6.0]);
        assert_abs_diff_eq!(repeated.mean().unwrap(), s.mean().unwrap(), epsilon = 1e-15);
    }

    #[test]
    fn non_positive_weights_are_ignored() {
        let mut s = Statistics::new();
        s.add_weighted(7.0, 0.0);
        assert!(s.mean().is_none());
        s.extend([1.0, 3.0]);
        s.add_weighted(-100.0, -1.0);
        s.add_weighted(-100.0, Real::NAN);
        assert_abs_diff_eq!(s.mean().unwrap(), 2.0, epsilon = 1e-15);
        assert_abs_diff_eq!(s.variance().unwrap(), 2.0, epsilon = 1e-15);
        assert_eq!(s.minimum(), Some(1.0));
        assert_eq!(s.samples(), 2);
    }

    #[test]
    fn variance_survives_a_large_offset() {
        let mut s = Statistics::new();
        s.extend([1e8, 1e8 + 1e-3, 1e8 + 2e-3]);
        // the samples themselves are rounded to the 1.5e-8 spacing near 1e8
        assert_abs_diff_eq!(s.variance().unwrap(), 1e-6, epsilon = 1e-10);
        assert_abs_diff_eq!(s.mean().unwrap(), 1e8 + 1e-3, epsilon = 1e-7);
    }

    #[test]
    fn empty_and_single_sample() {
        let mut s = Statistics::new();
        assert!(s.mean().is_none());
        assert!(s.variance().is_none());
        assert!(s.minimum().is_none());
        s.add(4.0);
        assert_eq!(s.mean(), Some(4.0));
        assert!(s.variance().is_none());
    }
}
