//! Random number generation.
//!
//! Every randomised routine in the workspace draws from a [`StdRng`] built by
//! [`seeded_rng`], so that passing the same seed reproduces the same output.

use crate::linalg::Matrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use nf_core::Real;

/// A reproducible generator for `Some(seed)`, an entropy-seeded one for
/// `None`.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// A `rows × cols` matrix of i.i.d. standard normal draws, filled column by
/// column.
pub fn standard_normal_matrix<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
    Matrix::from_fn(rows, cols, |_, _| rng.sample(StandardNormal))
}

/// A standard-normal generator.
#[derive(Debug, Clone)]
pub struct NormalRng {
    rng: StdRng,
}

impl NormalRng {
    /// Create a new generator with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: seeded_rng(Some(seed)),
        }
    }

    /// Generate the next standard-normal deviate.
    pub fn next_real(&mut self) -> Real {
        self.rng.sample(StandardNormal)
    }

    /// Fill `out` with standard-normal deviates.
    pub fn fill(&mut self, out: &mut [Real]) {
        for x in out.iter_mut() {
            *x = self.next_real();
        }
    }
}
