//! Randomness consumed by the refinement pass.

use rand::Rng;

/// Upper bound (exclusive) of the per-evaluation interference term.
pub const MAX_INTERFERENCE: f64 = 5.0;

/// Source of the three kinds of random draw the annealer makes.
///
/// Every [`rand::Rng`] is an entropy source. Tests can implement the trait
/// directly to script exact sequences.
pub trait EntropySource {
    /// Uniform draw in `[0, MAX_INTERFERENCE)`, taken once per energy
    /// evaluation.
    fn interference(&mut self) -> f64;

    /// Uniform index in `0..len`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;

    /// Return `true` with the given probability.
    fn tunnel(&mut self, probability: f64) -> bool;
}

impl<R> EntropySource for R
where
    R: Rng,
{
    fn interference(&mut self) -> f64 {
        self.gen_range(0.0..MAX_INTERFERENCE)
    }

    fn pick(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.gen_range(0..len)
    }

    fn tunnel(&mut self, probability: f64) -> bool {
        self.gen_range(0.0..1.0) < probability
    }
}
