//! Vector initialization
//!
//! The benchmark inputs come from a seeded [`ValueGenerator`] handed in by the
//! caller, so a run is reproducible from its seed alone and tests can plug in their
//! own sequences. Values are drawn in a fixed order: `X[i]` then `Y[i]` for every
//! index, and the scalar `a` last.
//!
//! # Example
//!
//! ```
//! use saxpulse::init::{UniformGenerator, Workload};
//!
//! let mut gen = UniformGenerator::with_seed(1);
//! let workload = Workload::generate(1_000, &mut gen);
//!
//! assert_eq!(workload.len(), 1_000);
//! assert!((0.0..1.0).contains(&workload.a));
//! ```

use crate::error::EngineError;
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Source of initial vector values
///
/// Implementations must be deterministic for a given seed.
pub trait ValueGenerator: Send {
    /// Next value in the sequence
    fn next_value(&mut self) -> f64;
}

/// Uniform values in `[0, 1)` from xoshiro256++
pub struct UniformGenerator {
    rng: Xoshiro256PlusPlus,
}

impl UniformGenerator {
    pub fn with_seed(seed: u32) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(u64::from(seed)),
        }
    }
}

impl ValueGenerator for UniformGenerator {
    #[inline]
    fn next_value(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Inputs of one benchmark run: X, Y and the scalar `a`
#[derive(Debug, Clone, PartialEq)]
pub struct Workload {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub a: f64,
}

impl Workload {
    /// Wrap existing vectors; X and Y must be the same non-zero length
    pub fn new(x: Vec<f64>, y: Vec<f64>, a: f64) -> Result<Self, EngineError> {
        if x.len() != y.len() {
            return Err(EngineError::LengthMismatch {
                x_len: x.len(),
                y_len: y.len(),
            });
        }
        if x.is_empty() {
            return Err(EngineError::InvalidSettings(
                "vectors must not be empty".into(),
            ));
        }
        Ok(Self { x, y, a })
    }

    /// Draw a workload of `len` elements from `gen`
    pub fn generate(len: usize, gen: &mut dyn ValueGenerator) -> Self {
        let mut x = Vec::with_capacity(len);
        let mut y = Vec::with_capacity(len);
        for _ in 0..len {
            x.push(gen.next_value());
            y.push(gen.next_value());
        }
        let a = gen.next_value();

        Self { x, y, a }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts up from zero so the draw order is visible
    struct Counter(f64);

    impl ValueGenerator for Counter {
        fn next_value(&mut self) -> f64 {
            let v = self.0;
            self.0 += 1.0;
            v
        }
    }

    #[test]
    fn test_draw_order_interleaves_x_and_y() {
        let w = Workload::generate(3, &mut Counter(0.0));
        assert_eq!(w.x, vec![0.0, 2.0, 4.0]);
        assert_eq!(w.y, vec![1.0, 3.0, 5.0]);
        assert_eq!(w.a, 6.0);
    }

    #[test]
    fn test_same_seed_same_workload() {
        let w1 = Workload::generate(256, &mut UniformGenerator::with_seed(42));
        let w2 = Workload::generate(256, &mut UniformGenerator::with_seed(42));
        assert_eq!(w1, w2);
    }

    #[test]
    fn test_different_seed_different_workload() {
        let w1 = Workload::generate(64, &mut UniformGenerator::with_seed(1));
        let w2 = Workload::generate(64, &mut UniformGenerator::with_seed(2));
        assert_ne!(w1.x, w2.x);
    }

    #[test]
    fn test_uniform_range() {
        let mut gen = UniformGenerator::with_seed(7);
        for _ in 0..10_000 {
            let v = gen.next_value();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_new_checks_lengths() {
        assert!(Workload::new(vec![1.0], vec![1.0, 2.0], 1.0).is_err());
        assert!(matches!(
            Workload::new(vec![], vec![], 1.0),
            Err(EngineError::InvalidSettings(_))
        ));
        assert_eq!(Workload::new(vec![1.0], vec![2.0], 0.5).unwrap().len(), 1);
    }
}
