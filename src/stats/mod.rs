//! Round reduction and run statistics
//!
//! The reducer computes the arithmetic mean of Y once per round, after the round's
//! barrier. Summation is a plain left-to-right pass, so the value only depends on the
//! contents of Y and never on how many workers produced it. The segmented variant
//! walks the per-worker views in worker order, which visits elements in the same
//! order as the flat pass and therefore gives bit-identical results.
//!
//! [`RunResult`] is what the engine hands back after the last round, and
//! [`Throughput`] derives the rates the reports print from it.

use crate::util::time::calculate_rate;
use std::time::Duration;

/// Floating-point operations per element per round (one multiply, one add)
pub const FLOPS_PER_ELEMENT: f64 = 2.0;

/// Bytes moved per element per round: read X, read Y, write Y
pub const BYTES_PER_ELEMENT: f64 = 3.0 * std::mem::size_of::<f64>() as f64;

/// Mean of `values`, summed left to right
///
/// Returns 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    segmented_mean(std::iter::once(values))
}

/// Mean over consecutive parts of one vector, summed left to right across parts
pub fn segmented_mean<'a, I>(parts: I) -> f64
where
    I: IntoIterator<Item = &'a [f64]>,
{
    let mut total = 0.0;
    let mut count = 0usize;
    for part in parts {
        for &v in part {
            total += v;
        }
        count += part.len();
    }

    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Output of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    /// Y after the final round
    pub y: Vec<f64>,
    /// Mean of Y after each round, indexed by round
    pub y_avgs: Vec<f64>,
    /// Wall-clock time of the round loop only
    pub elapsed: Duration,
}

impl RunResult {
    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn rounds(&self) -> usize {
        self.y_avgs.len()
    }

    pub fn throughput(&self) -> Throughput {
        Throughput::new(self.len(), self.rounds(), self.elapsed)
    }
}

/// Last `n` values of `values` (fewer if the slice is shorter)
pub fn tail(values: &[f64], n: usize) -> &[f64] {
    &values[values.len().saturating_sub(n)..]
}

/// Rates derived from vector length, round count and elapsed time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Throughput {
    pub rounds_per_sec: f64,
    pub elements_per_sec: f64,
    pub flops: f64,
    pub bytes_per_sec: f64,
}

impl Throughput {
    pub fn new(len: usize, rounds: usize, elapsed: Duration) -> Self {
        let elements = len as f64 * rounds as f64;
        Self {
            rounds_per_sec: calculate_rate(rounds as f64, elapsed),
            elements_per_sec: calculate_rate(elements, elapsed),
            flops: calculate_rate(elements * FLOPS_PER_ELEMENT, elapsed),
            bytes_per_sec: calculate_rate(elements * BYTES_PER_ELEMENT, elapsed),
        }
    }
}
