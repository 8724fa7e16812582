//! Worker tasks
//!
//! A [`Worker`] applies the SAXPY update `y[j] = y[j] + a * x[j]` to the segment it
//! was handed for the current round. It never sees any part of Y outside that
//! segment, which is what lets every worker of a round run concurrently without
//! locks: the engine hands out disjoint `&mut` views and the borrow checker proves
//! they cannot alias.
//!
//! # Example
//!
//! ```
//! use saxpulse::worker::Worker;
//! use saxpulse::partition::Segment;
//!
//! let x = vec![1.0, 2.0, 3.0, 4.0];
//! let mut y = vec![0.5; 4];
//!
//! let worker = Worker::new(0, None);
//! let seg = Segment::new(1, 3);
//! worker.apply(2.0, &x, seg, &mut y[seg.range()]);
//!
//! assert_eq!(y, vec![0.5, 4.5, 6.5, 0.5]);
//! ```

pub mod affinity;

use crate::partition::Segment;
use std::panic::{self, AssertUnwindSafe};

/// SAXPY kernel over matching slices of X and Y
///
/// `x` and `y` must have the same length.
#[inline]
pub fn saxpy(a: f64, x: &[f64], y: &mut [f64]) {
    debug_assert_eq!(x.len(), y.len());
    for (yj, &xj) in y.iter_mut().zip(x) {
        *yj = *yj + a * xj;
    }
}

/// One worker slot of the engine
///
/// Workers are cheap descriptors. The thread that runs one is created by the engine
/// (per round or once per run, depending on the strategy); the descriptor only
/// carries the worker id and its optional CPU pin.
#[derive(Debug, Clone)]
pub struct Worker {
    id: usize,
    cpu_core: Option<usize>,
}

impl Worker {
    pub fn new(id: usize, cpu_core: Option<usize>) -> Self {
        Self { id, cpu_core }
    }

    /// Build one worker per slot, pinning worker `i` to `cores[i % cores.len()]`
    pub fn for_slots(count: usize, cores: Option<&[usize]>) -> Vec<Self> {
        (0..count)
            .map(|id| {
                let core = cores.filter(|c| !c.is_empty()).map(|c| c[id % c.len()]);
                Self::new(id, core)
            })
            .collect()
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn cpu_core(&self) -> Option<usize> {
        self.cpu_core
    }

    /// Pin the calling thread to this worker's core, if one was assigned
    ///
    /// Pinning is best effort: a failure is logged and the worker keeps running
    /// unpinned.
    pub fn pin_current_thread(&self) {
        if let Some(core) = self.cpu_core {
            if let Err(e) = affinity::set_cpu_affinity(&[core]) {
                log::warn!("worker {}: could not pin to core {}: {:#}", self.id, core, e);
            }
        }
    }

    /// Apply the update to `y`, which is the `segment` slice of the full Y vector
    ///
    /// `x` is the whole input vector; the worker reads only `x[segment]`.
    #[inline]
    pub fn apply(&self, a: f64, x: &[f64], segment: Segment, y: &mut [f64]) {
        saxpy(a, &x[segment.range()], y);
    }

    /// Like [`apply`](Self::apply), but a panic is caught and reported as `false`
    ///
    /// The engine uses this where a panic would otherwise leave the round barrier
    /// waiting on a worker that will never report back.
    pub fn apply_guarded(&self, a: f64, x: &[f64], segment: Segment, y: &mut [f64]) -> bool {
        panic::catch_unwind(AssertUnwindSafe(|| self.apply(a, x, segment, y))).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saxpy_basic() {
        let x = vec![1.0, 2.0, 3.0];
        let mut y = vec![10.0, 20.0, 30.0];
        saxpy(0.5, &x, &mut y);
        assert_eq!(y, vec![10.5, 21.0, 31.5]);
    }

    #[test]
    fn test_saxpy_empty_is_noop() {
        let mut y: Vec<f64> = vec![];
        saxpy(3.0, &[], &mut y);
        assert!(y.is_empty());
    }

    #[test]
    fn test_apply_only_touches_segment() {
        let x = vec![1.0; 6];
        let mut y = vec![0.0; 6];
        let seg = Segment::new(2, 4);

        Worker::new(1, None).apply(1.0, &x, seg, &mut y[seg.range()]);

        assert_eq!(y, vec![0.0, 0.0, 1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_apply_empty_segment() {
        let x = vec![1.0; 3];
        let mut y = vec![2.0; 3];
        let seg = Segment::new(0, 0);

        Worker::new(0, None).apply(9.0, &x, seg, &mut y[seg.range()]);

        assert_eq!(y, vec![2.0; 3]);
    }

    #[test]
    fn test_apply_guarded_reports_panic() {
        let x = vec![1.0; 2];
        let mut y = vec![0.0; 3];
        // Segment runs past the end of X
        let seg = Segment::new(0, 3);

        let ok = Worker::new(0, None).apply_guarded(1.0, &x, seg, &mut y);
        assert!(!ok);
    }

    #[test]
    fn test_for_slots_round_robin_cores() {
        let workers = Worker::for_slots(5, Some(&[2, 4]));
        let cores: Vec<_> = workers.iter().map(|w| w.cpu_core()).collect();
        assert_eq!(cores, vec![Some(2), Some(4), Some(2), Some(4), Some(2)]);
        assert_eq!(workers[3].id(), 3);
    }

    #[test]
    fn test_for_slots_without_cores() {
        let workers = Worker::for_slots(3, None);
        assert!(workers.iter().all(|w| w.cpu_core().is_none()));

        let workers = Worker::for_slots(2, Some(&[]));
        assert!(workers.iter().all(|w| w.cpu_core().is_none()));
    }
}
