//! Vector partitioning
//!
//! Splits `[0, len)` into one contiguous segment per worker. Every worker gets
//! `len / workers` elements and the last worker also absorbs the remainder:
//!
//! ```text
//! len = 10, workers = 3
//!
//!   worker 0   worker 1   worker 2
//! [ 0  1  2 | 3  4  5 | 6  7  8  9 ]
//! ```
//!
//! When there are more workers than elements the per-worker size is zero, so every
//! worker but the last gets the empty segment `[0, 0)` and the last worker gets the
//! whole vector. Empty segments are valid and their workers simply do nothing.
//!
//! # Example
//!
//! ```
//! use saxpulse::partition::{segments, Segment};
//!
//! let segs = segments(10, 3).unwrap();
//! assert_eq!(segs, vec![Segment::new(0, 3), Segment::new(3, 6), Segment::new(6, 10)]);
//! ```

use crate::error::EngineError;
use std::ops::Range;

/// Half-open index range `[start, end)` owned by one worker for one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "segment start {} past end {}", start, end);
        Self { start, end }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Segment assigned to worker `index` out of `workers` for a vector of `len` elements
///
/// Pure function of its arguments: the same inputs always give the same segment.
///
/// # Errors
///
/// Returns [`EngineError::InvalidPartition`] if `len` or `workers` is zero, or if
/// `index >= workers`.
pub fn segment(len: usize, workers: usize, index: usize) -> Result<Segment, EngineError> {
    if len == 0 || workers == 0 || index >= workers {
        return Err(EngineError::InvalidPartition { len, workers, index });
    }

    let size = len / workers;
    let start = index * size;
    let end = if index == workers - 1 { len } else { start + size };

    Ok(Segment::new(start, end))
}

/// All segments for `workers` workers, in worker order
pub fn segments(len: usize, workers: usize) -> Result<Vec<Segment>, EngineError> {
    if workers == 0 {
        return Err(EngineError::InvalidPartition { len, workers, index: 0 });
    }
    (0..workers).map(|index| segment(len, workers, index)).collect()
}

/// Split `data` into one exclusive view per segment
///
/// `segments` must be contiguous, in order, and start at zero, which is exactly what
/// [`segments`] produces. The borrow checker then guarantees no two views overlap.
pub fn split_disjoint<'a, T>(mut data: &'a mut [T], segments: &[Segment]) -> Vec<&'a mut [T]> {
    let mut views = Vec::with_capacity(segments.len());
    let mut offset = 0;

    for seg in segments {
        debug_assert_eq!(seg.start, offset, "segments must be contiguous");
        let (head, tail) = std::mem::take(&mut data).split_at_mut(seg.len());
        views.push(head);
        data = tail;
        offset = seg.end;
    }

    views
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_exact_cover(len: usize, workers: usize) {
        let segs = segments(len, workers).unwrap();
        assert_eq!(segs.len(), workers);

        let mut next = 0;
        for seg in &segs {
            assert_eq!(seg.start, next, "gap or overlap at {} for ({}, {})", next, len, workers);
            next = seg.end;
        }
        assert_eq!(next, len);
    }

    #[test]
    fn test_ten_over_three() {
        let segs = segments(10, 3).unwrap();
        assert_eq!(segs, vec![Segment::new(0, 3), Segment::new(3, 6), Segment::new(6, 10)]);
    }

    #[test]
    fn test_even_split() {
        let segs = segments(12, 4).unwrap();
        assert!(segs.iter().all(|s| s.len() == 3));
    }

    #[test]
    fn test_coverage_grid() {
        for len in 1..=64 {
            for workers in 1..=20 {
                assert_exact_cover(len, workers);
            }
        }
        assert_exact_cover(1_000_003, 7);
    }

    #[test]
    fn test_idempotent() {
        for (len, workers) in [(10, 3), (7, 7), (3, 9), (1_000, 16)] {
            assert_eq!(segments(len, workers).unwrap(), segments(len, workers).unwrap());
            for i in 0..workers {
                assert_eq!(segment(len, workers, i).unwrap(), segment(len, workers, i).unwrap());
            }
        }
    }

    #[test]
    fn test_more_workers_than_elements() {
        let segs = segments(3, 5).unwrap();
        for seg in &segs[..4] {
            assert!(seg.is_empty());
            assert_eq!(*seg, Segment::new(0, 0));
        }
        assert_eq!(segs[4], Segment::new(0, 3));
    }

    #[test]
    fn test_single_worker_takes_everything() {
        assert_eq!(segments(5, 1).unwrap(), vec![Segment::new(0, 5)]);
    }

    #[test]
    fn test_rejects_degenerate_inputs() {
        assert!(segment(0, 3, 0).is_err());
        assert!(segment(10, 0, 0).is_err());
        assert!(segment(10, 3, 3).is_err());
        assert!(segments(10, 0).is_err());
        assert!(segments(0, 2).is_err());
    }

    #[test]
    fn test_split_disjoint_views() {
        let mut data: Vec<u32> = (0..10).collect();
        let segs = segments(10, 3).unwrap();
        let views = split_disjoint(&mut data, &segs);

        assert_eq!(views.len(), 3);
        assert_eq!(&*views[0], &[0, 1, 2]);
        assert_eq!(&*views[1], &[3, 4, 5]);
        assert_eq!(&*views[2], &[6, 7, 8, 9]);
    }

    #[test]
    fn test_split_disjoint_with_empty_segments() {
        let mut data = vec![1.0f64, 2.0];
        let segs = segments(2, 4).unwrap();
        let mut views = split_disjoint(&mut data, &segs);

        assert!(views[..3].iter().all(|v| v.is_empty()));
        views[3][1] = 5.0;
        drop(views);
        assert_eq!(data, vec![1.0, 5.0]);
    }
}
