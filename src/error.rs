//! Engine error types
//!
//! Configuration problems are reported through `anyhow` by the validator before the
//! engine ever runs. Everything that can go wrong once the round loop is underway is
//! an [`EngineError`]. None of these are retryable: a round either completes on every
//! worker or the whole run is abandoned without partial results.

use thiserror::Error;

/// Failure raised by the partitioner or the round loop
#[derive(Debug, Error)]
pub enum EngineError {
    /// Zero-length vector, zero workers, or a worker index outside the worker set
    #[error("cannot partition {len} elements across {workers} workers (worker index {index})")]
    InvalidPartition {
        len: usize,
        workers: usize,
        index: usize,
    },

    /// X and Y must have the same length
    #[error("vector length mismatch: X has {x_len} elements, Y has {y_len}")]
    LengthMismatch { x_len: usize, y_len: usize },

    /// Zero rounds or zero workers requested
    #[error("invalid engine settings: {0}")]
    InvalidSettings(String),

    /// The OS refused to create a worker thread
    #[error("failed to create worker {worker} in round {round}")]
    ResourceExhaustion {
        worker: usize,
        round: usize,
        #[source]
        source: std::io::Error,
    },

    /// The rayon pool backing the `rayon` strategy could not be built
    #[error("failed to build a thread pool with {threads} threads")]
    PoolBuild {
        threads: usize,
        #[source]
        source: rayon::ThreadPoolBuildError,
    },

    /// A worker panicked while applying its segment
    #[error("worker {worker} panicked in round {round}")]
    WorkerPanicked { worker: usize, round: usize },

    /// A pooled worker went away before handing its segment back
    #[error("worker {worker} disconnected during round {round}")]
    WorkerDisconnected { worker: usize, round: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_exhaustion_keeps_source() {
        use std::error::Error as _;

        let err = EngineError::ResourceExhaustion {
            worker: 3,
            round: 7,
            source: std::io::Error::new(std::io::ErrorKind::OutOfMemory, "no threads left"),
        };

        assert_eq!(err.to_string(), "failed to create worker 3 in round 7");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_invalid_partition_message() {
        let err = EngineError::InvalidPartition { len: 0, workers: 4, index: 0 };
        assert!(err.to_string().contains("0 elements across 4 workers"));
    }
}
