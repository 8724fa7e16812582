//! SaxPulse - multi-threaded SAXPY micro-benchmark
//!
//! SaxPulse repeatedly applies `Y = Y + a*X` across a configurable number of worker
//! threads, measures the wall-clock time of the round loop and records the mean of Y
//! after every round.
//!
//! # Architecture
//!
//! - **Partitioner** (`partition`): contiguous, disjoint segments per worker
//! - **Workers** (`worker`): the SAXPY kernel over one exclusive segment
//! - **Engine** (`engine`): round loop with a full barrier before each reduction
//! - **Reducer** (`stats`): left-to-right mean of Y, once per round
//! - **Collaborators**: seeded initialization (`init`), configuration (`config`),
//!   reports (`output`)

pub mod config;
pub mod engine;
pub mod error;
pub mod init;
pub mod output;
pub mod partition;
pub mod stats;
pub mod util;
pub mod worker;

// Re-export commonly used types
pub use config::Config;
pub use engine::{Engine, EngineSettings, Strategy};
pub use error::EngineError;
pub use init::Workload;
pub use stats::RunResult;

/// Result type used throughout SaxPulse
pub type Result<T> = anyhow::Result<T>;
