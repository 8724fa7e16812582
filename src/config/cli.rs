//! CLI argument parsing using clap

use crate::engine::Strategy;
use clap::Parser;
use std::path::PathBuf;

/// SaxPulse - multi-threaded SAXPY micro-benchmark
///
/// Repeatedly computes Y = Y + a*X across worker threads and records the mean of Y
/// after every round.
#[derive(Parser, Debug)]
#[command(name = "saxpulse")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file (command-line options override it)
    #[arg(short = 'c', long, env = "SAXPULSE_CONFIG")]
    pub config: Option<PathBuf>,

    // === Run Options ===
    /// Vector size [default: 10000000]
    #[arg(short = 'p', long)]
    pub size: Option<usize>,

    /// Seed for vector initialization [default: 1]
    #[arg(short = 's', long)]
    pub seed: Option<u32>,

    /// Number of worker threads [default: 2]
    #[arg(short = 'n', long)]
    pub threads: Option<usize>,

    /// Maximum number of rounds [default: 1000]
    #[arg(short = 'i', long = "iters")]
    pub max_iters: Option<usize>,

    // === Execution Options ===
    /// Worker execution strategy [default: spawn]
    #[arg(long, value_enum)]
    pub strategy: Option<Strategy>,

    /// CPU cores to pin workers to (e.g. "0,2-5")
    #[arg(long)]
    pub cpu_cores: Option<String>,

    // === Output Options ===
    /// Write a JSON report to this path
    #[arg(long)]
    pub json_output: Option<PathBuf>,

    /// Write compact rather than pretty-printed JSON
    #[arg(long)]
    pub json_compact: bool,

    /// Write per-round means as CSV to this path
    #[arg(long)]
    pub csv_output: Option<PathBuf>,

    /// Number of leading elements shown in debug previews [default: 5]
    #[arg(long)]
    pub preview: Option<usize>,

    // === Runtime Options ===
    /// Enable debug logging and vector previews
    #[arg(long)]
    pub debug: bool,

    /// Validate and print the configuration without running
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Reject values that are invalid regardless of any configuration file
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.size == Some(0) {
            anyhow::bail!("size must be at least 1");
        }
        if self.threads == Some(0) {
            anyhow::bail!("threads must be at least 1");
        }
        if self.max_iters == Some(0) {
            anyhow::bail!("iters must be at least 1");
        }
        Ok(())
    }
}
