//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.
//! A TOML file (if given) supplies the base configuration and any option given on
//! the command line overrides it.

pub mod cli;
pub mod toml;
pub mod validator;

use crate::engine::{EngineSettings, Strategy};
use crate::worker::affinity::parse_cpu_list;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Largest supported vector length (the range of a signed 32-bit index)
pub const MAX_VECTOR_LEN: usize = 2_147_483_647;

/// Complete benchmark configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

/// Problem size and repetition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Vector length `p`
    #[serde(default = "default_size")]
    pub size: usize,
    /// Seed for vector initialization
    #[serde(default = "default_seed")]
    pub seed: u32,
    /// Number of worker threads
    #[serde(default = "default_threads")]
    pub threads: usize,
    /// Number of rounds
    #[serde(default = "default_max_iters")]
    pub max_iters: usize,
}

fn default_size() -> usize {
    10_000_000
}

fn default_seed() -> u32 {
    1
}

fn default_threads() -> usize {
    2
}

fn default_max_iters() -> usize {
    1000
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            size: default_size(),
            seed: default_seed(),
            threads: default_threads(),
            max_iters: default_max_iters(),
        }
    }
}

/// How the rounds are executed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    #[serde(default)]
    pub strategy: Strategy,
    /// Core list such as "0,2-5"; workers are pinned round robin
    pub cpu_cores: Option<String>,
}

/// Reports written after the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// JSON report path
    pub json_output: Option<PathBuf>,
    /// Pretty-print the JSON report
    #[serde(default = "default_true")]
    pub json_pretty: bool,
    /// CSV of per-round means
    pub csv_output: Option<PathBuf>,
    /// Number of leading elements shown in debug previews
    #[serde(default = "default_preview")]
    pub preview: usize,
}

fn default_true() -> bool {
    true
}

fn default_preview() -> usize {
    5
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json_output: None,
            json_pretty: true,
            csv_output: None,
            preview: default_preview(),
        }
    }
}

/// Runtime switches
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Debug logging and vector previews
    #[serde(default)]
    pub debug: bool,
    /// Validate and print the configuration, then exit
    #[serde(default)]
    pub dry_run: bool,
}

impl Config {
    /// Engine parameters for this configuration
    pub fn engine_settings(&self) -> Result<EngineSettings> {
        let cpu_cores = self
            .execution
            .cpu_cores
            .as_deref()
            .map(parse_cpu_list)
            .transpose()?;

        Ok(EngineSettings {
            threads: self.run.threads,
            max_iters: self.run.max_iters,
            strategy: self.execution.strategy,
            cpu_cores,
        })
    }
}
