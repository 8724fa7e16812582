//! TOML configuration file parsing
//!
//! ```toml
//! [run]
//! size = 1000000
//! seed = 3
//! threads = 8
//! max_iters = 500
//!
//! [execution]
//! strategy = "pool"
//! cpu_cores = "0-7"
//!
//! [output]
//! csv_output = "means.csv"
//! ```

use super::*;
use crate::config::cli::Cli;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<Config> {
    let config: Config = ::toml::from_str(contents).context("Failed to parse TOML configuration")?;
    Ok(config)
}

/// Apply command-line values on top of `config` (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, mut config: Config) -> Config {
    if let Some(size) = cli.size {
        config.run.size = size;
    }
    if let Some(seed) = cli.seed {
        config.run.seed = seed;
    }
    if let Some(threads) = cli.threads {
        config.run.threads = threads;
    }
    if let Some(max_iters) = cli.max_iters {
        config.run.max_iters = max_iters;
    }

    if let Some(strategy) = cli.strategy {
        config.execution.strategy = strategy;
    }
    if let Some(ref cores) = cli.cpu_cores {
        config.execution.cpu_cores = Some(cores.clone());
    }

    if let Some(ref path) = cli.json_output {
        config.output.json_output = Some(path.clone());
    }
    if cli.json_compact {
        config.output.json_pretty = false;
    }
    if let Some(ref path) = cli.csv_output {
        config.output.csv_output = Some(path.clone());
    }
    if let Some(preview) = cli.preview {
        config.output.preview = preview;
    }

    if cli.debug {
        config.runtime.debug = true;
    }
    if cli.dry_run {
        config.runtime.dry_run = true;
    }

    config
}

/// Build the effective configuration: file (or defaults) overridden by the CLI
pub fn load_config(cli: &Cli) -> Result<Config> {
    let base = match cli.config {
        Some(ref path) => parse_toml_file(path)?,
        None => Config::default(),
    };
    Ok(merge_cli_with_config(cli, base))
}
