//! Configuration validation
//!
//! Hard errors stop the run before any vector is allocated. Legal but questionable
//! settings (more threads than elements or than CPUs) are logged as warnings.

use super::*;
use crate::worker::affinity::{parse_cpu_list, warn_if_oversubscribed};
use anyhow::{Context, Result};

/// Validate complete configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_run(&config.run)?;
    validate_execution(&config.execution)?;
    validate_output(&config.output)?;
    Ok(())
}

/// Validate problem size and repetition
pub fn validate_run(run: &RunConfig) -> Result<()> {
    if run.size == 0 || run.size > MAX_VECTOR_LEN {
        anyhow::bail!("size must be between 1 and {}, got {}", MAX_VECTOR_LEN, run.size);
    }

    if run.threads == 0 {
        anyhow::bail!("threads must be at least 1");
    }

    if run.max_iters == 0 {
        anyhow::bail!("max_iters must be at least 1");
    }

    if run.threads > run.size {
        log::warn!(
            "{} threads for {} elements: {} workers will get empty segments",
            run.threads,
            run.size,
            run.threads - 1
        );
    }
    warn_if_oversubscribed(run.threads);

    Ok(())
}

/// Validate execution options
pub fn validate_execution(execution: &ExecutionConfig) -> Result<()> {
    if let Some(ref spec) = execution.cpu_cores {
        parse_cpu_list(spec).context("Invalid cpu_cores")?;
    }
    Ok(())
}

/// Validate output options
pub fn validate_output(output: &OutputConfig) -> Result<()> {
    if let (Some(json), Some(csv)) = (&output.json_output, &output.csv_output) {
        if json == csv {
            anyhow::bail!("json_output and csv_output must be different files: {}", json.display());
        }
    }
    Ok(())
}
