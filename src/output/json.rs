//! JSON report
//!
//! One document per run with the effective configuration, timing, derived rates,
//! the tail of Y and the full list of per-round means.

use crate::config::Config;
use crate::engine::Strategy;
use crate::output::text::TAIL_LEN;
use crate::stats::{tail, RunResult};
use crate::util::time::{as_millis_f64, format_duration};
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Top-level JSON document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    pub tool: String,
    pub version: String,
    /// RFC 3339 time the report was produced
    pub timestamp: String,
    pub config: JsonRunConfig,
    pub elapsed: JsonElapsed,
    pub throughput: JsonThroughput,
    pub y_tail: Vec<f64>,
    pub y_avgs: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRunConfig {
    pub size: usize,
    pub seed: u32,
    pub threads: usize,
    pub max_iters: usize,
    pub strategy: Strategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_cores: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonElapsed {
    pub millis: f64,
    pub human: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonThroughput {
    pub rounds_per_sec: f64,
    pub elements_per_sec: f64,
    pub flops: f64,
    pub bytes_per_sec: f64,
}

/// Assemble the report for `result`
pub fn build_report(result: &RunResult, config: &Config) -> JsonReport {
    let throughput = result.throughput();

    JsonReport {
        tool: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Local::now().to_rfc3339(),
        config: JsonRunConfig {
            size: config.run.size,
            seed: config.run.seed,
            threads: config.run.threads,
            max_iters: config.run.max_iters,
            strategy: config.execution.strategy,
            cpu_cores: config.execution.cpu_cores.clone(),
        },
        elapsed: JsonElapsed {
            millis: as_millis_f64(result.elapsed),
            human: format_duration(result.elapsed),
        },
        throughput: JsonThroughput {
            rounds_per_sec: throughput.rounds_per_sec,
            elements_per_sec: throughput.elements_per_sec,
            flops: throughput.flops,
            bytes_per_sec: throughput.bytes_per_sec,
        },
        y_tail: tail(&result.y, TAIL_LEN).to_vec(),
        y_avgs: result.y_avgs.clone(),
    }
}

/// Write `report` to `path`
pub fn write_json_report(path: &Path, report: &JsonReport, pretty: bool) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create JSON report: {}", path.display()))?;
    let writer = BufWriter::new(file);

    if pretty {
        serde_json::to_writer_pretty(writer, report)?;
    } else {
        serde_json::to_writer(writer, report)?;
    }

    Ok(())
}
