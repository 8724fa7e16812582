//! Human-readable console output

use crate::config::Config;
use crate::stats::{tail, RunResult};
use crate::util::time::{as_millis_f64, format_rate, format_throughput};

/// Number of trailing values shown for Y and the per-round means
pub const TAIL_LEN: usize = 3;

/// Print the configuration summary
pub fn print_configuration(config: &Config) {
    println!("Configuration:");
    println!("  Run:");
    println!("    Vector size: {}", config.run.size);
    println!("    Seed: {}", config.run.seed);
    println!("    Threads: {}", config.run.threads);
    println!("    Max. iterations: {}", config.run.max_iters);
    println!("  Execution:");
    println!("    Strategy: {}", config.execution.strategy);
    if let Some(ref cores) = config.execution.cpu_cores {
        println!("    CPU cores: {}", cores);
    }
    if let Some(ref path) = config.output.json_output {
        println!("  JSON report: {}", path.display());
    }
    if let Some(ref path) = config.output.csv_output {
        println!("  CSV output: {}", path.display());
    }
}

/// Render the first `count` values of a vector as `[ a, b, ... ]`
pub fn format_preview(values: &[f64], count: usize) -> String {
    let shown: Vec<String> = values.iter().take(count).map(|v| format!("{:.6}", v)).collect();
    if values.len() > count {
        format!("[ {}, ... ]", shown.join(", "))
    } else {
        format!("[ {} ]", shown.join(", "))
    }
}

/// Render values separated by ", " with six decimals
pub fn format_values(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{:.6}", v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Print the results of a completed run
pub fn print_results(result: &RunResult, config: &Config) {
    let throughput = result.throughput();

    println!("═══════════════════════════════════════════════════════════");
    println!("                    BENCHMARK RESULTS");
    println!("═══════════════════════════════════════════════════════════");
    println!();
    println!("Execution time: {:.6} ms", as_millis_f64(result.elapsed));
    println!(
        "Rounds: {} x {} elements on {} threads ({})",
        result.rounds(),
        result.len(),
        config.run.threads,
        config.execution.strategy
    );
    println!();
    println!("Throughput:");
    println!("  Rounds:    {}/s", format_rate(throughput.rounds_per_sec));
    println!("  Elements:  {}/s", format_rate(throughput.elements_per_sec));
    println!("  Compute:   {}FLOP/s", format_rate(throughput.flops));
    println!("  Bandwidth: {}", format_throughput(throughput.bytes_per_sec));
    println!();
    println!(
        "Last {} values of Y: {}",
        TAIL_LEN,
        format_values(tail(&result.y, TAIL_LEN))
    );
    println!(
        "Last {} values of Y_avgs: {}",
        TAIL_LEN,
        format_values(tail(&result.y_avgs, TAIL_LEN))
    );
    println!("═══════════════════════════════════════════════════════════");
}
