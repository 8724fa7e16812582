//! SaxPulse CLI entry point

use anyhow::{Context, Result};
use saxpulse::config::cli::Cli;
use saxpulse::config::{toml, validator, Config};
use saxpulse::engine::Engine;
use saxpulse::init::{UniformGenerator, Workload};
use saxpulse::output::{csv, json, text};

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.debug);
    cli.validate()?;

    println!("SaxPulse v{}", env!("CARGO_PKG_VERSION"));
    println!("Multi-threaded SAXPY micro-benchmark");
    println!();

    let config = toml::load_config(&cli)?;
    validator::validate_config(&config).context("Configuration validation failed")?;

    text::print_configuration(&config);

    if config.runtime.dry_run {
        println!();
        println!("Dry run mode - configuration validated successfully");
        return Ok(());
    }

    run(&config)
}

/// `--debug` forces debug level; otherwise RUST_LOG applies, defaulting to info
fn init_logging(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp_millis().init();
}

fn run(config: &Config) -> Result<()> {
    let engine = Engine::new(config.engine_settings()?).context("Failed to create engine")?;

    log::debug!("generating {} elements with seed {}", config.run.size, config.run.seed);
    let mut generator = UniformGenerator::with_seed(config.run.seed);
    let workload = Workload::generate(config.run.size, &mut generator);

    if config.runtime.debug {
        let k = config.output.preview;
        println!();
        println!("Initial vector X= {}", text::format_preview(&workload.x, k));
        println!("Initial vector Y= {}", text::format_preview(&workload.y, k));
        println!("Scalar a= {:.6}", workload.a);
    }

    println!();
    println!("Starting benchmark...");
    println!();

    let result = engine.run(workload).context("Benchmark run failed")?;

    if config.runtime.debug {
        println!(
            "Resultant vector Y= {}",
            text::format_preview(&result.y, config.output.preview)
        );
        println!();
    }

    text::print_results(&result, config);

    if let Some(ref path) = config.output.json_output {
        let report = json::build_report(&result, config);
        json::write_json_report(path, &report, config.output.json_pretty)?;
        log::info!("JSON report written to {}", path.display());
    }

    if let Some(ref path) = config.output.csv_output {
        csv::write_round_means(path, &result.y_avgs)?;
        log::info!("Per-round means written to {}", path.display());
    }

    Ok(())
}
