//! Repair Simulation Engine CLI
//!
//! Runs one simulation and prints per-worker utilisation, repaired counts
//! and average downtime per machine type.
//!
//! ```bash
//! repair-sim --seed 7
//! repair-sim --config fleet.json --output report.json
//! RUST_LOG=repair_simulation_engine=debug repair-sim --horizon 500
//! ```

use std::fs;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use repair_simulation_engine::{DispatchStrategy, MachineType, Simulation, SimulationConfig};

#[derive(Parser, Debug)]
#[command(name = "repair-sim")]
#[command(about = "Simulate machine failures and shift-scheduled repairs", long_about = None)]
struct Args {
    /// JSON config file (missing fields take defaults)
    #[arg(short, long)]
    config: Option<String>,

    /// Simulation horizon in hours (overrides config)
    #[arg(long)]
    horizon: Option<f64>,

    /// RNG seed (overrides config)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Dispatch strategy when all workers are busy (first-listed, least-queued)
    #[arg(long)]
    strategy: Option<DispatchStrategy>,

    /// Write the report as JSON to this path
    #[arg(short, long)]
    output: Option<String>,

    /// Write the event trace as JSON to this path. Recording follows this
    /// flag; `record_trace` in the config file is ignored.
    #[arg(long)]
    trace: Option<String>,

    /// Only log warnings and errors (no per-event log)
    #[arg(short, long)]
    quiet: bool,
}

/// Log filter used when `RUST_LOG` is unset
fn default_log_filter(quiet: bool) -> &'static str {
    if quiet {
        "warn"
    } else {
        "repair_simulation_engine=info,info"
    }
}

/// Apply command-line overrides on top of the loaded config
fn apply_overrides(mut config: SimulationConfig, args: &Args) -> SimulationConfig {
    if let Some(horizon) = args.horizon {
        config = config.with_horizon(horizon);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(strategy) = args.strategy {
        config = config.with_dispatch(strategy);
    }
    config.record_trace = args.trace.is_some();
    config
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_log_filter(args.quiet).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match &args.config {
        Some(path) => SimulationConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config from {path}"))?,
        None => SimulationConfig::default(),
    };
    let config = apply_overrides(config, &args);

    let mut simulation = Simulation::new(config).context("Invalid simulation config")?;
    let report = simulation.run();

    println!("\nStatistics ({:.0} hours, seed {}):", report.horizon_hours, report.seed);
    println!("{:<10} {:>6} {:>14} {:>10}", "Worker", "Type", "Busy (h)", "Busy (%)");
    println!("{}", "-".repeat(43));
    for w in &report.workers {
        println!(
            "{:<10} {:>6} {:>14.2} {:>9.2}%",
            w.worker.to_string(),
            w.machine_type.to_string(),
            w.busy_hours,
            w.busy_percentage
        );
    }

    println!("\n{:<6} {:>10} {:>10} {:>22}", "Type", "Machines", "Repaired", "Avg downtime (h)");
    println!("{}", "-".repeat(51));
    for t in MachineType::ALL {
        if let Some(row) = report.type_report(t) {
            println!(
                "{:<6} {:>10} {:>10} {:>22.2}",
                t.to_string(),
                row.population,
                row.repaired,
                row.average_downtime_hours
            );
        }
    }
    println!(
        "\nFailures: {}  Repaired: {}  Down at horizon: {}",
        report.total_failures, report.total_repaired, report.machines_down_at_horizon
    );

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json).with_context(|| format!("Failed to write report to {path}"))?;
        info!(path = %path, "Report saved");
    }

    if let Some(path) = &args.trace {
        let json = serde_json::to_string_pretty(simulation.trace())?;
        fs::write(path, json).with_context(|| format!("Failed to write trace to {path}"))?;
        info!(path = %path, events = simulation.trace().len(), "Trace saved");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("repair-sim").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_default_filter_shows_per_event_log() {
        let filter = default_log_filter(false);
        assert!(filter.contains("repair_simulation_engine=info"));
        assert!(tracing_subscriber::EnvFilter::try_new(filter).is_ok());
    }

    #[test]
    fn test_quiet_filter_hides_per_event_log() {
        let filter = default_log_filter(true);
        assert_eq!(filter, "warn");
        assert!(tracing_subscriber::EnvFilter::try_new(filter).is_ok());
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let config = apply_overrides(
            SimulationConfig::default(),
            &args(&["--horizon", "500", "--seed", "9", "--strategy", "least-queued"]),
        );
        assert_eq!(config.horizon_hours, 500.0);
        assert_eq!(config.seed, 9);
        assert_eq!(config.dispatch, DispatchStrategy::LeastQueued);
    }

    #[test]
    fn test_trace_flag_decides_recording() {
        let from_file = SimulationConfig::default();
        assert!(from_file.record_trace);
        assert!(!apply_overrides(from_file, &args(&[])).record_trace);

        let from_file = SimulationConfig::default().without_trace();
        assert!(apply_overrides(from_file, &args(&["--trace", "trace.json"])).record_trace);
    }
}
