//! Pulse Health CLI
//!
//! Reads one telemetry sample as JSON, runs the oscillation detector and
//! prints the report (plus a synchronization outcome when a baseline error
//! rate is given) as JSON on stdout.
//!
//! # Usage
//!
//! ```bash
//! # Analyze a file
//! pulse-health --input sample.json --pretty
//!
//! # Pipe from the generator, reproducible benefit, project a 2% error rate
//! simulation --seed 7 | pulse-health --stdin --seed 42 --baseline-error 0.02
//! ```
//!
//! # Environment Variables
//!
//! - `PULSE_CONFIG`: Path to a detector config TOML (see `detector_config.example.toml`)
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use tracing::{info, warn};

use pulse_health::{
    synchronize, DetectorConfig, OscillationDetector, PulseReport, SynchronizationOutcome,
    TelemetrySample,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "pulse-health")]
#[command(about = "Oscillation health detection for telemetry signals")]
#[command(version)]
struct CliArgs {
    /// Path to a telemetry sample (JSON)
    #[arg(long, conflicts_with = "stdin")]
    input: Option<PathBuf>,

    /// Read the telemetry sample (JSON) from stdin
    #[arg(long)]
    stdin: bool,

    /// Detector config TOML (overrides PULSE_CONFIG and ./detector_config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the target frequency (Hz)
    #[arg(long, value_name = "HZ")]
    target_hz: Option<f64>,

    /// Seed for the benefit perturbation (default: fresh entropy)
    #[arg(long, env = "PULSE_SEED")]
    seed: Option<u64>,

    /// Baseline error rate in [0, 1] to project through synchronization
    #[arg(long, value_name = "RATE")]
    baseline_error: Option<f64>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Serialize)]
struct CliOutput {
    report: PulseReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    synchronization: Option<SynchronizationOutcome>,
}

fn read_sample(args: &CliArgs) -> Result<TelemetrySample> {
    let raw = match (&args.input, args.stdin) {
        (Some(path), _) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        (None, true) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            buf
        }
        (None, false) => bail!("no input: pass --input <file> or --stdin"),
    };

    let sample: TelemetrySample =
        serde_json::from_str(&raw).context("parsing telemetry sample JSON")?;
    sample.validate()?;
    Ok(sample)
}

fn load_config(args: &CliArgs) -> Result<DetectorConfig> {
    let mut config = match &args.config {
        Some(path) => DetectorConfig::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DetectorConfig::load(),
    };
    if let Some(hz) = args.target_hz {
        config.detector.target_frequency_hz = hz;
    }
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    let config = load_config(&args)?;
    let detector = match args.seed {
        Some(seed) => OscillationDetector::with_seed(config, seed)?,
        None => OscillationDetector::new(config)?,
    };

    let sample = read_sample(&args)?;
    info!(
        samples = sample.len(),
        sample_rate = sample.sample_rate,
        duration_secs = sample.duration_secs(),
        target_hz = detector.target_frequency(),
        "Analyzing telemetry sample"
    );

    let report = detector.analyze(&sample)?;
    info!(
        detected = report.detected,
        status = %report.status,
        health = report.health_score,
        benefit = report.benefit_estimate,
        "{}",
        report.interpretation
    );

    let synchronization = args
        .baseline_error
        .map(|baseline| synchronize(&report, baseline))
        .transpose()?;
    if let Some(SynchronizationOutcome::NotApplicable { reason, .. }) = &synchronization {
        warn!("Synchronization not applicable: {}", reason);
    }

    let output = CliOutput {
        report,
        synchronization,
    };
    let json = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{json}");

    Ok(())
}
