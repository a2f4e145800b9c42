//! Synthetic Telemetry Generator
//!
//! Emits one [`TelemetrySample`] as JSON: a sinusoid at the requested
//! frequency plus Gaussian noise, normalised to unit peak amplitude, with
//! per-sample `error_rate` and `fidelity` auxiliary channels.
//!
//! The generator has its own seed, independent of the detector's benefit
//! perturbation.
//!
//! # Usage
//! ```bash
//! ./simulation --seed 7 --duration 300 | ./pulse-health --stdin --pretty
//! ```

use anyhow::{ensure, Result};
use clap::Parser;
use rand::prelude::*;
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;

use pulse_health::{channels, TelemetrySample};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "pulse-simulation")]
#[command(about = "Synthetic oscillating telemetry for pulse-health testing")]
#[command(version = "1.0")]
struct Args {
    /// Oscillation frequency (Hz)
    #[arg(short, long, default_value = "0.67")]
    frequency: f64,

    /// Sample rate (Hz)
    #[arg(short = 'r', long, default_value = "100")]
    sample_rate: f64,

    /// Duration (seconds)
    #[arg(short, long, default_value = "300")]
    duration: f64,

    /// Sinusoid amplitude before normalisation
    #[arg(long, default_value = "0.95")]
    amplitude: f64,

    /// Standard deviation of the additive Gaussian noise
    #[arg(short, long, default_value = "0.05")]
    noise: f64,

    /// Mean per-sample error rate for the auxiliary channel
    #[arg(long, default_value = "0.005")]
    error_rate: f64,

    /// Mean per-sample fidelity for the auxiliary channel
    #[arg(long, default_value = "0.99")]
    fidelity: f64,

    /// Omit auxiliary channels
    #[arg(long)]
    no_channels: bool,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,
}

/// Signal plus the per-sample auxiliary values produced alongside it.
struct Generated {
    signal: Vec<f64>,
    error_rates: Vec<f64>,
    fidelities: Vec<f64>,
}

fn generate<R: Rng>(args: &Args, rng: &mut R) -> Result<Generated> {
    let n = (args.sample_rate * args.duration).round() as usize;
    let noise = Normal::new(0.0, args.noise)?;
    // auxiliary jitter scales with each channel's headroom
    let error_jitter = Normal::new(0.0, args.error_rate * 0.2)?;
    let fidelity_jitter = Normal::new(0.0, (1.0 - args.fidelity) * 0.2)?;

    let mut signal: Vec<f64> = (0..n)
        .map(|i| {
            let t = i as f64 / args.sample_rate;
            args.amplitude * (2.0 * PI * args.frequency * t).sin() + noise.sample(rng)
        })
        .collect();

    let peak = signal.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    if peak > 0.0 {
        signal.iter_mut().for_each(|v| *v /= peak);
    }

    let error_rates = (0..n)
        .map(|_| (args.error_rate + error_jitter.sample(rng)).clamp(0.0, 1.0))
        .collect();
    let fidelities = (0..n)
        .map(|_| (args.fidelity + fidelity_jitter.sample(rng)).clamp(0.0, 1.0))
        .collect();

    Ok(Generated {
        signal,
        error_rates,
        fidelities,
    })
}

fn main() -> Result<()> {
    let args = Args::parse();
    ensure!(args.sample_rate > 0.0, "sample rate must be positive");
    ensure!(args.duration > 0.0, "duration must be positive");
    ensure!(
        (0.0..=1.0).contains(&args.error_rate) && (0.0..=1.0).contains(&args.fidelity),
        "error rate and fidelity must be in [0, 1]"
    );

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let generated = generate(&args, &mut rng)?;
    let mut sample = TelemetrySample::new(generated.signal, args.sample_rate)?;
    if !args.no_channels {
        sample = sample
            .with_channel(channels::ERROR_RATE, generated.error_rates)?
            .with_channel(channels::FIDELITY, generated.fidelities)?;
    }

    println!("{}", serde_json::to_string(&sample)?);
    Ok(())
}
