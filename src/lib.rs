//! Pulse Health: oscillation health detection for telemetry streams
//!
//! Looks for a stable rhythm at a target frequency (0.67 Hz by default) in a
//! uniformly sampled signal and reports how healthy it is.
//!
//! ## Architecture
//!
//! - **Processing**: Welch spectrum, peak/SNR, Hilbert phase coherence, rhythm stability
//! - **Scoring**: weighted health score, status label, conjunctive detection gates
//! - **Pipeline**: [`OscillationDetector`] running the stages, plus [`synchronize`]
//! - **Config**: TOML-backed [`DetectorConfig`] with range and typo checks
//!
//! ```no_run
//! use pulse_health::{analyze, synchronize, TelemetrySample};
//!
//! let signal: Vec<f64> = (0..30_000)
//!     .map(|i| (2.0 * std::f64::consts::PI * 0.67 * i as f64 / 100.0).sin())
//!     .collect();
//! let sample = TelemetrySample::new(signal, 100.0)?;
//! let report = analyze(&sample)?;
//! let outcome = synchronize(&report, 0.02)?;
//! println!("{} {:?}", report.status, outcome);
//! # Ok::<(), pulse_health::ProcessingError>(())
//! ```

pub mod config;
pub mod pipeline;
pub mod processing;
pub mod types;

pub use config::{ConfigError, DetectorConfig};
pub use pipeline::{synchronize, OscillationDetector};
pub use processing::{ProcessingError, SpectrumEstimate, WelchEstimator};
pub use types::{
    channels, DetectionGates, HealthComponents, HealthStatus, PulseReport,
    SynchronizationOutcome, TelemetrySample,
};

/// Analyze `sample` with the default configuration and an entropy-seeded
/// benefit perturbation.
pub fn analyze(sample: &TelemetrySample) -> Result<PulseReport, ProcessingError> {
    OscillationDetector::default().analyze(sample)
}
