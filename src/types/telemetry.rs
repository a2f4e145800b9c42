//! Telemetry input record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::processing::ProcessingError;

/// Well-known auxiliary channel names read by the health scorer.
pub mod channels {
    /// Per-sample error rate (fraction, nominally `0..=1`)
    pub const ERROR_RATE: &str = "error_rate";
    /// Per-sample fidelity (fraction, nominally `0..=1`)
    pub const FIDELITY: &str = "fidelity";
}

/// One uniformly-sampled telemetry capture.
///
/// All channels share the raw signal's length and sampling rate. Built once
/// per analysis and never mutated by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Raw signal searched for the oscillation
    pub signal: Vec<f64>,
    /// Sampling rate (Hz)
    pub sample_rate: f64,
    /// Auxiliary channels keyed by name, each aligned 1:1 with `signal`
    #[serde(default)]
    pub auxiliary: BTreeMap<String, Vec<f64>>,
}

impl TelemetrySample {
    /// Build a sample with no auxiliary channels.
    ///
    /// # Errors
    ///
    /// [`ProcessingError::InvalidArgument`] for a non-positive sampling rate
    /// or non-finite samples.
    pub fn new(signal: Vec<f64>, sample_rate: f64) -> Result<Self, ProcessingError> {
        let sample = Self {
            signal,
            sample_rate,
            auxiliary: BTreeMap::new(),
        };
        sample.validate()?;
        Ok(sample)
    }

    /// Attach an auxiliary channel.
    ///
    /// # Errors
    ///
    /// [`ProcessingError::InvalidArgument`] if the channel length differs
    /// from the signal or holds non-finite values.
    pub fn with_channel(
        mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<Self, ProcessingError> {
        let name = name.into();
        check_channel(&name, &values, self.signal.len())?;
        self.auxiliary.insert(name, values);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.signal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signal.is_empty()
    }

    /// Duration covered by the signal (seconds).
    pub fn duration_secs(&self) -> f64 {
        self.signal.len() as f64 / self.sample_rate
    }

    pub fn channel(&self, name: &str) -> Option<&[f64]> {
        self.auxiliary.get(name).map(Vec::as_slice)
    }

    /// Mean of an auxiliary channel, `None` if absent or empty.
    pub fn channel_mean(&self, name: &str) -> Option<f64> {
        self.channel(name)
            .filter(|values| !values.is_empty())
            .map(|values| values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Check the shared-length and finiteness invariants.
    ///
    /// Samples deserialized from JSON bypass the constructors, so the
    /// detector re-checks before analysis.
    pub fn validate(&self) -> Result<(), ProcessingError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(ProcessingError::InvalidArgument(format!(
                "sampling rate must be positive, got {}",
                self.sample_rate
            )));
        }
        if let Some(i) = self.signal.iter().position(|x| !x.is_finite()) {
            return Err(ProcessingError::InvalidArgument(format!(
                "signal sample {i} is not finite"
            )));
        }
        for (name, values) in &self.auxiliary {
            check_channel(name, values, self.signal.len())?;
        }
        Ok(())
    }
}

fn check_channel(name: &str, values: &[f64], expected_len: usize) -> Result<(), ProcessingError> {
    if values.len() != expected_len {
        return Err(ProcessingError::InvalidArgument(format!(
            "auxiliary channel '{name}' has {} samples, signal has {expected_len}",
            values.len()
        )));
    }
    if values.iter().any(|x| !x.is_finite()) {
        return Err(ProcessingError::InvalidArgument(format!(
            "auxiliary channel '{name}' contains non-finite values"
        )));
    }
    Ok(())
}
