//! Signal processing stages for oscillation detection
//!
//! - [`spectrum`]: Welch power spectral density
//! - [`peak`]: peak location and in-band / out-of-band SNR
//! - [`phase`]: analytic-signal phase coherence
//! - [`rhythm`]: segment-wise rhythm stability
//! - [`health_scoring`]: weighted health score, detection gates, benefit estimate

pub mod health_scoring;
pub mod peak;
pub mod phase;
pub mod rhythm;
pub mod spectrum;

pub use health_scoring::{
    calculate_health_score, detection_gates, estimate_benefit, health_components, interpret,
    status_from_score, weighted_score, HealthInputs,
};
pub use peak::{analyze_peak, PeakAnalysis};
pub use phase::{analytic_signal, phase_coherence, unwrap_phase, MIN_PHASE_SAMPLES};
pub use rhythm::{rhythm_stability, NEUTRAL_STABILITY};
pub use spectrum::WelchEstimator;

use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, OrderStatistics};
use thiserror::Error;

/// Errors in signal processing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProcessingError {
    #[error("Insufficient data for {stage}: need {needed} samples, have {available}")]
    InsufficientData {
        stage: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// One-sided power spectrum produced by the spectral estimator.
///
/// `frequencies` is non-decreasing and spans `0..=sample_rate / 2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumEstimate {
    /// Frequency bins (Hz)
    pub frequencies: Vec<f64>,
    /// Power spectral density at each bin
    pub powers: Vec<f64>,
    /// Sample rate used
    pub sample_rate: f64,
    /// Number of windowed segments averaged
    pub segments_averaged: usize,
}

impl SpectrumEstimate {
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// (frequency, power) pairs in frequency order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.frequencies
            .iter()
            .copied()
            .zip(self.powers.iter().copied())
    }

    /// Index of the bin closest to `target`. Ties go to the lower frequency.
    ///
    /// Only bins carrying both a frequency and a power are considered.
    pub fn nearest_bin(&self, target: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, (f, _)) in self.iter().enumerate() {
            let dist = (f - target).abs();
            match best {
                // strict `<` keeps the earlier (lower) bin on ties
                Some((_, d)) if dist >= d => {}
                _ => best = Some((i, dist)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// Power at the bin closest to `target`, or 0.0 for an empty spectrum.
    pub fn power_at(&self, target: f64) -> f64 {
        self.nearest_bin(target)
            .and_then(|i| self.powers.get(i).copied())
            .unwrap_or(0.0)
    }

    /// Mean power over bins accepted by `include`, or `None` if no bin matches.
    pub fn band_mean(&self, include: impl Fn(f64) -> bool) -> Option<f64> {
        let (sum, count) = self
            .iter()
            .filter(|&(f, _)| include(f))
            .fold((0.0, 0usize), |(s, n), (_, p)| (s + p, n + 1));
        (count > 0).then(|| sum / count as f64)
    }

    /// Percentile (0-100) of all power values.
    pub fn percentile(&self, p: usize) -> f64 {
        if self.powers.is_empty() {
            return 0.0;
        }
        let mut data = Data::new(self.powers.clone());
        data.percentile(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_spectrum(frequencies: Vec<f64>, powers: Vec<f64>) -> SpectrumEstimate {
        SpectrumEstimate {
            frequencies,
            powers,
            sample_rate: 10.0,
            segments_averaged: 1,
        }
    }

    #[test]
    fn test_nearest_bin_tie_prefers_lower_frequency() {
        let spectrum = make_spectrum(vec![0.0, 1.0, 2.0, 3.0], vec![1.0; 4]);
        assert_eq!(spectrum.nearest_bin(1.5), Some(1));
        assert_eq!(spectrum.nearest_bin(2.4), Some(2));
        assert_eq!(spectrum.nearest_bin(99.0), Some(3));
    }

    #[test]
    fn test_nearest_bin_empty() {
        let spectrum = make_spectrum(vec![], vec![]);
        assert_eq!(spectrum.nearest_bin(1.0), None);
        assert_eq!(spectrum.power_at(1.0), 0.0);
    }

    #[test]
    fn test_nearest_bin_ignores_unpaired_frequencies() {
        let spectrum = make_spectrum(vec![0.0, 1.0, 2.0, 3.0], vec![1.0, 2.0]);
        assert_eq!(spectrum.nearest_bin(3.0), Some(1));
        assert_eq!(spectrum.power_at(3.0), 2.0);
    }

    #[test]
    fn test_band_mean() {
        let spectrum = make_spectrum(vec![0.0, 1.0, 2.0, 3.0], vec![1.0, 2.0, 4.0, 8.0]);
        let mean = spectrum.band_mean(|f| (1.0..=2.0).contains(&f));
        assert_eq!(mean, Some(3.0));
        assert_eq!(spectrum.band_mean(|f| f > 10.0), None);
    }

    #[test]
    fn test_percentile_orders_powers() {
        let powers: Vec<f64> = (1..=100).map(f64::from).collect();
        let spectrum = make_spectrum((0..100).map(f64::from).collect(), powers);
        let p90 = spectrum.percentile(90);
        assert!(p90 > 85.0 && p90 < 95.0, "p90 = {}", p90);
    }
}
