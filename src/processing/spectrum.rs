//! Welch power spectral density using rustfft
//!
//! The signal is cut into Hann-windowed, mean-detrended segments with
//! fractional overlap. Each segment is zero-padded to a power-of-two FFT
//! length fine enough to resolve the detection tolerance, and the squared
//! magnitudes are averaged across segments.
//!
//! # Example
//!
//! ```ignore
//! let estimator = WelchEstimator::new(SpectralConfig::default());
//! let spectrum = estimator.estimate(&samples, 100.0)?;
//! let p = spectrum.power_at(0.67);
//! ```

use num_complex::Complex;
use rustfft::FftPlanner;
use std::f64::consts::PI;

use super::{ProcessingError, SpectrumEstimate};
use crate::config::SpectralConfig;

/// Upper bound on the zero-padded FFT length.
const MAX_FFT_LEN: usize = 1 << 20;

/// Welch estimator with a fixed segmenting policy.
#[derive(Debug, Clone)]
pub struct WelchEstimator {
    config: SpectralConfig,
}

impl Default for WelchEstimator {
    fn default() -> Self {
        Self::new(SpectralConfig::default())
    }
}

impl WelchEstimator {
    pub fn new(config: SpectralConfig) -> Self {
        Self { config }
    }

    /// Fewest samples [`estimate`](Self::estimate) accepts.
    pub fn min_samples(&self) -> usize {
        self.config.min_samples.max(2)
    }

    /// Segment length used for an `n`-sample signal.
    ///
    /// Capped at `max_segment_len` and never longer than `n / 4`.
    pub fn segment_len(&self, n: usize) -> usize {
        self.config.max_segment_len.min(n / 4).max(2)
    }

    /// Zero-padded FFT length for a given segment length and sample rate.
    ///
    /// The resolution target is capped at `MAX_FFT_LEN` before rounding, so
    /// extreme sample rates cannot overflow the power-of-two step.
    pub fn fft_len(&self, segment_len: usize, sample_rate: f64) -> usize {
        let for_resolution = if self.config.resolution_hz > 0.0 {
            (sample_rate / self.config.resolution_hz)
                .ceil()
                .min(MAX_FFT_LEN as f64) as usize
        } else {
            segment_len
        };
        let segment_pow2 = segment_len.checked_next_power_of_two().unwrap_or(segment_len);
        segment_len
            .max(for_resolution)
            .min(MAX_FFT_LEN)
            .next_power_of_two()
            .max(segment_pow2)
    }

    /// Estimate the one-sided power spectrum of `samples`.
    ///
    /// # Errors
    ///
    /// [`ProcessingError::InsufficientData`] when fewer than
    /// [`min_samples`](Self::min_samples) samples are supplied,
    /// [`ProcessingError::InvalidArgument`] for a non-positive sample rate.
    pub fn estimate(
        &self,
        samples: &[f64],
        sample_rate: f64,
    ) -> Result<SpectrumEstimate, ProcessingError> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(ProcessingError::InvalidArgument(format!(
                "sampling rate must be positive, got {sample_rate}"
            )));
        }

        let n = samples.len();
        if n < self.min_samples() {
            return Err(ProcessingError::InsufficientData {
                stage: "spectral estimation",
                needed: self.min_samples(),
                available: n,
            });
        }

        let seg_len = self.segment_len(n);
        let overlap = (seg_len as f64 * self.config.overlap_fraction.clamp(0.0, 0.95)) as usize;
        let step = (seg_len - overlap).max(1);
        let num_segments = (n - seg_len) / step + 1;
        let nfft = self.fft_len(seg_len, sample_rate);

        let window = hann_window(seg_len);
        let window_power: f64 = window.iter().map(|w| w * w).sum();

        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(nfft);

        let n_positive = nfft / 2 + 1;
        let mut accum = vec![0.0_f64; n_positive];
        let mut buffer = vec![Complex::new(0.0, 0.0); nfft];

        for seg in 0..num_segments {
            let segment = &samples[seg * step..seg * step + seg_len];
            let mean = segment.iter().sum::<f64>() / seg_len as f64;

            for (slot, (&x, &w)) in buffer.iter_mut().zip(segment.iter().zip(window.iter())) {
                *slot = Complex::new((x - mean) * w, 0.0);
            }
            for slot in buffer.iter_mut().skip(seg_len) {
                *slot = Complex::new(0.0, 0.0);
            }

            fft.process(&mut buffer);

            for (acc, c) in accum.iter_mut().zip(buffer.iter()) {
                *acc += c.norm_sqr();
            }
        }

        // Density scaling, doubled for the one-sided interior bins
        let scale = 1.0 / (sample_rate * window_power.max(f64::EPSILON) * num_segments as f64);
        let powers: Vec<f64> = accum
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let one_sided = if i == 0 || i == n_positive - 1 { 1.0 } else { 2.0 };
                p * scale * one_sided
            })
            .collect();

        let resolution = sample_rate / nfft as f64;
        let frequencies: Vec<f64> = (0..n_positive).map(|i| i as f64 * resolution).collect();

        tracing::trace!(
            samples = n,
            segment_len = seg_len,
            segments = num_segments,
            nfft = nfft,
            resolution_hz = resolution,
            "Welch spectrum estimated"
        );

        Ok(SpectrumEstimate {
            frequencies,
            powers,
            sample_rate,
            segments_averaged: num_segments,
        })
    }
}

/// Periodic Hann window.
fn hann_window(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / len as f64).cos())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, sample_rate: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_too_short_signal_rejected() {
        let estimator = WelchEstimator::default();
        let err = estimator.estimate(&[0.0; 7], 100.0).unwrap_err();
        assert!(matches!(
            err,
            ProcessingError::InsufficientData { needed: 8, available: 7, .. }
        ));
    }

    #[test]
    fn test_invalid_sample_rate_rejected() {
        let estimator = WelchEstimator::default();
        assert!(matches!(
            estimator.estimate(&[0.0; 64], 0.0),
            Err(ProcessingError::InvalidArgument(_))
        ));
        assert!(matches!(
            estimator.estimate(&[0.0; 64], f64::NAN),
            Err(ProcessingError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_segment_len_caps() {
        let estimator = WelchEstimator::default();
        assert_eq!(estimator.segment_len(8), 2);
        assert_eq!(estimator.segment_len(400), 100);
        assert_eq!(estimator.segment_len(30_000), 1024);
    }

    #[test]
    fn test_frequency_axis_spans_to_nyquist() {
        let estimator = WelchEstimator::default();
        let spectrum = estimator.estimate(&sine(5.0, 100.0, 2000), 100.0).unwrap();

        assert_eq!(spectrum.frequencies.len(), spectrum.powers.len());
        assert_eq!(spectrum.frequencies[0], 0.0);
        let last = *spectrum.frequencies.last().unwrap();
        assert!((last - 50.0).abs() < 1e-9, "last bin = {}", last);
        assert!(spectrum.frequencies.windows(2).all(|w| w[0] <= w[1]));
        assert!(spectrum.segments_averaged > 1);
    }

    #[test]
    fn test_sine_peak_location() {
        let estimator = WelchEstimator::default();
        let spectrum = estimator.estimate(&sine(12.5, 100.0, 4096), 100.0).unwrap();

        let (peak_freq, _) = spectrum
            .iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap();
        assert!((peak_freq - 12.5).abs() < 0.01, "Peak at {}", peak_freq);
    }

    #[test]
    fn test_bin_spacing_meets_resolution_target() {
        let estimator = WelchEstimator::default();
        let spectrum = estimator.estimate(&sine(0.67, 100.0, 3000), 100.0).unwrap();
        let spacing = spectrum.frequencies[1] - spectrum.frequencies[0];
        assert!(spacing <= 0.002, "spacing = {}", spacing);
    }

    #[test]
    fn test_fft_len_capped_for_extreme_sample_rate() {
        let estimator = WelchEstimator::default();
        assert_eq!(estimator.fft_len(16, 1e17), MAX_FFT_LEN);
        assert_eq!(estimator.fft_len(16, f64::MAX), MAX_FFT_LEN);
        assert_eq!(estimator.fft_len(1024, 100.0), 65_536);
    }

    #[test]
    fn test_extreme_sample_rate_still_estimates() {
        let estimator = WelchEstimator::default();
        let spectrum = estimator.estimate(&sine(0.67, 1e17, 64), 1e17).unwrap();
        assert_eq!(spectrum.len(), MAX_FFT_LEN / 2 + 1);
        assert!(spectrum.powers.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_constant_signal_has_no_power() {
        let estimator = WelchEstimator::default();
        let spectrum = estimator.estimate(&[3.0; 256], 10.0).unwrap();
        assert!(spectrum.powers.iter().all(|&p| p.abs() < 1e-20));
    }
}
