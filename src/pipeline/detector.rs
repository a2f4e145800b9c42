//! Oscillation detector: runs the five stages for one telemetry sample.
//!
//! Stage 1→2 (spectrum, peak/SNR), stage 3 (phase coherence) and stage 4
//! (rhythm stability) only read the immutable sample and run concurrently
//! through `rayon::join`. Health scoring joins their results. The benefit
//! perturbation is the single random draw per analysis.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

use crate::config::DetectorConfig;
use crate::processing::{
    analyze_peak, calculate_health_score, detection_gates, estimate_benefit, interpret,
    phase_coherence, rhythm_stability, HealthInputs, PeakAnalysis, ProcessingError,
    WelchEstimator, MIN_PHASE_SAMPLES,
};
use crate::types::{channels, PulseReport, SynchronizationOutcome, TelemetrySample};

/// Stage 2-4 outputs for one sample, before scoring.
#[derive(Debug, Clone)]
struct Measurements {
    peak: PeakAnalysis,
    phase_coherence: f64,
    rhythm_stability: f64,
}

/// Oscillation health detector.
///
/// Construct with [`new`](Self::new) for a fresh entropy-seeded generator on
/// every call, or [`with_seed`](Self::with_seed) for a shared deterministic
/// generator whose draws are serialized behind a mutex.
/// [`analyze_with_rng`](Self::analyze_with_rng) accepts any injected source.
#[derive(Debug)]
pub struct OscillationDetector {
    config: DetectorConfig,
    estimator: WelchEstimator,
    rng: Option<Mutex<StdRng>>,
}

impl Default for OscillationDetector {
    fn default() -> Self {
        let config = DetectorConfig::default();
        Self {
            estimator: WelchEstimator::new(config.spectral.clone()),
            config,
            rng: None,
        }
    }
}

impl OscillationDetector {
    /// # Errors
    ///
    /// [`ProcessingError::InvalidArgument`] if `config` fails validation.
    pub fn new(config: DetectorConfig) -> Result<Self, ProcessingError> {
        config
            .validate()
            .map_err(|e| ProcessingError::InvalidArgument(e.to_string()))?;
        Ok(Self {
            estimator: WelchEstimator::new(config.spectral.clone()),
            config,
            rng: None,
        })
    }

    /// Detector whose benefit perturbation comes from `StdRng::seed_from_u64(seed)`.
    pub fn with_seed(config: DetectorConfig, seed: u64) -> Result<Self, ProcessingError> {
        let mut detector = Self::new(config)?;
        detector.rng = Some(Mutex::new(StdRng::seed_from_u64(seed)));
        Ok(detector)
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn target_frequency(&self) -> f64 {
        self.config.detector.target_frequency_hz
    }

    /// Shortest signal [`analyze`](Self::analyze) accepts.
    pub fn min_samples(&self) -> usize {
        self.estimator.min_samples().max(MIN_PHASE_SAMPLES)
    }

    /// Analyze one sample using the detector's own random source.
    ///
    /// # Errors
    ///
    /// [`ProcessingError::InsufficientData`] if the signal is shorter than
    /// [`min_samples`](Self::min_samples); [`ProcessingError::InvalidArgument`]
    /// if the sample violates its invariants.
    pub fn analyze(&self, sample: &TelemetrySample) -> Result<PulseReport, ProcessingError> {
        let measurements = self.measure(sample)?;
        match &self.rng {
            Some(shared) => {
                // only the draw is serialized; measuring runs unlocked
                let mut rng = shared.lock().unwrap_or_else(PoisonError::into_inner);
                Ok(self.score(sample, &measurements, &mut *rng))
            }
            None => Ok(self.score(sample, &measurements, &mut StdRng::from_entropy())),
        }
    }

    /// Analyze one sample drawing the benefit perturbation from `rng`.
    pub fn analyze_with_rng<R: Rng>(
        &self,
        sample: &TelemetrySample,
        rng: &mut R,
    ) -> Result<PulseReport, ProcessingError> {
        let measurements = self.measure(sample)?;
        Ok(self.score(sample, &measurements, rng))
    }

    /// Analyze independent samples in parallel.
    ///
    /// Sample `i` owns `StdRng::seed_from_u64(seed + i)`, so results are
    /// reproducible regardless of scheduling. Output order matches input.
    pub fn analyze_batch(
        &self,
        samples: &[TelemetrySample],
        seed: u64,
    ) -> Vec<Result<PulseReport, ProcessingError>> {
        samples
            .par_iter()
            .enumerate()
            .map(|(i, sample)| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
                self.analyze_with_rng(sample, &mut rng)
            })
            .collect()
    }

    /// See [`super::synchronize`].
    pub fn synchronize(
        &self,
        report: &PulseReport,
        baseline_error_rate: f64,
    ) -> Result<SynchronizationOutcome, ProcessingError> {
        super::synchronize(report, baseline_error_rate)
    }

    fn measure(&self, sample: &TelemetrySample) -> Result<Measurements, ProcessingError> {
        sample.validate()?;
        if sample.len() < self.min_samples() {
            return Err(ProcessingError::InsufficientData {
                stage: "analysis",
                needed: self.min_samples(),
                available: sample.len(),
            });
        }

        let target = self.target_frequency();
        let signal = sample.signal.as_slice();
        let fs = sample.sample_rate;

        let (peak, (coherence, stability)) = rayon::join(
            || {
                self.estimator
                    .estimate(signal, fs)
                    .map(|spectrum| analyze_peak(&spectrum, target, &self.config.peak))
            },
            || {
                rayon::join(
                    || phase_coherence(signal),
                    || {
                        rhythm_stability(
                            signal,
                            fs,
                            target,
                            &self.estimator,
                            self.config.rhythm.segment_count,
                        )
                    },
                )
            },
        );

        Ok(Measurements {
            peak: peak?,
            phase_coherence: coherence?,
            rhythm_stability: stability,
        })
    }

    fn score<R: Rng>(&self, sample: &TelemetrySample, m: &Measurements, rng: &mut R) -> PulseReport {
        let target = self.target_frequency();
        let deviation = (m.peak.measured_frequency - target).abs();

        let gates = detection_gates(
            deviation,
            m.peak.snr,
            m.peak.peak_power,
            m.peak.power_p90,
            m.phase_coherence,
        );
        let detected = gates.all();

        let (health_score, status, components) = calculate_health_score(&HealthInputs {
            frequency_deviation: deviation,
            snr: m.peak.snr,
            phase_coherence: m.phase_coherence,
            rhythm_stability: m.rhythm_stability,
            mean_error_rate: sample.channel_mean(channels::ERROR_RATE),
            mean_fidelity: sample.channel_mean(channels::FIDELITY),
        });

        let benefit =
            estimate_benefit(detected, m.peak.snr, m.phase_coherence, health_score, rng);
        let interpretation = interpret(status, detected, target, benefit);

        debug!(
            detected = detected,
            measured_hz = m.peak.measured_frequency,
            deviation_hz = deviation,
            snr = m.peak.snr,
            coherence = m.phase_coherence,
            stability = m.rhythm_stability,
            health = health_score,
            status = %status,
            benefit = benefit,
            ?gates,
            "Pulse analysis complete"
        );

        PulseReport {
            detected,
            target_frequency: target,
            measured_frequency: m.peak.measured_frequency,
            frequency_deviation: deviation,
            peak_power: m.peak.peak_power,
            snr: m.peak.snr,
            phase_coherence: m.phase_coherence,
            rhythm_stability: m.rhythm_stability,
            health_score,
            status,
            benefit_estimate: benefit,
            interpretation,
            components,
            gates,
        }
    }
}
