//! Phase coherence from the analytic signal
//!
//! The analytic signal is built in the frequency domain: positive
//! frequencies doubled, negative frequencies zeroed, DC and Nyquist kept.
//! Coherence is `1 / (1 + std(Δφ))` over the unwrapped instantaneous phase.

use num_complex::Complex;
use rustfft::FftPlanner;
use statrs::statistics::Statistics;
use std::f64::consts::PI;

use super::ProcessingError;

/// Fewest samples that yield two phase increments.
pub const MIN_PHASE_SAMPLES: usize = 3;

/// Analytic signal `x + j·H{x}` of a real sequence.
pub fn analytic_signal(samples: &[f64]) -> Vec<Complex<f64>> {
    let n = samples.len();
    if n == 0 {
        return Vec::new();
    }

    let mut planner = FftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(n);
    let inverse = planner.plan_fft_inverse(n);

    let mut buffer: Vec<Complex<f64>> = samples.iter().map(|&x| Complex::new(x, 0.0)).collect();
    forward.process(&mut buffer);

    // Spectral mask: keep DC (and Nyquist for even n), double positives, drop negatives
    let half = n / 2;
    for (k, c) in buffer.iter_mut().enumerate() {
        let gain = if k == 0 || (n % 2 == 0 && k == half) {
            1.0
        } else if k < (n + 1) / 2 {
            2.0
        } else {
            0.0
        };
        *c *= gain;
    }

    inverse.process(&mut buffer);

    // rustfft leaves the inverse unnormalised
    let norm = 1.0 / n as f64;
    buffer.iter_mut().for_each(|c| *c *= norm);
    buffer
}

/// Unwrap a wrapped phase sequence so consecutive steps lie in (-π, π].
pub fn unwrap_phase(wrapped: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(wrapped.len());
    let mut offset = 0.0;
    let mut prev: Option<f64> = None;

    for &phase in wrapped {
        if let Some(p) = prev {
            let delta = phase - p;
            let folded = fold_phase(delta);
            offset += folded - delta;
        }
        out.push(phase + offset);
        prev = Some(phase);
    }
    out
}

/// Fold an angle into (-π, π].
fn fold_phase(delta: f64) -> f64 {
    let mut d = (delta + PI).rem_euclid(2.0 * PI) - PI;
    if d <= -PI {
        d += 2.0 * PI;
    }
    d
}

/// Phase coherence of `samples` in (0, 1].
///
/// A constant (or all-zero) signal has a fixed phase, so its increments are
/// all zero and coherence is 1.0. Coherence alone does not indicate a
/// rhythm; detection also requires SNR and a spectral peak.
///
/// # Errors
///
/// [`ProcessingError::InsufficientData`] for fewer than three samples.
pub fn phase_coherence(samples: &[f64]) -> Result<f64, ProcessingError> {
    if samples.len() < MIN_PHASE_SAMPLES {
        return Err(ProcessingError::InsufficientData {
            stage: "phase estimation",
            needed: MIN_PHASE_SAMPLES,
            available: samples.len(),
        });
    }

    // signed zeros would make arg() jump between 0 and ±π
    let wrapped: Vec<f64> = analytic_signal(samples)
        .iter()
        .map(|c| if c.norm_sqr() > 0.0 { c.arg() } else { 0.0 })
        .collect();
    let phase = unwrap_phase(&wrapped);
    let increments: Vec<f64> = phase.windows(2).map(|w| w[1] - w[0]).collect();

    let jitter = increments.iter().population_std_dev();
    let jitter = if jitter.is_finite() { jitter } else { 0.0 };
    let coherence = 1.0 / (1.0 + jitter);

    tracing::debug!(
        samples = samples.len(),
        phase_jitter = jitter,
        coherence = coherence,
        "Phase coherence estimated"
    );

    Ok(coherence)
}
