//! Rhythm stability: consistency of target-band power across time segments.

use rayon::prelude::*;
use statrs::statistics::Statistics;

use super::WelchEstimator;

/// Stability reported when the signal is too short to partition.
pub const NEUTRAL_STABILITY: f64 = 0.5;

/// Stability of the target-frequency rhythm in `[0, 1]`.
///
/// Splits `samples` into `segment_count` equal contiguous segments (any
/// trailing remainder is dropped), estimates each segment's spectrum and
/// reads the power at the bin nearest `target`. Returns
/// `clip(1 - std/mean, 0, 1)` over those powers, [`NEUTRAL_STABILITY`] when
/// fewer than two segments can be estimated, and 0.0 when no segment carries
/// any power at the target.
pub fn rhythm_stability(
    samples: &[f64],
    sample_rate: f64,
    target: f64,
    estimator: &WelchEstimator,
    segment_count: usize,
) -> f64 {
    if segment_count < 2 {
        return NEUTRAL_STABILITY;
    }

    let segment_len = samples.len() / segment_count;
    if segment_len < estimator.min_samples() {
        tracing::debug!(
            samples = samples.len(),
            segment_len = segment_len,
            "Signal too short to partition, using neutral rhythm stability"
        );
        return NEUTRAL_STABILITY;
    }

    let powers: Vec<f64> = samples
        .par_chunks_exact(segment_len)
        .take(segment_count)
        .filter_map(|segment| estimator.estimate(segment, sample_rate).ok())
        .map(|spectrum| spectrum.power_at(target))
        .collect();

    if powers.len() < 2 {
        return NEUTRAL_STABILITY;
    }

    let mean = powers.iter().mean();
    if !(mean > 0.0) {
        tracing::debug!("No power at target in any segment");
        return 0.0;
    }
    let std = powers.iter().population_std_dev();
    let stability = (1.0 - std / mean).clamp(0.0, 1.0);

    tracing::debug!(
        segments = powers.len(),
        mean_power = mean,
        std_power = std,
        stability = stability,
        "Rhythm stability estimated"
    );

    stability
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(freq: f64, sample_rate: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_steady_rhythm_is_stable() {
        let samples = sine(2.0, 50.0, 5000);
        let stability = rhythm_stability(&samples, 50.0, 2.0, &WelchEstimator::default(), 10);
        assert!(stability > 0.95, "stability = {}", stability);
    }

    #[test]
    fn test_intermittent_rhythm_is_unstable() {
        // Rhythm present only in the first half
        let mut samples = sine(2.0, 50.0, 5000);
        samples[2500..].iter_mut().for_each(|x| *x *= 0.05);

        let stability = rhythm_stability(&samples, 50.0, 2.0, &WelchEstimator::default(), 10);
        assert!(stability < 0.2, "stability = {}", stability);
    }

    #[test]
    fn test_short_signal_is_neutral() {
        let samples = sine(2.0, 50.0, 40);
        let stability = rhythm_stability(&samples, 50.0, 2.0, &WelchEstimator::default(), 10);
        assert_eq!(stability, NEUTRAL_STABILITY);
    }

    #[test]
    fn test_silent_signal_has_zero_stability() {
        let samples = vec![0.0; 1000];
        let stability = rhythm_stability(&samples, 50.0, 2.0, &WelchEstimator::default(), 10);
        assert_eq!(stability, 0.0);
    }
}
