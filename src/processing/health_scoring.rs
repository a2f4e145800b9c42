//! Health Scoring Module
//!
//! Deterministic, rule-based scoring of an oscillation source. Six
//! sub-metrics are combined with fixed weights into a health score, the
//! score maps onto a [`HealthStatus`], and a conjunctive set of gates decides
//! detection. The benefit estimate is the only randomised figure: a uniform
//! perturbation drawn from a caller-supplied generator.

use rand::Rng;

use crate::config::defaults::*;
use crate::types::{DetectionGates, HealthComponents, HealthStatus};

/// Measurements feeding the health score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthInputs {
    /// |measured - target| (Hz)
    pub frequency_deviation: f64,
    pub snr: f64,
    pub phase_coherence: f64,
    pub rhythm_stability: f64,
    /// Mean of the auxiliary error-rate channel, if supplied
    pub mean_error_rate: Option<f64>,
    /// Mean of the auxiliary fidelity channel, if supplied
    pub mean_fidelity: Option<f64>,
}

/// Compute the six sub-scores.
///
/// # Scoring
///
/// - frequency: `1 - min(deviation / 0.01, 1)`
/// - snr: `min(SNR / 3, 1)`
/// - phase, rhythm: passed through
/// - error: `1 - mean_error / 0.02`, neutral 0.5 if absent
/// - fidelity: `(mean_fidelity - 0.95) / 0.05`, neutral 0.5 if absent
///
/// Error and fidelity are not clamped; malformed auxiliary data can push
/// them outside `[0, 1]`.
pub fn health_components(inputs: &HealthInputs) -> HealthComponents {
    HealthComponents {
        frequency: 1.0 - (inputs.frequency_deviation / FREQ_TOLERANCE_HZ).min(1.0),
        snr: (inputs.snr / SNR_REFERENCE).min(1.0),
        phase: inputs.phase_coherence,
        rhythm: inputs.rhythm_stability,
        error: inputs
            .mean_error_rate
            .map_or(NEUTRAL_SUBSCORE, |e| 1.0 - e / ERROR_REFERENCE),
        fidelity: inputs
            .mean_fidelity
            .map_or(NEUTRAL_SUBSCORE, |f| (f - FIDELITY_FLOOR) / FIDELITY_SPAN),
    }
}

/// Weighted average of the sub-scores (weights sum to 1.0).
pub fn weighted_score(c: &HealthComponents) -> f64 {
    c.frequency * WEIGHT_FREQUENCY
        + c.snr * WEIGHT_SNR
        + c.phase * WEIGHT_PHASE
        + c.rhythm * WEIGHT_RHYTHM
        + c.error * WEIGHT_ERROR
        + c.fidelity * WEIGHT_FIDELITY
}

/// Calculate the health score and its status label.
pub fn calculate_health_score(inputs: &HealthInputs) -> (f64, HealthStatus, HealthComponents) {
    let components = health_components(inputs);
    let score = weighted_score(&components);
    let status = status_from_score(score);

    tracing::debug!(
        frequency = components.frequency,
        snr = components.snr,
        phase = components.phase,
        rhythm = components.rhythm,
        error = components.error,
        fidelity = components.fidelity,
        score = score,
        status = %status,
        "Health score calculated"
    );

    (score, status, components)
}

/// Determine status label from health score.
///
/// Thresholds (strictly greater than):
/// - Excellent: > 0.8
/// - Good: > 0.6
/// - Fair: > 0.4
/// - Poor: > 0.2
/// - Critical: otherwise
pub fn status_from_score(score: f64) -> HealthStatus {
    if score > STATUS_EXCELLENT_ABOVE {
        HealthStatus::Excellent
    } else if score > STATUS_GOOD_ABOVE {
        HealthStatus::Good
    } else if score > STATUS_FAIR_ABOVE {
        HealthStatus::Fair
    } else if score > STATUS_POOR_ABOVE {
        HealthStatus::Poor
    } else {
        HealthStatus::Critical
    }
}

/// Evaluate the four detection conditions.
pub fn detection_gates(
    frequency_deviation: f64,
    snr: f64,
    peak_power: f64,
    power_p90: f64,
    phase_coherence: f64,
) -> DetectionGates {
    DetectionGates {
        frequency_locked: frequency_deviation < DETECT_MAX_DEVIATION_HZ,
        snr_sufficient: snr > DETECT_MIN_SNR,
        peak_prominent: peak_power > power_p90,
        phase_coherent: phase_coherence > DETECT_MIN_COHERENCE,
    }
}

/// Benefit of synchronizing to a detected rhythm, in `[0, 0.18]`.
///
/// `clip(min(SNR/3, 1)·0.12 + coherence·0.06 + health·0.05 + U(-0.02, 0.02), 0, 0.18)`.
/// Returns exactly 0.0 without touching `rng` when `detected` is false.
pub fn estimate_benefit<R: Rng>(
    detected: bool,
    snr: f64,
    phase_coherence: f64,
    health_score: f64,
    rng: &mut R,
) -> f64 {
    if !detected {
        return 0.0;
    }

    let base = (snr / SNR_REFERENCE).min(1.0) * BENEFIT_SNR_SHARE
        + phase_coherence * BENEFIT_PHASE_SHARE
        + health_score * BENEFIT_HEALTH_SHARE;
    let jitter = rng.gen_range(-BENEFIT_JITTER..=BENEFIT_JITTER);

    (base + jitter).clamp(0.0, BENEFIT_MAX)
}

/// Rule-based synopsis, reproducible from the numeric fields.
pub fn interpret(status: HealthStatus, detected: bool, target_frequency: f64, benefit: f64) -> String {
    if !detected {
        return format!(
            "{status}: no stable rhythm locked at {target_frequency:.2} Hz. \
             Synchronization is not recommended."
        );
    }

    let advice = if benefit > BENEFIT_TIER_STRONG {
        "Strong synchronization candidate; align actions to the rhythm."
    } else if benefit > BENEFIT_TIER_MODERATE {
        "Moderate benefit expected from synchronization."
    } else if benefit > BENEFIT_TIER_MODEST {
        "Modest benefit; synchronize when convenient."
    } else {
        "Marginal benefit; synchronization is optional."
    };

    format!(
        "{status}: rhythm locked at {target_frequency:.2} Hz with projected benefit {:.1}%. {advice}",
        benefit * 100.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ideal_inputs() -> HealthInputs {
        HealthInputs {
            frequency_deviation: 0.0,
            snr: 50.0,
            phase_coherence: 1.0,
            rhythm_stability: 1.0,
            mean_error_rate: Some(0.0),
            mean_fidelity: Some(1.0),
        }
    }

    #[test]
    fn test_ideal_inputs_score_one() {
        let (score, status, components) = calculate_health_score(&ideal_inputs());
        assert!((score - 1.0).abs() < 1e-12, "Score: {}", score);
        assert_eq!(status, HealthStatus::Excellent);
        assert_eq!(components.frequency, 1.0);
        assert_eq!(components.snr, 1.0);
    }

    #[test]
    fn test_missing_channels_are_neutral() {
        let inputs = HealthInputs {
            mean_error_rate: None,
            mean_fidelity: None,
            ..ideal_inputs()
        };
        let (score, status, components) = calculate_health_score(&inputs);
        assert_eq!(components.error, 0.5);
        assert_eq!(components.fidelity, 0.5);
        // 0.70 from the four core metrics + 0.15 from the neutral pair
        assert!((score - 0.85).abs() < 1e-12, "Score: {}", score);
        assert_eq!(status, HealthStatus::Excellent);
    }

    #[test]
    fn test_frequency_health_saturates() {
        let half = health_components(&HealthInputs {
            frequency_deviation: 0.005,
            ..ideal_inputs()
        });
        assert!((half.frequency - 0.5).abs() < 1e-12);

        let far = health_components(&HealthInputs {
            frequency_deviation: 0.17,
            ..ideal_inputs()
        });
        assert_eq!(far.frequency, 0.0);
    }

    #[test]
    fn test_auxiliary_scores_not_clamped() {
        let c = health_components(&HealthInputs {
            mean_error_rate: Some(0.05),
            mean_fidelity: Some(0.90),
            ..ideal_inputs()
        });
        assert!((c.error - (-1.5)).abs() < 1e-12);
        assert!((c.fidelity - (-1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_status_from_score() {
        assert_eq!(status_from_score(0.95), HealthStatus::Excellent);
        assert_eq!(status_from_score(0.8), HealthStatus::Good);
        assert_eq!(status_from_score(0.75), HealthStatus::Good);
        assert_eq!(status_from_score(0.5), HealthStatus::Fair);
        assert_eq!(status_from_score(0.4), HealthStatus::Poor);
        assert_eq!(status_from_score(0.25), HealthStatus::Poor);
        assert_eq!(status_from_score(0.2), HealthStatus::Critical);
        assert_eq!(status_from_score(-0.3), HealthStatus::Critical);
    }

    #[test]
    fn test_each_gate_can_fail_detection() {
        let pass = detection_gates(0.001, 10.0, 5.0, 1.0, 0.95);
        assert!(pass.all());

        assert!(!detection_gates(0.02, 10.0, 5.0, 1.0, 0.95).all());
        assert!(!detection_gates(0.001, 2.0, 5.0, 1.0, 0.95).all());
        assert!(!detection_gates(0.001, 10.0, 1.0, 1.0, 0.95).all());
        assert!(!detection_gates(0.001, 10.0, 5.0, 1.0, 0.7).all());
    }

    #[test]
    fn test_benefit_zero_when_not_detected() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(estimate_benefit(false, 100.0, 1.0, 1.0, &mut rng), 0.0);
    }

    #[test]
    fn test_benefit_bounded() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let b = estimate_benefit(true, 100.0, 1.0, 1.0, &mut rng);
            assert!((0.0..=BENEFIT_MAX).contains(&b), "benefit {}", b);
        }
        for _ in 0..1000 {
            let b = estimate_benefit(true, 0.0, 0.0, -1.0, &mut rng);
            assert!((0.0..=BENEFIT_MAX).contains(&b), "benefit {}", b);
        }
    }

    #[test]
    fn test_benefit_reproducible_with_seed() {
        let a = estimate_benefit(true, 2.5, 0.9, 0.7, &mut StdRng::seed_from_u64(9));
        let b = estimate_benefit(true, 2.5, 0.9, 0.7, &mut StdRng::seed_from_u64(9));
        assert_eq!(a.to_bits(), b.to_bits());
        // base = 0.1 + 0.054 + 0.035 = 0.189, jitter keeps it near the cap
        assert!(a >= 0.169 - 1e-12 && a <= BENEFIT_MAX);
    }

    #[test]
    fn test_interpretation_tiers() {
        let strong = interpret(HealthStatus::Excellent, true, 0.67, 0.16);
        assert!(strong.starts_with("EXCELLENT"));
        assert!(strong.contains("Strong"));
        assert!(strong.contains("16.0%"));

        assert!(interpret(HealthStatus::Good, true, 0.67, 0.12).contains("Moderate"));
        assert!(interpret(HealthStatus::Fair, true, 0.67, 0.06).contains("Modest"));
        assert!(interpret(HealthStatus::Poor, true, 0.67, 0.01).contains("Marginal"));

        let none = interpret(HealthStatus::Fair, false, 0.67, 0.0);
        assert!(none.contains("not recommended"));
        assert!(none.contains("0.67 Hz"));
    }

    #[test]
    fn test_interpretation_deterministic() {
        assert_eq!(
            interpret(HealthStatus::Good, true, 1.5, 0.11),
            interpret(HealthStatus::Good, true, 1.5, 0.11)
        );
    }
}
