//! Fixed scoring policy constants.
//!
//! These are reproduced as given and are not operator-tunable. Grouped by
//! the stage that consumes them.

// ============================================================================
// Health Score Sub-Metrics
// ============================================================================

/// Frequency deviation at which frequency health reaches zero (Hz).
pub const FREQ_TOLERANCE_HZ: f64 = 0.01;

/// SNR at which SNR health saturates at 1.0.
pub const SNR_REFERENCE: f64 = 3.0;

/// Mean auxiliary error rate at which error health reaches zero.
pub const ERROR_REFERENCE: f64 = 0.02;

/// Mean auxiliary fidelity at which fidelity health is zero.
pub const FIDELITY_FLOOR: f64 = 0.95;

/// Fidelity range mapped onto `[0, 1]` above the floor.
pub const FIDELITY_SPAN: f64 = 0.05;

/// Sub-score substituted for an absent auxiliary channel.
pub const NEUTRAL_SUBSCORE: f64 = 0.5;

// ============================================================================
// Health Score Weights (sum to 1.0)
// ============================================================================

pub const WEIGHT_FREQUENCY: f64 = 0.20;
pub const WEIGHT_SNR: f64 = 0.20;
pub const WEIGHT_PHASE: f64 = 0.20;
pub const WEIGHT_RHYTHM: f64 = 0.10;
pub const WEIGHT_ERROR: f64 = 0.15;
pub const WEIGHT_FIDELITY: f64 = 0.15;

// ============================================================================
// Status Thresholds (strictly greater than)
// ============================================================================

pub const STATUS_EXCELLENT_ABOVE: f64 = 0.8;
pub const STATUS_GOOD_ABOVE: f64 = 0.6;
pub const STATUS_FAIR_ABOVE: f64 = 0.4;
pub const STATUS_POOR_ABOVE: f64 = 0.2;

// ============================================================================
// Detection Gates (all must hold)
// ============================================================================

/// Maximum |measured - target| for a lock (Hz, exclusive).
pub const DETECT_MAX_DEVIATION_HZ: f64 = 0.01;

/// Minimum SNR (exclusive).
pub const DETECT_MIN_SNR: f64 = 2.0;

/// Percentile of all spectrum powers the peak must exceed.
pub const DETECT_PEAK_PERCENTILE: usize = 90;

/// Minimum phase coherence (exclusive).
pub const DETECT_MIN_COHERENCE: f64 = 0.7;

// ============================================================================
// Benefit Estimate
// ============================================================================

/// Share driven by saturated SNR, `min(SNR / 3, 1)`.
pub const BENEFIT_SNR_SHARE: f64 = 0.12;

/// Share driven by phase coherence.
pub const BENEFIT_PHASE_SHARE: f64 = 0.06;

/// Share driven by the health score.
pub const BENEFIT_HEALTH_SHARE: f64 = 0.05;

/// Half-width of the uniform perturbation.
pub const BENEFIT_JITTER: f64 = 0.02;

/// Upper clip of the benefit estimate.
pub const BENEFIT_MAX: f64 = 0.18;

// ============================================================================
// Interpretation Tiers (strictly greater than)
// ============================================================================

pub const BENEFIT_TIER_STRONG: f64 = 0.15;
pub const BENEFIT_TIER_MODERATE: f64 = 0.10;
pub const BENEFIT_TIER_MODEST: f64 = 0.05;
