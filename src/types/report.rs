//! Analysis outputs: PulseReport, HealthStatus, SynchronizationOutcome.

use serde::{Deserialize, Serialize};

// ============================================================================
// Health Status
// ============================================================================

/// Discrete health label, ordered worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    Critical,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Critical => "CRITICAL",
            HealthStatus::Poor => "POOR",
            HealthStatus::Fair => "FAIR",
            HealthStatus::Good => "GOOD",
            HealthStatus::Excellent => "EXCELLENT",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Score Breakdown
// ============================================================================

/// The six weighted sub-scores behind a health score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthComponents {
    pub frequency: f64,
    pub snr: f64,
    pub phase: f64,
    pub rhythm: f64,
    /// 0.5 when no error-rate channel was supplied
    pub error: f64,
    /// 0.5 when no fidelity channel was supplied
    pub fidelity: f64,
}

/// Outcome of each detection condition. Detection requires all four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionGates {
    /// |measured - target| below tolerance
    pub frequency_locked: bool,
    /// SNR above minimum
    pub snr_sufficient: bool,
    /// Peak power above the 90th percentile of the spectrum
    pub peak_prominent: bool,
    /// Phase coherence above minimum
    pub phase_coherent: bool,
}

impl DetectionGates {
    pub fn all(&self) -> bool {
        self.frequency_locked && self.snr_sufficient && self.peak_prominent && self.phase_coherent
    }
}

// ============================================================================
// Pulse Report
// ============================================================================

/// Final verdict for one telemetry sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PulseReport {
    /// All detection gates passed
    pub detected: bool,
    /// Frequency searched for (Hz)
    pub target_frequency: f64,
    /// Frequency of the located peak (Hz)
    pub measured_frequency: f64,
    /// |measured_frequency - target_frequency| (Hz)
    pub frequency_deviation: f64,
    /// Power at the located peak
    pub peak_power: f64,
    /// In-band / out-of-band power ratio
    pub snr: f64,
    /// (0, 1]
    pub phase_coherence: f64,
    /// [0, 1]
    pub rhythm_stability: f64,
    /// Weighted health score, nominally [0, 1]
    pub health_score: f64,
    pub status: HealthStatus,
    /// [0, 0.18]; exactly 0.0 when not detected
    pub benefit_estimate: f64,
    /// Rule-based synopsis of status and benefit
    pub interpretation: String,
    pub components: HealthComponents,
    pub gates: DetectionGates,
}

// ============================================================================
// Synchronization
// ============================================================================

/// Reason attached to every not-applicable synchronization.
pub const NOT_DETECTED_REASON: &str =
    "no stable oscillation detected near the target frequency";

/// Projected effect of synchronizing an external process to the rhythm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SynchronizationOutcome {
    /// The report did not detect a rhythm; nothing to synchronize to.
    NotApplicable { reason: String, benefit: f64 },
    /// Error rate before and after applying the benefit.
    Applied {
        original_error: f64,
        adjusted_error: f64,
        benefit: f64,
    },
}

impl SynchronizationOutcome {
    pub fn benefit(&self) -> f64 {
        match self {
            SynchronizationOutcome::NotApplicable { benefit, .. }
            | SynchronizationOutcome::Applied { benefit, .. } => *benefit,
        }
    }

    pub fn is_applicable(&self) -> bool {
        matches!(self, SynchronizationOutcome::Applied { .. })
    }
}
