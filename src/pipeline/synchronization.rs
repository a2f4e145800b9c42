//! Synchronization: apply a report's benefit estimate to a baseline error rate.

use tracing::debug;

use crate::processing::ProcessingError;
use crate::types::{PulseReport, SynchronizationOutcome, NOT_DETECTED_REASON};

/// Project the error rate of an external process synchronized to the rhythm.
///
/// Returns [`SynchronizationOutcome::NotApplicable`] with zero benefit when
/// the report detected nothing. Otherwise
/// `adjusted_error = baseline_error_rate * (1 - benefit_estimate)`.
///
/// # Errors
///
/// [`ProcessingError::InvalidArgument`] if `baseline_error_rate` is not a
/// finite value in `[0, 1]`. The baseline is checked before detection.
pub fn synchronize(
    report: &PulseReport,
    baseline_error_rate: f64,
) -> Result<SynchronizationOutcome, ProcessingError> {
    if !baseline_error_rate.is_finite() || !(0.0..=1.0).contains(&baseline_error_rate) {
        return Err(ProcessingError::InvalidArgument(format!(
            "baseline error rate must be in [0, 1], got {baseline_error_rate}"
        )));
    }

    if !report.detected {
        return Ok(SynchronizationOutcome::NotApplicable {
            reason: NOT_DETECTED_REASON.to_string(),
            benefit: 0.0,
        });
    }

    let benefit = report.benefit_estimate;
    let adjusted_error = baseline_error_rate * (1.0 - benefit);
    debug!(
        original = baseline_error_rate,
        adjusted = adjusted_error,
        benefit = benefit,
        "Synchronization applied"
    );

    Ok(SynchronizationOutcome::Applied {
        original_error: baseline_error_rate,
        adjusted_error,
        benefit,
    })
}
