//! Shared data structures for the oscillation health pipeline
//!
//! - TelemetrySample: caller-owned input (raw signal + auxiliary channels)
//! - PulseReport: per-sample verdict with sub-scores and detection gates
//! - SynchronizationOutcome: projected benefit derived from a report

mod report;
mod telemetry;

pub use report::*;
pub use telemetry::*;
