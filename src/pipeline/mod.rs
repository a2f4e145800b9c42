//! Analysis Pipeline
//!
//! ```text
//! STAGE 1: Welch spectrum       ─┐
//! STAGE 2: Peak / SNR           ─┤ (1→2 chained)
//! STAGE 3: Phase coherence      ─┤ rayon::join
//! STAGE 4: Rhythm stability     ─┘
//! STAGE 5: Health score, gates, benefit (joins 2-4)
//! ```
//!
//! [`synchronize`] consumes a finished [`PulseReport`](crate::types::PulseReport).

mod detector;
mod synchronization;

pub use detector::OscillationDetector;
pub use synchronization::synchronize;
