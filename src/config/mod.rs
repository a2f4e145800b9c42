//! Detector Configuration Module
//!
//! Estimator and search parameters loaded from TOML, plus the fixed scoring
//! policy in [`defaults`].
//!
//! ## Loading Order
//!
//! 1. `PULSE_CONFIG` environment variable (path to TOML file)
//! 2. `detector_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! ```ignore
//! let config = DetectorConfig::load();
//! let detector = OscillationDetector::new(config)?;
//! ```

mod detector_config;
pub mod defaults;
pub mod validation;

pub use detector_config::*;
