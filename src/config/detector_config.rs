//! Detector Configuration - estimator and search parameters as TOML values
//!
//! Each struct implements `Default` with the reference parameters, so an
//! absent config file changes nothing. Scoring weights and detection gates
//! are fixed policy and live in [`super::defaults`] instead.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "PULSE_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "detector_config.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for an oscillation detector.
///
/// Load with `DetectorConfig::load()` which searches:
/// 1. `$PULSE_CONFIG` env var
/// 2. `./detector_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Target frequency
    #[serde(default)]
    pub detector: TargetConfig,

    /// Welch estimator parameters
    #[serde(default)]
    pub spectral: SpectralConfig,

    /// Peak search and SNR bands
    #[serde(default)]
    pub peak: PeakConfig,

    /// Rhythm stability segmentation
    #[serde(default)]
    pub rhythm: RhythmConfig,
}

impl DetectorConfig {
    /// Load configuration using the standard search order:
    /// 1. `$PULSE_CONFIG` environment variable
    /// 2. `./detector_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), target_hz = config.detector.target_frequency_hz, "Loaded detector config from PULSE_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from PULSE_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "PULSE_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(target_hz = config.detector.target_frequency_hz, "Loaded detector config from ./detector_config.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./detector_config.toml, using defaults");
                }
            }
        }

        info!("No detector_config.toml found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys are logged as warnings (with suggestions) and otherwise
    /// ignored; range violations are fatal.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Write to a TOML file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))
    }

    /// Check every range constraint and report all violations together.
    ///
    /// - Target frequency must be positive
    /// - Segment caps and minimum sample counts must be >= 2
    /// - Overlap must be in [0, 0.95]
    /// - Noise band must be ordered and non-negative
    /// - Rhythm segment count must be >= 2
    pub fn validate(&self) -> Result<(), ConfigError> {
        let errors = super::validation::validate_ranges(self);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Config loading / validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Target
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Frequency searched for a dominant oscillation (Hz)
    #[serde(default = "default_target_frequency")]
    pub target_frequency_hz: f64,
}

fn default_target_frequency() -> f64 { 0.67 }

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            target_frequency_hz: default_target_frequency(),
        }
    }
}

// ============================================================================
// Spectral Estimation
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralConfig {
    /// Upper bound on Welch segment length (samples)
    #[serde(default = "default_max_segment_len")]
    pub max_segment_len: usize,

    /// Fraction of each segment shared with the next
    #[serde(default = "default_overlap_fraction")]
    pub overlap_fraction: f64,

    /// Target bin spacing after zero padding (Hz)
    #[serde(default = "default_resolution_hz")]
    pub resolution_hz: f64,

    /// Fewest samples accepted for estimation
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
}

fn default_max_segment_len() -> usize { 1024 }
fn default_overlap_fraction() -> f64 { 0.5 }
fn default_resolution_hz() -> f64 { 0.002 }
fn default_min_samples() -> usize { 8 }

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            max_segment_len: default_max_segment_len(),
            overlap_fraction: default_overlap_fraction(),
            resolution_hz: default_resolution_hz(),
            min_samples: default_min_samples(),
        }
    }
}

// ============================================================================
// Peak / SNR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakConfig {
    /// Half-width of the signal band around the measured peak (Hz)
    #[serde(default = "default_signal_half_band")]
    pub signal_half_band_hz: f64,

    /// Reference noise band lower edge (Hz)
    #[serde(default = "default_noise_band_low")]
    pub noise_band_low_hz: f64,

    /// Reference noise band upper edge (Hz)
    #[serde(default = "default_noise_band_high")]
    pub noise_band_high_hz: f64,

    /// Noise power used when the noise band is empty
    #[serde(default = "default_noise_floor")]
    pub noise_floor: f64,

    /// Furthest the peak climb may move from the target (Hz)
    #[serde(default = "default_peak_search")]
    pub peak_search_hz: f64,
}

fn default_signal_half_band() -> f64 { 0.1 }
fn default_noise_band_low() -> f64 { 0.2 }
fn default_noise_band_high() -> f64 { 20.0 }
fn default_noise_floor() -> f64 { 1e-10 }
fn default_peak_search() -> f64 { 0.5 }

impl Default for PeakConfig {
    fn default() -> Self {
        Self {
            signal_half_band_hz: default_signal_half_band(),
            noise_band_low_hz: default_noise_band_low(),
            noise_band_high_hz: default_noise_band_high(),
            noise_floor: default_noise_floor(),
            peak_search_hz: default_peak_search(),
        }
    }
}

// ============================================================================
// Rhythm Stability
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RhythmConfig {
    /// Number of equal contiguous segments compared
    #[serde(default = "default_segment_count")]
    pub segment_count: usize,
}

fn default_segment_count() -> usize { 10 }

impl Default for RhythmConfig {
    fn default() -> Self {
        Self {
            segment_count: default_segment_count(),
        }
    }
}
