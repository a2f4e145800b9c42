//! Config Validation Tests
//!
//! Typo detection and range validation for `detector_config.toml`, exercised
//! independently from the analysis pipeline.

use pulse_health::config::validation::{
    known_config_keys, suggest_correction, validate_ranges, validate_unknown_keys,
};
use pulse_health::config::{ConfigError, DetectorConfig};
use pulse_health::{OscillationDetector, ProcessingError};

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_peak_section_warns_with_suggestion() {
    let toml_str = r#"
[peak]
noise_flor = 1e-9
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("noise_flor"));
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("peak.noise_floor"),
        "Should suggest the correct spelling"
    );
}

#[test]
fn typo_in_detector_section_warns() {
    let toml_str = r#"
[detector]
target_frequncy_hz = 0.5
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1);
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("detector.target_frequency_hz")
    );
}

#[test]
fn valid_config_produces_zero_warnings() {
    let toml_str = r#"
[detector]
target_frequency_hz = 0.67

[spectral]
max_segment_len = 1024
overlap_fraction = 0.5
resolution_hz = 0.002
min_samples = 8

[peak]
signal_half_band_hz = 0.1
noise_band_low_hz = 0.2
noise_band_high_hz = 20.0
noise_floor = 1e-10
peak_search_hz = 0.5

[rhythm]
segment_count = 10
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(
        warnings.is_empty(),
        "Valid config should produce 0 warnings, got: {:?}",
        warnings.iter().map(|w| &w.field).collect::<Vec<_>>()
    );
}

#[test]
fn unrelated_key_has_no_suggestion() {
    let warnings = validate_unknown_keys("completely_unrelated_section_name = 1\n");
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].suggestion.is_none());
}

#[test]
fn every_default_field_is_a_known_key() {
    let toml_str = DetectorConfig::default().to_toml().unwrap();
    assert!(validate_unknown_keys(&toml_str).is_empty());
    assert!(known_config_keys().contains("rhythm.segment_count"));
    assert_eq!(
        suggest_correction("spectral.min_sample", &known_config_keys()).as_deref(),
        Some("spectral.min_samples")
    );
}

// ============================================================================
// Range Validation
// ============================================================================

#[test]
fn default_config_passes_range_validation() {
    assert!(validate_ranges(&DetectorConfig::default()).is_empty());
}

#[test]
fn all_range_violations_reported_together() {
    let mut config = DetectorConfig::default();
    config.detector.target_frequency_hz = -1.0;
    config.spectral.overlap_fraction = 0.99;
    config.rhythm.segment_count = 1;

    let errors = validate_ranges(&config);
    assert_eq!(errors.len(), 3, "errors: {:?}", errors);
    assert!(errors.iter().any(|e| e.contains("target_frequency_hz")));
    assert!(errors.iter().any(|e| e.contains("overlap_fraction")));
    assert!(errors.iter().any(|e| e.contains("segment_count")));
}

#[test]
fn inverted_noise_band_rejected() {
    let toml_str = r#"
[peak]
noise_band_low_hz = 25.0
noise_band_high_hz = 20.0
"#;
    match DetectorConfig::from_toml_str(toml_str) {
        Err(ConfigError::Validation(errors)) => {
            assert!(errors.iter().any(|e| e.contains("noise_band")))
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn detector_rejects_invalid_config() {
    let mut config = DetectorConfig::default();
    config.peak.noise_floor = 0.0;
    assert!(matches!(
        OscillationDetector::new(config),
        Err(ProcessingError::InvalidArgument(_))
    ));
}

// ============================================================================
// File Round Trip
// ============================================================================

#[test]
fn config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("detector_config.toml");

    let mut config = DetectorConfig::default();
    config.detector.target_frequency_hz = 1.2;
    config.rhythm.segment_count = 6;
    config.save_to_file(&path).unwrap();

    let loaded = DetectorConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn partial_file_fills_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.toml");
    std::fs::write(&path, "[detector]\ntarget_frequency_hz = 0.5\n").unwrap();

    let loaded = DetectorConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded.detector.target_frequency_hz, 0.5);
    assert_eq!(loaded.spectral, DetectorConfig::default().spectral);
    assert_eq!(loaded.rhythm.segment_count, 10);
}

#[test]
fn malformed_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[detector\ntarget_frequency_hz = ").unwrap();

    match DetectorConfig::load_from_file(&path) {
        Err(ConfigError::Parse(p, _)) => assert_eq!(p, path),
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = DetectorConfig::load_from_file(&dir.path().join("nope.toml"));
    assert!(matches!(result, Err(ConfigError::Io(_, _))));
}
