//! Config validation: unknown-key detection with Levenshtein suggestions
//! and range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

use super::DetectorConfig;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for DetectorConfig.
///
/// Any new field added to DetectorConfig must be added here too.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [detector]
        "detector",
        "detector.target_frequency_hz",
        // [spectral]
        "spectral",
        "spectral.max_segment_len",
        "spectral.overlap_fraction",
        "spectral.resolution_hz",
        "spectral.min_samples",
        // [peak]
        "peak",
        "peak.signal_half_band_hz",
        "peak.noise_band_low_hz",
        "peak.noise_band_high_hz",
        "peak.noise_floor",
        "peak.peak_search_hz",
        // [rhythm]
        "rhythm",
        "rhythm.segment_count",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Closest known key within edit distance 3, if any.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (k, levenshtein(unknown, k)))
        .filter(|&(_, dist)| dist <= 3)
        // sort key includes the name so HashSet order never decides a tie
        .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)))
        .map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys, it only warns.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| {
            let suggestion = suggest_correction(&key, &known);
            let message = format!("Unknown config key '{key}'");
            ValidationWarning {
                field: key,
                message,
                suggestion,
            }
        })
        .collect()
}

// ============================================================================
// Range Validation
// ============================================================================

/// Validate ranges on a parsed DetectorConfig.
///
/// Returns one message per violated constraint.
pub fn validate_ranges(config: &DetectorConfig) -> Vec<String> {
    let mut errors = Vec::new();

    let target = config.detector.target_frequency_hz;
    if !(target.is_finite() && target > 0.0) {
        errors.push(format!(
            "detector.target_frequency_hz = {target} must be a positive frequency"
        ));
    }

    let s = &config.spectral;
    if s.max_segment_len < 2 {
        errors.push(format!(
            "spectral.max_segment_len = {} must be >= 2",
            s.max_segment_len
        ));
    }
    if s.min_samples < 2 {
        errors.push(format!("spectral.min_samples = {} must be >= 2", s.min_samples));
    }
    if !(0.0..=0.95).contains(&s.overlap_fraction) {
        errors.push(format!(
            "spectral.overlap_fraction = {:.3} is outside [0, 0.95]",
            s.overlap_fraction
        ));
    }
    if !(s.resolution_hz.is_finite() && s.resolution_hz > 0.0) {
        errors.push(format!(
            "spectral.resolution_hz = {} must be > 0",
            s.resolution_hz
        ));
    }

    let p = &config.peak;
    if !(p.signal_half_band_hz > 0.0) {
        errors.push(format!(
            "peak.signal_half_band_hz = {} must be > 0",
            p.signal_half_band_hz
        ));
    }
    if p.noise_band_low_hz < 0.0 || p.noise_band_low_hz >= p.noise_band_high_hz {
        errors.push(format!(
            "peak.noise_band ({}..{}) must satisfy 0 <= low < high",
            p.noise_band_low_hz, p.noise_band_high_hz
        ));
    }
    if !(p.noise_floor > 0.0) {
        errors.push(format!("peak.noise_floor = {} must be > 0 (used as divisor)", p.noise_floor));
    }
    if p.peak_search_hz < 0.0 {
        errors.push(format!(
            "peak.peak_search_hz = {} cannot be negative",
            p.peak_search_hz
        ));
    }

    if config.rhythm.segment_count < 2 {
        errors.push(format!(
            "rhythm.segment_count = {} must be >= 2",
            config.rhythm.segment_count
        ));
    }

    errors
}

// ============================================================================
// Tests
// ============================================================================
