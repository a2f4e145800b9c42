//! Peak location and signal-to-noise estimation around the target frequency.

use serde::{Deserialize, Serialize};

use super::SpectrumEstimate;
use crate::config::PeakConfig;

/// Peak and SNR figures read from one spectrum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakAnalysis {
    /// Frequency of the located peak (Hz)
    pub measured_frequency: f64,
    /// Power at the located peak
    pub peak_power: f64,
    /// Mean power within the signal band around the peak
    pub signal_power: f64,
    /// Mean power in the reference noise band (floored)
    pub noise_power: f64,
    /// signal_power / noise_power
    pub snr: f64,
    /// 90th percentile of all spectrum power values
    pub power_p90: f64,
}

/// Locate the peak nearest `target` and compute in-band vs out-of-band SNR.
///
/// The search starts at the bin closest to the target and climbs to the
/// local maximum of the lobe containing it, travelling at most
/// `peak_search_hz` away from the target. Noise power is the mean over the
/// reference band excluding the signal band; an empty noise band falls back
/// to `noise_floor`, so SNR stays finite.
pub fn analyze_peak(spectrum: &SpectrumEstimate, target: f64, config: &PeakConfig) -> PeakAnalysis {
    let located = spectrum.nearest_bin(target).and_then(|start| {
        let i = climb_to_peak(spectrum, start, target, config.peak_search_hz);
        Some((*spectrum.frequencies.get(i)?, *spectrum.powers.get(i)?))
    });
    let Some((measured_frequency, peak_power)) = located else {
        return PeakAnalysis {
            measured_frequency: 0.0,
            peak_power: 0.0,
            signal_power: 0.0,
            noise_power: config.noise_floor,
            snr: 0.0,
            power_p90: 0.0,
        };
    };

    let half_band = config.signal_half_band_hz;
    let in_signal_band = |f: f64| (f - measured_frequency).abs() <= half_band;

    let signal_power = spectrum.band_mean(in_signal_band).unwrap_or(peak_power);

    let noise_power = spectrum
        .band_mean(|f| {
            f >= config.noise_band_low_hz && f <= config.noise_band_high_hz && !in_signal_band(f)
        })
        .unwrap_or(config.noise_floor)
        .max(config.noise_floor);

    let snr = signal_power / noise_power;
    let power_p90 = spectrum.percentile(90);

    tracing::debug!(
        target_hz = target,
        measured_hz = measured_frequency,
        peak_power = peak_power,
        signal_power = signal_power,
        noise_power = noise_power,
        snr = snr,
        "Peak located"
    );

    PeakAnalysis {
        measured_frequency,
        peak_power,
        signal_power,
        noise_power,
        snr,
        power_p90,
    }
}

/// Hill-climb from `start` to the nearest local maximum.
///
/// Moves only to strictly higher neighbours; when both neighbours are higher
/// the larger wins (lower frequency on ties). Stops before leaving the
/// `max_distance` window around `target`.
fn climb_to_peak(spectrum: &SpectrumEstimate, start: usize, target: f64, max_distance: f64) -> usize {
    let bin = |i: usize| -> Option<(usize, f64)> {
        let f = *spectrum.frequencies.get(i)?;
        let p = *spectrum.powers.get(i)?;
        ((f - target).abs() <= max_distance).then_some((i, p))
    };
    let power = |i: usize| spectrum.powers.get(i).copied().unwrap_or(f64::NEG_INFINITY);

    let mut idx = start;
    loop {
        let here = power(idx);
        let left = idx.checked_sub(1).and_then(bin);
        let right = bin(idx + 1);

        let next = match (left, right) {
            (Some(l), Some(r)) if l.1 > here && r.1 > here => Some(if r.1 > l.1 { r } else { l }),
            (Some(l), _) if l.1 > here => Some(l),
            (_, Some(r)) if r.1 > here => Some(r),
            _ => None,
        };

        match next {
            Some((i, _)) => idx = i,
            None => return idx,
        }
    }
}
