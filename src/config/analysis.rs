// src/config/analysis.rs
//
// Spectral analysis settings shared by every profile an engine produces.

use serde::{Deserialize, Serialize};

use crate::core::dsp::WindowType;
use crate::error::{EqMatchError, Result};

/// Canonical analysis rate the decoder resamples to
pub const CANONICAL_SAMPLE_RATE: u32 = 48_000;

/// Settings for the frame extractor, band aggregator and profile builder.
///
/// Two profiles are only comparable band-for-band when they were produced
/// with the same `AnalysisConfig`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// FFT frame length in samples (power of two)
    pub frame_size: usize,
    /// Hop between frame starts in samples
    pub hop_size: usize,
    /// Analysis window
    pub window: WindowType,
    /// Bands per octave (3 = third-octave layout)
    pub bands_per_octave: u32,
    /// Lowest band centre in Hz (snapped to the base-2 grid around 1 kHz)
    pub min_frequency: f32,
    /// Highest band centre in Hz (snapped to the base-2 grid around 1 kHz)
    pub max_frequency: f32,
    /// Per-bin power treated as the noise floor, in dB
    pub noise_floor_db: f32,
    /// SNR above the floor at which the level factor reaches 1
    pub snr_range_db: f32,
    /// Coefficient of variation at which the stability factor halves
    pub stability_scale: f32,
    /// Minimum reported band gain
    pub min_gain_db: f32,
    /// Floor for absolute loudness values
    pub loudness_floor_db: f32,
    /// Fraction of total energy below the spectral rolloff
    pub rolloff_fraction: f32,
    /// Upper percentile of the frame loudness distribution
    pub dynamics_upper_percentile: f32,
    /// Lower percentile of the frame loudness distribution
    pub dynamics_lower_percentile: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_size: 4096,
            hop_size: 2048,
            window: WindowType::BlackmanHarris,
            bands_per_octave: 3,
            min_frequency: 20.0,
            max_frequency: 20_000.0,
            noise_floor_db: -100.0,
            snr_range_db: 30.0,
            stability_scale: 1.0,
            min_gain_db: -60.0,
            loudness_floor_db: -120.0,
            rolloff_fraction: 0.85,
            dynamics_upper_percentile: 95.0,
            dynamics_lower_percentile: 10.0,
        }
    }
}

impl AnalysisConfig {
    /// Reject settings that cannot produce a meaningful layout
    pub fn validate(&self) -> Result<()> {
        if self.frame_size < 16 || !self.frame_size.is_power_of_two() {
            return Err(EqMatchError::config(
                "frame_size",
                self.frame_size as f64,
                "a power of two >= 16",
            ));
        }
        if self.hop_size == 0 || self.hop_size > self.frame_size {
            return Err(EqMatchError::config(
                "hop_size",
                self.hop_size as f64,
                "1..=frame_size",
            ));
        }
        if self.bands_per_octave == 0 || self.bands_per_octave > 24 {
            return Err(EqMatchError::config(
                "bands_per_octave",
                self.bands_per_octave as f64,
                "1..=24",
            ));
        }
        if !(self.min_frequency.is_finite() && self.min_frequency > 0.0) {
            return Err(EqMatchError::config(
                "min_frequency",
                self.min_frequency as f64,
                "a positive frequency",
            ));
        }
        if !(self.max_frequency.is_finite() && self.max_frequency > self.min_frequency) {
            return Err(EqMatchError::config(
                "max_frequency",
                self.max_frequency as f64,
                "greater than min_frequency",
            ));
        }
        if !(self.snr_range_db.is_finite() && self.snr_range_db > 0.0) {
            return Err(EqMatchError::config(
                "snr_range_db",
                self.snr_range_db as f64,
                "> 0 dB",
            ));
        }
        if !(self.stability_scale.is_finite() && self.stability_scale > 0.0) {
            return Err(EqMatchError::config(
                "stability_scale",
                self.stability_scale as f64,
                "> 0",
            ));
        }
        if !(self.min_gain_db.is_finite() && self.min_gain_db < 0.0) {
            return Err(EqMatchError::config(
                "min_gain_db",
                self.min_gain_db as f64,
                "a finite negative dB value",
            ));
        }
        if !self.noise_floor_db.is_finite() || !self.loudness_floor_db.is_finite() {
            return Err(EqMatchError::config(
                "noise_floor_db",
                self.noise_floor_db as f64,
                "finite floors",
            ));
        }
        if !(self.rolloff_fraction > 0.0 && self.rolloff_fraction <= 1.0) {
            return Err(EqMatchError::config(
                "rolloff_fraction",
                self.rolloff_fraction as f64,
                "0.0 < x <= 1.0",
            ));
        }
        let (lo, hi) = (self.dynamics_lower_percentile, self.dynamics_upper_percentile);
        if !(0.0..=100.0).contains(&lo) || !(0.0..=100.0).contains(&hi) || lo >= hi {
            return Err(EqMatchError::config(
                "dynamics_upper_percentile",
                hi as f64,
                "0 <= lower < upper <= 100",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_frame_size() {
        let config = AnalysisConfig {
            frame_size: 3000,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EqMatchError::InvalidConfig { field: "frame_size", .. })
        ));
    }

    #[test]
    fn test_rejects_inverted_percentiles() {
        let config = AnalysisConfig {
            dynamics_upper_percentile: 5.0,
            dynamics_lower_percentile: 50.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
