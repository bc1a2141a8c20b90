// src/config/presets.rs
//
// Match configuration, tunable policy constants, and named presets

use serde::{Deserialize, Serialize};

use crate::error::{EqMatchError, Result};
use crate::matching::{DynamicsPolicy, PsychoacousticCurve};

/// Policy constants behind the matching algorithm.
///
/// None of these are derivable from the profiles themselves; they are kept
/// here as explicit defaults so callers and tests can pin them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchTuning {
    /// Frequency weighting applied to the gap when psychoacoustic mode is on
    pub psychoacoustic: PsychoacousticCurve,
    /// Attenuation applied when the input is more dynamic than the reference
    pub dynamics: DynamicsPolicy,
    /// Gaussian sigma (in bands) reached at `smoothing_factor = 1.0`
    pub max_smoothing_sigma_bands: f32,
    /// Output confidence below which a band is flagged
    pub low_confidence_threshold: f32,
    /// Dynamic range difference that triggers a mismatch warning
    pub dynamics_mismatch_db: f32,
    /// Fraction of clamped bands above which the match is flagged as unnatural
    pub unnatural_clamp_fraction: f32,
    /// Adjacent-band slope that triggers a steep slope warning
    pub max_slope_db_per_octave: f32,
    /// Mean absolute correction per band that triggers a high-total warning
    pub total_correction_per_band_db: f32,
    /// Residual RMS (dB) at which the quality score drops to 0.5
    pub quality_scale_db: f32,
    /// Band gain standing in for "no energy"; matches the analysis floor
    pub gain_floor_db: f32,
}

impl Default for MatchTuning {
    fn default() -> Self {
        Self {
            psychoacoustic: PsychoacousticCurve::default(),
            dynamics: DynamicsPolicy::default(),
            max_smoothing_sigma_bands: 3.0,
            low_confidence_threshold: 0.3,
            dynamics_mismatch_db: 6.0,
            unnatural_clamp_fraction: 0.5,
            max_slope_db_per_octave: 12.0,
            total_correction_per_band_db: 3.0,
            quality_scale_db: 3.0,
            gain_floor_db: -60.0,
        }
    }
}

impl MatchTuning {
    pub fn validate(&self) -> Result<()> {
        self.psychoacoustic.validate()?;
        self.dynamics.validate()?;
        let positive = [
            ("max_smoothing_sigma_bands", self.max_smoothing_sigma_bands),
            ("dynamics_mismatch_db", self.dynamics_mismatch_db),
            ("max_slope_db_per_octave", self.max_slope_db_per_octave),
            ("total_correction_per_band_db", self.total_correction_per_band_db),
            ("quality_scale_db", self.quality_scale_db),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(EqMatchError::config(field, value as f64, "> 0"));
            }
        }
        if !(self.gain_floor_db.is_finite() && self.gain_floor_db < 0.0) {
            return Err(EqMatchError::config(
                "gain_floor_db",
                self.gain_floor_db as f64,
                "a finite negative dB value",
            ));
        }
        let unit = [
            ("low_confidence_threshold", self.low_confidence_threshold),
            ("unnatural_clamp_fraction", self.unnatural_clamp_fraction),
        ];
        for (field, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(EqMatchError::config(field, value as f64, "0.0..=1.0"));
            }
        }
        Ok(())
    }
}

/// User-facing match settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Fraction of the raw gap to correct (0.0 - 1.0)
    pub intensity: f32,
    /// Symmetric clamp on every band, in dB
    pub max_correction: f32,
    /// Cross-band blending width (0.0 - 1.0)
    pub smoothing_factor: f32,
    /// Frequency-dependent weighting of the gap
    pub use_psychoacoustic: bool,
    /// Back off correction on inputs more dynamic than the reference
    pub preserve_dynamics: bool,
    /// Policy constants
    pub tuning: MatchTuning,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self::from_preset(MatchPreset::Balanced)
    }
}

impl MatchConfig {
    /// Create config from preset
    pub fn from_preset(preset: MatchPreset) -> Self {
        let (intensity, max_correction, smoothing_factor, use_psychoacoustic, preserve_dynamics) =
            match preset {
                MatchPreset::Gentle => (0.5, 4.0, 0.7, true, true),
                MatchPreset::Balanced => (0.7, 6.0, 0.5, true, true),
                MatchPreset::Full => (1.0, 12.0, 0.3, true, false),
                MatchPreset::Surgical => (1.0, 12.0, 0.0, false, false),
            };
        Self {
            intensity,
            max_correction,
            smoothing_factor,
            use_psychoacoustic,
            preserve_dynamics,
            tuning: MatchTuning::default(),
        }
    }

    /// Fail fast on out-of-range settings
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.intensity) {
            return Err(EqMatchError::config(
                "intensity",
                self.intensity as f64,
                "0.0..=1.0",
            ));
        }
        if !(self.max_correction.is_finite() && self.max_correction > 0.0) {
            return Err(EqMatchError::config(
                "max_correction",
                self.max_correction as f64,
                "a finite value > 0 dB",
            ));
        }
        if !(0.0..=1.0).contains(&self.smoothing_factor) {
            return Err(EqMatchError::config(
                "smoothing_factor",
                self.smoothing_factor as f64,
                "0.0..=1.0",
            ));
        }
        self.tuning.validate()
    }

    /// Load a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| EqMatchError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Named starting points for common use cases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPreset {
    /// Half-strength, heavily smoothed; safe on finished mixes
    Gentle,
    /// General-purpose defaults
    Balanced,
    /// Full-strength match with light smoothing
    Full,
    /// Exact clamped gap, no weighting or smoothing
    Surgical,
}

impl MatchPreset {
    pub fn all() -> Vec<Self> {
        vec![Self::Gentle, Self::Balanced, Self::Full, Self::Surgical]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Gentle => "gentle",
            Self::Balanced => "balanced",
            Self::Full => "full",
            Self::Surgical => "surgical",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Gentle => "Subtle tonal nudge, wide smoothing, max 4 dB",
            Self::Balanced => "General-purpose match, max 6 dB",
            Self::Full => "Full-strength match, max 12 dB",
            Self::Surgical => "Raw clamped difference, no weighting or smoothing",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name.trim()))
    }
}

/// Builder for custom match configs
pub struct MatchConfigBuilder {
    config: MatchConfig,
}

impl MatchConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: MatchConfig::default(),
        }
    }

    pub fn from_preset(preset: MatchPreset) -> Self {
        Self {
            config: MatchConfig::from_preset(preset),
        }
    }

    pub fn from_config(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn intensity(mut self, intensity: f32) -> Self {
        self.config.intensity = intensity;
        self
    }

    pub fn max_correction(mut self, db: f32) -> Self {
        self.config.max_correction = db;
        self
    }

    pub fn smoothing(mut self, factor: f32) -> Self {
        self.config.smoothing_factor = factor;
        self
    }

    pub fn psychoacoustic(mut self, enabled: bool) -> Self {
        self.config.use_psychoacoustic = enabled;
        self
    }

    pub fn preserve_dynamics(mut self, enabled: bool) -> Self {
        self.config.preserve_dynamics = enabled;
        self
    }

    pub fn tuning(mut self, tuning: MatchTuning) -> Self {
        self.config.tuning = tuning;
        self
    }

    /// Validate and return the config
    pub fn build(self) -> Result<MatchConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for MatchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
