// src/matching/weighting.rs
//
// Frequency-dependent emphasis of the correction gap

use serde::{Deserialize, Serialize};

use crate::error::{EqMatchError, Result};

/// Log-frequency Gaussian bump centred on the ear's most sensitive region.
/// Bands near `peak_hz` get `max_weight`, bands far away approach
/// `min_weight`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PsychoacousticCurve {
    pub peak_hz: f32,
    /// Gaussian sigma in octaves
    pub width_octaves: f32,
    pub min_weight: f32,
    pub max_weight: f32,
}

impl Default for PsychoacousticCurve {
    fn default() -> Self {
        Self {
            peak_hz: 2000.0,
            width_octaves: 2.5,
            min_weight: 0.5,
            max_weight: 1.5,
        }
    }
}

impl PsychoacousticCurve {
    pub fn weight(&self, frequency: f32) -> f32 {
        if frequency <= 0.0 {
            return self.min_weight;
        }
        let octaves = (frequency / self.peak_hz).log2() / self.width_octaves;
        let bump = (-0.5 * octaves * octaves).exp();
        self.min_weight + (self.max_weight - self.min_weight) * bump
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.peak_hz.is_finite() && self.peak_hz > 0.0) {
            return Err(EqMatchError::config(
                "psychoacoustic.peak_hz",
                self.peak_hz as f64,
                "a positive frequency",
            ));
        }
        if !(self.width_octaves.is_finite() && self.width_octaves > 0.0) {
            return Err(EqMatchError::config(
                "psychoacoustic.width_octaves",
                self.width_octaves as f64,
                "> 0 octaves",
            ));
        }
        if !(self.min_weight.is_finite()
            && self.max_weight.is_finite()
            && self.min_weight >= 0.0
            && self.min_weight <= self.max_weight)
        {
            return Err(EqMatchError::config(
                "psychoacoustic.min_weight",
                self.min_weight as f64,
                "0 <= min_weight <= max_weight",
            ));
        }
        Ok(())
    }
}
