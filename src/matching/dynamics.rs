// src/matching/dynamics.rs
//
// Dynamic-range-aware attenuation of the correction

use serde::{Deserialize, Serialize};

use crate::error::{EqMatchError, Result};

/// How much to back off the correction when the input is already more
/// dynamic than the reference.
///
/// `excess = input_dr - reference_dr - threshold_db`. Above zero the
/// correction is scaled by `1 - max_attenuation * min(excess / full_scale_db, 1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicsPolicy {
    pub threshold_db: f32,
    pub full_scale_db: f32,
    pub max_attenuation: f32,
}

impl Default for DynamicsPolicy {
    fn default() -> Self {
        Self {
            threshold_db: 3.0,
            full_scale_db: 12.0,
            max_attenuation: 0.3,
        }
    }
}

impl DynamicsPolicy {
    /// Scale factor in `[1 - max_attenuation, 1]`
    pub fn factor(&self, reference_dr: f32, input_dr: f32) -> f32 {
        let excess = input_dr - reference_dr - self.threshold_db;
        if !(excess > 0.0) {
            return 1.0;
        }
        let attenuation = self.max_attenuation * (excess / self.full_scale_db).min(1.0);
        1.0 - attenuation
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.threshold_db.is_finite() && self.threshold_db >= 0.0) {
            return Err(EqMatchError::config(
                "dynamics.threshold_db",
                self.threshold_db as f64,
                ">= 0 dB",
            ));
        }
        if !(self.full_scale_db.is_finite() && self.full_scale_db > 0.0) {
            return Err(EqMatchError::config(
                "dynamics.full_scale_db",
                self.full_scale_db as f64,
                "> 0 dB",
            ));
        }
        if !(0.0..=1.0).contains(&self.max_attenuation) {
            return Err(EqMatchError::config(
                "dynamics.max_attenuation",
                self.max_attenuation as f64,
                "0.0..=1.0",
            ));
        }
        Ok(())
    }
}
