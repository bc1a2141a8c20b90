//! Correction curve export
//!
//! Renders a correction profile for third-party consumers:
//! - Equalizer APO parametric configuration (one peaking filter per band)
//! - JSON dump of the profile
//! - Plain-text band report

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::profile::EqProfile;
use crate::error::{EqMatchError, Result};

/// Output format for [`render_export`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Equalizer APO `config.txt` filter chain
    EqualizerApo,
    Json,
    Text,
}

impl ExportFormat {
    pub fn all() -> &'static [ExportFormat] {
        &[ExportFormat::EqualizerApo, ExportFormat::Json, ExportFormat::Text]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExportFormat::EqualizerApo => "apo",
            ExportFormat::Json => "json",
            ExportFormat::Text => "text",
        }
    }

    /// Conventional file extension
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::EqualizerApo | ExportFormat::Text => "txt",
            ExportFormat::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = EqMatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "apo" | "equalizer-apo" | "equalizerapo" | "equalizer_apo" => {
                Ok(ExportFormat::EqualizerApo)
            }
            "json" => Ok(ExportFormat::Json),
            "text" | "txt" => Ok(ExportFormat::Text),
            _ => Err(EqMatchError::UnknownExportFormat(s.to_string())),
        }
    }
}

/// Serialize a correction profile. Band order is preserved; frequencies
/// are written as integer Hz and gains with two decimals.
pub fn render_export(correction: &EqProfile, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::EqualizerApo => Ok(render_apo(correction)),
        ExportFormat::Json => Ok(serde_json::to_string_pretty(correction)?),
        ExportFormat::Text => Ok(render_text(correction)),
    }
}

/// Headroom that keeps the filter chain from clipping: minus the largest boost
pub fn preamp_db(correction: &EqProfile) -> f32 {
    let max_boost = correction
        .bands
        .iter()
        .map(|b| b.gain_db)
        .fold(0.0f32, f32::max);
    if max_boost > 0.0 {
        -max_boost
    } else {
        0.0
    }
}

fn render_apo(correction: &EqProfile) -> String {
    let mut out = String::new();
    out.push_str(&format!("Preamp: {:.2} dB\n", preamp_db(correction)));
    for (i, band) in correction.bands.iter().enumerate() {
        out.push_str(&format!(
            "Filter {}: ON PK Fc {} Hz Gain {:.2} dB Q {:.3}\n",
            i + 1,
            band.frequency.round() as i64,
            band.gain_db,
            band.q()
        ));
    }
    out
}

fn render_text(correction: &EqProfile) -> String {
    let mut out = String::new();
    out.push_str(&format!("EQ correction ({} bands)\n", correction.len()));
    out.push_str(&format!(
        "Preamp {:.2} dB, curve loudness {:.2} dB, spread {:.2} dB\n",
        preamp_db(correction),
        correction.overall_loudness,
        correction.dynamic_range
    ));
    out.push_str(&format!(
        "{:>8}  {:>9}  {:>7}  {:>10}\n",
        "Hz", "Gain dB", "Q", "Confidence"
    ));
    for band in &correction.bands {
        out.push_str(&format!(
            "{:>8}  {:>+9.2}  {:>7.3}  {:>10.2}\n",
            band.frequency.round() as i64,
            band.gain_db,
            band.q(),
            band.confidence
        ));
    }
    out
}
