//! Match diagnostics

use std::fmt;

use serde::{Deserialize, Serialize};

/// How much a warning should worry the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational - may be expected behavior
    Info,
    /// Possible issue
    Low,
    /// Likely audible issue
    Medium,
    /// The correction probably should not be used as-is
    High,
}

impl Severity {
    pub fn symbol(&self) -> &'static str {
        match self {
            Severity::Info => "ℹ",
            Severity::Low => "⚠",
            Severity::Medium => "⚠",
            Severity::High => "✗",
        }
    }
}

/// A non-fatal concern about a match result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchWarning {
    /// Requested correction exceeded `max_correction`
    Clamped {
        frequency: f32,
        requested_db: f32,
        limit_db: f32,
    },
    LowConfidence { frequency: f32, confidence: f32 },
    /// Correction changes faster than a natural EQ curve between two bands
    SteepSlope {
        lower_hz: f32,
        upper_hz: f32,
        slope_db_per_octave: f32,
    },
    /// More than the tolerated share of bands hit the clamp
    Unnatural { clamped: usize, total: usize },
    HighTotalCorrection { total_db: f32, limit_db: f32 },
    DynamicsMismatch { reference_db: f32, input_db: f32 },
}

impl MatchWarning {
    pub fn severity(&self) -> Severity {
        match self {
            MatchWarning::Clamped { .. } => Severity::Medium,
            MatchWarning::LowConfidence { .. } => Severity::Low,
            MatchWarning::SteepSlope { .. } => Severity::Medium,
            MatchWarning::Unnatural { .. } => Severity::High,
            MatchWarning::HighTotalCorrection { .. } => Severity::Medium,
            MatchWarning::DynamicsMismatch { .. } => Severity::Info,
        }
    }

    /// Band frequency the warning refers to, if it refers to one band
    pub fn frequency(&self) -> Option<f32> {
        match self {
            MatchWarning::Clamped { frequency, .. }
            | MatchWarning::LowConfidence { frequency, .. } => Some(*frequency),
            _ => None,
        }
    }
}

impl fmt::Display for MatchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchWarning::Clamped {
                frequency,
                requested_db,
                limit_db,
            } => write!(
                f,
                "correction at band near {:.0} Hz clamped to ±{:.1} dB (requested {:+.1} dB)",
                frequency, limit_db, requested_db
            ),
            MatchWarning::LowConfidence { frequency, .. } => {
                write!(f, "low confidence at band near {:.0} Hz", frequency)
            }
            MatchWarning::SteepSlope {
                lower_hz,
                upper_hz,
                slope_db_per_octave,
            } => write!(
                f,
                "steep correction slope of {:.1} dB/octave between {:.0} Hz and {:.0} Hz",
                slope_db_per_octave, lower_hz, upper_hz
            ),
            MatchWarning::Unnatural { clamped, total } => write!(
                f,
                "match may sound unnatural: {} of {} bands hit the correction limit",
                clamped, total
            ),
            MatchWarning::HighTotalCorrection { total_db, limit_db } => write!(
                f,
                "high total correction: {:.1} dB summed across bands (limit {:.1} dB)",
                total_db, limit_db
            ),
            MatchWarning::DynamicsMismatch {
                reference_db,
                input_db,
            } => write!(
                f,
                "dynamics mismatch: reference range {:.1} dB, input range {:.1} dB",
                reference_db, input_db
            ),
        }
    }
}
