//! Error types for profile analysis and matching

use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EqMatchError>;

/// Hard failures. Only structurally invalid input or configuration ends up
/// here; weak or degenerate signals are reported through confidence values
/// and match warnings instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EqMatchError {
    /// PCM buffer has no samples
    #[error("PCM buffer `{argument}` is empty")]
    EmptyBuffer { argument: &'static str },

    /// PCM buffer contains NaN or infinity
    #[error("PCM buffer `{argument}` has non-finite sample {value} at index {index}")]
    NonFiniteSample {
        argument: &'static str,
        index: usize,
        value: f32,
    },

    /// Sample rate of zero
    #[error("Invalid sample rate: {0} Hz (must be positive)")]
    InvalidSampleRate(u32),

    /// A configuration field is outside its valid range
    #[error("Invalid configuration: `{field}` = {value} (expected {expected})")]
    InvalidConfig {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },

    /// Configuration document could not be parsed
    #[error("Invalid configuration document: {0}")]
    ConfigParse(String),

    /// Profiles do not share a band layout
    #[error("Band layout mismatch: reference has {reference} bands, input has {input}")]
    BandCountMismatch { reference: usize, input: usize },

    /// FFT plan rejected its buffers
    #[error("FFT processing failed: {0}")]
    Fft(String),

    /// Filter design rejected its parameters
    #[error("Filter design failed: {0}")]
    Filter(String),

    /// Export format name not recognised
    #[error("Unknown export format: {0} (expected apo, json or text)")]
    UnknownExportFormat(String),

    /// Structured export failed
    #[error("Export failed: {0}")]
    Export(String),
}

impl EqMatchError {
    pub(crate) fn config(field: &'static str, value: f64, expected: &'static str) -> Self {
        Self::InvalidConfig {
            field,
            value,
            expected,
        }
    }
}

impl From<serde_json::Error> for EqMatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Export(err.to_string())
    }
}
