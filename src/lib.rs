//! eqmatch - Reference-based EQ matching
//!
//! Analyses a reference and an input recording into comparable
//! frequency-band profiles and computes the parametric correction that
//! moves the input's tonal balance toward the reference.
//!
//! ## Features
//!
//! - **Fixed band layout**: third-octave bands (20 Hz - 20 kHz) shared by every profile
//! - **Confidence per band**: level above the noise floor times frame-to-frame stability
//! - **Deterministic analysis**: parallel Welch averaging with a fixed reduction order
//! - **Match presets**: gentle, balanced, full and surgical, with per-field overrides
//! - **Diagnostics**: clamp, confidence, slope, total-correction and dynamics warnings
//! - **Export**: Equalizer APO filter chains, JSON and plain text
//!
//! ## Module Structure
//!
//! - `core` - Frame extraction, band analysis, profile engine, decoding
//! - `matching` - Correction curve, quality score and warnings
//! - `config` - Analysis settings, match config and presets
//! - `export` - Correction profile serialization
//! - `cli` - Command-line interface
//! - `testgen` - Synthetic test signals
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use eqmatch::{build_profile, match_profiles, render_export, ExportFormat, MatchConfig};
//!
//! let reference = build_profile(&reference_pcm, 48_000)?;
//! let input = build_profile(&input_pcm, 48_000)?;
//!
//! let result = match_profiles(&reference, &input, &MatchConfig::default())?;
//! println!("Quality: {:.0}%", result.quality_score * 100.0);
//! for warning in &result.warnings {
//!     println!("  {}", warning);
//! }
//!
//! let apo = render_export(&result.correction_profile, ExportFormat::EqualizerApo)?;
//! ```
//!
//! ## Match Presets
//!
//! | Preset   | Intensity | Max dB | Smoothing | Psychoacoustic | Dynamics |
//! |----------|-----------|--------|-----------|----------------|----------|
//! | Gentle   | 0.5       | 4      | 0.7       | yes            | yes      |
//! | Balanced | 0.7       | 6      | 0.5       | yes            | yes      |
//! | Full     | 1.0       | 12     | 0.3       | yes            | no       |
//! | Surgical | 1.0       | 12     | 0.0       | no             | no       |

// Core analysis functionality
pub mod core;

// Correction curve computation
pub mod matching;

// Configuration and presets
pub mod config;

// Export formats
pub mod export;

// Command-line interface
pub mod cli;

// Error types
pub mod error;

// Synthetic signals for tests and demos
pub mod testgen;

// Re-export commonly used types at crate root for convenience
pub use crate::config::{AnalysisConfig, MatchConfig, MatchConfigBuilder, MatchPreset, MatchTuning};
pub use crate::core::{build_profile, BandLayout, BandProfile, EqMatchEngine, EqProfile};
pub use crate::error::{EqMatchError, Result};
pub use crate::export::{render_export, ExportFormat};
pub use crate::matching::{match_profiles, MatchResult, MatchWarning, Severity};
