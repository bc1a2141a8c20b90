//! Configuration module for eqmatch

mod analysis;
mod presets;

pub use analysis::{AnalysisConfig, CANONICAL_SAMPLE_RATE};
pub use presets::{MatchConfig, MatchConfigBuilder, MatchPreset, MatchTuning};
