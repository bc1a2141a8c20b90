// tests/test_utils/mod.rs
//
// Shared helpers for integration tests: synthetic profiles on the
// default band layout, literal match configs and scratch file paths.

#![allow(dead_code)]

use std::path::PathBuf;

use eqmatch::testgen;
use eqmatch::{
    AnalysisConfig, BandLayout, BandProfile, EqProfile, MatchConfig, MatchConfigBuilder,
};

pub const SAMPLE_RATE: u32 = 48_000;

pub fn default_layout() -> BandLayout {
    BandLayout::from_config(&AnalysisConfig::default())
}

/// Profile on the default layout with the given gains and a uniform confidence
pub fn profile_from_gains(gains: &[f32], confidence: f32) -> EqProfile {
    let layout = default_layout();
    assert_eq!(gains.len(), layout.len(), "gain curve must cover the layout");
    EqProfile {
        bands: layout
            .centers()
            .iter()
            .zip(gains)
            .enumerate()
            .map(|(i, (&frequency, &gain_db))| BandProfile {
                frequency,
                gain_db,
                bandwidth: layout.bandwidth(i),
                confidence,
            })
            .collect(),
        overall_loudness: -20.0,
        dynamic_range: 10.0,
        spectral_centroid: 1000.0,
        spectral_rolloff: 8000.0,
    }
}

pub fn flat_profile(gain_db: f32, confidence: f32) -> EqProfile {
    profile_from_gains(&vec![gain_db; default_layout().len()], confidence)
}

/// Index of the band centred closest to `frequency`
pub fn band_index(frequency: f32) -> usize {
    flat_profile(0.0, 1.0)
        .nearest_band(frequency)
        .expect("frequency must be positive")
}

/// Full-strength, unsmoothed, unweighted: correction is the clamped gap
pub fn literal_config(max_correction: f32) -> MatchConfig {
    MatchConfigBuilder::new()
        .intensity(1.0)
        .max_correction(max_correction)
        .smoothing(0.0)
        .psychoacoustic(false)
        .preserve_dynamics(false)
        .build()
        .expect("literal config is valid")
}

pub fn white_noise(seconds: f32, seed: u64) -> Vec<f32> {
    testgen::white_noise((seconds * SAMPLE_RATE as f32) as usize, 0.5, seed)
}

/// Unique scratch path under the system temp dir
pub fn temp_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("eqmatch-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    dir.join(format!("{}-{}", rand::random::<u32>(), name))
}
