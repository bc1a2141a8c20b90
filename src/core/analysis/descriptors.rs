// src/core/analysis/descriptors.rs
//
// Whole-signal descriptors that accompany the band list

use super::welch::WelchEstimate;
use crate::config::AnalysisConfig;
use crate::core::dsp::stats::{percentile, power_to_db, spectral_centroid, spectral_rolloff};
use crate::core::profile::{BandProfile, EqProfile};

/// Mean-square level of the whole buffer in dB
pub fn overall_loudness(samples: &[f32], floor_db: f32) -> f32 {
    if samples.is_empty() {
        return floor_db;
    }
    let mean_square =
        samples.iter().map(|&s| (s as f64) * (s as f64)).sum::<f64>() / samples.len() as f64;
    power_to_db(mean_square, floor_db)
}

/// Percentile spread of per-frame loudness. Loud transients and silent
/// gaps at the extremes do not move it the way max - min would.
pub fn dynamic_range(frame_mean_square: &[f64], config: &AnalysisConfig) -> f32 {
    let loudness: Vec<f32> = frame_mean_square
        .iter()
        .map(|&ms| power_to_db(ms, config.loudness_floor_db))
        .collect();
    let spread = percentile(&loudness, config.dynamics_upper_percentile)
        - percentile(&loudness, config.dynamics_lower_percentile);
    spread.max(0.0)
}

/// Assemble the profile from aggregated bands and the Welch estimate
pub fn build(
    bands: Vec<BandProfile>,
    samples: &[f32],
    estimate: &WelchEstimate,
    bin_frequencies: &[f32],
    config: &AnalysisConfig,
) -> EqProfile {
    EqProfile {
        bands,
        overall_loudness: overall_loudness(samples, config.loudness_floor_db),
        dynamic_range: dynamic_range(&estimate.frame_mean_square, config),
        spectral_centroid: spectral_centroid(bin_frequencies, &estimate.mean_power),
        spectral_rolloff: spectral_rolloff(
            bin_frequencies,
            &estimate.mean_power,
            config.rolloff_fraction,
        ),
    }
}
