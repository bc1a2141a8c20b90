// src/core/analysis/bands.rs
//
// Band aggregation: averaged spectrum -> per-band gain and confidence

use super::layout::{BandLayout, BinMap};
use super::welch::WelchEstimate;
use crate::config::AnalysisConfig;
use crate::core::dsp::stats::{coefficient_of_variation, power_to_db};
use crate::core::profile::BandProfile;

/// Stability assigned when there is a single frame and hence no evidence
/// about frame-to-frame variance
const SINGLE_FRAME_STABILITY: f32 = 0.5;

/// Level factor: 0 at the noise floor, 1 at `snr_range_db` above it
fn level_factor(mean_bin_power: f64, config: &AnalysisConfig) -> f32 {
    let floor = config.noise_floor_db;
    let db = power_to_db(mean_bin_power, floor);
    ((db - floor) / config.snr_range_db).clamp(0.0, 1.0)
}

/// Stability factor from the spread of one band's per-frame energies
fn stability_factor(frame_energies: &[f64], config: &AnalysisConfig) -> f32 {
    if frame_energies.len() < 2 {
        return SINGLE_FRAME_STABILITY;
    }
    match coefficient_of_variation(frame_energies) {
        Some(cv) => (1.0 / (1.0 + cv / config.stability_scale as f64)) as f32,
        None => 0.0,
    }
}

/// Reduce a Welch estimate onto the band layout
pub fn aggregate(
    layout: &BandLayout,
    bin_map: &BinMap,
    estimate: &WelchEstimate,
    config: &AnalysisConfig,
) -> Vec<BandProfile> {
    let num_bins = estimate.mean_power.len().max(1);
    let reference_energy = estimate.mean_power.iter().sum::<f64>() / num_bins as f64;

    let mut band_frames = Vec::with_capacity(estimate.frame_count());
    bin_map
        .bands()
        .iter()
        .enumerate()
        .map(|(i, bins)| {
            let frequency = layout.centers()[i];
            let bandwidth = layout.bandwidth(i);

            if bins.is_above_nyquist() {
                return BandProfile {
                    frequency,
                    gain_db: config.min_gain_db,
                    bandwidth,
                    confidence: 0.0,
                };
            }

            let energy = bins.energy(&estimate.mean_power);
            let gain_db = if reference_energy > 0.0 {
                power_to_db(energy / reference_energy, config.min_gain_db)
            } else {
                config.min_gain_db
            };

            band_frames.clear();
            band_frames.extend(estimate.frame_band_energy.iter().map(|f| f[i]));

            let level = level_factor(energy / bins.effective_bins(), config);
            let stability = stability_factor(&band_frames, config);

            BandProfile {
                frequency,
                gain_db,
                bandwidth,
                confidence: (level * stability).clamp(0.0, 1.0),
            }
        })
        .collect()
}
