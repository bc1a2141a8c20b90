//! EQ matching
//!
//! Computes the correction curve that moves an input profile toward a
//! reference profile:
//! - Gap per band, gated by confidence
//! - Psychoacoustic weighting and intensity scaling
//! - Cross-band smoothing
//! - Dynamics-aware attenuation
//! - Clamping, diagnostics and a quality estimate

mod dynamics;
pub mod quality;
pub mod smoothing;
mod warning;
mod weighting;

pub use dynamics::DynamicsPolicy;
pub use warning::{MatchWarning, Severity};
pub use weighting::PsychoacousticCurve;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::MatchConfig;
use crate::core::dsp::stats::{
    db_to_power, mean, percentile, power_to_db, spectral_centroid, spectral_rolloff,
};
use crate::core::profile::{BandProfile, EqProfile};
use crate::error::{EqMatchError, Result};

/// Percentiles and rolloff fraction used for the correction curve's own
/// descriptors
const CURVE_UPPER_PERCENTILE: f32 = 95.0;
const CURVE_LOWER_PERCENTILE: f32 = 10.0;
const CURVE_ROLLOFF_FRACTION: f32 = 0.85;

/// Outcome of one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Gain per band is the correction to apply to the input
    pub correction_profile: EqProfile,
    /// Reference gains with their mean removed, for display
    pub reference_normalized: Vec<f32>,
    /// Input gains with their mean removed, for display
    pub input_normalized: Vec<f32>,
    pub quality_score: f32,
    pub warnings: Vec<MatchWarning>,
}

impl MatchResult {
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(|w| w.to_string()).collect()
    }

    pub fn correction_gains(&self) -> Vec<f32> {
        self.correction_profile.gains()
    }
}

/// Replace NaN and -inf by `floor` and +inf by `-floor`; finite gains pass through
fn finite_gain(gain_db: f32, floor: f32) -> f32 {
    if gain_db.is_nan() || gain_db == f32::NEG_INFINITY {
        floor
    } else if gain_db == f32::INFINITY {
        -floor
    } else {
        gain_db
    }
}

/// Copy of `profile` with every value the matcher reads made finite
fn finite_profile(profile: &EqProfile, floor: f32) -> EqProfile {
    let mut profile = profile.clone();
    for band in &mut profile.bands {
        band.gain_db = finite_gain(band.gain_db, floor);
        if !band.confidence.is_finite() {
            band.confidence = 0.0;
        }
    }
    if !profile.dynamic_range.is_finite() {
        profile.dynamic_range = 0.0;
    }
    profile
}

/// Gains minus their mean
pub fn normalize_gains(profile: &EqProfile) -> Vec<f32> {
    let gains = profile.gains();
    let offset = mean(&gains);
    gains.into_iter().map(|g| g - offset).collect()
}

/// Compute the correction that moves `input` toward `reference`.
///
/// Both profiles must come from the same band layout. Non-finite band
/// gains (a band with no energy at all reads as -inf dB) are replaced by
/// `tuning.gain_floor_db`. A band contributes no gap when its output
/// confidence is zero and either side sits at that floor, which is how
/// bands above an input's Nyquist arrive; any other band contributes its
/// full gap whatever its confidence.
pub fn match_profiles(
    reference: &EqProfile,
    input: &EqProfile,
    config: &MatchConfig,
) -> Result<MatchResult> {
    config.validate()?;
    if reference.len() != input.len() {
        return Err(EqMatchError::BandCountMismatch {
            reference: reference.len(),
            input: input.len(),
        });
    }

    let tuning = &config.tuning;
    let n = reference.len();
    let reference = &finite_profile(reference, tuning.gain_floor_db);
    let input = &finite_profile(input, tuning.gain_floor_db);

    let confidence: Vec<f32> = reference
        .bands
        .iter()
        .zip(&input.bands)
        .map(|(r, i)| r.confidence.min(i.confidence))
        .collect();

    let floor = tuning.gain_floor_db;
    let scaled: Vec<f32> = reference
        .bands
        .iter()
        .zip(&input.bands)
        .zip(&confidence)
        .map(|((r, i), &c)| {
            if c == 0.0 && (r.gain_db <= floor || i.gain_db <= floor) {
                return 0.0;
            }
            let gap = r.gain_db - i.gain_db;
            let weight = if config.use_psychoacoustic {
                tuning.psychoacoustic.weight(r.frequency)
            } else {
                1.0
            };
            gap * weight * config.intensity
        })
        .collect();

    let sigma = config.smoothing_factor * tuning.max_smoothing_sigma_bands;
    let smoothed = smoothing::smooth(&scaled, sigma);

    let dynamics_factor = if config.preserve_dynamics {
        tuning
            .dynamics
            .factor(reference.dynamic_range, input.dynamic_range)
    } else {
        1.0
    };

    let limit = config.max_correction;
    let mut warnings = Vec::new();
    let mut clamped = 0usize;
    let bands: Vec<BandProfile> = smoothed
        .iter()
        .zip(&reference.bands)
        .zip(&confidence)
        .map(|((&value, band), &c)| {
            let requested = value * dynamics_factor;
            let gain_db = if requested.abs() > limit {
                clamped += 1;
                warnings.push(MatchWarning::Clamped {
                    frequency: band.frequency,
                    requested_db: requested,
                    limit_db: limit,
                });
                requested.clamp(-limit, limit)
            } else {
                requested
            };
            BandProfile {
                frequency: band.frequency,
                gain_db,
                bandwidth: band.bandwidth,
                confidence: c,
            }
        })
        .collect();

    for band in &bands {
        if band.confidence < tuning.low_confidence_threshold {
            warnings.push(MatchWarning::LowConfidence {
                frequency: band.frequency,
                confidence: band.confidence,
            });
        }
    }

    for pair in bands.windows(2) {
        let octaves = (pair[1].frequency / pair[0].frequency).log2();
        if octaves <= 0.0 {
            continue;
        }
        let slope = (pair[1].gain_db - pair[0].gain_db).abs() / octaves;
        if slope > tuning.max_slope_db_per_octave {
            warnings.push(MatchWarning::SteepSlope {
                lower_hz: pair[0].frequency,
                upper_hz: pair[1].frequency,
                slope_db_per_octave: slope,
            });
        }
    }

    if n > 0 && clamped as f32 > tuning.unnatural_clamp_fraction * n as f32 {
        warnings.push(MatchWarning::Unnatural { clamped, total: n });
    }

    let total_db: f32 = bands.iter().map(|b| b.gain_db.abs()).sum();
    let total_limit = tuning.total_correction_per_band_db * n as f32;
    if total_db > total_limit {
        warnings.push(MatchWarning::HighTotalCorrection {
            total_db,
            limit_db: total_limit,
        });
    }

    if (input.dynamic_range - reference.dynamic_range).abs() > tuning.dynamics_mismatch_db {
        warnings.push(MatchWarning::DynamicsMismatch {
            reference_db: reference.dynamic_range,
            input_db: input.dynamic_range,
        });
    }

    let correction_profile = correction_descriptors(bands, limit);
    let quality_score = quality::score(reference, input, &correction_profile, tuning.quality_scale_db);

    debug!(
        "Matched {} bands: sigma {:.2}, dynamics factor {:.2}, {} clamped, quality {:.3}",
        n, sigma, dynamics_factor, clamped, quality_score
    );

    Ok(MatchResult {
        correction_profile,
        reference_normalized: normalize_gains(reference),
        input_normalized: normalize_gains(input),
        quality_score,
        warnings,
    })
}

/// Descriptors of a correction curve, reading each band gain as a band power
fn correction_descriptors(bands: Vec<BandProfile>, max_correction: f32) -> EqProfile {
    let gains: Vec<f32> = bands.iter().map(|b| b.gain_db).collect();
    let frequencies: Vec<f32> = bands.iter().map(|b| b.frequency).collect();
    let powers: Vec<f64> = gains.iter().map(|&g| db_to_power(g)).collect();

    let overall_loudness = if powers.is_empty() {
        0.0
    } else {
        power_to_db(powers.iter().sum::<f64>() / powers.len() as f64, -max_correction)
    };

    EqProfile {
        overall_loudness,
        dynamic_range: percentile(&gains, CURVE_UPPER_PERCENTILE)
            - percentile(&gains, CURVE_LOWER_PERCENTILE),
        spectral_centroid: spectral_centroid(&frequencies, &powers),
        spectral_rolloff: spectral_rolloff(&frequencies, &powers, CURVE_ROLLOFF_FRACTION),
        bands,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchConfigBuilder;

    fn flat(n: usize, gain: f32, confidence: f32) -> EqProfile {
        EqProfile {
            bands: (0..n)
                .map(|i| {
                    let frequency = 1000.0 * 2f32.powf((i as f32 - 10.0) / 3.0);
                    BandProfile {
                        frequency,
                        gain_db: gain,
                        bandwidth: frequency * 0.2316,
                        confidence,
                    }
                })
                .collect(),
            overall_loudness: -20.0,
            dynamic_range: 10.0,
            spectral_centroid: 1000.0,
            spectral_rolloff: 5000.0,
        }
    }

    fn literal() -> MatchConfig {
        MatchConfigBuilder::new()
            .intensity(1.0)
            .max_correction(12.0)
            .smoothing(0.0)
            .psychoacoustic(false)
            .preserve_dynamics(false)
            .build()
            .unwrap()
    }

    #[test]
    fn test_band_count_mismatch() {
        let err = match_profiles(&flat(31, 0.0, 1.0), &flat(30, 0.0, 1.0), &literal());
        assert_eq!(
            err,
            Err(EqMatchError::BandCountMismatch {
                reference: 31,
                input: 30
            })
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = literal();
        config.intensity = 1.5;
        assert!(match_profiles(&flat(3, 0.0, 1.0), &flat(3, 0.0, 1.0), &config).is_err());
    }

    #[test]
    fn test_zero_confidence_band_contributes_nothing() {
        let reference = flat(5, 0.0, 1.0);
        let mut input = flat(5, 0.0, 1.0);
        input.bands[4].gain_db = -60.0;
        input.bands[4].confidence = 0.0;

        let result = match_profiles(&reference, &input, &literal()).unwrap();
        assert_eq!(result.correction_profile.bands[4].gain_db, 0.0);
        assert!(!result
            .warnings
            .iter()
            .any(|w| matches!(w, MatchWarning::Clamped { .. })));
        assert!(result
            .warnings
            .iter()
            .any(|w| matches!(w, MatchWarning::LowConfidence { .. })));
    }

    #[test]
    fn test_unreliable_band_with_real_levels_still_corrected() {
        let reference = flat(5, 0.0, 0.0);
        let mut input = flat(5, 0.0, 0.0);
        input.bands[2].gain_db = 6.0;
        let mut config = literal();
        config.max_correction = 3.0;

        let result = match_profiles(&reference, &input, &config).unwrap();
        assert_eq!(result.correction_profile.bands[2].gain_db, -3.0);
        assert!(result
            .warnings
            .iter()
            .any(|w| matches!(w, MatchWarning::Clamped { .. })));
    }

    #[test]
    fn test_non_finite_gains_are_floored() {
        let mut reference = flat(9, 0.0, 1.0);
        reference.bands[1].gain_db = f32::NAN;
        let mut input = flat(9, 0.0, 1.0);
        input.bands[4].gain_db = f32::NEG_INFINITY;
        input.bands[6].gain_db = f32::INFINITY;

        let mut silent = literal();
        silent.intensity = 0.0;
        let result = match_profiles(&reference, &input, &silent).unwrap();
        assert!(result.correction_gains().iter().all(|&g| g == 0.0));
        assert!(result.quality_score.is_finite());
        assert!((0.0..=1.0).contains(&result.quality_score));
        assert!(result.reference_normalized.iter().all(|g| g.is_finite()));
        assert!(result.input_normalized.iter().all(|g| g.is_finite()));

        let config = MatchConfig::default();
        let result = match_profiles(&reference, &input, &config).unwrap();
        assert!(result.correction_profile.is_finite());
        assert!(result.quality_score.is_finite());
        for band in &result.correction_profile.bands {
            assert!(band.gain_db.abs() <= config.max_correction);
        }
        assert!((0.0..=1.0).contains(&result.quality_score));
        assert!(!result.warning_messages().iter().any(|m| m.contains("NaN")));
    }

    #[test]
    fn test_dynamics_preservation_scales_magnitude() {
        let reference = flat(5, 0.0, 1.0);
        let mut input = flat(5, 2.0, 1.0);
        input.dynamic_range = reference.dynamic_range + 15.0;

        let mut config = literal();
        config.preserve_dynamics = true;
        let result = match_profiles(&reference, &input, &config).unwrap();
        // 12 dB excess: full 0.3 attenuation
        for band in &result.correction_profile.bands {
            assert!((band.gain_db + 1.4).abs() < 1e-5);
        }
        // Mismatch is reported regardless of preservation
        assert!(matches!(
            result.warnings.last(),
            Some(MatchWarning::DynamicsMismatch { .. })
        ));
    }

    #[test]
    fn test_warning_order() {
        let reference = flat(10, 0.0, 1.0);
        let mut input = flat(10, 10.0, 1.0);
        input.bands[0].confidence = 0.1;
        input.dynamic_range = 30.0;

        let mut config = literal();
        config.max_correction = 4.0;
        let result = match_profiles(&reference, &input, &config).unwrap();

        let kinds: Vec<u8> = result
            .warnings
            .iter()
            .map(|w| match w {
                MatchWarning::Clamped { .. } => 1,
                MatchWarning::LowConfidence { .. } => 2,
                MatchWarning::SteepSlope { .. } => 3,
                MatchWarning::Unnatural { .. } => 4,
                MatchWarning::HighTotalCorrection { .. } => 5,
                MatchWarning::DynamicsMismatch { .. } => 6,
            })
            .collect();
        assert!(kinds.windows(2).all(|w| w[0] <= w[1]), "{:?}", kinds);
        assert_eq!(kinds.iter().filter(|&&k| k == 1).count(), 10);
        assert!(kinds.contains(&2));
        assert!(kinds.contains(&4));
        assert!(kinds.contains(&5));
        assert!(kinds.contains(&6));
    }

    #[test]
    fn test_steep_slope_detected() {
        let reference = flat(4, 0.0, 1.0);
        let mut input = flat(4, 0.0, 1.0);
        // 8 dB jump over a third of an octave is 24 dB/octave
        input.bands[2].gain_db = -8.0;
        let result = match_profiles(&reference, &input, &literal()).unwrap();
        assert!(result
            .warnings
            .iter()
            .any(|w| matches!(w, MatchWarning::SteepSlope { .. })));
    }

    #[test]
    fn test_correction_descriptors() {
        let reference = flat(6, 0.0, 1.0);
        let input = flat(6, 3.0, 1.0);
        let result = match_profiles(&reference, &input, &literal()).unwrap();
        let profile = &result.correction_profile;
        assert!((profile.overall_loudness + 3.0).abs() < 1e-4);
        assert!(profile.dynamic_range.abs() < 1e-6);
        assert!(profile.spectral_centroid > 0.0);
        assert!(profile.is_finite());
    }

    #[test]
    fn test_normalized_curves_are_mean_zero() {
        let mut reference = flat(8, 0.0, 1.0);
        reference.bands[3].gain_db = 8.0;
        let input = flat(8, -5.0, 1.0);
        let result = match_profiles(&reference, &input, &literal()).unwrap();
        assert!(mean(&result.reference_normalized).abs() < 1e-5);
        assert!(mean(&result.input_normalized).abs() < 1e-5);
        assert_eq!(result.input_normalized, vec![0.0; 8]);
    }
}
