// tests/matching_test.rs
// Correction curves from synthetic and measured profiles: clamping,
// intensity, gain sanitising, smoothing and warnings.
//
// Run with: cargo test --test matching_test

mod test_utils;

use approx::assert_abs_diff_eq;
use eqmatch::matching::smoothing::smooth;
use eqmatch::{
    build_profile, match_profiles, MatchConfig, MatchConfigBuilder, MatchPreset, MatchWarning,
};
use test_utils::*;

fn boosted_at(frequency: f32, gain_db: f32) -> eqmatch::EqProfile {
    let mut profile = flat_profile(0.0, 1.0);
    profile.bands[band_index(frequency)].gain_db = gain_db;
    profile
}

fn clamp_warnings(warnings: &[MatchWarning]) -> Vec<&MatchWarning> {
    warnings
        .iter()
        .filter(|w| matches!(w, MatchWarning::Clamped { .. }))
        .collect()
}

#[test]
fn boost_is_cut_within_limit() {
    let reference = flat_profile(0.0, 1.0);
    let input = boosted_at(2000.0, 6.0);
    let result = match_profiles(&reference, &input, &literal_config(6.0)).unwrap();

    let i = band_index(2000.0);
    let gains = result.correction_gains();
    assert_abs_diff_eq!(gains[i], -6.0, epsilon = 1e-5);
    for (j, &g) in gains.iter().enumerate() {
        if j != i {
            assert_eq!(g, 0.0, "band {}", j);
        }
    }
    // Exactly at the limit is not a clamp
    assert!(clamp_warnings(&result.warnings).is_empty());
}

#[test]
fn boost_beyond_limit_is_clamped_and_reported() {
    let reference = flat_profile(0.0, 1.0);
    let input = boosted_at(2000.0, 6.0);
    let result = match_profiles(&reference, &input, &literal_config(3.0)).unwrap();

    let i = band_index(2000.0);
    assert_abs_diff_eq!(result.correction_gains()[i], -3.0, epsilon = 1e-5);

    let clamps = clamp_warnings(&result.warnings);
    assert_eq!(clamps.len(), 1);
    assert_eq!(clamps[0].frequency(), Some(2000.0));
    let message = clamps[0].to_string();
    assert!(message.contains("2000 Hz"), "{}", message);
    assert!(result
        .warning_messages()
        .iter()
        .any(|m| m.contains("clamped")));
}

#[test]
fn unreliable_band_is_still_matched_when_both_have_energy() {
    let mut reference = flat_profile(0.0, 0.0);
    let mut input = boosted_at(2000.0, 6.0);
    for band in &mut input.bands {
        band.confidence = 0.0;
    }
    reference.dynamic_range = input.dynamic_range;

    let result = match_profiles(&reference, &input, &literal_config(3.0)).unwrap();
    assert_abs_diff_eq!(result.correction_gains()[band_index(2000.0)], -3.0, epsilon = 1e-5);
    let clamps = clamp_warnings(&result.warnings);
    assert_eq!(clamps.len(), 1);
    assert_eq!(clamps[0].frequency(), Some(2000.0));
}

#[test]
fn infinite_gain_band_stays_finite() {
    let reference = flat_profile(0.0, 1.0);
    let input = boosted_at(2000.0, f32::NEG_INFINITY);

    let silent = MatchConfigBuilder::from_config(literal_config(12.0))
        .intensity(0.0)
        .build()
        .unwrap();
    let result = match_profiles(&reference, &input, &silent).unwrap();
    assert!(result.correction_gains().iter().all(|&g| g == 0.0));
    assert!(result.quality_score.is_finite());
    assert!(result.input_normalized.iter().all(|g| g.is_finite()));

    let config = MatchConfig::default();
    let result = match_profiles(&reference, &input, &config).unwrap();
    assert!(result.correction_profile.is_finite());
    assert!((0.0..=1.0).contains(&result.quality_score));
    for band in &result.correction_profile.bands {
        assert!(band.gain_db.abs() <= config.max_correction);
    }
    // A silent band reads as far below the reference, so it is boosted
    assert!(result.correction_gains()[band_index(2000.0)] > 0.0);
}

#[test]
fn zero_intensity_is_a_flat_curve() {
    let reference = flat_profile(0.0, 1.0);
    let mut input = boosted_at(250.0, -9.0);
    input.bands[band_index(8000.0)].gain_db = 7.0;

    for preset in MatchPreset::all() {
        let config = MatchConfigBuilder::from_preset(preset)
            .intensity(0.0)
            .build()
            .unwrap();
        let result = match_profiles(&reference, &input, &config).unwrap();
        assert!(
            result.correction_gains().iter().all(|&g| g == 0.0),
            "{}",
            preset.name()
        );
        assert_abs_diff_eq!(result.correction_profile.overall_loudness, 0.0, epsilon = 1e-5);
    }
}

#[test]
fn corrections_never_exceed_the_limit() {
    let reference = flat_profile(0.0, 1.0);
    let gains: Vec<f32> = (0..default_layout().len())
        .map(|i| if i % 2 == 0 { 18.0 } else { -18.0 })
        .collect();
    let input = profile_from_gains(&gains, 1.0);

    for preset in MatchPreset::all() {
        let config = MatchConfig::from_preset(preset);
        let result = match_profiles(&reference, &input, &config).unwrap();
        for band in &result.correction_profile.bands {
            assert!(band.gain_db.abs() <= config.max_correction + 1e-6);
        }
    }
}

#[test]
fn self_match_on_noise_is_neutral() {
    let profile = build_profile(&white_noise(3.0, 7), SAMPLE_RATE).unwrap();
    let result = match_profiles(&profile, &profile, &MatchConfig::default()).unwrap();

    assert!(result.correction_gains().iter().all(|g| g.abs() < 1e-4));
    assert!(result.quality_score >= 0.95, "{}", result.quality_score);
    assert!(clamp_warnings(&result.warnings).is_empty());
    assert!(!result
        .warnings
        .iter()
        .any(|w| matches!(w, MatchWarning::DynamicsMismatch { .. })));
}

#[test]
fn low_rate_input_leaves_upper_bands_untouched() {
    let reference = build_profile(&white_noise(2.0, 8), SAMPLE_RATE).unwrap();
    let input_samples = eqmatch::testgen::white_noise(8000 * 2, 0.5, 9);
    let input = build_profile(&input_samples, 8000).unwrap();

    let result = match_profiles(&reference, &input, &literal_config(12.0)).unwrap();
    for band in &result.correction_profile.bands {
        if band.lower_edge() >= 4000.0 {
            assert_eq!(band.gain_db, 0.0, "{} Hz", band.frequency);
            assert_eq!(band.confidence, 0.0);
        }
    }
    assert!(result.warnings.iter().any(|w| matches!(
        w,
        MatchWarning::LowConfidence { frequency, .. } if *frequency > 10_000.0
    )));
}

#[test]
fn smoothing_spreads_a_narrow_gap() {
    let reference = flat_profile(0.0, 1.0);
    let input = boosted_at(1000.0, 6.0);
    let i = band_index(1000.0);

    let literal = match_profiles(&reference, &input, &literal_config(12.0)).unwrap();
    let smoothed_config = MatchConfigBuilder::from_config(literal_config(12.0))
        .smoothing(1.0)
        .build()
        .unwrap();
    let smoothed = match_profiles(&reference, &input, &smoothed_config).unwrap();

    let a = literal.correction_gains();
    let b = smoothed.correction_gains();
    assert!(b[i] > a[i]);
    assert!(b[i - 1] < 0.0 && b[i + 1] < 0.0);
    let sum_a: f32 = a.iter().sum();
    let sum_b: f32 = b.iter().sum();
    assert_abs_diff_eq!(sum_a, sum_b, epsilon = 1e-3);
}

#[test]
fn smoothing_preserves_curve_mean() {
    let curve: Vec<f32> = (0..31).map(|i| ((i * 7) % 11) as f32 - 5.0).collect();
    for sigma in [0.5, 1.0, 2.0, 4.0, 40.0] {
        let out = smooth(&curve, sigma);
        let before: f32 = curve.iter().sum::<f32>() / curve.len() as f32;
        let after: f32 = out.iter().sum::<f32>() / out.len() as f32;
        assert_abs_diff_eq!(before, after, epsilon = 1e-4);
    }
    assert_eq!(smooth(&curve, 0.0), curve);
}

#[test]
fn psychoacoustic_weight_favors_presence_region() {
    let reference = flat_profile(0.0, 1.0);
    let input = flat_profile(-4.0, 1.0);
    let config = MatchConfigBuilder::from_config(literal_config(12.0))
        .psychoacoustic(true)
        .build()
        .unwrap();
    let result = match_profiles(&reference, &input, &config).unwrap();
    let gains = result.correction_gains();

    let presence = gains[band_index(2000.0)];
    let sub = gains[band_index(31.5)];
    assert!(presence > sub, "presence {} sub {}", presence, sub);
    assert!(presence > 4.0);
}

#[test]
fn warnings_render_as_messages() {
    let reference = flat_profile(0.0, 1.0);
    let mut input = flat_profile(10.0, 0.1);
    input.dynamic_range = reference.dynamic_range + 10.0;

    let result = match_profiles(&reference, &input, &literal_config(4.0)).unwrap();
    let messages = result.warning_messages();
    assert_eq!(messages.len(), result.warnings.len());
    assert!(messages.iter().any(|m| m.starts_with("low confidence")));
    assert!(messages.iter().any(|m| m.starts_with("match may sound unnatural")));
    assert!(messages.iter().any(|m| m.starts_with("high total correction")));
    assert!(messages.iter().any(|m| m.starts_with("dynamics mismatch")));
}

#[test]
fn result_serializes_to_json() {
    let reference = flat_profile(0.0, 1.0);
    let input = boosted_at(500.0, 8.0);
    let result = match_profiles(&reference, &input, &literal_config(6.0)).unwrap();

    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains("\"kind\":\"clamped\""));
    let back: eqmatch::MatchResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result);
}
