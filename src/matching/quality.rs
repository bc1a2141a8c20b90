// src/matching/quality.rs
//
// Match quality: how close the corrected input lands to the reference

use crate::core::profile::EqProfile;

/// Weights summing to less than this are treated as "no confidence anywhere"
const MIN_TOTAL_WEIGHT: f64 = 1e-9;

/// Score in `[0, 1]` from the confidence-weighted RMS residual of
/// `input + correction - reference`, mapped by `1 / (1 + rms / scale_db)`.
///
/// Weights are the correction's band confidences. When they are all zero
/// every band counts equally.
pub fn score(
    reference: &EqProfile,
    input: &EqProfile,
    correction: &EqProfile,
    scale_db: f32,
) -> f32 {
    let residuals: Vec<f64> = reference
        .bands
        .iter()
        .zip(&input.bands)
        .zip(&correction.bands)
        .map(|((r, i), c)| (i.gain_db + c.gain_db - r.gain_db) as f64)
        .collect();
    if residuals.is_empty() {
        return 1.0;
    }

    let mut weights: Vec<f64> = correction
        .bands
        .iter()
        .map(|b| b.confidence.max(0.0) as f64)
        .collect();
    let mut total: f64 = weights.iter().sum();
    if total < MIN_TOTAL_WEIGHT {
        weights.iter_mut().for_each(|w| *w = 1.0);
        total = weights.len() as f64;
    }

    let mean_square = residuals
        .iter()
        .zip(&weights)
        .map(|(r, w)| w * r * r)
        .sum::<f64>()
        / total;
    let rms = mean_square.sqrt();

    (1.0 / (1.0 + rms / scale_db.max(f32::EPSILON) as f64)).clamp(0.0, 1.0) as f32
}
