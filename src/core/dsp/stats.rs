//! Statistical and spectral summary functions

/// Convert a linear power ratio to dB, never going below `floor_db`.
/// Zero, negative and non-finite inputs map to the floor.
pub fn power_to_db(power: f64, floor_db: f32) -> f32 {
    if power > 0.0 && power.is_finite() {
        ((10.0 * power.log10()) as f32).max(floor_db)
    } else {
        floor_db
    }
}

/// Convert dB to a linear power ratio
pub fn db_to_power(db: f32) -> f64 {
    10.0_f64.powf(db as f64 / 10.0)
}

/// Arithmetic mean (0.0 for empty input)
pub fn mean(data: &[f32]) -> f32 {
    if data.is_empty() {
        return 0.0;
    }
    (data.iter().map(|&x| x as f64).sum::<f64>() / data.len() as f64) as f32
}

/// Percentile with linear interpolation between closest ranks.
/// `p` is in percent (0-100). Returns 0.0 for empty input.
pub fn percentile(data: &[f32], p: f32) -> f32 {
    if data.is_empty() {
        return 0.0;
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f32;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f32;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Standard deviation over mean. `None` when fewer than two values or a
/// non-positive mean make the ratio meaningless.
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if mean <= 0.0 || !mean.is_finite() {
        return None;
    }
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt() / mean)
}

/// Energy-weighted mean frequency (brightness measure).
/// 0.0 when there is no energy.
pub fn spectral_centroid(frequencies: &[f32], energy: &[f64]) -> f32 {
    let total: f64 = energy.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return 0.0;
    }
    let weighted: f64 = frequencies
        .iter()
        .zip(energy)
        .map(|(&f, &e)| f as f64 * e)
        .sum();
    (weighted / total) as f32
}

/// Smallest frequency whose cumulative energy reaches `fraction` of the
/// total. 0.0 when there is no energy.
pub fn spectral_rolloff(frequencies: &[f32], energy: &[f64], fraction: f32) -> f32 {
    let total: f64 = energy.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return 0.0;
    }
    let threshold = total * fraction as f64;

    let mut cumulative = 0.0f64;
    for (&f, &e) in frequencies.iter().zip(energy) {
        cumulative += e;
        if cumulative >= threshold {
            return f;
        }
    }

    frequencies.last().copied().unwrap_or(0.0)
}
