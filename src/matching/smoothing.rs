// src/matching/smoothing.rs
//
// Cross-band Gaussian smoothing of a correction curve

/// Normalised Gaussian taps for offsets `0..=radius`
fn gaussian_taps(sigma: f32, radius: usize) -> Vec<f64> {
    let sigma = sigma as f64;
    let raw: Vec<f64> = (0..=radius)
        .map(|k| (-0.5 * (k as f64 / sigma).powi(2)).exp())
        .collect();
    let total = raw[0] + 2.0 * raw[1..].iter().sum::<f64>();
    raw.into_iter().map(|w| w / total).collect()
}

/// Half-sample mirror: ... 1 0 | 0 1 2 ... n-1 | n-1 n-2 ...
fn mirror(index: isize, len: usize) -> usize {
    let n = len as isize;
    let period = 2 * n;
    let mut j = index.rem_euclid(period);
    if j >= n {
        j = period - 1 - j;
    }
    j as usize
}

/// Smooth `values` with a Gaussian of `sigma_bands` across band index.
///
/// Reads only from `values` and returns a new buffer. Boundaries reflect
/// about the half-sample point, so every output is a weighted average
/// with weights summing to 1 and the mean of the curve is unchanged.
/// `sigma_bands <= 0` returns an exact copy.
pub fn smooth(values: &[f32], sigma_bands: f32) -> Vec<f32> {
    let n = values.len();
    if n < 2 || !(sigma_bands > 0.0) || !sigma_bands.is_finite() {
        return values.to_vec();
    }

    let radius = ((3.0 * sigma_bands).ceil() as usize).min(n);
    let taps = gaussian_taps(sigma_bands, radius);

    (0..n)
        .map(|i| {
            let mut acc = taps[0] * values[i] as f64;
            for (k, &w) in taps.iter().enumerate().skip(1) {
                let left = mirror(i as isize - k as isize, n);
                let right = mirror(i as isize + k as isize, n);
                acc += w * (values[left] as f64 + values[right] as f64);
            }
            acc as f32
        })
        .collect()
}
