//! Analysis windows
//!
//! Every supported window is a generalised cosine sum
//! `w[i] = a0 - a1 cos(2πi/N) + a2 cos(4πi/N) - ...`, evaluated in its
//! periodic form so overlapping frames sum smoothly.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowType {
    Hann,
    Hamming,
    /// 4-term, -92 dB sidelobes; the default for band profiling
    BlackmanHarris,
    /// Best amplitude accuracy, widest main lobe
    FlatTop,
}

impl Default for WindowType {
    fn default() -> Self {
        Self::BlackmanHarris
    }
}

impl WindowType {
    /// Cosine-sum coefficients `a0, a1, ...` (signs alternate on use)
    fn coefficients(self) -> &'static [f64] {
        match self {
            Self::Hann => &[0.5, 0.5],
            Self::Hamming => &[0.54, 0.46],
            Self::BlackmanHarris => &[0.35875, 0.48829, 0.14128, 0.01168],
            Self::FlatTop => &[
                0.215_578_95,
                0.416_631_58,
                0.277_263_158,
                0.083_578_947,
                0.006_947_368,
            ],
        }
    }
}

/// Periodic window of `size` coefficients
pub fn create_window(size: usize, window_type: WindowType) -> Vec<f32> {
    let coefficients = window_type.coefficients();
    let n = size as f64;
    (0..size)
        .map(|i| {
            let phase = TAU * i as f64 / n;
            coefficients
                .iter()
                .enumerate()
                .map(|(k, &a)| {
                    let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                    sign * a * (k as f64 * phase).cos()
                })
                .sum::<f64>() as f32
        })
        .collect()
}

/// Sum of squared coefficients. Dividing |X|² by this makes the expected
/// per-bin power of white noise equal to its variance.
pub fn window_power(window: &[f32]) -> f64 {
    window.iter().map(|&w| (w as f64) * (w as f64)).sum()
}
