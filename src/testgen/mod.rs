// src/testgen/mod.rs
//
// Synthetic signal generation for tests and demos.
// Produces deterministic noise, tones and EQ-coloured noise, and can
// write them to WAV so the full decode -> match pipeline can be driven
// from files.

use std::path::Path;

use anyhow::{Context, Result};
use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::dsp::PeakingFilter;

/// A peaking boost or cut applied to generated noise
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coloration {
    pub frequency: f32,
    pub gain_db: f32,
    pub q: f32,
}

impl Coloration {
    pub fn new(frequency: f32, gain_db: f32, q: f32) -> Self {
        Self {
            frequency,
            gain_db,
            q,
        }
    }
}

/// Uniform white noise in `[-amplitude, amplitude)`, reproducible per seed
pub fn white_noise(len: usize, amplitude: f32, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| rng.random_range(-amplitude..amplitude))
        .collect()
}

/// Pure tone
pub fn sine(frequency: f32, sample_rate: u32, len: usize, amplitude: f32) -> Vec<f32> {
    let step = 2.0 * std::f64::consts::PI * frequency as f64 / sample_rate as f64;
    (0..len)
        .map(|i| (amplitude as f64 * (step * i as f64).sin()) as f32)
        .collect()
}

/// White noise pushed through a chain of peaking filters
pub fn colored_noise(
    len: usize,
    sample_rate: u32,
    amplitude: f32,
    seed: u64,
    colorations: &[Coloration],
) -> Vec<f32> {
    let mut samples = white_noise(len, amplitude, seed);
    for c in colorations {
        let mut filter = match PeakingFilter::new(sample_rate, c.frequency, c.gain_db, c.q) {
            Ok(filter) => filter,
            Err(e) => {
                warn!("Skipping coloration: {}", e);
                continue;
            }
        };
        for s in samples.iter_mut() {
            *s = filter.process_sample(*s);
        }
    }
    samples
}

/// Noise whose level alternates between `loud` and `quiet` every
/// `segment` samples (a crude wide-dynamics signal)
pub fn gated_noise(len: usize, segment: usize, loud: f32, quiet: f32, seed: u64) -> Vec<f32> {
    let segment = segment.max(1);
    white_noise(len, 1.0, seed)
        .into_iter()
        .enumerate()
        .map(|(i, s)| if (i / segment) % 2 == 0 { s * loud } else { s * quiet })
        .collect()
}

/// Write mono 32-bit float WAV
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;
    for &s in samples {
        writer.write_sample(s)?;
    }
    writer
        .finalize()
        .with_context(|| format!("Failed to finalize WAV file: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_is_seeded() {
        assert_eq!(white_noise(64, 0.5, 7), white_noise(64, 0.5, 7));
        assert_ne!(white_noise(64, 0.5, 7), white_noise(64, 0.5, 8));
        assert!(white_noise(1000, 0.5, 1).iter().all(|s| s.abs() <= 0.5));
    }

    #[test]
    fn test_sine_amplitude() {
        let tone = sine(1000.0, 48000, 4800, 0.25);
        let peak = tone.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!((peak - 0.25).abs() < 1e-3);
    }

    #[test]
    fn test_unrealisable_coloration_is_skipped() {
        let plain = white_noise(2048, 0.5, 5);
        let above_nyquist = colored_noise(2048, 8000, 0.5, 5, &[Coloration::new(6000.0, 6.0, 1.0)]);
        assert_eq!(above_nyquist, plain);

        let boosted = colored_noise(2048, 8000, 0.5, 5, &[Coloration::new(1000.0, 6.0, 1.0)]);
        assert_ne!(boosted, plain);
        assert!(boosted.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_gated_noise_levels() {
        let noise = gated_noise(400, 100, 1.0, 0.01, 3);
        let loud = noise[..100].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        let quiet = noise[100..200].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(quiet <= 0.01);
        assert!(loud > 0.5);
    }
}
