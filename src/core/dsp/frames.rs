//! Spectral frame extraction: windowed, overlapping power spectra

use std::sync::Arc;

use num_complex::Complex32;
use realfft::{RealFftPlanner, RealToComplex};

use super::windows::{create_window, window_power, WindowType};
use crate::error::{EqMatchError, Result};

/// One analysis frame: linear power per bin plus the time-domain level
#[derive(Debug, Clone)]
pub struct SpectralFrame {
    /// Frame position in the sequence
    pub index: usize,
    /// Power per bin, `frame_size / 2 + 1` values, phase discarded
    pub power: Vec<f32>,
    /// Mean square of the frame's real (non-padded) samples
    pub mean_square: f64,
}

/// Windows a mono buffer into fixed-size frames and transforms each one.
///
/// Frame geometry never depends on the input: a trailing partial frame is
/// zero-padded, so any buffer (even an empty one) yields at least one frame.
pub struct FrameExtractor {
    fft: Arc<dyn RealToComplex<f32>>,
    window: Vec<f32>,
    /// 1 / Σw²
    power_scale: f64,
    frame_size: usize,
    hop_size: usize,
}

impl FrameExtractor {
    pub fn new(frame_size: usize, hop_size: usize, window_type: WindowType) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(frame_size);
        let window = create_window(frame_size, window_type);
        let power_scale = 1.0 / window_power(&window).max(f64::MIN_POSITIVE);

        Self {
            fft,
            window,
            power_scale,
            frame_size,
            hop_size: hop_size.max(1),
        }
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Number of spectrum bins per frame
    pub fn num_bins(&self) -> usize {
        self.frame_size / 2 + 1
    }

    /// Centre frequency of bin `k`
    pub fn bin_frequency(&self, k: usize, sample_rate: u32) -> f32 {
        k as f32 * sample_rate as f32 / self.frame_size as f32
    }

    /// Frames needed to cover `len` samples
    pub fn frame_count(&self, len: usize) -> usize {
        if len <= self.frame_size {
            1
        } else {
            1 + (len - self.frame_size).div_ceil(self.hop_size)
        }
    }

    /// Compute frame `index` of `samples`
    pub fn frame(&self, samples: &[f32], index: usize) -> Result<SpectralFrame> {
        let start = (index * self.hop_size).min(samples.len());
        let end = (start + self.frame_size).min(samples.len());
        let chunk = &samples[start..end];

        let mean_square = if chunk.is_empty() {
            0.0
        } else {
            chunk.iter().map(|&s| (s as f64) * (s as f64)).sum::<f64>() / chunk.len() as f64
        };

        let mut input = self.fft.make_input_vec();
        for (slot, (&s, &w)) in input.iter_mut().zip(chunk.iter().zip(&self.window)) {
            *slot = s * w;
        }
        // Anything past `chunk.len()` stays zero: the padding.

        let mut spectrum = self.fft.make_output_vec();
        let mut scratch = self.fft.make_scratch_vec();
        self.fft
            .process_with_scratch(&mut input, &mut spectrum, &mut scratch)
            .map_err(|e| EqMatchError::Fft(e.to_string()))?;

        let power = spectrum
            .iter()
            .map(|c: &Complex32| (c.norm_sqr() as f64 * self.power_scale) as f32)
            .collect();

        Ok(SpectralFrame {
            index,
            power,
            mean_square,
        })
    }

    /// Lazy frame sequence over `samples`
    pub fn frames<'a>(&'a self, samples: &'a [f32]) -> Frames<'a> {
        Frames {
            extractor: self,
            samples,
            next: 0,
            count: self.frame_count(samples.len()),
        }
    }
}

/// Iterator returned by [`FrameExtractor::frames`]
pub struct Frames<'a> {
    extractor: &'a FrameExtractor,
    samples: &'a [f32],
    next: usize,
    count: usize,
}

impl Iterator for Frames<'_> {
    type Item = Result<SpectralFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        let frame = self.extractor.frame(self.samples, self.next);
        self.next += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Frames<'_> {}
