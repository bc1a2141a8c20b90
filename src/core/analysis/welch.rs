// src/core/analysis/welch.rs
//
// Welch averaging of frame power spectra. Frames are processed in
// parallel in fixed-size chunks; partial sums are combined in chunk
// order so the result does not depend on the thread count.

use rayon::prelude::*;

use super::layout::BinMap;
use crate::core::dsp::FrameExtractor;
use crate::error::Result;

/// Frames per parallel work unit
const CHUNK_FRAMES: usize = 64;

/// Everything the band aggregator and profile builder need from the frames
#[derive(Debug, Clone)]
pub struct WelchEstimate {
    /// Mean power per bin across all frames
    pub mean_power: Vec<f64>,
    /// Band energies of every frame, `[frame][band]`
    pub frame_band_energy: Vec<Vec<f64>>,
    /// Mean square of every frame's samples
    pub frame_mean_square: Vec<f64>,
}

impl WelchEstimate {
    pub fn frame_count(&self) -> usize {
        self.frame_mean_square.len()
    }
}

struct ChunkPartial {
    power_sum: Vec<f64>,
    band_energy: Vec<Vec<f64>>,
    mean_square: Vec<f64>,
}

fn process_chunk(
    extractor: &FrameExtractor,
    bin_map: &BinMap,
    samples: &[f32],
    frames: std::ops::Range<usize>,
) -> Result<ChunkPartial> {
    let mut partial = ChunkPartial {
        power_sum: vec![0.0; extractor.num_bins()],
        band_energy: Vec::with_capacity(frames.len()),
        mean_square: Vec::with_capacity(frames.len()),
    };

    for index in frames {
        let frame = extractor.frame(samples, index)?;
        for (acc, &p) in partial.power_sum.iter_mut().zip(&frame.power) {
            *acc += p as f64;
        }
        partial.band_energy.push(bin_map.band_energies(&frame.power));
        partial.mean_square.push(frame.mean_square);
    }

    Ok(partial)
}

/// Compute the averaged spectrum and per-frame statistics of `samples`
pub fn estimate(extractor: &FrameExtractor, bin_map: &BinMap, samples: &[f32]) -> Result<WelchEstimate> {
    let frame_count = extractor.frame_count(samples.len());
    let chunk_count = frame_count.div_ceil(CHUNK_FRAMES);

    let partials = (0..chunk_count)
        .into_par_iter()
        .map(|chunk| {
            let start = chunk * CHUNK_FRAMES;
            let end = (start + CHUNK_FRAMES).min(frame_count);
            process_chunk(extractor, bin_map, samples, start..end)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut mean_power = vec![0.0f64; extractor.num_bins()];
    let mut frame_band_energy = Vec::with_capacity(frame_count);
    let mut frame_mean_square = Vec::with_capacity(frame_count);
    for partial in partials {
        for (acc, p) in mean_power.iter_mut().zip(&partial.power_sum) {
            *acc += p;
        }
        frame_band_energy.extend(partial.band_energy);
        frame_mean_square.extend(partial.mean_square);
    }

    let scale = 1.0 / frame_count as f64;
    for p in &mut mean_power {
        *p *= scale;
    }

    Ok(WelchEstimate {
        mean_power,
        frame_band_energy,
        frame_mean_square,
    })
}
