// src/core/profile.rs
//
// Band-level and whole-signal profile value types.

use serde::{Deserialize, Serialize};

/// One band of a profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandProfile {
    /// Centre frequency in Hz
    pub frequency: f32,
    /// Level relative to the whole-signal reference, in dB (or, in a
    /// correction profile, the gain to apply)
    pub gain_db: f32,
    /// Band width in Hz, fixed by the layout
    pub bandwidth: f32,
    /// Reliability of `gain_db`, 0.0 - 1.0
    pub confidence: f32,
}

impl BandProfile {
    /// Quality factor of the equivalent peaking filter
    pub fn q(&self) -> f32 {
        if self.bandwidth > 0.0 {
            self.frequency / self.bandwidth
        } else {
            0.0
        }
    }

    /// Lower band edge, assuming the centre is the geometric mean of the edges
    pub fn lower_edge(&self) -> f32 {
        let (f, bw) = (self.frequency as f64, self.bandwidth as f64);
        (((bw * bw + 4.0 * f * f).sqrt() - bw) / 2.0) as f32
    }

    /// Upper band edge
    pub fn upper_edge(&self) -> f32 {
        self.lower_edge() + self.bandwidth
    }
}

/// Frequency-band profile of a signal plus whole-signal descriptors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EqProfile {
    pub bands: Vec<BandProfile>,
    /// dB
    pub overall_loudness: f32,
    /// dB, percentile spread of frame loudness
    pub dynamic_range: f32,
    /// Hz
    pub spectral_centroid: f32,
    /// Hz
    pub spectral_rolloff: f32,
}

impl EqProfile {
    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    pub fn gains(&self) -> Vec<f32> {
        self.bands.iter().map(|b| b.gain_db).collect()
    }

    /// Index of the band whose centre is closest to `frequency` on a log scale
    pub fn nearest_band(&self, frequency: f32) -> Option<usize> {
        if frequency <= 0.0 {
            return None;
        }
        let target = frequency.ln();
        self.bands
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                (a.frequency.ln() - target)
                    .abs()
                    .total_cmp(&(b.frequency.ln() - target).abs())
            })
            .map(|(i, _)| i)
    }

    /// True when every numeric field is finite
    pub fn is_finite(&self) -> bool {
        self.overall_loudness.is_finite()
            && self.dynamic_range.is_finite()
            && self.spectral_centroid.is_finite()
            && self.spectral_rolloff.is_finite()
            && self.bands.iter().all(|b| {
                b.frequency.is_finite()
                    && b.gain_db.is_finite()
                    && b.bandwidth.is_finite()
                    && b.confidence.is_finite()
            })
    }
}
