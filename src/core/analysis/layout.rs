// src/core/analysis/layout.rs
//
// Fixed fractional-octave band layout and its mapping onto FFT bins.
// The layout is built once per engine; the bin map depends on the
// sample rate of each buffer and is derived from it per call.

use crate::config::AnalysisConfig;

/// Band centres are anchored to this frequency (base-2 series)
const ANCHOR_HZ: f64 = 1000.0;

/// Log-spaced band table shared by every profile of one engine
#[derive(Debug, Clone, PartialEq)]
pub struct BandLayout {
    bands_per_octave: u32,
    centers: Vec<f32>,
    lower: Vec<f32>,
    upper: Vec<f32>,
}

impl BandLayout {
    /// Centres are `1000 * 2^(k / b)` for every integer `k` whose centre
    /// rounds into `[min_frequency, max_frequency]` on the band grid.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        let b = config.bands_per_octave.max(1) as f64;
        let k_min = (b * (config.min_frequency as f64 / ANCHOR_HZ).log2()).round() as i32;
        let k_max = (b * (config.max_frequency as f64 / ANCHOR_HZ).log2()).round() as i32;
        let half_step = 2.0_f64.powf(1.0 / (2.0 * b));

        let mut centers = Vec::new();
        let mut lower = Vec::new();
        let mut upper = Vec::new();
        for k in k_min..=k_max.max(k_min) {
            let fc = ANCHOR_HZ * 2.0_f64.powf(k as f64 / b);
            centers.push(fc as f32);
            lower.push((fc / half_step) as f32);
            upper.push((fc * half_step) as f32);
        }

        Self {
            bands_per_octave: config.bands_per_octave.max(1),
            centers,
            lower,
            upper,
        }
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    pub fn bands_per_octave(&self) -> u32 {
        self.bands_per_octave
    }

    pub fn centers(&self) -> &[f32] {
        &self.centers
    }

    pub fn lower_edge(&self, band: usize) -> f32 {
        self.lower[band]
    }

    pub fn upper_edge(&self, band: usize) -> f32 {
        self.upper[band]
    }

    pub fn bandwidth(&self, band: usize) -> f32 {
        self.upper[band] - self.lower[band]
    }

    /// Assign FFT bins of a `frame_size`-point transform at `sample_rate`
    /// to bands.
    pub fn bin_map(&self, sample_rate: u32, frame_size: usize) -> BinMap {
        let num_bins = frame_size / 2 + 1;
        let spacing = sample_rate as f64 / frame_size as f64;
        let nyquist = sample_rate as f64 / 2.0;

        let bands = (0..self.len())
            .map(|i| {
                let lo = self.lower[i] as f64;
                let hi = self.upper[i] as f64;
                if lo >= nyquist {
                    return BandBins::AboveNyquist;
                }

                // First bin with f >= lo, first bin with f >= hi
                let start = ((lo / spacing).ceil() as usize).min(num_bins);
                let end = ((hi / spacing).ceil() as usize).min(num_bins);
                if end > start {
                    return BandBins::Range { start, end };
                }

                let position = self.centers[i] as f64 / spacing;
                let below = (position.floor() as usize).min(num_bins - 1);
                let above = (below + 1).min(num_bins - 1);
                BandBins::Interpolated {
                    below,
                    above,
                    fraction: (position - below as f64).clamp(0.0, 1.0),
                    scale: (hi - lo) / spacing,
                }
            })
            .collect();

        BinMap { bands, spacing }
    }
}

/// How one band draws its energy from the bins
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BandBins {
    /// Bins `start..end` have centres inside the band; their power is summed
    Range { start: usize, end: usize },
    /// No bin centre falls inside the band. Energy is the power linearly
    /// interpolated at the band centre, times the band's width in bins.
    Interpolated {
        below: usize,
        above: usize,
        fraction: f64,
        scale: f64,
    },
    /// Lower edge at or above Nyquist: no information
    AboveNyquist,
}

impl BandBins {
    /// Band energy from a power spectrum
    pub fn energy<T: Copy + Into<f64>>(&self, power: &[T]) -> f64 {
        match *self {
            BandBins::Range { start, end } => power[start..end].iter().map(|&p| p.into()).sum(),
            BandBins::Interpolated {
                below,
                above,
                fraction,
                scale,
            } => {
                let a: f64 = power[below].into();
                let b: f64 = power[above].into();
                (a + (b - a) * fraction) * scale
            }
            BandBins::AboveNyquist => 0.0,
        }
    }

    /// Number of bins the band's energy is spread over
    pub fn effective_bins(&self) -> f64 {
        match *self {
            BandBins::Range { start, end } => (end - start) as f64,
            BandBins::Interpolated { scale, .. } => scale.max(f64::MIN_POSITIVE),
            BandBins::AboveNyquist => 0.0,
        }
    }

    pub fn is_above_nyquist(&self) -> bool {
        matches!(self, BandBins::AboveNyquist)
    }
}

/// Bin assignment for every band of a layout at one sample rate
#[derive(Debug, Clone)]
pub struct BinMap {
    bands: Vec<BandBins>,
    spacing: f64,
}

impl BinMap {
    pub fn bands(&self) -> &[BandBins] {
        &self.bands
    }

    /// Hz between adjacent bins
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Energy of every band for one power spectrum
    pub fn band_energies<T: Copy + Into<f64>>(&self, power: &[T]) -> Vec<f64> {
        self.bands.iter().map(|b| b.energy(power)).collect()
    }
}
