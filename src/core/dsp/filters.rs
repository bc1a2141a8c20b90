//! Peaking biquads for offline correction preview

use std::f64::consts::PI;

use biquad::{Biquad, Coefficients, DirectForm2Transposed, ToHertz, Type};
use log::debug;

use crate::core::profile::{BandProfile, EqProfile};
use crate::error::{EqMatchError, Result};

/// Corrections smaller than this are not worth a filter stage
const MIN_AUDIBLE_GAIN_DB: f32 = 0.01;

/// Q below this makes the design degenerate
const MIN_Q: f32 = 1e-3;

/// RBJ peaking filter, transposed direct form II
pub struct PeakingFilter {
    coeffs: Coefficients<f32>,
    state: DirectForm2Transposed<f32>,
}

impl PeakingFilter {
    /// Design a peaking section. Fails when the centre is not strictly
    /// below Nyquist or the frequency is negative.
    pub fn new(sample_rate: u32, frequency: f32, gain_db: f32, q: f32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(EqMatchError::InvalidSampleRate(sample_rate));
        }
        let coeffs = Coefficients::<f32>::from_params(
            Type::PeakingEQ(gain_db),
            (sample_rate as f32).hz(),
            frequency.hz(),
            q.max(MIN_Q),
        )
        .map_err(|e| {
            EqMatchError::Filter(format!(
                "peaking {:.1} Hz {:+.1} dB at {} Hz: {:?}",
                frequency, gain_db, sample_rate, e
            ))
        })?;

        Ok(Self {
            coeffs,
            state: DirectForm2Transposed::<f32>::new(coeffs),
        })
    }

    pub fn process_sample(&mut self, sample: f32) -> f32 {
        self.state.run(sample)
    }

    /// Magnitude response at `frequency`, in dB
    pub fn response_db(&self, frequency: f32, sample_rate: u32) -> f32 {
        let w = 2.0 * PI * frequency as f64 / sample_rate as f64;
        let c = &self.coeffs;
        let (b0, b1, b2) = (c.b0 as f64, c.b1 as f64, c.b2 as f64);
        let (a1, a2) = (c.a1 as f64, c.a2 as f64);
        // H(z) evaluated on the unit circle, z^-1 = e^{-jw}
        let (s1, c1) = (-w).sin_cos();
        let (s2, c2) = (-2.0 * w).sin_cos();
        let num_re = b0 + b1 * c1 + b2 * c2;
        let num_im = b1 * s1 + b2 * s2;
        let den_re = 1.0 + a1 * c1 + a2 * c2;
        let den_im = a1 * s1 + a2 * s2;
        let num = num_re * num_re + num_im * num_im;
        let den = (den_re * den_re + den_im * den_im).max(1e-30);
        (10.0 * (num / den).log10()) as f32
    }
}

/// Cascade of peaking filters, one per correction band
pub struct ParametricEq {
    filters: Vec<PeakingFilter>,
}

impl ParametricEq {
    /// Build from correction bands. Bands with negligible gain, or whose
    /// centre sits too close to Nyquist for a stable design, are skipped.
    pub fn new(sample_rate: u32, bands: &[BandProfile]) -> Self {
        let nyquist = sample_rate as f32 / 2.0;
        let filters = bands
            .iter()
            .filter(|b| b.gain_db.abs() >= MIN_AUDIBLE_GAIN_DB && b.frequency < nyquist * 0.95)
            .filter_map(
                |b| match PeakingFilter::new(sample_rate, b.frequency, b.gain_db, b.q()) {
                    Ok(filter) => Some(filter),
                    Err(e) => {
                        debug!("Skipping band: {}", e);
                        None
                    }
                },
            )
            .collect();

        Self { filters }
    }

    pub fn stage_count(&self) -> usize {
        self.filters.len()
    }

    pub fn process_sample(&mut self, sample: f32) -> f32 {
        self.filters
            .iter_mut()
            .fold(sample, |acc, filter| filter.process_sample(acc))
    }

    pub fn process_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }
}

/// Render `samples` through the correction curve (offline preview)
pub fn apply_correction(samples: &[f32], sample_rate: u32, correction: &EqProfile) -> Vec<f32> {
    let mut eq = ParametricEq::new(sample_rate, &correction.bands);
    let mut output = samples.to_vec();
    eq.process_buffer(&mut output);
    output
}
