// src/core/engine.rs
//
// Profile engine: owns the band layout and FFT plan, and turns PCM
// buffers into comparable EQ profiles.

use std::sync::OnceLock;

use log::{debug, info};

use super::analysis::{bands, descriptors, welch, BandLayout};
use super::dsp::FrameExtractor;
use super::profile::EqProfile;
use crate::config::{AnalysisConfig, MatchConfig};
use crate::error::{EqMatchError, Result};
use crate::matching::{self, MatchResult};

/// Builds profiles that all share one band layout
pub struct EqMatchEngine {
    config: AnalysisConfig,
    layout: BandLayout,
    extractor: FrameExtractor,
}

impl EqMatchEngine {
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: AnalysisConfig) -> Self {
        let layout = BandLayout::from_config(&config);
        let extractor = FrameExtractor::new(config.frame_size, config.hop_size, config.window);
        debug!(
            "Engine layout: {} bands, {:.1} Hz - {:.1} Hz, frame {} / hop {}",
            layout.len(),
            layout.centers().first().copied().unwrap_or(0.0),
            layout.centers().last().copied().unwrap_or(0.0),
            config.frame_size,
            config.hop_size
        );
        Self {
            config,
            layout,
            extractor,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// The band table every profile from this engine uses
    pub fn layout(&self) -> &BandLayout {
        &self.layout
    }

    /// Analyse one mono buffer
    pub fn build_profile(&self, pcm_samples: &[f32], sample_rate: u32) -> Result<EqProfile> {
        validate_pcm(pcm_samples, sample_rate, "pcm_samples")?;

        let bin_map = self.layout.bin_map(sample_rate, self.config.frame_size);
        let estimate = welch::estimate(&self.extractor, &bin_map, pcm_samples)?;
        let band_list = bands::aggregate(&self.layout, &bin_map, &estimate, &self.config);

        let bin_frequencies: Vec<f32> = (0..self.extractor.num_bins())
            .map(|k| self.extractor.bin_frequency(k, sample_rate))
            .collect();
        let profile = descriptors::build(
            band_list,
            pcm_samples,
            &estimate,
            &bin_frequencies,
            &self.config,
        );

        debug!(
            "Profile: {} samples @ {} Hz, {} frames, loudness {:.1} dB, DR {:.1} dB, centroid {:.0} Hz",
            pcm_samples.len(),
            sample_rate,
            estimate.frame_count(),
            profile.overall_loudness,
            profile.dynamic_range,
            profile.spectral_centroid
        );
        Ok(profile)
    }

    /// Analyse reference and input concurrently
    pub fn build_profiles(
        &self,
        reference: (&[f32], u32),
        input: (&[f32], u32),
    ) -> Result<(EqProfile, EqProfile)> {
        validate_pcm(reference.0, reference.1, "reference")?;
        validate_pcm(input.0, input.1, "input")?;

        let (reference_profile, input_profile) = rayon::join(
            || self.build_profile(reference.0, reference.1),
            || self.build_profile(input.0, input.1),
        );
        Ok((reference_profile?, input_profile?))
    }

    /// Analyse both buffers and compute the correction
    pub fn match_audio(
        &self,
        reference: (&[f32], u32),
        input: (&[f32], u32),
        config: &MatchConfig,
    ) -> Result<MatchResult> {
        config.validate()?;
        let (reference_profile, input_profile) = self.build_profiles(reference, input)?;
        let result = matching::match_profiles(&reference_profile, &input_profile, config)?;
        info!(
            "Match quality {:.2}, {} warning(s)",
            result.quality_score,
            result.warnings.len()
        );
        Ok(result)
    }
}

impl Default for EqMatchEngine {
    fn default() -> Self {
        Self::with_valid_config(AnalysisConfig::default())
    }
}

fn validate_pcm(samples: &[f32], sample_rate: u32, argument: &'static str) -> Result<()> {
    if sample_rate == 0 {
        return Err(EqMatchError::InvalidSampleRate(sample_rate));
    }
    if samples.is_empty() {
        return Err(EqMatchError::EmptyBuffer { argument });
    }
    if let Some((index, &value)) = samples.iter().enumerate().find(|(_, s)| !s.is_finite()) {
        return Err(EqMatchError::NonFiniteSample {
            argument,
            index,
            value,
        });
    }
    Ok(())
}

/// Process-wide engine with the default analysis settings
pub fn default_engine() -> &'static EqMatchEngine {
    static ENGINE: OnceLock<EqMatchEngine> = OnceLock::new();
    ENGINE.get_or_init(EqMatchEngine::default)
}

/// Analyse a buffer with the default engine
pub fn build_profile(pcm_samples: &[f32], sample_rate: u32) -> Result<EqProfile> {
    default_engine().build_profile(pcm_samples, sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_malformed_input() {
        let engine = EqMatchEngine::default();
        assert_eq!(
            engine.build_profile(&[], 48000),
            Err(EqMatchError::EmptyBuffer {
                argument: "pcm_samples"
            })
        );
        assert_eq!(
            engine.build_profile(&[0.1, 0.2], 0),
            Err(EqMatchError::InvalidSampleRate(0))
        );
        assert!(matches!(
            engine.build_profile(&[0.0, f32::INFINITY, 0.0], 48000),
            Err(EqMatchError::NonFiniteSample { index: 1, .. })
        ));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = AnalysisConfig {
            hop_size: 0,
            ..Default::default()
        };
        assert!(EqMatchEngine::new(config).is_err());
    }

    #[test]
    fn test_short_buffer_gives_full_layout() {
        let engine = EqMatchEngine::default();
        let profile = engine.build_profile(&[0.25; 100], 48000).unwrap();
        assert_eq!(profile.len(), engine.layout().len());
        assert!(profile.is_finite());
    }

    #[test]
    fn test_default_engine_is_shared() {
        assert!(std::ptr::eq(default_engine(), default_engine()));
        let profile = build_profile(&[0.0; 10], 44100).unwrap();
        assert_eq!(profile.len(), 31);
    }
}
