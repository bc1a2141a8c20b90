// src/core/decoder.rs
//
// Audio decoding, mono downmix and resampling to the analysis rate.
// Uses Symphonia for format-agnostic decoding and rubato for sample
// rate conversion.

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use log::{debug, info};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Resampler chunk length in frames
const RESAMPLE_CHUNK: usize = 1024;

/// Decoded PCM, interleaved when `channels > 1`
#[derive(Debug, Clone)]
pub struct AudioData {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: usize,
    pub duration_secs: f64,
    /// Codec as reported by the container, for logs
    pub codec_name: String,
}

/// First decodable track of a file, ready to pull packets from
struct OpenedTrack {
    reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    id: u32,
    sample_rate: u32,
    channels: usize,
    codec_name: String,
}

impl OpenedTrack {
    fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
        let stream = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }
        let reader = symphonia::default::get_probe()
            .format(&hint, stream, &FormatOptions::default(), &MetadataOptions::default())
            .with_context(|| format!("Unrecognised audio format: {}", path.display()))?
            .format;

        let params = reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .map(|t| (t.id, t.codec_params.clone()))
            .context("No decodable audio track")?;
        let (id, params) = params;

        let sample_rate = params.sample_rate.context("Track has no sample rate")?;
        let channels = params.channels.map(|c| c.count()).unwrap_or(2);
        if channels == 0 {
            bail!("Track reports no channels");
        }
        let decoder = symphonia::default::get_codecs()
            .make(&params, &DecoderOptions::default())
            .context("Unsupported codec")?;

        Ok(Self {
            reader,
            decoder,
            id,
            sample_rate,
            channels,
            codec_name: format!("{:?}", params.codec),
        })
    }

    /// Next packet of this track, `None` at end of stream
    fn next_packet(&mut self) -> Result<Option<Packet>> {
        loop {
            match self.reader.next_packet() {
                Ok(packet) if packet.track_id() == self.id => return Ok(Some(packet)),
                Ok(_) => {}
                Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => {
                    return Ok(None)
                }
                Err(SymphoniaError::ResetRequired) => self.decoder.reset(),
                Err(e) => return Err(e).context("Failed to read packet"),
            }
        }
    }
}

/// Decode a whole file to interleaved `f32` samples
pub fn decode_audio(path: &Path) -> Result<AudioData> {
    let mut track = OpenedTrack::open(path)?;
    let mut samples: Vec<f32> = Vec::new();
    let mut scratch: Option<SampleBuffer<f32>> = None;
    let mut skipped = 0usize;

    while let Some(packet) = track.next_packet()? {
        let decoded = match track.decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                skipped += 1;
                debug!("Dropping corrupt packet: {}", e);
                continue;
            }
            Err(e) => return Err(e).context("Decoder failed"),
        };
        let scratch = scratch
            .get_or_insert_with(|| SampleBuffer::new(decoded.capacity() as u64, *decoded.spec()));
        scratch.copy_interleaved_ref(decoded);
        samples.extend_from_slice(scratch.samples());
    }

    if samples.is_empty() {
        bail!("{} contains no audio", path.display());
    }
    if skipped > 0 {
        debug!("{} corrupt packet(s) skipped in {}", skipped, path.display());
    }

    Ok(AudioData {
        duration_secs: samples.len() as f64 / (track.sample_rate as f64 * track.channels as f64),
        samples,
        sample_rate: track.sample_rate,
        channels: track.channels,
        codec_name: track.codec_name,
    })
}

/// Downmix multi-channel audio to mono by averaging channels
pub fn extract_mono(audio: &AudioData) -> Vec<f32> {
    if audio.channels <= 1 {
        return audio.samples.clone();
    }

    audio
        .samples
        .chunks_exact(audio.channels)
        .map(|frame| frame.iter().sum::<f32>() / audio.channels as f32)
        .collect()
}

/// Offline sinc resampling of a mono buffer. Output length is
/// `ceil(len * to / from)` with the resampler delay removed.
pub fn resample_mono(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == 0 || to_rate == 0 {
        bail!("Cannot resample between {} Hz and {} Hz", from_rate, to_rate);
    }
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let params = SincInterpolationParameters {
        sinc_len: 128,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Cubic,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris,
    };
    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, RESAMPLE_CHUNK, 1)
        .map_err(|e| anyhow!("Resampler construction failed: {}", e))?;

    let expected_len = (samples.len() as f64 * ratio).ceil() as usize;
    let delay = resampler.output_delay();
    let mut output: Vec<f32> = Vec::with_capacity(expected_len + delay);

    let mut chunks = samples.chunks_exact(RESAMPLE_CHUNK);
    for chunk in chunks.by_ref() {
        let out = resampler
            .process(&[chunk][..], None)
            .map_err(|e| anyhow!("Resampling failed: {}", e))?;
        output.extend_from_slice(&out[0]);
    }

    let tail = chunks.remainder();
    if !tail.is_empty() {
        let out = resampler
            .process_partial(Some(&[tail][..]), None)
            .map_err(|e| anyhow!("Resampling failed: {}", e))?;
        output.extend_from_slice(&out[0]);
    }

    // Flush the filter delay line
    while output.len() < expected_len + delay {
        let out = resampler
            .process_partial::<&[f32]>(None, None)
            .map_err(|e| anyhow!("Resampling failed: {}", e))?;
        if out[0].is_empty() {
            break;
        }
        output.extend_from_slice(&out[0]);
    }

    let start = delay.min(output.len());
    let mut trimmed = output.split_off(start);
    trimmed.truncate(expected_len);
    Ok(trimmed)
}

/// Decode, downmix and resample a file for analysis
pub fn load_mono(path: &Path, target_rate: u32) -> Result<AudioData> {
    let audio = decode_audio(path)?;
    info!(
        "Decoded {}: {} Hz, {} ch, {:.2}s ({})",
        path.display(),
        audio.sample_rate,
        audio.channels,
        audio.duration_secs,
        audio.codec_name
    );

    let mono = extract_mono(&audio);
    let samples = resample_mono(&mono, audio.sample_rate, target_rate)
        .with_context(|| format!("Failed to resample {}", path.display()))?;
    if audio.sample_rate != target_rate {
        debug!(
            "Resampled {} -> {} Hz ({} -> {} samples)",
            audio.sample_rate,
            target_rate,
            mono.len(),
            samples.len()
        );
    }

    Ok(AudioData {
        duration_secs: samples.len() as f64 / target_rate as f64,
        samples,
        sample_rate: target_rate,
        channels: 1,
        codec_name: audio.codec_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downmix_averages_channels() {
        let stereo = AudioData {
            samples: vec![0.4, 0.2, -1.0, 0.0, 0.25, 0.75],
            sample_rate: 48_000,
            channels: 2,
            duration_secs: 3.0 / 48_000.0,
            codec_name: "pcm".into(),
        };
        assert_eq!(extract_mono(&stereo), vec![0.3, -0.5, 0.5]);

        let mono = AudioData { channels: 1, ..stereo.clone() };
        assert_eq!(extract_mono(&mono), stereo.samples);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = decode_audio(Path::new("/nonexistent/eqmatch.wav")).unwrap_err();
        assert!(err.to_string().contains("Cannot open"));
    }

    #[test]
    fn test_resample_passthrough() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(resample_mono(&samples, 48000, 48000).unwrap(), samples);
        assert!(resample_mono(&[], 44100, 48000).unwrap().is_empty());
        assert!(resample_mono(&samples, 0, 48000).is_err());
    }

    #[test]
    fn test_resample_length_and_level() {
        let from = 44100;
        let to = 48000;
        let tone: Vec<f32> = (0..from as usize)
            .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / from as f32).sin())
            .collect();
        let out = resample_mono(&tone, from, to).unwrap();
        assert_eq!(out.len(), to as usize);

        let mid = &out[4800..43200];
        let peak = mid.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!((peak - 0.5).abs() < 0.02, "peak {}", peak);
    }
}
