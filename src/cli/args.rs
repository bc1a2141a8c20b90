//! CLI argument parsing with preset support

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::config::{MatchConfig, MatchConfigBuilder, MatchPreset};
use crate::export::ExportFormat;

/// Parsed command line
#[derive(Parser, Debug)]
#[command(name = "eqmatch", version)]
#[command(about = "Match the tonal balance of an input recording to a reference")]
pub struct Args {
    /// Reference recording (the sound to aim for)
    #[arg(short, long, required_unless_present = "list_presets")]
    pub reference: Option<PathBuf>,

    /// Input recording (the one to correct)
    #[arg(short, long, required_unless_present = "list_presets")]
    pub input: Option<PathBuf>,

    /// Match preset: gentle, balanced, full, surgical
    #[arg(short, long, default_value = "balanced", value_parser = parse_preset)]
    pub preset: MatchPreset,

    /// JSON match configuration (overrides the preset)
    #[arg(short, long, env = "EQMATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Fraction of the gap to correct (0.0 - 1.0)
    #[arg(long)]
    pub intensity: Option<f32>,

    /// Maximum correction per band in dB
    #[arg(long)]
    pub max_correction: Option<f32>,

    /// Cross-band smoothing (0.0 - 1.0)
    #[arg(long)]
    pub smoothing: Option<f32>,

    /// Disable psychoacoustic weighting
    #[arg(long)]
    pub no_psychoacoustic: bool,

    /// Disable dynamics preservation
    #[arg(long)]
    pub no_dynamics: bool,

    /// Export format: apo, json, text
    #[arg(short, long, default_value = "apo", value_parser = parse_format)]
    pub format: ExportFormat,

    /// Write the export here instead of stdout; the format's extension is
    /// added when the path has none
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Render the corrected input to this WAV file
    #[arg(long)]
    pub preview: Option<PathBuf>,

    /// List available presets and exit
    #[arg(long)]
    pub list_presets: bool,

    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn parse_preset(name: &str) -> std::result::Result<MatchPreset, String> {
    MatchPreset::from_name(name).ok_or_else(|| {
        let names: Vec<&str> = MatchPreset::all().iter().map(|p| p.name()).collect();
        format!("Unknown preset: {} (expected one of {})", name, names.join(", "))
    })
}

fn parse_format(name: &str) -> std::result::Result<ExportFormat, String> {
    name.parse().map_err(|e: crate::error::EqMatchError| e.to_string())
}

impl Args {
    /// Starting config (file or preset) with command-line overrides applied
    pub fn match_config(&self) -> Result<MatchConfig> {
        let base = match &self.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config: {}", path.display()))?;
                MatchConfig::from_json(&json)
                    .with_context(|| format!("Invalid config: {}", path.display()))?
            }
            None => MatchConfig::from_preset(self.preset),
        };

        let mut builder = MatchConfigBuilder::from_config(base);
        if let Some(intensity) = self.intensity {
            builder = builder.intensity(intensity);
        }
        if let Some(db) = self.max_correction {
            builder = builder.max_correction(db);
        }
        if let Some(factor) = self.smoothing {
            builder = builder.smoothing(factor);
        }
        if self.no_psychoacoustic {
            builder = builder.psychoacoustic(false);
        }
        if self.no_dynamics {
            builder = builder.preserve_dynamics(false);
        }

        Ok(builder.build()?)
    }
}
