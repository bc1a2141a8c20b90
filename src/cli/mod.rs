// src/cli/mod.rs
//
// Command-line interface module

mod args;
mod output;

pub use args::Args;
pub use output::{format_presets, format_report};

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::info;

use crate::config::{MatchConfig, CANONICAL_SAMPLE_RATE};
use crate::core::dsp::apply_correction;
use crate::core::{default_engine, load_mono, EqProfile};
use crate::export::{preamp_db, render_export, ExportFormat};
use crate::matching::{match_profiles, MatchResult};
use crate::testgen::write_wav;

/// Run the CLI
pub fn run(args: &Args) -> Result<()> {
    if args.list_presets {
        print!("{}", format_presets());
        return Ok(());
    }

    let (reference_path, input_path) = match (&args.reference, &args.input) {
        (Some(reference), Some(input)) => (reference.as_path(), input.as_path()),
        _ => bail!("Both --reference and --input are required"),
    };

    let config = args.match_config()?;

    let (reference_audio, input_audio) = rayon::join(
        || load_mono(reference_path, CANONICAL_SAMPLE_RATE),
        || load_mono(input_path, CANONICAL_SAMPLE_RATE),
    );
    let reference_audio = reference_audio
        .with_context(|| format!("Failed to load reference: {}", reference_path.display()))?;
    let input_audio =
        input_audio.with_context(|| format!("Failed to load input: {}", input_path.display()))?;

    let engine = default_engine();
    let (reference, input) = engine.build_profiles(
        (&reference_audio.samples, reference_audio.sample_rate),
        (&input_audio.samples, input_audio.sample_rate),
    )?;
    let result = match_profiles(&reference, &input, &config)?;
    info!(
        "Matched with quality {:.3} and {} warning(s)",
        result.quality_score,
        result.warnings.len()
    );

    let export = render_export(&result.correction_profile, args.format)?;
    match &args.output {
        Some(path) => {
            let path = &export_path(path, args.format);
            std::fs::write(path, &export)
                .with_context(|| format!("Failed to write export: {}", path.display()))?;
            print_report(args, &config, (reference_path, &reference), (input_path, &input), &result);
            println!("\n  Export ({}) written to: {}", args.format.name(), path.display());
        }
        // Keep stdout machine-readable
        None if args.format == ExportFormat::Json => print!("{}", export),
        None => {
            print_report(args, &config, (reference_path, &reference), (input_path, &input), &result);
            println!();
            print!("{}", export);
        }
    }

    if let Some(path) = &args.preview {
        let gain = 10f32.powf(preamp_db(&result.correction_profile) / 20.0);
        let mut rendered =
            apply_correction(&input_audio.samples, input_audio.sample_rate, &result.correction_profile);
        for s in rendered.iter_mut() {
            *s *= gain;
        }
        write_wav(path, &rendered, input_audio.sample_rate)?;
        info!("Preview written to {}", path.display());
    }

    Ok(())
}

/// `path`, with the format's extension when it has none
fn export_path(path: &Path, format: ExportFormat) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(format.extension())
    }
}

fn print_report(
    args: &Args,
    config: &MatchConfig,
    reference: (&Path, &EqProfile),
    input: (&Path, &EqProfile),
    result: &MatchResult,
) {
    print!(
        "{}",
        format_report(
            &reference.0.display().to_string(),
            &input.0.display().to_string(),
            reference.1,
            input.1,
            result,
            config.max_correction,
            args.verbose > 0,
        )
    );
}
