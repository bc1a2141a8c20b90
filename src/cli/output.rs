//! Output formatting for CLI results

use colorful::Colorful;

use crate::config::MatchPreset;
use crate::core::profile::EqProfile;
use crate::matching::{MatchResult, Severity};

/// Width of the correction bar at `max_correction`
const BAR_WIDTH: usize = 20;

/// Terminal report for one match
pub fn format_report(
    reference_name: &str,
    input_name: &str,
    reference: &EqProfile,
    input: &EqProfile,
    result: &MatchResult,
    max_correction: f32,
    verbose: bool,
) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{} {}\n{} {}\n\n",
        "Reference:".bold(),
        reference_name.cyan(),
        "Input:    ".bold(),
        input_name.cyan()
    ));

    output.push_str(&format_profile_line("Reference", reference));
    output.push_str(&format_profile_line("Input", input));

    let quality = format!("{:.0}%", result.quality_score * 100.0);
    let quality = if result.quality_score >= 0.8 {
        quality.as_str().green()
    } else if result.quality_score >= 0.5 {
        quality.as_str().yellow()
    } else {
        quality.as_str().red()
    };
    output.push_str(&format!("\n  {} {}\n", "Match quality:".bold(), quality));

    output.push_str(&format!("\n  {}\n", "Correction curve:".bold()));
    for (i, band) in result.correction_profile.bands.iter().enumerate() {
        let bar = format_bar(band.gain_db, max_correction);
        let line = format!("    {:>6.0} Hz  {:>+6.2} dB  {}", band.frequency, band.gain_db, bar);
        if band.confidence < 0.3 {
            output.push_str(&format!("{}", line.as_str().dim()));
        } else {
            output.push_str(&line);
        }
        if verbose {
            let detail = format!(
                "(ref {:+.1}, in {:+.1}, conf {:.2})",
                result.reference_normalized[i], result.input_normalized[i], band.confidence
            );
            output.push_str(&format!("  {}", detail.as_str().dim()));
        }
        output.push('\n');
    }

    if result.warnings.is_empty() {
        output.push_str(&format!("\n  {}\n", "✓ No warnings".green()));
    } else {
        output.push_str(&format!("\n  {}\n", "Warnings:".bold()));
        for warning in &result.warnings {
            let text = format!("{} {}", warning.severity().symbol(), warning);
            let text = match warning.severity() {
                Severity::Info => text.as_str().cyan(),
                Severity::Low | Severity::Medium => text.as_str().yellow(),
                Severity::High => text.as_str().red(),
            };
            output.push_str(&format!("    {}\n", text));
        }
    }

    output
}

fn format_profile_line(label: &str, profile: &EqProfile) -> String {
    format!(
        "  {:<10} loudness {:>6.1} dB | DR {:>5.1} dB | centroid {:>6.0} Hz | rolloff {:>6.0} Hz\n",
        label,
        profile.overall_loudness,
        profile.dynamic_range,
        profile.spectral_centroid,
        profile.spectral_rolloff
    )
}

/// Centred bar: cuts grow left of the axis, boosts grow right
fn format_bar(gain_db: f32, max_correction: f32) -> String {
    let half = BAR_WIDTH / 2;
    let cells = if max_correction > 0.0 {
        ((gain_db.abs() / max_correction) * half as f32).round() as usize
    } else {
        0
    }
    .min(half);

    if gain_db < 0.0 {
        format!("{}{}|{}", " ".repeat(half - cells), "█".repeat(cells), " ".repeat(half))
    } else {
        format!("{}|{}{}", " ".repeat(half), "█".repeat(cells), " ".repeat(half - cells))
    }
}

/// Preset table for `--list-presets`
pub fn format_presets() -> String {
    let mut output = format!("{}\n", "Available presets:".bold());
    for preset in MatchPreset::all() {
        output.push_str(&format!(
            "  {:<10} {}\n",
            preset.name().cyan(),
            preset.description()
        ));
    }
    output
}
