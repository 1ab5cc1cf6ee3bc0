//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ProfileSummary>,
}

#[derive(Serialize)]
struct ProfileSummary {
    preset: String,
    codec: String,
    capture: String,
    skip_frames: u32,
    output_dir: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating recording profile");

    let result = validate_profile(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Profile validation failed")
    }
}

fn validate_profile(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(profile) => {
            let warnings = collect_warnings(&profile);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ProfileSummary {
                    preset: format!("{:?}", profile.preset),
                    codec: format!("{:?}", profile.codec),
                    capture: format!(
                        "{}x{} @ {} fps",
                        profile.capture_width, profile.capture_height, profile.capture_fps
                    ),
                    skip_frames: profile.skip_frames,
                    output_dir: profile.output_dir.display().to_string(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect profile warnings (non-fatal issues)
fn collect_warnings(profile: &contracts::RecordingProfile) -> Vec<String> {
    let mut warnings = Vec::new();

    let effective_fps = profile.capture_fps / (profile.skip_frames as f64 + 1.0);
    if effective_fps < 5.0 {
        warnings.push(format!(
            "Effective encode rate is only {:.1} fps (skip_frames = {})",
            effective_fps, profile.skip_frames
        ));
    }

    if profile.segment_threshold > 0.5 {
        warnings.push(format!(
            "segment_threshold {} is high - highlights may come out empty",
            profile.segment_threshold
        ));
    }

    if profile.capture_width * profile.capture_height > 3840 * 2160 {
        warnings.push("Capture resolution exceeds 4K - encoding will be expensive".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Profile is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Preset: {}", summary.preset);
            println!("  Codec: {}", summary.codec);
            println!("  Capture: {}", summary.capture);
            println!("  Skip frames: {}", summary.skip_frames);
            println!("  Output dir: {}", summary.output_dir);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Profile is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
