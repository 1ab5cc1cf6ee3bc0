//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Pipeline, RunConfig};

use contracts::RecordingProfile;

/// Execute the `run` command
pub async fn run_recording(args: &RunArgs) -> Result<()> {
    // Load the profile; the default path falling back to built-in defaults
    // lets `ridecam run` work out of the box
    let mut profile = if args.config.exists() {
        info!(config = %args.config.display(), "Loading recording profile");
        config_loader::ConfigLoader::load_from_path(&args.config)
            .with_context(|| format!("Failed to load profile from {}", args.config.display()))?
    } else if args.config.as_os_str() == "ridecam.toml" {
        info!("No profile file found, using built-in defaults");
        RecordingProfile::default()
    } else {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    };

    // Apply CLI overrides
    if let Some(preset) = args.preset {
        info!(preset = ?preset, "Overriding bitrate preset from CLI");
        profile.preset = preset.into();
    }
    if let Some(skip_frames) = args.skip_frames {
        info!(skip_frames, "Overriding skip count from CLI");
        profile.skip_frames = skip_frames;
    }
    if let Some(ref output_dir) = args.output_dir {
        info!(output_dir = %output_dir.display(), "Overriding output directory from CLI");
        profile.output_dir = output_dir.clone();
    }

    info!(
        preset = ?profile.preset,
        codec = ?profile.codec,
        skip_frames = profile.skip_frames,
        capture = format!("{}x{}@{}", profile.capture_width, profile.capture_height, profile.capture_fps),
        output_dir = %profile.output_dir.display(),
        "Profile loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - profile is valid, exiting");
        print_profile_summary(&profile);
        return Ok(());
    }

    // Build run configuration
    let run_config = RunConfig {
        profile,
        max_frames: if args.max_frames == 0 {
            None
        } else {
            Some(args.max_frames)
        },
        duration: if args.duration == 0 {
            None
        } else {
            Some(Duration::from_secs(args.duration))
        },
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    // Create pipeline and graceful shutdown handler
    let pipeline = Pipeline::new(run_config);
    let shutdown_signal = setup_shutdown_signal();

    info!("Starting recording...");

    tokio::select! {
        result = pipeline.run() => {
            match result {
                Ok(stats) => {
                    info!(
                        frames_kept = stats.frames_kept,
                        segments = stats.segments_committed,
                        duration_secs = stats.duration.as_secs_f64(),
                        "Recording completed successfully"
                    );
                    stats.print_summary();
                }
                Err(e) => {
                    return Err(e).context("Recording failed");
                }
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping recording...");
        }
    }

    info!("ridecam finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print profile summary for dry-run mode
fn print_profile_summary(profile: &RecordingProfile) {
    println!("\n=== Profile Summary ===\n");
    println!("Encoding:");
    println!(
        "  Preset: {:?} ({} Mb/s)",
        profile.preset,
        profile.preset.bits_per_second() / 1_000_000
    );
    println!("  Codec: {:?} (.{})", profile.codec, profile.codec.file_extension());
    println!("\nCapture:");
    println!(
        "  Resolution: {}x{} @ {} fps",
        profile.capture_width, profile.capture_height, profile.capture_fps
    );
    println!(
        "  Decimation: skip {} (keep 1 in {})",
        profile.skip_frames,
        profile.skip_frames + 1
    );
    println!("  HDR: {}  Stabilization: {}", profile.hdr, profile.stabilization);
    println!("\nOutput:");
    println!("  Directory: {}", profile.output_dir.display());
    println!("  Segment threshold: {}", profile.segment_threshold);
    println!();
}
