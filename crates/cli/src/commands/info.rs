//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::RecordingProfile;
use tracing::info;

use crate::cli::InfoArgs;

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    let (profile, from_file) = if args.config.exists() {
        info!(config = %args.config.display(), "Loading recording profile");
        let profile = config_loader::ConfigLoader::load_from_path(&args.config)
            .with_context(|| format!("Failed to load profile from {}", args.config.display()))?;
        (profile, true)
    } else {
        info!("No profile file found, showing built-in defaults");
        (RecordingProfile::default(), false)
    };

    if args.json {
        let json =
            serde_json::to_string_pretty(&profile).context("Failed to serialize profile")?;
        println!("{}", json);
    } else {
        print_profile(&profile, &args.config.display().to_string(), from_file);
    }

    Ok(())
}

fn print_profile(profile: &RecordingProfile, path: &str, from_file: bool) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  Ridecam Recording Profile                   ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    if from_file {
        println!("📄 Source: {}", path);
    } else {
        println!("📄 Source: built-in defaults ({} not found)", path);
    }

    println!("\n🎬 Encoding");
    println!(
        "   ├─ Preset: {:?} ({} Mb/s)",
        profile.preset,
        profile.preset.bits_per_second() / 1_000_000
    );
    println!(
        "   ├─ Codec: {:?} (.{})",
        profile.codec,
        profile.codec.file_extension()
    );
    println!("   └─ Writer queue: {} chunks", profile.writer_queue_capacity);

    println!("\n📷 Capture");
    println!(
        "   ├─ Resolution: {}x{} @ {} fps",
        profile.capture_width, profile.capture_height, profile.capture_fps
    );
    println!(
        "   ├─ Decimation: skip {} (keep 1 in {}, {:.1} fps effective)",
        profile.skip_frames,
        profile.skip_frames + 1,
        profile.capture_fps / (profile.skip_frames as f64 + 1.0)
    );
    println!("   ├─ HDR: {}", profile.hdr);
    println!("   └─ Stabilization: {}", profile.stabilization);

    println!("\n🔀 Queues");
    println!("   ├─ Frames: {}", profile.frame_queue_capacity);
    println!("   └─ Samples: {}", profile.sample_queue_capacity);

    println!("\n🎞  Highlight");
    println!("   └─ Segment threshold: {}", profile.segment_threshold);

    println!("\n💾 Output");
    println!("   └─ Directory: {}", profile.output_dir.display());

    println!();
}
