//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::BitratePreset;
use std::path::PathBuf;

/// Ridecam - bike dashcam capture-to-highlight pipeline
#[derive(Parser, Debug)]
#[command(
    name = "ridecam",
    author,
    version,
    about = "Bike dashcam recording pipeline",
    long_about = "Captures video and motion/position sensor streams, decimates and \n\
                  encodes kept frames into a recording, scores frames for interest, \n\
                  and composes a highlight from the committed segments."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "RIDECAM_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "RIDECAM_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record a ride and compose the highlight
    Run(RunArgs),

    /// Validate a profile file without recording
    Validate(ValidateArgs),

    /// Display the effective recording profile
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to the recording profile (TOML or JSON); built-in defaults are
    /// used when the default path does not exist
    #[arg(short, long, default_value = "ridecam.toml", env = "RIDECAM_CONFIG")]
    pub config: PathBuf,

    /// Override the bitrate preset from the profile
    #[arg(long, value_enum, env = "RIDECAM_PRESET")]
    pub preset: Option<PresetArg>,

    /// Override the decimation skip count (9 keeps 1 in 10)
    #[arg(long, env = "RIDECAM_SKIP_FRAMES")]
    pub skip_frames: Option<u32>,

    /// Override the output directory
    #[arg(long, env = "RIDECAM_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Maximum number of kept frames to encode (0 = unlimited)
    #[arg(long, default_value = "0", env = "RIDECAM_MAX_FRAMES")]
    pub max_frames: u64,

    /// Recording duration in seconds (0 = until interrupted)
    #[arg(long, default_value = "0", env = "RIDECAM_DURATION")]
    pub duration: u64,

    /// Validate the profile and exit without recording
    #[arg(long)]
    pub dry_run: bool,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", env = "RIDECAM_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to the profile file to validate
    #[arg(short, long, default_value = "ridecam.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to the profile file (built-in defaults when missing)
    #[arg(short, long, default_value = "ridecam.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

/// Bitrate preset values accepted on the command line
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum PresetArg {
    /// 35 Mb/s
    HighQuality,
    /// 25 Mb/s
    Standard,
    /// 15 Mb/s
    PowerSaving,
    /// 10 Mb/s
    Compression,
}

impl From<PresetArg> for BitratePreset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::HighQuality => BitratePreset::HighQuality,
            PresetArg::Standard => BitratePreset::Standard,
            PresetArg::PowerSaving => BitratePreset::PowerSaving,
            PresetArg::Compression => BitratePreset::Compression,
        }
    }
}
