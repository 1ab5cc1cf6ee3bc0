//! RecordingProfile - external configuration surface
//!
//! Parsed from TOML/JSON by the config loader. Declarative field checks live
//! here via `validator`; cross-field semantic checks live in the loader.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Encoder bitrate presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitratePreset {
    /// 35 Mb/s
    HighQuality,
    /// 25 Mb/s
    Standard,
    /// 15 Mb/s
    PowerSaving,
    /// 10 Mb/s
    Compression,
}

impl BitratePreset {
    /// Target bitrate in bits per second
    pub fn bits_per_second(&self) -> u64 {
        match self {
            BitratePreset::HighQuality => 35_000_000,
            BitratePreset::Standard => 25_000_000,
            BitratePreset::PowerSaving => 15_000_000,
            BitratePreset::Compression => 10_000_000,
        }
    }
}

/// Output codec selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Codec {
    Hevc,
    H264,
}

impl Codec {
    /// Container extension conventionally paired with the codec
    pub fn file_extension(&self) -> &'static str {
        match self {
            Codec::Hevc => "mov",
            Codec::H264 => "mp4",
        }
    }
}

/// Fully-resolved encoder session configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Bitrate preset
    pub preset: BitratePreset,

    /// Output width in pixels
    pub width: u32,

    /// Output height in pixels
    pub height: u32,

    /// Codec (drives the container extension)
    pub codec: Codec,

    /// Frames between forced keyframes
    pub keyframe_interval: u64,

    /// Output timebase rate; presentation timestamps are `sequence / nominal_fps`
    pub nominal_fps: f64,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            preset: BitratePreset::HighQuality,
            width: 3840,
            height: 2160,
            codec: Codec::Hevc,
            keyframe_interval: 120,
            nominal_fps: 30.0,
        }
    }
}

/// User-facing recording profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RecordingProfile {
    /// Encoder bitrate preset
    pub preset: BitratePreset,

    /// Output codec
    pub codec: Codec,

    /// Frames skipped between kept frames (9 keeps 1 in 10)
    pub skip_frames: u32,

    /// Request video stabilization from the device
    pub stabilization: bool,

    /// Request HDR capture (degrades to off when unsupported)
    pub hdr: bool,

    /// Capture frame rate
    #[validate(range(min = 1.0, max = 240.0))]
    pub capture_fps: f64,

    /// Capture width in pixels
    #[validate(range(min = 16))]
    pub capture_width: u32,

    /// Capture height in pixels
    #[validate(range(min = 16))]
    pub capture_height: u32,

    /// Directory for recordings and highlight output
    pub output_dir: PathBuf,

    /// Bounded frame channel capacity
    #[validate(range(min = 1))]
    pub frame_queue_capacity: usize,

    /// Bounded sensor sample channel capacity
    #[validate(range(min = 1))]
    pub sample_queue_capacity: usize,

    /// Bounded encoder writer queue capacity
    #[validate(range(min = 1))]
    pub writer_queue_capacity: usize,

    /// Base acceptance threshold scaled per category by the segment selector
    #[validate(range(min = 0.0, max = 1.0))]
    pub segment_threshold: f64,
}

impl Default for RecordingProfile {
    fn default() -> Self {
        Self {
            preset: BitratePreset::HighQuality,
            codec: Codec::Hevc,
            skip_frames: 9,
            stabilization: true,
            hdr: true,
            capture_fps: 30.0,
            capture_width: 3840,
            capture_height: 2160,
            output_dir: PathBuf::from("recordings"),
            frame_queue_capacity: 64,
            sample_queue_capacity: 256,
            writer_queue_capacity: 120,
            segment_threshold: 0.3,
        }
    }
}

impl RecordingProfile {
    /// Derive the encoder session configuration from the profile
    pub fn encoder_config(&self) -> EncoderConfig {
        EncoderConfig {
            preset: self.preset,
            width: self.capture_width,
            height: self.capture_height,
            codec: self.codec,
            ..EncoderConfig::default()
        }
    }
}
