//! EncodingStatistics - encoder session telemetry
//!
//! Maintained by the writer worker and published at 1 Hz through the
//! statistics callback.

use serde::{Deserialize, Serialize};

/// Snapshot of one encoding session's counters
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EncodingStatistics {
    /// Bitrate over the most recent publish interval (bits/s)
    pub current_bitrate: f64,

    /// Bitrate over the whole session (bits/s)
    pub average_bitrate: f64,

    /// Encoded frame rate over the most recent publish interval
    pub fps: f64,

    /// Frames encoded since start()
    pub encoded_frames: u64,

    /// Compressed bytes produced since start()
    pub encoded_bytes: u64,

    /// Frames or chunks dropped (codec not ready, writer queue full)
    pub dropped_frames: u64,

    /// Session wall-clock duration (seconds)
    pub duration: f64,
}

impl EncodingStatistics {
    /// Drop ratio over everything submitted so far
    pub fn drop_rate(&self) -> f64 {
        let total = self.encoded_frames + self.dropped_frames;
        if total == 0 {
            0.0
        } else {
            self.dropped_frames as f64 / total as f64
        }
    }
}
