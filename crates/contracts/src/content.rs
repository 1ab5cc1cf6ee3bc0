//! ContentEvent / VideoSegment - analysis output

use serde::{Deserialize, Serialize};

/// Which heuristic claimed the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    Motion,
    Object,
    Scene,
    Action,
}

/// Normalized region of interest within a frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Per-frame interest verdict from the content scorer
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ContentEvent {
    /// Frame capture timestamp (seconds)
    pub timestamp: f64,

    /// Combined interest score, clamped to [0, 1]
    pub confidence: f64,

    /// Dominant category for this frame
    pub category: ContentCategory,

    /// Optional localized region (None = whole frame)
    pub region: Option<Region>,
}

/// Committed interval of interesting footage
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VideoSegment {
    /// Capture timestamp of the first accepted frame (seconds)
    pub start_time: f64,

    /// Capture timestamp of the last accepted frame (seconds)
    pub end_time: f64,

    /// Number of accepted frames in the segment
    pub frame_count: u32,

    /// Sum of per-frame confidences (mean = sum / frame_count)
    pub confidence_sum: f64,
}

impl VideoSegment {
    /// Segment duration (seconds)
    pub fn duration(&self) -> f64 {
        (self.end_time - self.start_time).max(0.0)
    }

    /// Mean per-frame confidence
    pub fn mean_confidence(&self) -> f64 {
        if self.frame_count == 0 {
            0.0
        } else {
            self.confidence_sum / self.frame_count as f64
        }
    }
}
