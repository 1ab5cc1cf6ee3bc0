//! FusedFrame / TripStatistics - sensor fusion output

use serde::{Deserialize, Serialize};

use crate::{InertialSample, PositionalFix};

/// One fused motion + position record
///
/// Emitted by the fusion buffer on every accepted positional fix, pairing the
/// fix with the most recent inertial sample (which may be `None` at startup).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FusedFrame {
    /// Fusion timestamp (the positional fix timestamp)
    pub timestamp: f64,

    /// Latest inertial sample at emission time
    pub inertial: Option<InertialSample>,

    /// The positional fix that triggered emission
    pub fix: PositionalFix,

    /// Trip distance up to and including this fix (meters)
    pub cumulative_distance: f64,

    /// Ground speed at this fix, clamped at zero (m/s)
    pub speed: f64,
}

/// Running trip totals maintained by the fusion buffer
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TripStatistics {
    /// Accumulated distance over accuracy-gated fix pairs (meters)
    pub total_distance: f64,

    /// Maximum observed ground speed (m/s)
    pub max_speed: f64,

    /// Online mean of ground speed (m/s)
    pub mean_speed: f64,

    /// Online mean of inertial acceleration magnitude (g)
    pub mean_acceleration: f64,

    /// Maximum observed acceleration magnitude (g)
    pub max_acceleration: f64,

    /// Number of fused frames folded into the means
    pub sample_count: u64,

    /// Timestamp of the first fused frame
    pub started_at: Option<f64>,

    /// Timestamp of the most recent fused frame
    pub last_at: Option<f64>,
}

impl TripStatistics {
    /// Trip duration covered by the statistics (seconds)
    pub fn elapsed(&self) -> f64 {
        match (self.started_at, self.last_at) {
            (Some(start), Some(last)) => (last - start).max(0.0),
            _ => 0.0,
        }
    }
}
