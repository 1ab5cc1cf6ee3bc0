//! Backpressure configuration and metrics

use std::sync::atomic::{AtomicU64, Ordering};

pub use contracts::DropPolicy;

/// Backpressure configuration
#[derive(Debug, Clone)]
pub struct BackpressureConfig {
    /// Frame channel capacity
    pub frame_capacity: usize,

    /// Sensor sample channel capacity
    pub sample_capacity: usize,

    /// Drop policy when a channel is full
    pub drop_policy: DropPolicy,
}

impl Default for BackpressureConfig {
    fn default() -> Self {
        Self {
            frame_capacity: 64,
            sample_capacity: 256,
            drop_policy: DropPolicy::DropNewest,
        }
    }
}

impl BackpressureConfig {
    /// Create new backpressure configuration
    pub fn new(frame_capacity: usize, sample_capacity: usize, drop_policy: DropPolicy) -> Self {
        Self {
            frame_capacity,
            sample_capacity,
            drop_policy,
        }
    }
}

/// Ingestion metrics
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Total frames delivered by sources
    pub frames_received: AtomicU64,

    /// Frames dropped on a full channel
    pub frames_dropped: AtomicU64,

    /// Total sensor samples delivered by sources
    pub samples_received: AtomicU64,

    /// Samples dropped on a full channel
    pub samples_dropped: AtomicU64,
}

impl IngestionMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record frame received
    pub fn record_frame_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record frame dropped
    pub fn record_frame_dropped(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record sample received
    pub fn record_sample_received(&self) {
        self.samples_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record sample dropped
    pub fn record_sample_dropped(&self) {
        self.samples_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            samples_received: self.samples_received.load(Ordering::Relaxed),
            samples_dropped: self.samples_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Total frames delivered by sources
    pub frames_received: u64,

    /// Frames dropped on a full channel
    pub frames_dropped: u64,

    /// Total sensor samples delivered by sources
    pub samples_received: u64,

    /// Samples dropped on a full channel
    pub samples_dropped: u64,
}
