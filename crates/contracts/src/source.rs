//! FrameSource / SensorSource traits - capture device abstraction
//!
//! Defines a unified interface for capture devices, decoupling the ingestion
//! adapters from concrete device implementations. Simulated devices and any
//! future platform bindings share the same API.

use std::sync::Arc;

use crate::{RawFrame, SensorSample};

/// Frame delivery callback type
///
/// Uses `Arc` to allow callback sharing across multiple contexts.
pub type FrameCallback = Arc<dyn Fn(RawFrame) + Send + Sync>;

/// Sensor sample delivery callback type
pub type SampleCallback = Arc<dyn Fn(SensorSample) + Send + Sync>;

/// Video frame source trait
///
/// # Design Principles
///
/// 1. **Decoupling**: separates frame production from frame consumption
/// 2. **Unified Interface**: simulated and real devices use the same API
/// 3. **Callback Pattern**: callbacks instead of channels, matching how
///    platform capture APIs deliver frames
pub trait FrameSource: Send + Sync {
    /// Source identifier (used for logging/metrics)
    fn source_id(&self) -> &str;

    /// Register the frame callback and start producing
    ///
    /// If already listening, repeated calls are idempotent (the callback is
    /// not registered twice).
    fn listen(&self, callback: FrameCallback);

    /// Stop producing frames
    fn stop(&self);

    /// Check if currently listening
    fn is_listening(&self) -> bool;
}

/// Motion/position sample source trait
///
/// Same lifecycle contract as [`FrameSource`], delivering [`SensorSample`]s.
pub trait SensorSource: Send + Sync {
    /// Source identifier (used for logging/metrics)
    fn source_id(&self) -> &str;

    /// Register the sample callback and start producing (idempotent)
    fn listen(&self, callback: SampleCallback);

    /// Stop producing samples
    fn stop(&self);

    /// Check if currently listening
    fn is_listening(&self) -> bool;
}

/// Backpressure policy for bounded handoff queues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPolicy {
    /// Drop the incoming item when the queue is full
    #[default]
    DropNewest,
    /// Evict the oldest queued item to admit the incoming one
    DropOldest,
}
