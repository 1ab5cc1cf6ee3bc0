//! # Ingestion
//!
//! Bridges capture sources onto bounded async channels with explicit
//! backpressure, and owns the frame decimator that thins the capture rate
//! down to the encode rate.
//!
//! Two streams leave this crate: decimation candidates (`RawFrame`) and
//! motion/position samples (`SensorSample`). Both are bounded; when a queue
//! is full the incoming item is dropped and counted rather than blocking
//! the capture callback.

mod config;
mod decimator;
mod handoff;
mod pipeline;

pub use config::{BackpressureConfig, IngestionMetrics, MetricsSnapshot};
pub use decimator::{DecimationObserver, FrameDecimator};
pub use pipeline::IngestionPipeline;
