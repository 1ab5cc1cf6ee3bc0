//! # Fusion
//!
//! Sensor fusion core: pairs the inertial stream with positional fixes,
//! maintains trip statistics, and keeps a bounded history of fused frames.
//!
//! Fusion is positional-driven: inertial samples (~100 Hz) only refresh a
//! latest-value cache; each accepted positional fix (~1 Hz) emits one
//! [`contracts::FusedFrame`].

mod aligner;
mod buffer;
mod geo;

pub use aligner::align;
pub use buffer::{FusedFrameCallback, SensorFusionBuffer, DEFAULT_HISTORY_CAPACITY};
pub use geo::haversine_distance;
