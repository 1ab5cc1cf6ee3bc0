//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-crate data structures and traits.
//! All business crates depend only on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Capture-side timestamps are host monotonic seconds (f64)
//! - Encoded output uses a uniform synthesized timebase (`sequence / nominal_fps`),
//!   decoupled from capture timestamps after decimation

mod content;
mod error;
mod frame;
mod fused;
mod profile;
mod sensor;
mod sink;
mod source;
mod stats;

pub use content::*;
pub use error::*;
pub use frame::*;
pub use fused::*;
pub use profile::*;
pub use sensor::*;
pub use sink::*;
pub use source::{DropPolicy, FrameCallback, FrameSource, SampleCallback, SensorSource};
pub use stats::*;
