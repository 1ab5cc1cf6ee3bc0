//! # Encoder
//!
//! The video encoding pipeline: a session state machine in front of a codec
//! seam, a bounded writer worker streaming chunk records to disk, and 1 Hz
//! statistics publishing.
//!
//! The platform codec is out of scope; [`SimulatedCodec`] produces
//! bitrate-shaped chunks behind the same [`VideoCodec`] trait a hardware
//! encoder would implement.

mod codec;
mod pipeline;
mod session;
pub mod sinks;
mod stats;
mod writer;

pub use codec::{CodecFactory, EncodeOutcome, EncodeStep, SimulatedCodec, VideoCodec};
pub use pipeline::{PipelineConfig, PipelineState, StatisticsCallback, VideoEncodingPipeline};
pub use session::{ChunkMeta, EncodingSession};
pub use stats::SessionMetrics;
pub use writer::WriterHandle;
