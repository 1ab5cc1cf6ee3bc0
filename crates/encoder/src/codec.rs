//! Codec seam.
//!
//! The pipeline talks to the encoder hardware through [`VideoCodec`] and
//! builds instances through a [`CodecFactory`], so a crashed codec can be
//! torn down and rebuilt mid-session. [`SimulatedCodec`] stands in for the
//! platform encoder and produces deterministic, bitrate-shaped chunks.

use contracts::{DashcamError, EncodedChunk, EncoderConfig, RawFrame};

use crate::session::ChunkMeta;

/// Result of feeding one frame to the codec
#[derive(Debug)]
pub enum EncodeOutcome {
    /// A compressed chunk is ready
    Chunk(EncodedChunk),
    /// The codec accepted the frame but has nothing to emit yet
    NotReady,
}

/// One compressed-video encoder instance
///
/// Implementations own whatever state the underlying encoder needs. A codec
/// that returns an error is considered dead; the pipeline rebuilds it from
/// the factory rather than reusing it.
pub trait VideoCodec: Send {
    /// Compress one frame into a chunk carrying the given metadata
    fn encode(&mut self, frame: &RawFrame, meta: ChunkMeta) -> Result<EncodeOutcome, DashcamError>;

    /// Retarget the output bitrate without recreating the session
    fn set_bitrate(&mut self, bits_per_second: u64);

    /// Drain any chunks the codec is still holding back
    fn flush(&mut self) -> Result<Vec<EncodedChunk>, DashcamError>;
}

/// Builds a fresh codec for a session, or after a mid-session crash
pub type CodecFactory =
    Box<dyn Fn(&EncoderConfig) -> Result<Box<dyn VideoCodec>, DashcamError> + Send + Sync>;

/// Scripted behavior for one `encode` call on a [`SimulatedCodec`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeStep {
    /// Emit a chunk
    Emit,
    /// Accept the frame without output
    Starve,
    /// Fail the call
    Fail,
}

/// Deterministic stand-in for the platform encoder
///
/// Chunk payloads are sized from the target bitrate and nominal frame rate,
/// with keyframes three times the delta-frame size. Tests can script
/// per-call behavior with [`SimulatedCodec::with_plan`]; once the plan is
/// exhausted every call emits.
pub struct SimulatedCodec {
    bits_per_second: u64,
    nominal_fps: f64,
    plan: Vec<EncodeStep>,
    calls: usize,
    pending: Vec<EncodedChunk>,
    lookahead: usize,
}

impl SimulatedCodec {
    /// Create a codec shaped by the session configuration
    pub fn new(config: &EncoderConfig) -> Self {
        Self {
            bits_per_second: config.preset.bits_per_second(),
            nominal_fps: config.nominal_fps,
            plan: Vec::new(),
            calls: 0,
            pending: Vec::new(),
            lookahead: 0,
        }
    }

    /// Script the outcome of the next `encode` calls, in order
    pub fn with_plan(mut self, plan: Vec<EncodeStep>) -> Self {
        self.plan = plan;
        self
    }

    /// Hold back the most recent `frames` chunks until `flush`
    ///
    /// Models encoder lookahead, where trailing output only appears when
    /// the session is finalized.
    pub fn with_lookahead(mut self, frames: usize) -> Self {
        self.lookahead = frames;
        self
    }

    /// A factory producing plain simulated codecs
    pub fn factory() -> CodecFactory {
        Box::new(|config| Ok(Box::new(SimulatedCodec::new(config)) as Box<dyn VideoCodec>))
    }

    fn chunk_len(&self, keyframe: bool) -> usize {
        let per_frame = (self.bits_per_second as f64 / 8.0 / self.nominal_fps).max(1.0) as usize;
        if keyframe { per_frame * 3 } else { per_frame }
    }

    fn shape_chunk(&self, meta: ChunkMeta) -> EncodedChunk {
        let len = self.chunk_len(meta.keyframe);
        let fill = (meta.sequence % 251) as u8;
        EncodedChunk {
            sequence: meta.sequence,
            timestamp: meta.timestamp,
            keyframe: meta.keyframe,
            data: bytes::Bytes::from(vec![fill; len]),
        }
    }
}

impl VideoCodec for SimulatedCodec {
    fn encode(&mut self, _frame: &RawFrame, meta: ChunkMeta) -> Result<EncodeOutcome, DashcamError> {
        let step = self.plan.get(self.calls).copied().unwrap_or(EncodeStep::Emit);
        self.calls += 1;

        match step {
            EncodeStep::Fail => Err(DashcamError::encoding(format!(
                "simulated encoder fault at sequence {}",
                meta.sequence
            ))),
            EncodeStep::Starve => Ok(EncodeOutcome::NotReady),
            EncodeStep::Emit => {
                let chunk = self.shape_chunk(meta);
                if self.lookahead > 0 {
                    self.pending.push(chunk);
                    if self.pending.len() > self.lookahead {
                        Ok(EncodeOutcome::Chunk(self.pending.remove(0)))
                    } else {
                        Ok(EncodeOutcome::NotReady)
                    }
                } else {
                    Ok(EncodeOutcome::Chunk(chunk))
                }
            }
        }
    }

    fn set_bitrate(&mut self, bits_per_second: u64) {
        self.bits_per_second = bits_per_second;
    }

    fn flush(&mut self) -> Result<Vec<EncodedChunk>, DashcamError> {
        Ok(std::mem::take(&mut self.pending))
    }
}
