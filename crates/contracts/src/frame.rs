//! RawFrame / EncodedChunk - pixel input and encoder output
//!
//! `EncodedChunk` also defines the on-disk record framing shared by the
//! streaming writer and the highlight composer.

use bytes::{Buf, BufMut, Bytes};
use serde::{Deserialize, Serialize};

use crate::DashcamError;

/// Uncompressed video frame as delivered by the capture device
///
/// The payload is reference-counted and immutable, so the decimator can hand
/// the same buffer to the encoder and the content scorer without copying.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFrame {
    /// Capture timestamp (host monotonic seconds)
    pub timestamp: f64,

    /// Frame width in pixels
    pub width: u32,

    /// Frame height in pixels
    pub height: u32,

    /// Bytes per pixel (grayscale = 1, BGRA = 4)
    pub bytes_per_pixel: u32,

    /// Pixel payload, row-major
    pub data: Bytes,
}

impl RawFrame {
    /// Total pixel count
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }
}

/// Magic prefix of every chunk record ("RCK1")
pub const CHUNK_RECORD_MAGIC: u32 = 0x5243_4B31;

/// Fixed header size of a chunk record (magic + sequence + pts + keyframe + len)
pub const CHUNK_RECORD_HEADER_LEN: usize = 4 + 8 + 8 + 1 + 4;

/// Compressed chunk produced by the codec
#[derive(Debug, Clone)]
pub struct EncodedChunk {
    /// Session-local sequence number (strictly increasing, gap-free)
    pub sequence: u64,

    /// Presentation timestamp (seconds, uniform output timebase)
    pub timestamp: f64,

    /// Whether this chunk is self-contained (sync point)
    pub keyframe: bool,

    /// Compressed payload
    pub data: Bytes,
}

impl EncodedChunk {
    /// Serialized record size of this chunk
    pub fn record_len(&self) -> usize {
        CHUNK_RECORD_HEADER_LEN + self.data.len()
    }

    /// Append this chunk as one length-prefixed record
    pub fn write_record(&self, buf: &mut impl BufMut) {
        buf.put_u32(CHUNK_RECORD_MAGIC);
        buf.put_u64(self.sequence);
        buf.put_f64(self.timestamp);
        buf.put_u8(self.keyframe as u8);
        buf.put_u32(self.data.len() as u32);
        buf.put_slice(&self.data);
    }

    /// Read the next record from `buf`
    ///
    /// Returns `Ok(None)` at a clean end of stream.
    ///
    /// # Errors
    /// Truncated record or bad magic.
    pub fn read_record(buf: &mut impl Buf) -> Result<Option<EncodedChunk>, DashcamError> {
        if buf.remaining() == 0 {
            return Ok(None);
        }
        if buf.remaining() < CHUNK_RECORD_HEADER_LEN {
            return Err(DashcamError::Other(format!(
                "truncated chunk record header: {} bytes remaining",
                buf.remaining()
            )));
        }

        let magic = buf.get_u32();
        if magic != CHUNK_RECORD_MAGIC {
            return Err(DashcamError::Other(format!(
                "bad chunk record magic: {magic:#010x}"
            )));
        }

        let sequence = buf.get_u64();
        let timestamp = buf.get_f64();
        let keyframe = buf.get_u8() != 0;
        let len = buf.get_u32() as usize;

        if buf.remaining() < len {
            return Err(DashcamError::Other(format!(
                "truncated chunk record payload: need {len}, have {}",
                buf.remaining()
            )));
        }

        Ok(Some(EncodedChunk {
            sequence,
            timestamp,
            keyframe,
            data: buf.copy_to_bytes(len),
        }))
    }
}
