//! ChunkSink trait - encoder output interface
//!
//! Defines the abstract interface for chunk sinks.

use crate::{DashcamError, EncodedChunk};

/// Encoded chunk output trait
///
/// All sink implementations must implement this trait. Writes happen as
/// chunks arrive; nothing is buffered until close.
#[trait_variant::make(ChunkSink: Send)]
pub trait LocalChunkSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one encoded chunk
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&mut self, chunk: &EncodedChunk) -> Result<(), DashcamError>;

    /// Flush buffered bytes (if any)
    async fn flush(&mut self) -> Result<(), DashcamError>;

    /// Finalize the sink and release the output
    async fn close(&mut self) -> Result<(), DashcamError>;
}
