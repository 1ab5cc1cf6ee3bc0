//! File-backed chunk sink.
//!
//! Streams length-prefixed chunk records into a recording file as they
//! arrive, so a crash loses at most the buffered tail instead of the whole
//! recording.

use std::path::{Path, PathBuf};

use bytes::BytesMut;
use chrono::Utc;
use contracts::{ChunkSink, Codec, DashcamError, EncodedChunk};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info};

/// Writes chunk records to one recording file
pub struct FileChunkSink {
    path: PathBuf,
    writer: BufWriter<File>,
    scratch: BytesMut,
}

impl FileChunkSink {
    /// Create (truncating) a recording file named after the wall clock,
    /// with the container extension the codec dictates
    pub async fn create(output_dir: &Path, codec: Codec) -> Result<Self, DashcamError> {
        tokio::fs::create_dir_all(output_dir).await?;

        let filename = format!(
            "recording_{}.{}",
            Utc::now().timestamp(),
            codec.file_extension()
        );
        let path = output_dir.join(filename);
        let file = File::create(&path).await?;

        debug!(path = %path.display(), "recording file opened");

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            scratch: BytesMut::with_capacity(64 * 1024),
        })
    }

    /// Open a sink at an explicit path
    pub async fn open(path: PathBuf) -> Result<Self, DashcamError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = File::create(&path).await?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            scratch: BytesMut::with_capacity(64 * 1024),
        })
    }

    /// Where this sink writes
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ChunkSink for FileChunkSink {
    fn name(&self) -> &str {
        "file"
    }

    async fn write(&mut self, chunk: &EncodedChunk) -> Result<(), DashcamError> {
        self.scratch.clear();
        self.scratch.reserve(chunk.record_len());
        chunk.write_record(&mut self.scratch);
        self.writer.write_all(&self.scratch).await?;
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), DashcamError> {
        self.writer.flush().await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DashcamError> {
        self.writer.flush().await?;
        self.writer.get_ref().sync_all().await?;
        info!(path = %self.path.display(), "recording file finalized");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{Buf, Bytes};
    use tempfile::tempdir;

    fn chunk(sequence: u64, len: usize) -> EncodedChunk {
        EncodedChunk {
            sequence,
            timestamp: sequence as f64 / 30.0,
            keyframe: sequence % 120 == 0,
            data: Bytes::from(vec![sequence as u8; len]),
        }
    }

    #[tokio::test]
    async fn test_records_round_trip_through_file() {
        let dir = tempdir().unwrap();
        let mut sink = FileChunkSink::create(dir.path(), Codec::Hevc).await.unwrap();
        assert_eq!(sink.path().extension().unwrap(), "mov");

        for sequence in 0..4 {
            sink.write(&chunk(sequence, 100 + sequence as usize)).await.unwrap();
        }
        sink.close().await.unwrap();

        let raw = tokio::fs::read(sink.path()).await.unwrap();
        let mut buf = raw.as_slice();
        let mut sequences = Vec::new();
        while let Some(decoded) = EncodedChunk::read_record(&mut buf).unwrap() {
            sequences.push(decoded.sequence);
        }
        assert_eq!(sequences, vec![0, 1, 2, 3]);
        assert!(!buf.has_remaining());
    }

    #[tokio::test]
    async fn test_h264_extension() {
        let dir = tempdir().unwrap();
        let sink = FileChunkSink::create(dir.path(), Codec::H264).await.unwrap();
        assert_eq!(sink.path().extension().unwrap(), "mp4");
    }

    #[tokio::test]
    async fn test_create_truncates_existing_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stale.mov");
        tokio::fs::write(&path, b"stale bytes").await.unwrap();

        let mut sink = FileChunkSink::open(path.clone()).await.unwrap();
        sink.write(&chunk(0, 10)).await.unwrap();
        sink.close().await.unwrap();

        let raw = tokio::fs::read(&path).await.unwrap();
        let mut buf = raw.as_slice();
        let decoded = EncodedChunk::read_record(&mut buf).unwrap().unwrap();
        assert_eq!(decoded.sequence, 0);
        assert!(!buf.has_remaining());
    }
}
