//! Chunk writer worker.
//!
//! Encoding must never stall on disk latency, so chunks cross a bounded
//! channel to a dedicated worker task that owns the sink. When the channel
//! is full the chunk is dropped and counted rather than blocking the
//! submit path.

use std::sync::Arc;
use std::time::Duration;

use contracts::{ChunkSink, DashcamError, EncodedChunk};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::stats::SessionMetrics;

/// How long `shutdown` waits for the worker to drain its queue
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to a running writer worker
pub struct WriterHandle {
    sink_name: String,
    tx: mpsc::Sender<EncodedChunk>,
    worker: JoinHandle<()>,
    metrics: Arc<SessionMetrics>,
}

impl WriterHandle {
    /// Spawn a worker task that owns `sink` and writes every chunk it
    /// receives
    pub fn spawn<S>(sink: S, capacity: usize, metrics: Arc<SessionMetrics>) -> Self
    where
        S: ChunkSink + 'static,
    {
        let sink_name = sink.name().to_string();
        let (tx, rx) = mpsc::channel(capacity);
        let worker = tokio::spawn(writer_worker(sink, rx, Arc::clone(&metrics)));

        debug!(sink = %sink_name, capacity, "writer worker spawned");

        Self {
            sink_name,
            tx,
            worker,
            metrics,
        }
    }

    /// Queue a chunk for writing
    ///
    /// Returns `false` when the chunk was dropped because the queue was
    /// full or the worker is gone.
    pub fn submit(&self, chunk: EncodedChunk) -> bool {
        match self.tx.try_send(chunk) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(chunk)) => {
                self.metrics.inc_dropped();
                warn!(
                    sink = %self.sink_name,
                    sequence = chunk.sequence,
                    "writer queue full, chunk dropped"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(chunk)) => {
                self.metrics.inc_dropped();
                error!(
                    sink = %self.sink_name,
                    sequence = chunk.sequence,
                    "writer worker gone, chunk dropped"
                );
                false
            }
        }
    }

    /// Close the queue and wait for the worker to drain and finalize
    pub async fn shutdown(self) -> Result<(), DashcamError> {
        drop(self.tx);
        match tokio::time::timeout(SHUTDOWN_TIMEOUT, self.worker).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(join_err)) => Err(DashcamError::sink_write(
                self.sink_name,
                format!("writer worker panicked: {join_err}"),
            )),
            Err(_) => Err(DashcamError::sink_write(
                self.sink_name,
                "writer worker did not drain within the shutdown timeout",
            )),
        }
    }
}

async fn writer_worker<S>(
    mut sink: S,
    mut rx: mpsc::Receiver<EncodedChunk>,
    metrics: Arc<SessionMetrics>,
) where
    S: ChunkSink,
{
    while let Some(chunk) = rx.recv().await {
        let bytes = chunk.data.len();
        let keyframe = chunk.keyframe;
        match sink.write(&chunk).await {
            Ok(()) => {
                metrics.add_written(bytes);
                observability::record_chunk_written(bytes, keyframe);
            }
            Err(err) => {
                metrics.inc_write_failure();
                error!(
                    sink = sink.name(),
                    sequence = chunk.sequence,
                    error = %err,
                    "chunk write failed"
                );
            }
        }
    }

    if let Err(err) = sink.flush().await {
        error!(sink = sink.name(), error = %err, "final flush failed");
    }
    if let Err(err) = sink.close().await {
        error!(sink = sink.name(), error = %err, "sink close failed");
    }

    info!(sink = sink.name(), "writer worker finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    struct MockSink {
        written: Arc<AtomicU64>,
        closed: Arc<AtomicBool>,
        should_fail: bool,
        delay_ms: u64,
    }

    impl MockSink {
        fn new() -> (Self, Arc<AtomicU64>, Arc<AtomicBool>) {
            let written = Arc::new(AtomicU64::new(0));
            let closed = Arc::new(AtomicBool::new(false));
            (
                Self {
                    written: Arc::clone(&written),
                    closed: Arc::clone(&closed),
                    should_fail: false,
                    delay_ms: 0,
                },
                written,
                closed,
            )
        }
    }

    impl ChunkSink for MockSink {
        fn name(&self) -> &str {
            "mock"
        }

        async fn write(&mut self, _chunk: &EncodedChunk) -> Result<(), DashcamError> {
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            if self.should_fail {
                return Err(DashcamError::sink_write("mock", "scripted failure"));
            }
            self.written.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), DashcamError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), DashcamError> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn chunk(sequence: u64) -> EncodedChunk {
        EncodedChunk {
            sequence,
            timestamp: sequence as f64 / 30.0,
            keyframe: sequence == 0,
            data: Bytes::from(vec![0u8; 32]),
        }
    }

    #[tokio::test]
    async fn test_writes_and_finalizes_on_shutdown() {
        let (sink, written, closed) = MockSink::new();
        let metrics = Arc::new(SessionMetrics::new());
        let handle = WriterHandle::spawn(sink, 16, Arc::clone(&metrics));

        for sequence in 0..5 {
            assert!(handle.submit(chunk(sequence)));
        }
        handle.shutdown().await.unwrap();

        assert_eq!(written.load(Ordering::SeqCst), 5);
        assert!(closed.load(Ordering::SeqCst));
        assert_eq!(metrics.snapshot().encoded_frames, 5);
    }

    #[tokio::test]
    async fn test_full_queue_drops_and_counts() {
        let (mut sink, _written, _closed) = MockSink::new();
        sink.delay_ms = 50;
        let metrics = Arc::new(SessionMetrics::new());
        let handle = WriterHandle::spawn(sink, 1, Arc::clone(&metrics));

        // first chunk occupies the worker, second fills the queue
        handle.submit(chunk(0));
        handle.submit(chunk(1));
        let mut dropped = 0;
        for sequence in 2..6 {
            if !handle.submit(chunk(sequence)) {
                dropped += 1;
            }
        }

        assert!(dropped > 0);
        assert_eq!(metrics.dropped(), dropped);
        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_write_failures_counted_not_fatal() {
        let (mut sink, written, closed) = MockSink::new();
        sink.should_fail = true;
        let metrics = Arc::new(SessionMetrics::new());
        let handle = WriterHandle::spawn(sink, 16, Arc::clone(&metrics));

        handle.submit(chunk(0));
        handle.submit(chunk(1));
        handle.shutdown().await.unwrap();

        assert_eq!(written.load(Ordering::SeqCst), 0);
        assert_eq!(metrics.write_failures(), 2);
        assert!(closed.load(Ordering::SeqCst));
    }
}
