//! Shared session counters behind atomics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use contracts::EncodingStatistics;

#[derive(Debug)]
struct SnapshotWindow {
    started_at: Instant,
    last_at: Instant,
    last_frames: u64,
    last_bytes: u64,
}

/// Counters shared by the submit path, the writer worker, and the
/// statistics publisher
///
/// The writer worker counts written chunks and bytes; the submit path
/// counts drops. `snapshot` derives the current bitrate and frame rate
/// from the deltas since the previous snapshot.
#[derive(Debug)]
pub struct SessionMetrics {
    encoded_frames: AtomicU64,
    encoded_bytes: AtomicU64,
    dropped_frames: AtomicU64,
    write_failures: AtomicU64,
    window: Mutex<SnapshotWindow>,
}

impl SessionMetrics {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            encoded_frames: AtomicU64::new(0),
            encoded_bytes: AtomicU64::new(0),
            dropped_frames: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            window: Mutex::new(SnapshotWindow {
                started_at: now,
                last_at: now,
                last_frames: 0,
                last_bytes: 0,
            }),
        }
    }

    /// Zero every counter and restart the clock
    pub fn reset(&self) {
        self.encoded_frames.store(0, Ordering::Relaxed);
        self.encoded_bytes.store(0, Ordering::Relaxed);
        self.dropped_frames.store(0, Ordering::Relaxed);
        self.write_failures.store(0, Ordering::Relaxed);
        if let Ok(mut window) = self.window.lock() {
            let now = Instant::now();
            window.started_at = now;
            window.last_at = now;
            window.last_frames = 0;
            window.last_bytes = 0;
        }
    }

    pub fn add_written(&self, bytes: usize) {
        self.encoded_frames.fetch_add(1, Ordering::Relaxed);
        self.encoded_bytes.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn inc_dropped(&self) {
        self.dropped_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_write_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dropped(&self) -> u64 {
        self.dropped_frames.load(Ordering::Relaxed)
    }

    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    /// Produce a statistics snapshot and roll the rate window forward
    pub fn snapshot(&self) -> EncodingStatistics {
        let frames = self.encoded_frames.load(Ordering::Relaxed);
        let bytes = self.encoded_bytes.load(Ordering::Relaxed);
        let dropped = self.dropped_frames.load(Ordering::Relaxed);

        let mut window = match self.window.lock() {
            Ok(window) => window,
            // a poisoned window only loses rate derivation
            Err(poisoned) => poisoned.into_inner(),
        };

        let now = Instant::now();
        let interval = now.duration_since(window.last_at).as_secs_f64().max(1e-9);
        let duration = now.duration_since(window.started_at).as_secs_f64();

        let frame_delta = frames.saturating_sub(window.last_frames);
        let byte_delta = bytes.saturating_sub(window.last_bytes);

        window.last_at = now;
        window.last_frames = frames;
        window.last_bytes = bytes;

        EncodingStatistics {
            current_bitrate: byte_delta as f64 * 8.0 / interval,
            average_bitrate: if duration > 0.0 {
                bytes as f64 * 8.0 / duration
            } else {
                0.0
            },
            fps: frame_delta as f64 / interval,
            encoded_frames: frames,
            encoded_bytes: bytes,
            dropped_frames: dropped,
            duration,
        }
    }
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}
