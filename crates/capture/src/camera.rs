//! Simulated camera implementation
//!
//! Implements `FrameSource`, generating synthetic BGRA frames from a
//! background thread. The pattern shifts every frame so downstream frame
//! differencing sees motion, the way a real ride recording would.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use contracts::{FrameCallback, FrameSource, RawFrame};
use tracing::{debug, trace};

/// Simulated camera configuration
#[derive(Debug, Clone)]
pub struct SimulatedCameraConfig {
    /// Frame rate (Hz)
    pub fps: f64,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
}

impl Default for SimulatedCameraConfig {
    fn default() -> Self {
        Self {
            fps: 30.0,
            width: 640,
            height: 360,
        }
    }
}

const BYTES_PER_PIXEL: u32 = 4;

/// Simulated camera
///
/// Produces frames at the configured rate in a background thread. Frames
/// are delivered through the callback, matching real capture delivery.
pub struct SimulatedCamera {
    source_id: String,
    config: SimulatedCameraConfig,
    listening: Arc<AtomicBool>,
}

impl SimulatedCamera {
    /// Create a new simulated camera
    pub fn new(source_id: String, config: SimulatedCameraConfig) -> Self {
        Self {
            source_id,
            config,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create with default configuration
    pub fn with_defaults(source_id: String) -> Self {
        Self::new(source_id, SimulatedCameraConfig::default())
    }

    /// Generate one frame's pixel pattern
    ///
    /// A rolling gradient: every pixel changes between consecutive frames,
    /// so strided frame differencing registers motion.
    fn generate_pattern(config: &SimulatedCameraConfig, frame_id: u64) -> Bytes {
        let size = (config.width * config.height * BYTES_PER_PIXEL) as usize;
        let mut data = vec![0u8; size];
        let phase = frame_id.wrapping_mul(7);
        for (i, byte) in data.iter_mut().enumerate() {
            *byte = ((i as u64).wrapping_mul(31).wrapping_add(phase) & 0xFF) as u8;
        }
        Bytes::from(data)
    }
}

impl FrameSource for SimulatedCamera {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    fn listen(&self, callback: FrameCallback) {
        // Idempotent: if already listening, don't start again
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let source_id = self.source_id.clone();
        let config = self.config.clone();
        let listening = self.listening.clone();

        let interval = Duration::from_secs_f64(1.0 / config.fps);

        thread::spawn(move || {
            let mut frame_id: u64 = 0;
            let start_time = std::time::Instant::now();

            debug!(
                source_id = %source_id,
                fps = config.fps,
                width = config.width,
                height = config.height,
                "simulated camera started"
            );

            while listening.load(Ordering::Relaxed) {
                frame_id += 1;
                let timestamp = start_time.elapsed().as_secs_f64();

                let frame = RawFrame {
                    timestamp,
                    width: config.width,
                    height: config.height,
                    bytes_per_pixel: BYTES_PER_PIXEL,
                    data: Self::generate_pattern(&config, frame_id),
                };

                callback(frame);

                trace!(source_id = %source_id, frame_id, timestamp, "frame delivered");

                thread::sleep(interval);
            }

            debug!(source_id = %source_id, "simulated camera stopped");
        });
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}
