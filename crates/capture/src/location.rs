//! Simulated positional receiver (~1 Hz, distance-filtered).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use contracts::{PositionalFix, SampleCallback, SensorSample, SensorSource};
use tracing::{debug, trace};

/// Meters per degree of latitude
const METERS_PER_DEGREE_LAT: f64 = 111_195.0;

/// Simulated positional receiver configuration
#[derive(Debug, Clone)]
pub struct SimulatedGpsConfig {
    /// Internal update rate (Hz)
    pub frequency_hz: f64,
    /// Ground speed along the simulated track (m/s)
    pub speed_mps: f64,
    /// Minimum movement between emitted fixes (meters)
    pub distance_filter_m: f64,
    /// Track origin latitude (degrees)
    pub start_latitude: f64,
    /// Track origin longitude (degrees)
    pub start_longitude: f64,
    /// Reported horizontal accuracy (meters)
    pub horizontal_accuracy: f64,
}

impl Default for SimulatedGpsConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 1.0,
            speed_mps: 5.5,
            distance_filter_m: 10.0,
            start_latitude: 47.3769,
            start_longitude: 8.5417,
            horizontal_accuracy: 5.0,
        }
    }
}

/// Simulated positional receiver
///
/// Walks a straight track north of the origin at the configured speed.
/// Fixes are only delivered after at least `distance_filter_m` of movement
/// since the last delivered fix, mirroring platform distance filtering.
pub struct SimulatedGps {
    source_id: String,
    config: SimulatedGpsConfig,
    listening: Arc<AtomicBool>,
}

impl SimulatedGps {
    /// Create a new simulated receiver
    pub fn new(source_id: String, config: SimulatedGpsConfig) -> Self {
        Self {
            source_id,
            config,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create with default configuration
    pub fn with_defaults(source_id: String) -> Self {
        Self::new(source_id, SimulatedGpsConfig::default())
    }
}

impl SensorSource for SimulatedGps {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    fn listen(&self, callback: SampleCallback) {
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let source_id = self.source_id.clone();
        let config = self.config.clone();
        let listening = self.listening.clone();

        let interval = Duration::from_secs_f64(1.0 / config.frequency_hz);
        let step_m = config.speed_mps / config.frequency_hz;

        thread::spawn(move || {
            let start_time = std::time::Instant::now();
            let mut traveled_m = 0.0f64;
            let mut since_emit_m = f64::INFINITY; // first fix always emits

            debug!(
                source_id = %source_id,
                speed_mps = config.speed_mps,
                distance_filter_m = config.distance_filter_m,
                "simulated positional receiver started"
            );

            while listening.load(Ordering::Relaxed) {
                let timestamp = start_time.elapsed().as_secs_f64();

                if since_emit_m >= config.distance_filter_m {
                    let fix = PositionalFix {
                        timestamp,
                        latitude: config.start_latitude + traveled_m / METERS_PER_DEGREE_LAT,
                        longitude: config.start_longitude,
                        altitude: 408.0,
                        speed: config.speed_mps,
                        course: 0.0,
                        horizontal_accuracy: config.horizontal_accuracy,
                        vertical_accuracy: config.horizontal_accuracy * 1.5,
                    };
                    callback(SensorSample::Positional(fix));
                    trace!(source_id = %source_id, timestamp, traveled_m, "fix delivered");
                    since_emit_m = 0.0;
                }

                thread::sleep(interval);
                traveled_m += step_m;
                since_emit_m += step_m;
            }

            debug!(source_id = %source_id, "simulated positional receiver stopped");
        });
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}
