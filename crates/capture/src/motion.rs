//! Simulated inertial unit (~100 Hz).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use contracts::{Attitude, InertialSample, SampleCallback, SensorSample, SensorSource, Vector3};
use tracing::{debug, trace};

/// Simulated inertial unit configuration
#[derive(Debug, Clone)]
pub struct SimulatedImuConfig {
    /// Sample rate (Hz)
    pub frequency_hz: f64,
    /// Peak road-buzz acceleration (g)
    pub vibration_amplitude: f64,
}

impl Default for SimulatedImuConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 100.0,
            vibration_amplitude: 0.15,
        }
    }
}

/// Simulated inertial unit
///
/// Produces user-acceleration samples shaped like riding over pavement:
/// a low-frequency sway plus higher-frequency buzz, all deterministic
/// functions of elapsed time.
pub struct SimulatedImu {
    source_id: String,
    config: SimulatedImuConfig,
    listening: Arc<AtomicBool>,
}

impl SimulatedImu {
    /// Create a new simulated inertial unit
    pub fn new(source_id: String, config: SimulatedImuConfig) -> Self {
        Self {
            source_id,
            config,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create with default configuration
    pub fn with_defaults(source_id: String) -> Self {
        Self::new(source_id, SimulatedImuConfig::default())
    }

    fn sample_at(config: &SimulatedImuConfig, t: f64) -> InertialSample {
        let amp = config.vibration_amplitude;
        InertialSample {
            timestamp: t,
            acceleration: Vector3::new(
                amp * (t * 2.0 * std::f64::consts::PI * 0.5).sin(),
                amp * 0.4 * (t * 2.0 * std::f64::consts::PI * 11.0).sin(),
                amp * 0.6 * (t * 2.0 * std::f64::consts::PI * 7.0).cos(),
            ),
            rotation_rate: Vector3::new(0.0, 0.0, 0.05 * (t * 0.3).sin()),
            magnetic_field: None,
            attitude: Some(Attitude {
                roll: 0.02 * (t * 0.8).sin(),
                pitch: 0.01,
                yaw: 0.1 * t % std::f64::consts::TAU,
            }),
        }
    }
}

impl SensorSource for SimulatedImu {
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

        thread::spawn(move || {
            let start_time = std::time::Instant::now();

            debug!(
                source_id = %source_id,
                frequency_hz = config.frequency_hz,
                "simulated inertial unit started"
            );

            while listening.load(Ordering::Relaxed) {
                let t = start_time.elapsed().as_secs_f64();
                callback(SensorSample::Inertial(Self::sample_at(&config, t)));
                trace!(source_id = %source_id, timestamp = t, "inertial sample delivered");
                thread::sleep(interval);
            }

            debug!(source_id = %source_id, "simulated inertial unit stopped");
        });
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;

    #[test]
    fn test_imu_delivers_inertial_samples() {
        let imu = SimulatedImu::new(
            "imu0".to_string(),
            SimulatedImuConfig {
                frequency_hz: 200.0,
                ..Default::default()
            },
        );

        let count = Arc::new(AtomicU64::new(0));
        let count_clone = count.clone();

        imu.listen(Arc::new(move |sample| {
            if let SensorSample::Inertial(inertial) = sample {
                assert!(inertial.acceleration.magnitude() < 1.0);
                count_clone.fetch_add(1, Ordering::Relaxed);
            } else {
                panic!("inertial unit emitted a non-inertial sample");
            }
        }));

        thread::sleep(Duration::from_millis(50));
        imu.stop();

        assert!(count.load(Ordering::Relaxed) > 0);
        assert!(!imu.is_listening());
    }

    #[test]
    fn test_samples_vary_over_time() {
        let config = SimulatedImuConfig::default();
        let a = SimulatedImu::sample_at(&config, 0.1);
        let b = SimulatedImu::sample_at(&config, 0.35);
        assert_ne!(a.acceleration, b.acceleration);
    }
}
