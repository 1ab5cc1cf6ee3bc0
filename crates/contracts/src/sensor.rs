//! Motion / position sample definitions

use serde::{Deserialize, Serialize};

/// 3-axis vector (device frame)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean magnitude
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Device attitude (radians)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Attitude {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

/// One inertial measurement (~100 Hz)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InertialSample {
    /// Sample timestamp (host monotonic seconds)
    pub timestamp: f64,

    /// User acceleration, gravity removed (g units)
    pub acceleration: Vector3,

    /// Rotation rate (rad/s)
    pub rotation_rate: Vector3,

    /// Magnetic field, when the magnetometer is calibrated (microtesla)
    pub magnetic_field: Option<Vector3>,

    /// Device attitude, when available
    pub attitude: Option<Attitude>,
}

/// One positional fix (~1 Hz, distance-filtered)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PositionalFix {
    /// Fix timestamp (host monotonic seconds)
    pub timestamp: f64,

    /// Latitude (degrees)
    pub latitude: f64,

    /// Longitude (degrees)
    pub longitude: f64,

    /// Altitude above sea level (meters)
    pub altitude: f64,

    /// Ground speed (m/s, negative = no estimate)
    pub speed: f64,

    /// Course over ground (degrees, negative = no estimate)
    pub course: f64,

    /// Horizontal accuracy radius (meters, negative = invalid fix)
    pub horizontal_accuracy: f64,

    /// Vertical accuracy (meters, negative = invalid)
    pub vertical_accuracy: f64,
}

impl PositionalFix {
    /// Whether this fix is accurate enough to contribute to trip distance
    ///
    /// Matches the 20 m horizontal accuracy gate used by the distance
    /// accumulator.
    pub fn is_accurate(&self) -> bool {
        self.horizontal_accuracy >= 0.0 && self.horizontal_accuracy <= 20.0
    }
}

/// Union of everything the sensor sources emit
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum SensorSample {
    Inertial(InertialSample),
    Positional(PositionalFix),
}

impl SensorSample {
    /// Sample timestamp regardless of variant
    pub fn timestamp(&self) -> f64 {
        match self {
            SensorSample::Inertial(s) => s.timestamp,
            SensorSample::Positional(f) => f.timestamp,
        }
    }
}
