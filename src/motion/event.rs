// Motion event model
//
// Mirrors the device-motion payload: an optional gravity-compensated
// acceleration, an optional gravity-inclusive acceleration, an optional
// rotation rate in degrees per second, and the event timestamp.

use serde::{Deserialize, Serialize};

/// Three-axis reading in m/s²
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Angular rate around the device axes in degrees per second
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RotationRate {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl RotationRate {
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Self {
        Self { alpha, beta, gamma }
    }

    /// Euclidean norm converted to radians per second
    pub fn magnitude_rad(&self) -> f64 {
        let deg = (self.alpha * self.alpha + self.beta * self.beta + self.gamma * self.gamma).sqrt();
        deg.to_radians()
    }
}

/// One device-motion sample
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionEvent {
    /// Gravity-compensated linear acceleration, when the platform provides it
    pub acceleration: Option<Vector3>,
    /// Raw acceleration including gravity
    pub acceleration_including_gravity: Option<Vector3>,
    /// Angular rate, when the device has a gyroscope
    pub rotation_rate: Option<RotationRate>,
    /// Event time in milliseconds on a monotonic clock
    pub timestamp_ms: f64,
}

impl MotionEvent {
    /// Linear acceleration magnitude in m/s²
    ///
    /// Prefers the gravity-compensated reading. Otherwise subtracts `gravity`
    /// from the vertical (z) axis of the gravity-inclusive reading. Events
    /// with neither reading contribute nothing.
    pub fn linear_acceleration_magnitude(&self, gravity: f64) -> f64 {
        if let Some(acc) = self.acceleration {
            return acc.magnitude();
        }
        match self.acceleration_including_gravity {
            Some(raw) => Vector3::new(raw.x, raw.y, raw.z - gravity).magnitude(),
            None => 0.0,
        }
    }

    /// Rotation-rate magnitude in rad/s, zero without a gyroscope reading
    pub fn rotation_magnitude_rad(&self) -> f64 {
        self.rotation_rate
            .map(|rate| rate.magnitude_rad())
            .unwrap_or(0.0)
    }
}
