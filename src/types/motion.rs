//! Motion telemetry types

use std::time::SystemTime;

/// One decoded motion sample from the glasses IMU
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    /// Rotation rate (rad/s)
    pub gyro: [f32; 3], // x, y, z
    /// Linear acceleration (m/s²)
    pub accel: [f32; 3], // x, y, z
    /// Local receive timestamp (the wire timestamp field is not trusted)
    pub timestamp: SystemTime,
}

impl MotionSample {
    /// Create a new sample stamped with the current time
    pub fn new(gyro: [f32; 3], accel: [f32; 3]) -> Self {
        Self {
            gyro,
            accel,
            timestamp: SystemTime::now(),
        }
    }

    /// Acceleration vector magnitude
    pub fn accel_magnitude(&self) -> f32 {
        (self.accel[0].powi(2) + self.accel[1].powi(2) + self.accel[2].powi(2)).sqrt()
    }

    /// Rotation rate vector magnitude
    pub fn gyro_magnitude(&self) -> f32 {
        (self.gyro[0].powi(2) + self.gyro[1].powi(2) + self.gyro[2].powi(2)).sqrt()
    }
}
