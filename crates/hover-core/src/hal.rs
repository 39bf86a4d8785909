//! Hardware access seams.
//!
//! The controller only talks to the craft through these traits. Firmware
//! implements them over the real pins and timers; the simulator and the
//! test mocks implement them over a virtual clock.

use crate::config::GYRO_SENSITIVITY;

/// Pulse-echo range sensors. Each read is bounded by the echo timeout.
pub trait RangeFinder {
    /// Forward distance in cm, `None` when no echo came back in time.
    fn forward_distance(&mut self) -> Option<f32>;
    /// Upward (overhead) distance in cm, `None` when no echo came back in time.
    fn upward_distance(&mut self) -> Option<f32>;
}

/// Single-axis gyroscope about the vertical axis.
pub trait YawGyro {
    /// Raw signed register value of the yaw channel.
    fn read_raw_yaw(&mut self) -> i16;

    /// Yaw rate in °/s, bias not removed.
    fn read_yaw_rate(&mut self) -> f32 {
        raw_to_dps(self.read_raw_yaw())
    }
}

/// Fire-and-forget actuator commands.
pub trait Actuators {
    fn set_steering(&mut self, angle: u8);
    fn set_propulsion(&mut self, level: u8);
    fn set_lift(&mut self, on: bool);
}

/// Monotonic millisecond time and a blocking delay.
pub trait Clock {
    /// Milliseconds since boot. Wraps like a hardware tick counter.
    fn now_ms(&self) -> u32;
    fn delay_ms(&mut self, ms: u32);
}

/// Everything the control loop needs from the craft.
pub trait Hardware: RangeFinder + YawGyro + Actuators + Clock {}

impl<T: RangeFinder + YawGyro + Actuators + Clock> Hardware for T {}

/// Converts a raw gyro sample to °/s.
#[inline]
pub fn raw_to_dps(raw: i16) -> f32 {
    raw as f32 / GYRO_SENSITIVITY
}

/// A reading counts only if an echo arrived and it is positive.
#[inline]
pub fn valid_reading(reading: Option<f32>) -> Option<f32> {
    reading.filter(|d| *d > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_to_dps() {
        assert_eq!(raw_to_dps(0), 0.0);
        assert!((raw_to_dps(131) - 1.0).abs() < 1e-6);
        assert!((raw_to_dps(-262) + 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_valid_reading() {
        assert_eq!(valid_reading(None), None);
        assert_eq!(valid_reading(Some(0.0)), None);
        assert_eq!(valid_reading(Some(-3.0)), None);
        assert_eq!(valid_reading(Some(12.5)), Some(12.5));
    }
}
