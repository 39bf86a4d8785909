use crate::config::{ControllerConfig, SERVO_MAX};
use crate::hal::{valid_reading, Actuators, Clock, RangeFinder};

/// Direction of a turn maneuver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i8)]
pub enum TurnDirection {
    Left = -1,
    Right = 1,
}

impl TurnDirection {
    /// Angles past neutral are to the right; neutral itself turns left.
    pub fn from_scan_angle(angle: u8, neutral: u8) -> Self {
        if angle > neutral {
            Self::Right
        } else {
            Self::Left
        }
    }

    pub fn sign(self) -> f32 {
        self as i8 as f32
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Sweeps the steering actuator from 0° to 180° and returns the angle with
/// the longest forward reading. Ties keep the lowest angle; if nothing beats
/// zero (all no-echo) the neutral angle comes back. Steering is left at
/// neutral.
pub fn scan_for_open_path<H>(hw: &mut H, config: &ControllerConfig) -> u8
where
    H: RangeFinder + Actuators + Clock,
{
    let step = config.scan_step.max(1);
    let mut best_angle = config.servo_neutral;
    let mut best_distance = 0.0_f32;

    for angle in (0..=SERVO_MAX).step_by(step as usize) {
        hw.set_steering(angle);
        hw.delay_ms(config.scan_settle_ms);

        let distance = valid_reading(hw.forward_distance()).unwrap_or(0.0);
        diag!(debug, "scan {:>3} deg: {:.1} cm", angle, distance);

        if distance > best_distance {
            best_distance = distance;
            best_angle = angle;
        }
    }

    hw.set_steering(config.servo_neutral);
    diag!(info, "scan result: {} deg ({:.1} cm)", best_angle, best_distance);
    best_angle
}
