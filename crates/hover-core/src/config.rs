// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Forward obstacle distance that triggers a turn (cm).
pub const WALL_THRESHOLD: f32 = 15.0;
/// Overhead clearance that triggers the terminal halt (cm).
pub const BAR_THRESHOLD: f32 = 15.0;

// ---------------------------------------------------------------------------
// Timing (ms)
// ---------------------------------------------------------------------------

pub const TURN_TIMEOUT: u32 = 3700;
pub const TURN_COOLDOWN: u32 = 2000;
pub const TURN_HOLD_DELAY: u32 = 300;
/// Spacing between gyro integrations inside the turn sub-loop.
pub const TURN_SAMPLE_INTERVAL: u32 = 10;
pub const LOOP_DELAY: u32 = 50;
pub const SCAN_SETTLE_TIME: u32 = 150;
pub const CALIBRATION_INTERVAL: u32 = 5;
/// Sleep period of the parked halt state.
pub const HALT_IDLE_PERIOD: u32 = 1000;

// ---------------------------------------------------------------------------
// Gains & Filters
// ---------------------------------------------------------------------------

pub const DRIFT_GAIN: f32 = 2.0;
/// Weight of the new sample in the yaw-rate low-pass filter.
pub const YAW_FILTER_ALPHA: f32 = 0.9;
/// Per-cycle heading decay of the drift corrector.
pub const HEADING_DECAY: f32 = 0.99;
pub const TARGET_TURN_ANGLE: f32 = 180.0;

// ---------------------------------------------------------------------------
// Actuators
// ---------------------------------------------------------------------------

pub const DEFAULT_PROPULSION: u8 = 200;
pub const TURN_PROPULSION: u8 = 130;

pub const SERVO_NEUTRAL: u8 = 93;
pub const SERVO_LEFT: u8 = 0;
pub const SERVO_RIGHT: u8 = 180;
pub const SERVO_MAX: u8 = 180;
pub const SCAN_STEP: u8 = 15;

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

pub const CALIBRATION_SAMPLES: u32 = 500;
/// Gyro sensitivity at the ±250 °/s range (LSB per °/s).
pub const GYRO_SENSITIVITY: f32 = 131.0;
/// Upper bound on a single pulse-echo measurement (ms).
pub const ECHO_TIMEOUT: u32 = 30;

/// Tunable controller parameters. `Default` yields the compile-time constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerConfig {
    pub wall_threshold: f32,
    pub bar_threshold: f32,
    pub turn_timeout_ms: u32,
    pub turn_cooldown_ms: u32,
    pub turn_hold_ms: u32,
    pub turn_sample_ms: u32,
    pub target_turn_angle: f32,
    pub loop_delay_ms: u32,
    pub drift_gain: f32,
    pub yaw_filter_alpha: f32,
    pub heading_decay: f32,
    pub default_propulsion: u8,
    pub turn_propulsion: u8,
    pub servo_neutral: u8,
    pub servo_left: u8,
    pub servo_right: u8,
    pub scan_step: u8,
    pub scan_settle_ms: u32,
    pub calibration_samples: u32,
    pub calibration_interval_ms: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            wall_threshold: WALL_THRESHOLD,
            bar_threshold: BAR_THRESHOLD,
            turn_timeout_ms: TURN_TIMEOUT,
            turn_cooldown_ms: TURN_COOLDOWN,
            turn_hold_ms: TURN_HOLD_DELAY,
            turn_sample_ms: TURN_SAMPLE_INTERVAL,
            target_turn_angle: TARGET_TURN_ANGLE,
            loop_delay_ms: LOOP_DELAY,
            drift_gain: DRIFT_GAIN,
            yaw_filter_alpha: YAW_FILTER_ALPHA,
            heading_decay: HEADING_DECAY,
            default_propulsion: DEFAULT_PROPULSION,
            turn_propulsion: TURN_PROPULSION,
            servo_neutral: SERVO_NEUTRAL,
            servo_left: SERVO_LEFT,
            servo_right: SERVO_RIGHT,
            scan_step: SCAN_STEP,
            scan_settle_ms: SCAN_SETTLE_TIME,
            calibration_samples: CALIBRATION_SAMPLES,
            calibration_interval_ms: CALIBRATION_INTERVAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_constants() {
        let cfg = ControllerConfig::default();
        assert_eq!(cfg.servo_neutral, 93);
        assert_eq!(cfg.turn_timeout_ms, TURN_TIMEOUT);
        assert_eq!(cfg.wall_threshold, WALL_THRESHOLD);
        assert!(cfg.calibration_samples >= 300);
    }

    #[test]
    fn test_servo_range() {
        assert!(SERVO_LEFT < SERVO_NEUTRAL && SERVO_NEUTRAL < SERVO_RIGHT);
        assert!(SERVO_RIGHT <= SERVO_MAX);
        assert_eq!(SERVO_MAX % SCAN_STEP, 0);
    }
}
