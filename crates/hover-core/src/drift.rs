use crate::config::{ControllerConfig, SERVO_MAX};
use crate::hal::{Actuators, Clock, YawGyro};
use crate::math::{round_i32, servo_offset};
use crate::state::ControllerState;

/// One proportional drift-correction step for straight-line travel.
///
/// The heading integral decays every call, which bounds accumulated gyro
/// drift on long runs but leaves a small steady-state heading error.
/// A call with no elapsed time changes nothing.
pub fn update_drift_correction<H>(
    hw: &mut H,
    state: &mut ControllerState,
    config: &ControllerConfig,
) where
    H: YawGyro + Actuators + Clock,
{
    let now = hw.now_ms();
    let elapsed = now.wrapping_sub(state.last_drift_ms);
    if elapsed == 0 {
        return;
    }
    let dt = elapsed as f32 / 1000.0;
    state.last_drift_ms = now;

    let raw = hw.read_yaw_rate() - state.yaw_bias;
    let alpha = config.yaw_filter_alpha;
    state.filtered_yaw_rate = alpha * raw + (1.0 - alpha) * state.filtered_yaw_rate;

    state.heading = state.heading * config.heading_decay + state.filtered_yaw_rate * dt;

    let correction = -state.heading * config.drift_gain;
    let steering = servo_offset(config.servo_neutral, round_i32(correction), SERVO_MAX);
    hw.set_steering(steering);

    diag!(
        trace,
        "drift: rate {:.2} heading {:.2} steering {}",
        state.filtered_yaw_rate,
        state.heading,
        steering
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockHardware;

    fn cfg() -> ControllerConfig {
        ControllerConfig::default()
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let mut hw = MockHardware::new().with_yaw(|_| 25.0);
        hw.now = 500;
        let mut state = ControllerState::new(0.0, 500);
        state.heading = 7.0;
        state.filtered_yaw_rate = 3.0;
        let before = state;

        update_drift_correction(&mut hw, &mut state, &cfg());
        assert_eq!(state, before);
        assert!(hw.commands.is_empty());
    }

    #[test]
    fn test_zero_rate_converges_to_neutral() {
        let mut hw = MockHardware::new();
        let mut state = ControllerState::new(0.0, 0);
        state.heading = 20.0;
        state.filtered_yaw_rate = 4.0;

        for _ in 0..2000 {
            hw.delay_ms(50);
            update_drift_correction(&mut hw, &mut state, &cfg());
        }
        assert!(state.heading.abs() < 1e-3, "heading {}", state.heading);
        assert!(state.filtered_yaw_rate.abs() < 1e-6);
        assert_eq!(hw.steering, 93);
    }

    #[test]
    fn test_filter_and_heading_update() {
        let mut hw = MockHardware::new().with_yaw(|_| 11.0);
        let mut state = ControllerState::new(1.0, 0);
        state.heading = 2.0;
        state.filtered_yaw_rate = 5.0;

        hw.delay_ms(100);
        update_drift_correction(&mut hw, &mut state, &cfg());

        // filtered = 0.9 * 10 + 0.1 * 5
        let filtered = 0.9 * (11.0_f32 - 1.0) + 0.1 * 5.0;
        assert!((state.filtered_yaw_rate - filtered).abs() < 0.01);
        let heading = 2.0 * 0.99 + filtered * 0.1;
        assert!((state.heading - heading).abs() < 0.01);
        // correction = -2 * 2.93 -> -6
        assert_eq!(hw.steering, 87);
        assert_eq!(state.last_drift_ms, 100);
    }

    #[test]
    fn test_steers_against_drift() {
        let mut hw = MockHardware::new().with_yaw(|_| -5.0);
        let mut state = ControllerState::new(0.0, 0);

        // A single step leaves the correction below one servo degree.
        hw.delay_ms(50);
        update_drift_correction(&mut hw, &mut state, &cfg());
        assert!(state.heading < 0.0);
        assert_eq!(hw.steering, 93);

        for _ in 0..9 {
            hw.delay_ms(50);
            update_drift_correction(&mut hw, &mut state, &cfg());
        }
        assert!(state.heading < -2.0, "heading {}", state.heading);
        assert!(hw.steering > 93);
    }

    #[test]
    fn test_steering_clamped() {
        let mut hw = MockHardware::new();
        let mut state = ControllerState::new(0.0, 0);
        state.heading = 500.0;
        hw.delay_ms(50);
        update_drift_correction(&mut hw, &mut state, &cfg());
        assert_eq!(hw.steering, 0);

        state.heading = -500.0;
        hw.delay_ms(50);
        update_drift_correction(&mut hw, &mut state, &cfg());
        assert_eq!(hw.steering, 180);
    }

    #[test]
    fn test_huge_heading_saturates() {
        let mut hw = MockHardware::new();
        let mut state = ControllerState::new(0.0, 0);
        state.heading = -1.2e9;
        hw.delay_ms(50);
        update_drift_correction(&mut hw, &mut state, &cfg());
        assert_eq!(hw.steering, 180);

        state.heading = 1.2e9;
        hw.delay_ms(50);
        update_drift_correction(&mut hw, &mut state, &cfg());
        assert_eq!(hw.steering, 0);
    }

    #[test]
    fn test_huge_gain_saturates() {
        let config = ControllerConfig {
            drift_gain: 1.0e12,
            ..cfg()
        };
        let mut hw = MockHardware::new().with_yaw(|_| -100.0);
        let mut state = ControllerState::new(0.0, 0);
        hw.delay_ms(50);
        update_drift_correction(&mut hw, &mut state, &config);
        assert_eq!(hw.steering, 180);
    }
}
