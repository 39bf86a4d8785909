/// Persistent controller state carried between cycles.
///
/// The heading estimate is shared by the turn maneuver and the drift
/// corrector; only one of them runs in any phase of a cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerState {
    /// Gyro bias (°/s), fixed after calibration.
    pub yaw_bias: f32,
    /// Integrated deviation from the reference heading (°).
    pub heading: f32,
    /// Low-pass filtered yaw rate of the drift corrector (°/s).
    pub filtered_yaw_rate: f32,
    /// Time of the last drift update.
    pub last_drift_ms: u32,
    /// Completion time of the last turn, `None` before the first one.
    pub last_turn_ms: Option<u32>,
    pub halted: bool,
}

impl ControllerState {
    pub fn new(yaw_bias: f32, now_ms: u32) -> Self {
        Self {
            yaw_bias,
            heading: 0.0,
            filtered_yaw_rate: 0.0,
            last_drift_ms: now_ms,
            last_turn_ms: None,
            halted: false,
        }
    }

    /// True once `cooldown_ms` have passed since the last turn completed.
    pub fn cooldown_elapsed(&self, now_ms: u32, cooldown_ms: u32) -> bool {
        match self.last_turn_ms {
            Some(t) => now_ms.wrapping_sub(t) >= cooldown_ms,
            None => true,
        }
    }

    pub fn reset_heading(&mut self) {
        self.heading = 0.0;
    }
}
