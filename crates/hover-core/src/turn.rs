//! Closed-loop turn maneuver.
//!
//! The maneuver integrates bias-corrected yaw rate (no decay) until the
//! heading change reaches the target angle or the timeout fires. Both exits
//! take the same completion path; the outcome only records which one it was.

use crate::config::ControllerConfig;
use crate::hal::{Actuators, Clock, YawGyro};
use crate::math::fabs;
use crate::scanner::TurnDirection;
use crate::state::ControllerState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TurnPhase {
    Idle = 0,
    Turning = 1,
    HoldAfterTurn = 2,
    Done = 3,
}

impl TurnPhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Turning => "Turning",
            Self::HoldAfterTurn => "HoldAfterTurn",
            Self::Done => "Done",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnExit {
    TargetReached,
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnOutcome {
    pub direction: TurnDirection,
    pub exit: TurnExit,
    /// Time from entry to the end of the Turning phase (ms).
    pub elapsed_ms: u32,
    /// Integrated heading when Turning ended (°).
    pub heading_at_exit: f32,
}

pub struct TurnManeuver {
    phase: TurnPhase,
    direction: TurnDirection,
    start_ms: u32,
    last_sample_ms: u32,
    hold_start_ms: u32,
    outcome: Option<TurnOutcome>,
}

impl Default for TurnManeuver {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnManeuver {
    pub fn new() -> Self {
        Self {
            phase: TurnPhase::Idle,
            direction: TurnDirection::Right,
            start_ms: 0,
            last_sample_ms: 0,
            hold_start_ms: 0,
            outcome: None,
        }
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Available once the Turning phase has ended.
    pub fn outcome(&self) -> Option<TurnOutcome> {
        self.outcome
    }

    /// Enters Turning: zero heading, steering hard over, reduced thrust.
    pub fn begin<H>(
        &mut self,
        hw: &mut H,
        state: &mut ControllerState,
        config: &ControllerConfig,
        direction: TurnDirection,
    ) where
        H: Actuators + Clock,
    {
        let now = hw.now_ms();
        state.reset_heading();

        self.direction = direction;
        self.start_ms = now;
        self.last_sample_ms = now;
        self.outcome = None;

        let extreme = match direction {
            TurnDirection::Right => config.servo_right,
            TurnDirection::Left => config.servo_left,
        };
        hw.set_steering(extreme);
        hw.set_propulsion(config.turn_propulsion);

        diag!(info, "turn {}: steering {}", direction.label(), extreme);
        self.transition_to(TurnPhase::Turning);
    }

    /// Advances the maneuver by one iteration and returns the phase after it.
    pub fn poll<H>(
        &mut self,
        hw: &mut H,
        state: &mut ControllerState,
        config: &ControllerConfig,
    ) -> TurnPhase
    where
        H: YawGyro + Actuators + Clock,
    {
        match self.phase {
            TurnPhase::Idle | TurnPhase::Done => {}
            TurnPhase::Turning => {
                let rate = hw.read_yaw_rate() - state.yaw_bias;
                let now = hw.now_ms();
                let dt = now.wrapping_sub(self.last_sample_ms) as f32 / 1000.0;
                self.last_sample_ms = now;
                state.heading += rate * dt;

                let elapsed = now.wrapping_sub(self.start_ms);
                let exit = if fabs(state.heading) >= config.target_turn_angle {
                    Some(TurnExit::TargetReached)
                } else if elapsed >= config.turn_timeout_ms {
                    Some(TurnExit::TimedOut)
                } else {
                    None
                };

                if let Some(exit) = exit {
                    self.outcome = Some(TurnOutcome {
                        direction: self.direction,
                        exit,
                        elapsed_ms: elapsed,
                        heading_at_exit: state.heading,
                    });
                    diag!(
                        info,
                        "turn exit {:?} after {} ms, heading {:.1} deg",
                        exit,
                        elapsed,
                        state.heading
                    );
                    self.hold_start_ms = now;
                    self.transition_to(TurnPhase::HoldAfterTurn);
                }
            }
            TurnPhase::HoldAfterTurn => {
                let now = hw.now_ms();
                if now.wrapping_sub(self.hold_start_ms) >= config.turn_hold_ms {
                    hw.set_steering(config.servo_neutral);
                    hw.set_propulsion(config.default_propulsion);
                    state.reset_heading();
                    state.last_turn_ms = Some(now);
                    state.last_drift_ms = now;
                    self.transition_to(TurnPhase::Done);
                }
            }
        }

        self.phase
    }

    /// Runs a whole maneuver, blocking until Done.
    pub fn run<H>(
        &mut self,
        hw: &mut H,
        state: &mut ControllerState,
        config: &ControllerConfig,
        direction: TurnDirection,
    ) -> TurnOutcome
    where
        H: YawGyro + Actuators + Clock,
    {
        self.begin(hw, state, config, direction);

        loop {
            match self.poll(hw, state, config) {
                TurnPhase::Turning => hw.delay_ms(config.turn_sample_ms.max(1)),
                TurnPhase::HoldAfterTurn => {
                    let held = hw.now_ms().wrapping_sub(self.hold_start_ms);
                    hw.delay_ms(config.turn_hold_ms.saturating_sub(held).max(1));
                }
                TurnPhase::Idle | TurnPhase::Done => break,
            }
        }

        // Turning always ends with an outcome before Done is reached.
        self.outcome.unwrap_or(TurnOutcome {
            direction,
            exit: TurnExit::TimedOut,
            elapsed_ms: 0,
            heading_at_exit: 0.0,
        })
    }

    fn transition_to(&mut self, phase: TurnPhase) {
        diag!(debug, "turn {} -> {}", self.phase.label(), phase.label());
        self.phase = phase;
    }
}
