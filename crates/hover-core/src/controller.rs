//! Main control loop.
//!
//! Each cycle runs, in this order: overhead-bar check (terminal halt), wall
//! check gated by the turn cooldown (scan + turn, blocking), then forward
//! thrust with one drift-correction step, then the loop delay.

use crate::calibration::calibrate_bias;
use crate::config::{ControllerConfig, HALT_IDLE_PERIOD};
use crate::drift::update_drift_correction;
use crate::hal::{valid_reading, Hardware};
use crate::scanner::{scan_for_open_path, TurnDirection};
use crate::state::ControllerState;
use crate::turn::{TurnManeuver, TurnOutcome};

/// What a single cycle did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleReport {
    Cruising,
    Turned(TurnOutcome),
    Halted,
}

pub struct Controller<H: Hardware> {
    hw: H,
    config: ControllerConfig,
    state: ControllerState,
    turn: TurnManeuver,
}

impl<H: Hardware> Controller<H> {
    /// Brings the craft up: steering neutral and motors off while the gyro
    /// bias is measured, then lift on and forward thrust.
    pub fn start(mut hw: H, config: ControllerConfig) -> Self {
        hw.set_steering(config.servo_neutral);
        hw.set_propulsion(0);
        hw.set_lift(false);

        let bias = calibrate_bias(
            &mut hw,
            config.calibration_samples,
            config.calibration_interval_ms,
        );

        hw.set_lift(true);
        hw.set_propulsion(config.default_propulsion);

        let state = ControllerState::new(bias, hw.now_ms());
        diag!(info, "controller started, bias {:.3} deg/s", bias);
        Self::from_parts(hw, config, state)
    }

    /// Wraps already-initialised hardware and state. No actuator is touched.
    pub fn from_parts(hw: H, config: ControllerConfig, state: ControllerState) -> Self {
        Self {
            hw,
            config,
            state,
            turn: TurnManeuver::new(),
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn hardware(&self) -> &H {
        &self.hw
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hw
    }

    pub fn into_hardware(self) -> H {
        self.hw
    }

    pub fn is_halted(&self) -> bool {
        self.state.halted
    }

    /// Runs one control cycle. Once halted, returns `Halted` without touching
    /// any sensor or actuator.
    pub fn step(&mut self) -> CycleReport {
        if self.state.halted {
            return CycleReport::Halted;
        }

        let upward = valid_reading(self.hw.upward_distance());
        if let Some(clearance) = upward {
            if clearance < self.config.bar_threshold {
                diag!(warn, "overhead bar at {:.1} cm, halting", clearance);
                self.halt();
                return CycleReport::Halted;
            }
        }

        let mut report = CycleReport::Cruising;
        let now = self.hw.now_ms();
        if self.state.cooldown_elapsed(now, self.config.turn_cooldown_ms) {
            let forward = valid_reading(self.hw.forward_distance());
            diag!(debug, "forward {:?} cm, upward {:?} cm", forward, upward);

            if let Some(distance) = forward.filter(|d| *d < self.config.wall_threshold) {
                diag!(info, "wall at {:.1} cm, scanning", distance);
                report = CycleReport::Turned(self.avoid_obstacle());
            }
        }

        self.hw.set_propulsion(self.config.default_propulsion);
        update_drift_correction(&mut self.hw, &mut self.state, &self.config);

        self.hw.delay_ms(self.config.loop_delay_ms);
        report
    }

    /// Runs cycles until the craft halts, then parks forever.
    pub fn run(mut self) -> ! {
        while self.step() != CycleReport::Halted {}
        self.park()
    }

    fn avoid_obstacle(&mut self) -> TurnOutcome {
        self.hw.set_propulsion(0);
        let angle = scan_for_open_path(&mut self.hw, &self.config);
        let direction = TurnDirection::from_scan_angle(angle, self.config.servo_neutral);

        self.hw.set_propulsion(self.config.turn_propulsion);
        self.turn
            .run(&mut self.hw, &mut self.state, &self.config, direction)
    }

    fn halt(&mut self) {
        self.hw.set_propulsion(0);
        self.hw.set_lift(false);
        self.state.halted = true;
    }

    /// Terminal wait. Only a physical reset leaves this state.
    fn park(mut self) -> ! {
        diag!(info, "halted");
        loop {
            self.hw.delay_ms(HALT_IDLE_PERIOD);
        }
    }
}
