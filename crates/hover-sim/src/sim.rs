use hover_core::hal::{Actuators, Clock, RangeFinder, YawGyro};
use hover_core::{Controller, ControllerConfig, CycleReport, TurnExit};
use nalgebra::{Rotation2, Vector2};
use serde::Serialize;

use crate::craft::{ActuatorInputs, CraftState};
use crate::error::SimError;
use crate::params::SimParams;
use crate::sensor::SensorSuite;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------
const DT_MS: u32 = 1; // 1 kHz physics
/// Servo angle at which the forward sensor looks straight ahead.
const SENSOR_CENTER_ANGLE: f64 = 90.0;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Serialize)]
pub struct TelemetrySample {
    pub time_ms: u32,
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub yaw_rate: f64,
    pub speed: f64,
    pub steering: u8,
    pub propulsion: u8,
    pub lift: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnRecord {
    /// Time the cycle containing the turn finished (ms).
    pub time_ms: u32,
    pub direction: &'static str,
    pub timed_out: bool,
    pub elapsed_ms: u32,
    /// Gyro-integrated heading when the turn ended (°).
    pub estimated_rotation: f32,
    /// Actual rotation of the craft over the scan and turn (°).
    pub true_rotation: f64,
}

#[derive(Debug, Clone)]
pub struct SimRun {
    pub telemetry: Vec<TelemetrySample>,
    pub turns: Vec<TurnRecord>,
    pub cycles: u32,
    pub halted: bool,
    pub halt_time_ms: Option<u32>,
    pub yaw_bias: f32,
    pub final_state: CraftState,
}

impl SimRun {
    pub fn distance_travelled(&self) -> f64 {
        self.telemetry
            .windows(2)
            .map(|w| ((w[1].x - w[0].x).powi(2) + (w[1].y - w[0].y).powi(2)).sqrt())
            .sum()
    }

    pub fn timed_out_turns(&self) -> usize {
        self.turns.iter().filter(|t| t.timed_out).count()
    }
}

// ---------------------------------------------------------------------------
// Simulated hardware
// ---------------------------------------------------------------------------

/// The craft, its arena and its sensors behind the controller's hardware
/// traits. Simulated time only moves through sensor echo time and delays.
pub struct SimCraft {
    params: SimParams,
    craft: CraftState,
    sensors: SensorSuite,
    inputs: ActuatorInputs,
    now_ms: u32,
    since_sample_ms: u32,
    telemetry: Vec<TelemetrySample>,
}

impl SimCraft {
    pub fn new(params: SimParams) -> Result<Self, SimError> {
        params.validate()?;

        let sensors = SensorSuite::new(params.sensors.clone())?;
        let craft = CraftState::new(params.start, params.start_heading);
        let inputs = ActuatorInputs {
            steering: params.craft.steering_neutral.round() as u8,
            propulsion: 0,
            lift: false,
        };

        let mut sim = Self {
            params,
            craft,
            sensors,
            inputs,
            now_ms: 0,
            since_sample_ms: 0,
            telemetry: Vec::new(),
        };
        sim.record();
        Ok(sim)
    }

    pub fn craft(&self) -> &CraftState {
        &self.craft
    }

    pub fn inputs(&self) -> ActuatorInputs {
        self.inputs
    }

    pub fn telemetry(&self) -> &[TelemetrySample] {
        &self.telemetry
    }

    pub fn into_telemetry(self) -> Vec<TelemetrySample> {
        self.telemetry
    }

    fn advance(&mut self, ms: u32) {
        let dt = DT_MS as f64 / 1000.0;
        for _ in 0..ms / DT_MS {
            self.craft
                .step(&self.params.craft, &self.params.arena, self.inputs, dt);
            self.now_ms = self.now_ms.wrapping_add(DT_MS);
            self.since_sample_ms += DT_MS;
            if self.since_sample_ms >= self.params.telemetry_period_ms {
                self.record();
            }
        }
    }

    fn record(&mut self) {
        self.since_sample_ms = 0;
        self.telemetry.push(TelemetrySample {
            time_ms: self.now_ms,
            x: self.craft.position.x,
            y: self.craft.position.y,
            heading: self.craft.heading,
            yaw_rate: self.craft.yaw_rate,
            speed: self.craft.speed,
            steering: self.inputs.steering,
            propulsion: self.inputs.propulsion,
            lift: self.inputs.lift,
        });
    }

    /// Origin and direction of the forward sensor, which turns with the
    /// steering servo.
    fn forward_ray(&self) -> (Vector2<f64>, Vector2<f64>) {
        let heading = self.craft.forward();
        let origin = self.craft.position + heading * self.params.craft.radius;
        let offset = (self.inputs.steering as f64 - SENSOR_CENTER_ANGLE).to_radians();
        (origin, Rotation2::new(offset) * heading)
    }
}

impl RangeFinder for SimCraft {
    fn forward_distance(&mut self) -> Option<f32> {
        let (origin, dir) = self.forward_ray();
        let d = self.params.arena.ray_distance(&origin, &dir);
        let ping = self.sensors.ping(Some(d));
        self.advance(ping.echo_ms);
        ping.distance
    }

    fn upward_distance(&mut self) -> Option<f32> {
        let clearance = self.params.arena.overhead_clearance(&self.craft.position);
        let ping = self.sensors.ping(clearance);
        self.advance(ping.echo_ms);
        ping.distance
    }
}

impl YawGyro for SimCraft {
    fn read_raw_yaw(&mut self) -> i16 {
        self.sensors.gyro_raw(self.craft.yaw_rate)
    }
}

impl Actuators for SimCraft {
    fn set_steering(&mut self, angle: u8) {
        if self.inputs.steering != angle {
            self.inputs.steering = angle;
            self.record();
        }
    }

    fn set_propulsion(&mut self, level: u8) {
        if self.inputs.propulsion != level {
            self.inputs.propulsion = level;
            self.record();
        }
    }

    fn set_lift(&mut self, on: bool) {
        if self.inputs.lift != on {
            self.inputs.lift = on;
            self.record();
        }
    }
}

impl Clock for SimCraft {
    fn now_ms(&self) -> u32 {
        self.now_ms
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance(ms);
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Starts the controller on a simulated craft and runs cycles until the time
/// budget is spent or the craft halts.
pub fn simulate(params: &SimParams, config: &ControllerConfig) -> Result<SimRun, SimError> {
    let craft = SimCraft::new(params.clone())?;
    let mut ctl = Controller::start(craft, *config);
    let yaw_bias = ctl.state().yaw_bias;
    tracing::debug!(yaw_bias, "calibration done");

    let mut turns = Vec::new();
    let mut cycles = 0;
    let mut halt_time_ms = None;

    while ctl.hardware().now_ms() < params.duration_ms {
        let heading_before = ctl.hardware().craft().heading;
        let report = ctl.step();
        cycles += 1;

        match report {
            CycleReport::Cruising => {}
            CycleReport::Turned(outcome) => {
                let record = TurnRecord {
                    time_ms: ctl.hardware().now_ms(),
                    direction: outcome.direction.label(),
                    timed_out: outcome.exit == TurnExit::TimedOut,
                    elapsed_ms: outcome.elapsed_ms,
                    estimated_rotation: outcome.heading_at_exit,
                    true_rotation: ctl.hardware().craft().heading - heading_before,
                };
                tracing::debug!(
                    time_ms = record.time_ms,
                    direction = record.direction,
                    timed_out = record.timed_out,
                    "turn complete"
                );
                turns.push(record);
            }
            CycleReport::Halted => {
                let now = ctl.hardware().now_ms();
                tracing::info!(time_ms = now, "overhead bar, craft halted");
                halt_time_ms = Some(now);
                break;
            }
        }
    }

    let craft = ctl.into_hardware();
    let final_state = craft.craft().clone();
    Ok(SimRun {
        telemetry: craft.into_telemetry(),
        turns,
        cycles,
        halted: halt_time_ms.is_some(),
        halt_time_ms,
        yaw_bias,
        final_state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::{Arena, OverheadBar};
    use crate::craft::CraftParams;

    #[test]
    fn test_wall_avoidance_stays_in_arena() {
        let params = SimParams::default();
        let run = simulate(&params, &ControllerConfig::default()).unwrap();

        assert!(!run.halted);
        assert!(!run.turns.is_empty(), "expected at least one turn");
        assert!(run
            .telemetry
            .iter()
            .all(|s| params.arena.contains(&Vector2::new(s.x, s.y))));
        assert!(run.distance_travelled() > 100.0);
        assert!((run.yaw_bias as f64 - params.sensors.gyro_bias).abs() < 0.1);
    }

    #[test]
    fn test_turn_reverses_heading() {
        let params = SimParams {
            sensors: crate::sensor::SensorConfig {
                dropout_prob: 0.0,
                ..Default::default()
            },
            ..SimParams::default()
        };
        let run = simulate(&params, &ControllerConfig::default()).unwrap();
        let first = run.turns.first().expect("a turn");
        assert!(!first.timed_out);
        assert!(first.estimated_rotation.abs() >= 180.0);
        assert!(first.true_rotation.abs() > 150.0, "rotated {}", first.true_rotation);
    }

    #[test]
    fn test_overhead_bar_halts() {
        let params = SimParams {
            arena: Arena::default().with_bar(OverheadBar {
                x_min: 250.0,
                x_max: 280.0,
                clearance: 10.0,
            }),
            ..SimParams::default()
        };
        let run = simulate(&params, &ControllerConfig::default()).unwrap();

        assert!(run.halted);
        assert!(run.turns.is_empty());
        let x = run.final_state.position.x;
        assert!((250.0..=300.0).contains(&x), "halted at x = {x}");
    }

    #[test]
    fn test_halted_craft_comes_to_rest() {
        let params = SimParams {
            arena: Arena::default().with_bar(OverheadBar {
                x_min: 200.0,
                x_max: 240.0,
                clearance: 5.0,
            }),
            ..SimParams::default()
        };
        let craft = SimCraft::new(params).unwrap();
        let mut ctl = Controller::start(craft, ControllerConfig::default());
        while ctl.step() != CycleReport::Halted {
            assert!(ctl.hardware().now_ms() < 20_000);
        }

        let hw = ctl.hardware_mut();
        assert_eq!(hw.inputs().propulsion, 0);
        assert!(!hw.inputs().lift);
        hw.delay_ms(3000);
        assert!(hw.craft().speed.abs() < 1e-3);
        assert!(hw.craft().yaw_rate.abs() < 1e-3);
    }

    fn drift_run(gain: f32) -> SimRun {
        let params = SimParams {
            arena: Arena::new(2000.0, 1000.0),
            craft: CraftParams {
                disturbance: 20.0,
                ..CraftParams::default()
            },
            start: Vector2::new(100.0, 500.0),
            duration_ms: 7_500,
            ..SimParams::default()
        };
        let config = ControllerConfig {
            drift_gain: gain,
            ..ControllerConfig::default()
        };
        simulate(&params, &config).unwrap()
    }

    #[test]
    fn test_drift_correction_holds_heading() {
        let corrected = drift_run(2.0);
        let open_loop = drift_run(0.0);

        assert!(corrected.turns.is_empty() && open_loop.turns.is_empty());
        let h_corr = corrected.final_state.heading.abs();
        let h_open = open_loop.final_state.heading.abs();
        assert!(h_corr < 15.0, "corrected heading {h_corr}");
        assert!(h_open > 25.0, "open-loop heading {h_open}");
    }

    #[test]
    fn test_same_seed_same_run() {
        let params = SimParams {
            duration_ms: 15_000,
            ..SimParams::default()
        };
        let a = simulate(&params, &ControllerConfig::default()).unwrap();
        let b = simulate(&params, &ControllerConfig::default()).unwrap();
        assert_eq!(a.cycles, b.cycles);
        assert_eq!(a.telemetry.len(), b.telemetry.len());
        assert_eq!(a.final_state, b.final_state);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = SimParams {
            start: Vector2::new(5000.0, 0.0),
            ..SimParams::default()
        };
        assert!(simulate(&params, &ControllerConfig::default()).is_err());
    }
}
