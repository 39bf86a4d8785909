//! Scripted hardware for unit tests. Time only moves through `delay_ms`
//! and the optional per-read latency.

use crate::config::GYRO_SENSITIVITY;
use crate::hal::{Actuators, Clock, RangeFinder, YawGyro};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Steering(u8),
    Propulsion(u8),
    Lift(bool),
}

type RangeFn = Box<dyn FnMut(u8, u32) -> Option<f32>>;
type YawFn = Box<dyn FnMut(u32) -> f32>;

pub struct MockHardware {
    pub now: u32,
    pub steering: u8,
    pub propulsion: u8,
    pub lift: bool,
    /// Every actuator command with the time it was issued.
    pub commands: Vec<(u32, Command)>,
    pub forward_reads: u32,
    pub upward_reads: u32,
    read_latency_ms: u32,
    forward: RangeFn,
    upward: RangeFn,
    yaw: YawFn,
}

impl MockHardware {
    /// Open space in every direction, gyro at rest.
    pub fn new() -> Self {
        Self {
            now: 0,
            steering: 0,
            propulsion: 0,
            lift: false,
            commands: Vec::new(),
            forward_reads: 0,
            upward_reads: 0,
            read_latency_ms: 0,
            forward: Box::new(|_, _| None),
            upward: Box::new(|_, _| None),
            yaw: Box::new(|_| 0.0),
        }
    }

    /// Forward distance as a function of (steering angle, time).
    pub fn with_forward(mut self, f: impl FnMut(u8, u32) -> Option<f32> + 'static) -> Self {
        self.forward = Box::new(f);
        self
    }

    pub fn with_upward(mut self, f: impl FnMut(u8, u32) -> Option<f32> + 'static) -> Self {
        self.upward = Box::new(f);
        self
    }

    /// Yaw rate in °/s (bias included) as a function of time.
    pub fn with_yaw(mut self, f: impl FnMut(u32) -> f32 + 'static) -> Self {
        self.yaw = Box::new(f);
        self
    }

    pub fn with_read_latency(mut self, ms: u32) -> Self {
        self.read_latency_ms = ms;
        self
    }

    pub fn steering_commands(&self) -> Vec<u8> {
        self.commands
            .iter()
            .filter_map(|(_, c)| match c {
                Command::Steering(a) => Some(*a),
                _ => None,
            })
            .collect()
    }

    pub fn propulsion_commands(&self) -> Vec<u8> {
        self.commands
            .iter()
            .filter_map(|(_, c)| match c {
                Command::Propulsion(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }
}

impl RangeFinder for MockHardware {
    fn forward_distance(&mut self) -> Option<f32> {
        self.forward_reads += 1;
        let d = (self.forward)(self.steering, self.now);
        self.now = self.now.wrapping_add(self.read_latency_ms);
        d
    }

    fn upward_distance(&mut self) -> Option<f32> {
        self.upward_reads += 1;
        let d = (self.upward)(self.steering, self.now);
        self.now = self.now.wrapping_add(self.read_latency_ms);
        d
    }
}

impl YawGyro for MockHardware {
    fn read_raw_yaw(&mut self) -> i16 {
        let dps = (self.yaw)(self.now);
        let raw = (dps * GYRO_SENSITIVITY).round();
        raw.clamp(i16::MIN as f32, i16::MAX as f32) as i16
    }
}

impl Actuators for MockHardware {
    fn set_steering(&mut self, angle: u8) {
        self.steering = angle;
        self.commands.push((self.now, Command::Steering(angle)));
    }

    fn set_propulsion(&mut self, level: u8) {
        self.propulsion = level;
        self.commands.push((self.now, Command::Propulsion(level)));
    }

    fn set_lift(&mut self, on: bool) {
        self.lift = on;
        self.commands.push((self.now, Command::Lift(on)));
    }
}

impl Clock for MockHardware {
    fn now_ms(&self) -> u32 {
        self.now
    }

    fn delay_ms(&mut self, ms: u32) {
        self.now = self.now.wrapping_add(ms);
    }
}
