//! Parameter definitions for hovercraft simulation.

use nalgebra::Vector2;

use crate::arena::Arena;
use crate::craft::CraftParams;
use crate::error::SimError;
use crate::sensor::SensorConfig;

/// Parameter specification with bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    /// Human-readable label.
    pub label: &'static str,
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
}

impl ParamSpec {
    /// Create a new parameter specification.
    pub const fn new(label: &'static str, min: f64, max: f64) -> Self {
        Self { label, min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// `steps` evenly spaced values from `min` to `max`.
    pub fn sweep(&self, steps: usize) -> Vec<f64> {
        match steps {
            0 => Vec::new(),
            1 => vec![self.min],
            n => (0..n)
                .map(|i| self.min + (self.max - self.min) * (i as f64 / (n - 1) as f64))
                .collect(),
        }
    }
}

/// Craft physical parameters.
pub mod craft {
    use super::ParamSpec;

    pub const DISTURBANCE: ParamSpec = ParamSpec::new("Yaw Disturbance (°/s²)", -30.0, 30.0);
}

/// Sensor parameters.
pub mod sensor {
    use super::ParamSpec;

    pub const GYRO_BIAS: ParamSpec = ParamSpec::new("Gyro Bias (°/s)", -5.0, 5.0);
    pub const NOISE_SCALE: ParamSpec = ParamSpec::new("Noise Scale", 0.0, 10.0);
}

/// Controller tuning parameters.
pub mod controller {
    use super::ParamSpec;

    pub const DRIFT_GAIN: ParamSpec = ParamSpec::new("Drift Gain", 0.0, 8.0);
    pub const WALL_THRESHOLD: ParamSpec = ParamSpec::new("Wall Threshold (cm)", 5.0, 60.0);
    pub const TURN_TIMEOUT: ParamSpec = ParamSpec::new("Turn Timeout (ms)", 500.0, 10_000.0);
}

/// Everything needed to set up one simulated run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimParams {
    pub arena: Arena,
    pub craft: CraftParams,
    pub sensors: SensorConfig,
    pub start: Vector2<f64>,
    pub start_heading: f64,
    /// Simulated time budget including calibration (ms).
    pub duration_ms: u32,
    pub telemetry_period_ms: u32,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            arena: Arena::default(),
            craft: CraftParams::default(),
            sensors: SensorConfig::default(),
            start: Vector2::new(100.0, 200.0),
            start_heading: 0.0,
            duration_ms: 60_000,
            telemetry_period_ms: 50,
        }
    }
}

impl SimParams {
    pub fn validate(&self) -> Result<(), SimError> {
        self.sensors.validate()?;

        let r = self.craft.radius;
        if self.arena.width <= 2.0 * r || self.arena.height <= 2.0 * r {
            return Err(SimError::ArenaTooSmall {
                width: self.arena.width,
                height: self.arena.height,
                radius: r,
            });
        }
        if !self.arena.contains(&self.start) {
            return Err(SimError::StartOutsideArena {
                x: self.start.x,
                y: self.start.y,
            });
        }
        for (name, value) in [
            ("max_speed", self.craft.max_speed),
            ("speed_time_const", self.craft.speed_time_const),
            ("telemetry_period_ms", self.telemetry_period_ms as f64),
        ] {
            if value <= 0.0 {
                return Err(SimError::NonPositive { name, value });
            }
        }
        Ok(())
    }
}
