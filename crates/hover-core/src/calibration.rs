//! Gyro bias calibration.
//!
//! The craft must be stationary while samples are taken. Nothing checks
//! this: a craft that moves during calibration gets a wrong bias for the
//! rest of the run.

use crate::hal::{Clock, YawGyro};

/// Running mean of stationary yaw-rate samples (°/s).
#[derive(Debug, Clone, Copy, Default)]
pub struct BiasEstimator {
    sum: f64,
    count: u32,
    required: u32,
}

impl BiasEstimator {
    pub fn new(required_samples: u32) -> Self {
        Self {
            sum: 0.0,
            count: 0,
            required: required_samples,
        }
    }

    /// Adds one sample. Returns `true` once enough samples are in.
    pub fn add_sample(&mut self, yaw_rate_dps: f32) -> bool {
        if self.count < self.required {
            self.sum += yaw_rate_dps as f64;
            self.count += 1;
        }
        self.is_ready()
    }

    pub fn is_ready(&self) -> bool {
        self.count >= self.required
    }

    pub fn sample_count(&self) -> u32 {
        self.count
    }

    /// Arithmetic mean of the samples so far, 0 with no samples.
    pub fn bias(&self) -> f32 {
        if self.count == 0 {
            0.0
        } else {
            (self.sum / self.count as f64) as f32
        }
    }
}

/// Samples the gyro `samples` times, `interval_ms` apart, and returns the
/// mean rate. Blocks for `samples × interval_ms`.
pub fn calibrate_bias<H>(hw: &mut H, samples: u32, interval_ms: u32) -> f32
where
    H: YawGyro + Clock,
{
    diag!(info, "calibrating gyro: {} samples @ {} ms", samples, interval_ms);

    let mut estimator = BiasEstimator::new(samples);
    while !estimator.add_sample(hw.read_yaw_rate()) {
        hw.delay_ms(interval_ms);
    }
    hw.delay_ms(interval_ms);

    let bias = estimator.bias();
    diag!(info, "gyro bias: {:.4} deg/s", bias);
    bias
}
