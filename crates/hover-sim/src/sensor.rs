use hover_core::config::{ECHO_TIMEOUT, GYRO_SENSITIVITY};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Bernoulli, Distribution, Normal};

use crate::error::SimError;

#[derive(Debug, Clone, PartialEq)]
pub struct SensorConfig {
    pub noise_scale: f64,
    pub range_noise_std: f64, // cm
    pub range_min: f64,       // cm
    pub range_max: f64,       // cm
    pub dropout_prob: f64,    // chance a ping gets no echo
    pub sound_speed: f64,     // cm/ms

    // Static bias only, no random walk
    pub gyro_bias: f64,      // °/s
    pub gyro_noise_std: f64, // °/s

    pub seed: u64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            noise_scale: 1.0,
            range_noise_std: 0.5,
            range_min: 2.0,
            range_max: 400.0,
            dropout_prob: 0.02,
            sound_speed: 34.3,
            gyro_bias: 0.8,
            gyro_noise_std: 0.3,
            seed: 42,
        }
    }
}

impl SensorConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        for (name, value) in [
            ("noise_scale", self.noise_scale),
            ("range_noise_std", self.range_noise_std),
            ("gyro_noise_std", self.gyro_noise_std),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::InvalidNoise { name, value });
            }
        }
        if !(0.0..=1.0).contains(&self.dropout_prob) {
            return Err(SimError::InvalidDropout(self.dropout_prob));
        }
        for (name, value) in [
            ("range_max", self.range_max),
            ("sound_speed", self.sound_speed),
        ] {
            if value <= 0.0 {
                return Err(SimError::NonPositive { name, value });
            }
        }
        Ok(())
    }
}

/// A single ultrasonic ping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ping {
    pub distance: Option<f32>,
    /// Time the measurement blocks the caller (ms).
    pub echo_ms: u32,
}

/// Noisy ultrasonic and gyro models sharing one seeded RNG.
pub struct SensorSuite {
    cfg: SensorConfig,
    rng: StdRng,
    range_noise: Normal<f64>,
    gyro_noise: Normal<f64>,
    dropout: Bernoulli,
}

impl SensorSuite {
    pub fn new(cfg: SensorConfig) -> Result<Self, SimError> {
        cfg.validate()?;

        let range_noise = Normal::new(0.0, cfg.noise_scale * cfg.range_noise_std).map_err(|_| {
            SimError::InvalidNoise {
                name: "range_noise_std",
                value: cfg.range_noise_std,
            }
        })?;
        let gyro_noise = Normal::new(0.0, cfg.noise_scale * cfg.gyro_noise_std).map_err(|_| {
            SimError::InvalidNoise {
                name: "gyro_noise_std",
                value: cfg.gyro_noise_std,
            }
        })?;
        let dropout = Bernoulli::new(cfg.dropout_prob)
            .map_err(|_| SimError::InvalidDropout(cfg.dropout_prob))?;

        Ok(Self {
            rng: StdRng::seed_from_u64(cfg.seed),
            cfg,
            range_noise,
            gyro_noise,
            dropout,
        })
    }

    pub fn config(&self) -> &SensorConfig {
        &self.cfg
    }

    /// Pings a surface `true_distance` cm away (`None` for nothing in range).
    pub fn ping(&mut self, true_distance: Option<f64>) -> Ping {
        let no_echo = Ping {
            distance: None,
            echo_ms: ECHO_TIMEOUT,
        };

        let Some(d) = true_distance.filter(|d| *d <= self.cfg.range_max) else {
            return no_echo;
        };
        if self.dropout.sample(&mut self.rng) {
            return no_echo;
        }

        let measured = (d + self.range_noise.sample(&mut self.rng)).max(self.cfg.range_min);
        let round_trip = (2.0 * measured / self.cfg.sound_speed).ceil() as u32;
        Ping {
            distance: Some(measured as f32),
            echo_ms: round_trip.clamp(1, ECHO_TIMEOUT),
        }
    }

    /// Raw yaw register value for a true rate in °/s.
    pub fn gyro_raw(&mut self, true_rate: f64) -> i16 {
        let measured = true_rate + self.cfg.gyro_bias + self.gyro_noise.sample(&mut self.rng);
        let counts = (measured * GYRO_SENSITIVITY as f64).round();
        counts.clamp(i16::MIN as f64, i16::MAX as f64) as i16
    }
}
