use thiserror::Error;

/// Invalid simulation setup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidNoise { name: &'static str, value: f64 },
    #[error("dropout probability must be in [0, 1], got {0}")]
    InvalidDropout(f64),
    #[error("arena {width} x {height} cm is too small for a craft of radius {radius} cm")]
    ArenaTooSmall { width: f64, height: f64, radius: f64 },
    #[error("start position ({x}, {y}) is outside the arena")]
    StartOutsideArena { x: f64, y: f64 },
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
}
