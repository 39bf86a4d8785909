//! # Hover Core
//!
//! Navigation and propulsion controller for a small autonomous hovercraft,
//! designed for `no_std` targets with a single thread of control and no
//! allocation:
//! - Gyro bias calibration
//! - Steering sweep for the most open heading
//! - Closed-loop turn maneuver with a bounded timeout
//! - Proportional drift correction during straight travel
//! - Main control loop with a terminal overhead-bar halt
//!
//! All hardware access goes through the traits in [`hal`].
//!
//! # Features
//! - `std`: Enable standard library support (host builds)
//! - `diagnostics`: Line-oriented state/sensor trace through the `log` facade
//! - Default: `no_std`, no diagnostics

#![cfg_attr(not(any(feature = "std", test)), no_std)]

#[macro_use]
mod diag;

pub mod calibration;
pub mod config;
pub mod controller;
pub mod drift;
pub mod hal;
mod math;
pub mod scanner;
pub mod state;
pub mod turn;

#[cfg(test)]
mod mock;

// Re-export core types
pub use calibration::{calibrate_bias, BiasEstimator};
pub use config::ControllerConfig;
pub use controller::{Controller, CycleReport};
pub use drift::update_drift_correction;
pub use hal::{Actuators, Clock, Hardware, RangeFinder, YawGyro};
pub use scanner::{scan_for_open_path, TurnDirection};
pub use state::ControllerState;
pub use turn::{TurnExit, TurnManeuver, TurnOutcome, TurnPhase};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
