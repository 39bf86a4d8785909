//! Hover Simulation Library
//!
//! Provides hovercraft dynamics, arena geometry and sensor models that plug
//! into the `hover-core` hardware traits, so the real controller can be run
//! and tested on a desktop.

pub mod arena;
pub mod craft;
pub mod error;
pub mod params;
pub mod sensor;
pub mod sim;

// Re-export main types
pub use arena::{Arena, Obstacle, OverheadBar};
pub use craft::{CraftParams, CraftState};
pub use error::SimError;
pub use params::SimParams;
pub use sensor::{SensorConfig, SensorSuite};
pub use sim::{simulate, SimCraft, SimRun, TelemetrySample, TurnRecord};
