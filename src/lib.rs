//! Territory conquest engine.
//!
//! Factions own cells of a square grid. Each faction spins an outcome wheel
//! that fires bursts from its cannons, builds a cannon, raises its shot
//! multiplier or does nothing; projectiles capture the enemy cells they hit.
//! The host drives everything through `tick` and reads snapshots and events
//! back, either from Rust (`SimulationLogic`) or from JavaScript
//! (`service::Simulation`).

pub mod config;
pub mod constants;
pub mod data;
pub mod dependency;
pub mod logic;
pub mod service;
pub mod types;

pub use config::{load_scenario, ConfigError, ScenarioConfig, SimulationConfig};
pub use data::{SimulationData, Territory, TimerEvent};
pub use logic::{
    ActionDispatcher, CaptureEngine, LayoutError, OutcomeWheel, SimulationLogic, WheelLayout,
};
pub use service::Simulation;
pub use types::{
    Cell, CellCoord, FactionId, SegmentLabel, SimulationEvent, SimulationSnapshot, SpinOutcome,
};
