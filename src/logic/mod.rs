mod action_dispatcher;
mod capture_engine;
mod outcome_wheel;
mod sim_logic;

pub use action_dispatcher::{ActionDispatcher, DispatchEffect};
pub use capture_engine::{Capture, CaptureEngine};
pub use outcome_wheel::{
    normalize_angle, LayoutError, OutcomeWheel, SpinPhase, SpinStart, WheelLayout, WheelSegment,
    WheelState,
};
pub use sim_logic::{ResolutionHook, SimulationLogic};
