pub mod cell;
pub mod event;
pub mod faction;
pub mod metrics;
pub mod outcome;
pub mod projectile;
pub mod snapshot;

pub use cell::{Cell, CellCoord};
pub use event::SimulationEvent;
pub use faction::{Faction, FactionId, FactionRoster};
pub use metrics::SimulationMetrics;
pub use outcome::{SegmentLabel, SpinOutcome};
pub use projectile::{Projectile, ProjectileId, Vec2};
pub use snapshot::{
    FactionStanding, ProjectileSnapshot, SimulationSnapshot, WheelSnapshot, WheelStatus,
    CELL_FIELD_COUNT,
};
