use serde::{Deserialize, Serialize};

use super::cell::CellCoord;
use super::faction::FactionId;
use super::outcome::SegmentLabel;
use super::projectile::{ProjectileId, Vec2};

/// Things the presentation layer may want to animate, in the order they
/// happened. Buffered by the simulation and drained by the host each frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimulationEvent {
    SpinStarted {
        faction: FactionId,
        target_angle: f64,
    },
    WheelResolved {
        faction: FactionId,
        index: usize,
        label: SegmentLabel,
        multiplier: u32,
    },
    WheelSettled {
        faction: FactionId,
    },
    WheelDestroyed {
        faction: FactionId,
    },
    CannonGranted {
        faction: FactionId,
        cell: CellCoord,
    },
    ProjectileFired {
        projectile: ProjectileId,
        faction: FactionId,
        cell: CellCoord,
        position: Vec2,
        angle: f32,
    },
    CellCaptured {
        cell: CellCoord,
        from: FactionId,
        to: FactionId,
        projectile: ProjectileId,
        cannon_lost: bool,
    },
}
