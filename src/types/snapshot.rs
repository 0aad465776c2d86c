use serde::{Deserialize, Serialize};

use super::cell::Cell;
use super::faction::FactionId;
use super::projectile::Projectile;

/// Values per cell in the flat snapshot: owner id, color, cannon flag.
pub const CELL_FIELD_COUNT: usize = 3;

/// Coarse wheel state for the host, encoded as a number on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u32", from = "u32")]
pub enum WheelStatus {
    Idle = 0,
    Spinning = 1,
    Settling = 2,
    Destroyed = 3,
}

impl From<WheelStatus> for u32 {
    fn from(status: WheelStatus) -> u32 {
        status as u32
    }
}

impl From<u32> for WheelStatus {
    fn from(value: u32) -> WheelStatus {
        match value {
            1 => WheelStatus::Spinning,
            2 => WheelStatus::Settling,
            3 => WheelStatus::Destroyed,
            _ => WheelStatus::Idle,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub faction: FactionId,
    pub color: u32,
}

impl From<&Projectile> for ProjectileSnapshot {
    fn from(projectile: &Projectile) -> Self {
        Self {
            id: projectile.id.0,
            x: projectile.position.x,
            y: projectile.position.y,
            faction: projectile.firing_faction,
            color: projectile.firing_color,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WheelSnapshot {
    pub faction: FactionId,
    pub name: String,
    pub status: WheelStatus,
    pub multiplier: u32,
    /// Where the arrow is headed while a spin is in flight.
    pub target_angle: Option<f64>,
    /// Segment highlighted while settling.
    pub highlighted: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactionStanding {
    pub faction: FactionId,
    pub name: String,
    pub color: u32,
    pub cells: usize,
    pub cannons: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    pub tick: u64,
    pub time_ms: f64,
    pub cells: Vec<Cell>,
    pub projectiles: Vec<ProjectileSnapshot>,
    pub wheels: Vec<WheelSnapshot>,
    pub standings: Vec<FactionStanding>,
}
