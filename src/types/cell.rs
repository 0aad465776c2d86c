use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::faction::FactionId;

/// Grid coordinate of a cell, column `x` and row `y`.
///
/// Coordinates order row-major (`y` first) so ownership sets iterate the
/// way the grid is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: u32,
    pub y: u32,
}

impl CellCoord {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// One grid position. Only `owner`, `color` and `has_cannon` change after
/// the grid is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub coord: CellCoord,
    pub owner: FactionId,
    pub color: u32,
    pub has_cannon: bool,
}

impl Cell {
    pub fn neutral(coord: CellCoord, color: u32) -> Self {
        Self {
            coord,
            owner: FactionId::NEUTRAL,
            color,
            has_cannon: false,
        }
    }
}

impl Ord for CellCoord {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for CellCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
