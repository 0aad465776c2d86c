use std::collections::{BTreeSet, HashMap};

use crate::types::{Cell, CellCoord, FactionId};

/// Result of an ownership change, for events and cannon bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerChange {
    pub previous_owner: FactionId,
    pub cannon_lost: bool,
}

/// The grid of cells plus the faction → owned-cells index.
///
/// Cells are stored row-major. Coordinates outside the grid are a caller
/// bug and panic.
#[derive(Debug, Clone)]
pub struct Territory {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    owned: HashMap<FactionId, BTreeSet<CellCoord>>,
}

impl Territory {
    /// A grid where every cell belongs to the neutral faction.
    pub fn new(width: u32, height: u32, neutral_color: u32) -> Self {
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(Cell::neutral(CellCoord::new(x, y), neutral_color));
            }
        }
        let mut owned = HashMap::new();
        owned.insert(FactionId::NEUTRAL, cells.iter().map(|c| c.coord).collect());
        Self {
            width,
            height,
            cells,
            owned,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    fn index(&self, coord: CellCoord) -> usize {
        assert!(
            self.contains(coord),
            "cell ({}, {}) outside {}x{} grid",
            coord.x,
            coord.y,
            self.width,
            self.height
        );
        coord.y as usize * self.width as usize + coord.x as usize
    }

    pub fn cell(&self, coord: CellCoord) -> &Cell {
        &self.cells[self.index(coord)]
    }

    pub fn owner_of(&self, coord: CellCoord) -> FactionId {
        self.cell(coord).owner
    }

    /// Hand a cell to `faction`. A cannon on the cell is lost with it.
    pub fn set_owner(&mut self, coord: CellCoord, faction: FactionId, color: u32) -> OwnerChange {
        let index = self.index(coord);
        let cell = &mut self.cells[index];
        let previous_owner = cell.owner;
        let cannon_lost = cell.has_cannon;

        cell.owner = faction;
        cell.color = color;
        cell.has_cannon = false;

        if previous_owner != faction {
            if let Some(set) = self.owned.get_mut(&previous_owner) {
                set.remove(&coord);
            }
            self.owned.entry(faction).or_default().insert(coord);
        }

        OwnerChange {
            previous_owner,
            cannon_lost,
        }
    }

    /// Arm a cell. Returns false if it already had a cannon.
    pub fn grant_cannon(&mut self, coord: CellCoord) -> bool {
        let index = self.index(coord);
        let cell = &mut self.cells[index];
        if cell.has_cannon {
            return false;
        }
        cell.has_cannon = true;
        true
    }

    /// Live ownership view in row-major order. The neutral faction only
    /// shows up when asked for by id.
    pub fn cells_owned_by(&self, faction: FactionId) -> impl Iterator<Item = CellCoord> + '_ {
        self.owned
            .get(&faction)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub fn owned_count(&self, faction: FactionId) -> usize {
        self.owned.get(&faction).map_or(0, BTreeSet::len)
    }

    pub fn cannon_cells_of(&self, faction: FactionId) -> Vec<CellCoord> {
        self.cells_owned_by(faction)
            .filter(|&coord| self.cell(coord).has_cannon)
            .collect()
    }

    pub fn unarmed_cells_of(&self, faction: FactionId) -> Vec<CellCoord> {
        self.cells_owned_by(faction)
            .filter(|&coord| !self.cell(coord).has_cannon)
            .collect()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Row-major copy of every cell, for rendering.
    pub fn snapshot(&self) -> Vec<Cell> {
        self.cells.clone()
    }
}
