use std::collections::HashMap;
use std::f64::consts::TAU;

use crate::types::CellCoord;

/// Source of a cannon's barrel angle at the moment it fires.
///
/// The presentation layer animates the barrel; the engine only samples it.
pub trait CannonAim {
    fn cannon_built(&mut self, cell: CellCoord, now_ms: f64);

    /// The cell's cannon changed hands. Shots still queued from it keep
    /// sampling the barrel until a new cannon is built there.
    fn cannon_lost(&mut self, cell: CellCoord);

    /// Host-reported barrel angle in radians; wins over any computed angle
    /// until the cannon is rebuilt.
    fn report_angle(&mut self, cell: CellCoord, radians: f32);

    fn angle_at(&self, cell: CellCoord, now_ms: f64) -> f32;
}

/// Barrels turn one full revolution every `period_ms`, starting at angle 0
/// when the cannon is built.
pub struct RotatingAim {
    period_ms: f64,
    built_at: HashMap<CellCoord, f64>,
    reported: HashMap<CellCoord, f32>,
}

impl RotatingAim {
    pub fn new(period_ms: f64) -> Self {
        Self {
            period_ms,
            built_at: HashMap::new(),
            reported: HashMap::new(),
        }
    }
}

impl CannonAim for RotatingAim {
    fn cannon_built(&mut self, cell: CellCoord, now_ms: f64) {
        self.built_at.insert(cell, now_ms);
        self.reported.remove(&cell);
    }

    fn cannon_lost(&mut self, cell: CellCoord) {
        // The host stops animating a lost barrel, so its last report goes
        // stale; the rotation phase carries on.
        self.reported.remove(&cell);
    }

    fn report_angle(&mut self, cell: CellCoord, radians: f32) {
        self.reported.insert(cell, radians);
    }

    fn angle_at(&self, cell: CellCoord, now_ms: f64) -> f32 {
        if let Some(&reported) = self.reported.get(&cell) {
            return reported;
        }
        let Some(&built_at) = self.built_at.get(&cell) else {
            return 0.0;
        };
        if self.period_ms <= 0.0 {
            return 0.0;
        }
        let turns = ((now_ms - built_at).max(0.0) / self.period_ms).fract();
        (turns * TAU) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn rotates_from_build_time() {
        let mut aim = RotatingAim::new(4000.0);
        let cell = CellCoord::new(2, 3);
        aim.cannon_built(cell, 1000.0);
        assert_eq!(aim.angle_at(cell, 1000.0), 0.0);
        assert!((aim.angle_at(cell, 2000.0) - FRAC_PI_2).abs() < 1e-5);
        assert!((aim.angle_at(cell, 3000.0) - PI).abs() < 1e-5);
        assert!(aim.angle_at(cell, 5000.0).abs() < 1e-5);
    }

    #[test]
    fn lost_cannon_keeps_its_rotation_phase() {
        let mut aim = RotatingAim::new(4000.0);
        let cell = CellCoord::new(1, 1);
        aim.cannon_built(cell, 0.0);
        aim.report_angle(cell, 0.5);
        aim.cannon_lost(cell);
        assert!((aim.angle_at(cell, 1000.0) - FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn reported_angle_overrides_until_rebuilt() {
        let mut aim = RotatingAim::new(4000.0);
        let cell = CellCoord::new(0, 0);
        aim.cannon_built(cell, 0.0);
        aim.report_angle(cell, 1.25);
        assert_eq!(aim.angle_at(cell, 3333.0), 1.25);
        aim.cannon_lost(cell);
        aim.cannon_built(cell, 0.0);
        assert_eq!(aim.angle_at(cell, 0.0), 0.0);
    }
}
