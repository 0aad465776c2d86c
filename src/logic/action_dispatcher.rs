use crate::config::SimulationConfig;
use crate::data::{SimulationData, TimerEvent};
use crate::dependency::pick_index;
use crate::types::{CellCoord, FactionId, ProjectileId, SegmentLabel, SimulationEvent, SpinOutcome, Vec2};

/// What a resolved outcome turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchEffect {
    /// `cells` cannons each started a burst of `shots_per_cell` shots.
    Burst { cells: usize, shots_per_cell: u32 },
    CannonGranted(CellCoord),
    Nothing,
}

/// Turns wheel outcomes into territory and projectile changes.
#[derive(Debug, Clone, Copy)]
pub struct ActionDispatcher {
    cell_size: f32,
    muzzle_offset: Vec2,
    projectile_speed: f32,
    burst_interval_ms: f64,
}

impl ActionDispatcher {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            cell_size: config.cell_size,
            muzzle_offset: Vec2::new(config.muzzle_offset[0], config.muzzle_offset[1]),
            projectile_speed: config.projectile_speed,
            burst_interval_ms: config.burst_interval_ms,
        }
    }

    pub fn dispatch(&self, outcome: &SpinOutcome, data: &mut SimulationData) -> DispatchEffect {
        match outcome.label {
            SegmentLabel::Fire => {
                let cells = self.open_fire(outcome.faction, outcome.multiplier, data);
                DispatchEffect::Burst {
                    cells,
                    shots_per_cell: outcome.multiplier,
                }
            }
            SegmentLabel::BuildCannon => self
                .build_cannon(outcome.faction, data)
                .map_or(DispatchEffect::Nothing, DispatchEffect::CannonGranted),
            // Multiply was applied by the wheel before the outcome left it.
            SegmentLabel::Empty | SegmentLabel::Multiply => DispatchEffect::Nothing,
        }
    }

    /// Start a burst of `multiplier` shots from every armed cell the faction
    /// holds right now. The first shot leaves immediately, the rest ride a
    /// repeating timer that nothing cancels.
    pub fn open_fire(&self, faction: FactionId, multiplier: u32, data: &mut SimulationData) -> usize {
        let armed = data.territory.cannon_cells_of(faction);
        if armed.is_empty() || multiplier == 0 {
            return 0;
        }
        let color = data.roster.color_of(faction);

        for &cell in &armed {
            self.fire_shot(cell, faction, color, data);
            if multiplier > 1 {
                data.scheduler.schedule_repeating(
                    self.burst_interval_ms,
                    Some(multiplier - 1),
                    TimerEvent::BurstShot {
                        cell,
                        faction,
                        color,
                    },
                );
            }
        }

        tracing::debug!(
            target: "conquest::dispatch",
            faction = %faction,
            cells = armed.len(),
            multiplier,
            "burst.started"
        );
        armed.len()
    }

    /// Arm one cannon-less cell picked uniformly at random. Eligibility is
    /// checked before drawing, so a fully armed faction costs no draw.
    pub fn build_cannon(&self, faction: FactionId, data: &mut SimulationData) -> Option<CellCoord> {
        let unarmed = data.territory.unarmed_cells_of(faction);
        let index = pick_index(data.rng.as_mut(), unarmed.len())?;
        let cell = unarmed[index];

        data.territory.grant_cannon(cell);
        let now_ms = data.now_ms();
        data.aim.cannon_built(cell, now_ms);
        data.metrics.cannons_built += 1;
        tracing::debug!(
            target: "conquest::dispatch",
            faction = %faction,
            cell.x = cell.x,
            cell.y = cell.y,
            "cannon.granted"
        );
        data.emit(SimulationEvent::CannonGranted { faction, cell });
        Some(cell)
    }

    /// Spawn one projectile from `cell`, aimed along the barrel angle sampled
    /// now. Used for the first shot of a burst and for every timed follow-up,
    /// including ones whose cell has since changed hands.
    pub fn fire_shot(
        &self,
        cell: CellCoord,
        faction: FactionId,
        color: u32,
        data: &mut SimulationData,
    ) -> ProjectileId {
        let angle = data.aim.angle_at(cell, data.now_ms());
        let half = self.cell_size / 2.0;
        let center = Vec2::new(
            cell.x as f32 * self.cell_size + half,
            cell.y as f32 * self.cell_size + half,
        );
        let position = center + self.muzzle_offset.rotated(angle);
        let velocity = Vec2::from_angle(angle) * self.projectile_speed;

        let projectile = data.projectiles.spawn(position, velocity, faction, color);
        data.metrics.shots_fired += 1;
        data.emit(SimulationEvent::ProjectileFired {
            projectile,
            faction,
            cell,
            position,
            angle,
        });
        projectile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScenarioConfig;
    use crate::dependency::{Scheduler, ScriptedRandom};

    fn two_cell_scenario() -> SimulationData {
        let scenario = ScenarioConfig::from_json_str(
            r#"{ "map_size": 4,
                 "factions": [
                    { "name": "a", "color": 11, "rows": [{ "x": [0, 1], "y": 0 }] },
                    { "name": "b", "color": 22, "rows": [{ "x": [3, 3], "y": 3 }] }
                 ] }"#,
        )
        .unwrap();
        SimulationData::from_scenario(&scenario).unwrap()
    }

    fn outcome(label: SegmentLabel, multiplier: u32) -> SpinOutcome {
        SpinOutcome {
            index: 0,
            label,
            faction: FactionId(1),
            multiplier,
            angle: 0.0,
        }
    }

    #[test]
    fn fire_with_one_cannon_spawns_one_projectile() {
        let mut data = two_cell_scenario();
        data.territory.grant_cannon(CellCoord::new(0, 0));
        let dispatcher = ActionDispatcher::from_config(data.config());

        let effect = dispatcher.dispatch(&outcome(SegmentLabel::Fire, 1), &mut data);
        assert_eq!(
            effect,
            DispatchEffect::Burst {
                cells: 1,
                shots_per_cell: 1
            }
        );
        assert_eq!(data.projectiles.len(), 1);
        assert_eq!(data.projectiles[0].firing_faction, FactionId(1));
        assert_eq!(data.projectiles[0].firing_color, 11);
        // Barrel at angle 0: center (20, 20) plus muzzle (12, -4).
        assert_eq!(data.projectiles[0].position, Vec2::new(32.0, 16.0));
        assert_eq!(data.projectiles[0].velocity, Vec2::new(80.0, 0.0));
        assert_eq!(data.scheduler.pop_due(10_000.0), None);
    }

    #[test]
    fn burst_schedules_remaining_shots() {
        let mut data = two_cell_scenario();
        data.territory.grant_cannon(CellCoord::new(0, 0));
        data.territory.grant_cannon(CellCoord::new(1, 0));
        let dispatcher = ActionDispatcher::from_config(data.config());

        dispatcher.dispatch(&outcome(SegmentLabel::Fire, 3), &mut data);
        assert_eq!(data.projectiles.len(), 2);

        let mut follow_ups = Vec::new();
        while let Some(event) = data.scheduler.pop_due(1_000.0) {
            follow_ups.push((data.scheduler.now_ms(), event));
        }
        assert_eq!(follow_ups.len(), 4);
        assert_eq!(follow_ups[0].0, 100.0);
        assert_eq!(follow_ups[3].0, 200.0);
        assert!(matches!(
            follow_ups[1].1,
            TimerEvent::BurstShot { cell, color: 11, .. } if cell == CellCoord::new(1, 0)
        ));
    }

    #[test]
    fn build_cannon_only_draws_from_unarmed_cells() {
        let mut data = two_cell_scenario();
        data.rng = Box::new(ScriptedRandom::new(&[0]));
        data.territory.grant_cannon(CellCoord::new(0, 0));
        let dispatcher = ActionDispatcher::from_config(data.config());

        let effect = dispatcher.dispatch(&outcome(SegmentLabel::BuildCannon, 1), &mut data);
        assert_eq!(effect, DispatchEffect::CannonGranted(CellCoord::new(1, 0)));
        assert_eq!(data.metrics.cannons_built, 1);

        let effect = dispatcher.dispatch(&outcome(SegmentLabel::BuildCannon, 1), &mut data);
        assert_eq!(effect, DispatchEffect::Nothing);
        assert_eq!(data.territory.cannon_cells_of(FactionId(1)).len(), 2);
    }

    #[test]
    fn empty_and_multiply_do_nothing() {
        let mut data = two_cell_scenario();
        data.territory.grant_cannon(CellCoord::new(0, 0));
        let dispatcher = ActionDispatcher::from_config(data.config());
        for label in [SegmentLabel::Empty, SegmentLabel::Multiply] {
            assert_eq!(
                dispatcher.dispatch(&outcome(label, 5), &mut data),
                DispatchEffect::Nothing
            );
        }
        assert!(data.projectiles.is_empty());
        assert!(data.drain_events().is_empty());
    }
}
