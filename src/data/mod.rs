mod projectile_store;
mod territory;

pub use projectile_store::ProjectileStore;
pub use territory::{OwnerChange, Territory};

use std::collections::BTreeMap;

use crate::config::{ConfigError, ScenarioConfig, SimulationConfig};
use crate::dependency::{
    CannonAim, RandomSource, RotatingAim, Scheduler, SeededRandom, TimerHandle, TimerQueue,
};
use crate::logic::OutcomeWheel;
use crate::types::{
    CellCoord, FactionId, FactionRoster, FactionStanding, ProjectileSnapshot, SimulationEvent,
    SimulationMetrics, SimulationSnapshot, WheelSnapshot, CELL_FIELD_COUNT,
};

/// Work the scheduler hands back to the simulation when a timer fires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerEvent {
    AutoSpin { faction: FactionId },
    SpinAnimationDone { faction: FactionId, spin: u64 },
    SettleDone { faction: FactionId, spin: u64 },
    BurstShot {
        cell: CellCoord,
        faction: FactionId,
        color: u32,
    },
}

/// A wheel plus the timers that belong to it, so destruction can cancel them.
pub struct WheelSlot {
    pub wheel: OutcomeWheel,
    pub auto_spin: Option<TimerHandle>,
    pub pending: Option<TimerHandle>,
}

impl WheelSlot {
    fn new(wheel: OutcomeWheel) -> Self {
        Self {
            wheel,
            auto_spin: None,
            pending: None,
        }
    }

    pub fn cancel_timers(&mut self, scheduler: &mut dyn Scheduler<TimerEvent>) {
        if let Some(handle) = self.auto_spin.take() {
            scheduler.cancel(handle);
        }
        if let Some(handle) = self.pending.take() {
            scheduler.cancel(handle);
        }
    }
}

/// Everything mutable in a match, owned in one place.
///
/// Engine steps borrow the fields they need directly; the host only sees the
/// read accessors.
pub struct SimulationData {
    pub(crate) tick: u64,
    pub(crate) auto_spin: bool,
    pub(crate) config: SimulationConfig,
    pub(crate) roster: FactionRoster,
    pub(crate) territory: Territory,
    pub(crate) projectiles: ProjectileStore,
    pub(crate) wheels: BTreeMap<FactionId, WheelSlot>,
    pub(crate) scheduler: Box<dyn Scheduler<TimerEvent>>,
    pub(crate) rng: Box<dyn RandomSource>,
    pub(crate) aim: Box<dyn CannonAim>,
    pub(crate) events: Vec<SimulationEvent>,
    pub(crate) metrics: SimulationMetrics,
    flat_snapshot: Vec<u32>,
    flat_snapshot_dirty: bool,
}

impl SimulationData {
    pub fn from_scenario(scenario: &ScenarioConfig) -> Result<Self, ConfigError> {
        scenario.validate()?;
        let layout = scenario.wheel_layout()?;
        let config = scenario.simulation.clone();

        let mut roster = FactionRoster::with_neutral_color(scenario.neutral_color);
        let mut territory = Territory::new(
            scenario.map_size,
            scenario.map_size,
            scenario.neutral_color,
        );
        let mut wheels = BTreeMap::new();

        for spec in &scenario.factions {
            let id = roster
                .register(&spec.name, spec.color)
                .ok_or_else(|| ConfigError::DuplicateFaction(spec.name.clone()))?;
            for cell in spec.cells() {
                territory.set_owner(cell, id, spec.color);
            }
            let wheel = OutcomeWheel::with_limits(
                id,
                layout.clone(),
                config.multiplier_cap,
                config.full_turns,
            );
            wheels.insert(id, WheelSlot::new(wheel));
        }

        let cell_count = territory.len();
        Ok(Self {
            tick: 0,
            auto_spin: false,
            rng: Box::new(SeededRandom::new(config.seed)),
            aim: Box::new(RotatingAim::new(config.cannon_rotation_period_ms)),
            scheduler: Box::new(TimerQueue::new()),
            config,
            roster,
            territory,
            projectiles: ProjectileStore::with_capacity(256),
            wheels,
            events: Vec::with_capacity(64),
            metrics: SimulationMetrics::default(),
            flat_snapshot: Vec::with_capacity(cell_count * CELL_FIELD_COUNT),
            flat_snapshot_dirty: true,
        })
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn now_ms(&self) -> f64 {
        self.scheduler.now_ms()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn roster(&self) -> &FactionRoster {
        &self.roster
    }

    pub fn territory(&self) -> &Territory {
        &self.territory
    }

    pub fn projectiles(&self) -> &ProjectileStore {
        &self.projectiles
    }

    pub fn wheel(&self, faction: FactionId) -> Option<&OutcomeWheel> {
        self.wheels.get(&faction).map(|slot| &slot.wheel)
    }

    /// Wheels that can still spin.
    pub fn active_wheels(&self) -> impl Iterator<Item = &OutcomeWheel> {
        self.wheels
            .values()
            .map(|slot| &slot.wheel)
            .filter(|wheel| !wheel.is_destroyed())
    }

    pub fn metrics(&self) -> &SimulationMetrics {
        &self.metrics
    }

    pub fn auto_spin_started(&self) -> bool {
        self.auto_spin
    }

    pub fn emit(&mut self, event: SimulationEvent) {
        if matches!(
            event,
            SimulationEvent::CellCaptured { .. } | SimulationEvent::CannonGranted { .. }
        ) {
            self.flat_snapshot_dirty = true;
        }
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<SimulationEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn standings(&self) -> Vec<FactionStanding> {
        self.roster
            .playable()
            .map(|faction| FactionStanding {
                faction: faction.id,
                name: faction.name.clone(),
                color: faction.color,
                cells: self.territory.owned_count(faction.id),
                cannons: self.territory.cannon_cells_of(faction.id).len(),
            })
            .collect()
    }

    /// The only playable faction still holding cells, once all rivals are out.
    pub fn winner(&self) -> Option<FactionId> {
        let mut alive = self
            .roster
            .playable()
            .filter(|faction| self.territory.owned_count(faction.id) > 0);
        let first = alive.next()?;
        match alive.next() {
            None if self.roster.playable().count() > 1 => Some(first.id),
            _ => None,
        }
    }

    pub fn build_snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            tick: self.tick,
            time_ms: self.now_ms(),
            cells: self.territory.snapshot(),
            projectiles: self
                .projectiles
                .as_slice()
                .iter()
                .map(ProjectileSnapshot::from)
                .collect(),
            wheels: self
                .wheels
                .values()
                .map(|slot| WheelSnapshot {
                    faction: slot.wheel.faction(),
                    name: self.roster.name_of(slot.wheel.faction()).to_string(),
                    status: slot.wheel.status(),
                    multiplier: slot.wheel.multiplier(),
                    target_angle: slot.wheel.target_angle(),
                    highlighted: slot.wheel.highlighted(),
                })
                .collect(),
            standings: self.standings(),
        }
    }

    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    pub fn ensure_flat_snapshot_ready(&mut self) {
        if self.flat_snapshot_dirty {
            self.rebuild_flat_snapshot();
        }
    }

    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    pub fn flat_snapshot_slice(&self) -> &[u32] {
        &self.flat_snapshot
    }

    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    fn rebuild_flat_snapshot(&mut self) {
        let required_len = self.territory.len() * CELL_FIELD_COUNT;
        if self.flat_snapshot.len() != required_len {
            self.flat_snapshot.resize(required_len, 0);
        }
        for (i, cell) in self.territory.cells().iter().enumerate() {
            let base = i * CELL_FIELD_COUNT;
            self.flat_snapshot[base] = cell.owner.0;
            self.flat_snapshot[base + 1] = cell.color;
            self.flat_snapshot[base + 2] = u32::from(cell.has_cannon);
        }
        self.flat_snapshot_dirty = false;
    }

    /// Tear the match down: every wheel is destroyed, every timer (bursts
    /// in flight included) is cancelled, and projectiles and undrained
    /// events are dropped.
    pub fn destroy(&mut self) {
        for slot in self.wheels.values_mut() {
            slot.cancel_timers(self.scheduler.as_mut());
            slot.wheel.destroy();
        }
        self.scheduler.cancel_all();
        self.auto_spin = false;
        self.projectiles.clear();
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_scenario_claims_corners() {
        let data = SimulationData::from_scenario(&ScenarioConfig::builtin()).unwrap();
        let territory = data.territory();
        assert_eq!(territory.len(), 14 * 14);
        let georgia = data.roster().by_name("georgia").unwrap().id;
        let india = data.roster().by_name("india").unwrap().id;
        assert_eq!(territory.owner_of(CellCoord::new(0, 0)), georgia);
        assert_eq!(territory.owner_of(CellCoord::new(13, 13)), india);
        assert_eq!(territory.owned_count(FactionId::NEUTRAL), 14 * 14 - 4);
        assert_eq!(data.active_wheels().count(), 4);
        assert_eq!(data.winner(), None);
    }

    #[test]
    fn snapshot_lists_every_wheel_and_cell() {
        let data = SimulationData::from_scenario(&ScenarioConfig::builtin()).unwrap();
        let snapshot = data.build_snapshot();
        assert_eq!(snapshot.cells.len(), 196);
        assert_eq!(snapshot.wheels.len(), 4);
        assert!(snapshot.wheels.iter().all(|w| w.multiplier == 1));
        assert_eq!(snapshot.standings.iter().map(|s| s.cells).sum::<usize>(), 4);
    }

    #[test]
    fn flat_snapshot_encodes_owner_color_and_cannon() {
        let mut data = SimulationData::from_scenario(&ScenarioConfig::builtin()).unwrap();
        data.territory.grant_cannon(CellCoord::new(0, 0));
        data.ensure_flat_snapshot_ready();
        let flat = data.flat_snapshot_slice();
        assert_eq!(flat.len(), 196 * CELL_FIELD_COUNT);
        assert_eq!(flat[0], 1);
        assert_eq!(flat[1], 0x67ffc6);
        assert_eq!(flat[2], 1);
        assert_eq!(flat[3], 0);
    }

    #[test]
    fn winner_is_last_faction_standing() {
        let mut data = SimulationData::from_scenario(&ScenarioConfig::builtin()).unwrap();
        let georgia = data.roster().by_name("georgia").unwrap().id;
        for (x, y) in [(0, 13), (13, 13), (13, 0)] {
            data.territory.set_owner(CellCoord::new(x, y), georgia, 0);
        }
        assert_eq!(data.winner(), Some(georgia));
    }
}
