use crate::config::{ConfigError, ScenarioConfig};
use crate::data::{SimulationData, TimerEvent};
use crate::dependency::{CannonAim, RandomSource, Scheduler, Stopwatch};
use crate::types::{
    CellCoord, FactionId, FactionStanding, SimulationEvent, SimulationSnapshot, SpinOutcome,
};

use super::action_dispatcher::ActionDispatcher;
use super::capture_engine::CaptureEngine;
use super::outcome_wheel::{OutcomeWheel, SpinPhase, SpinStart, WheelState};

/// Host callback run once per resolved spin, after the dispatcher acted.
pub type ResolutionHook = Box<dyn FnMut(&SpinOutcome)>;

pub struct SimulationLogic {
    scenario: ScenarioConfig,
    data: SimulationData,
    capture_engine: CaptureEngine,
    dispatcher: ActionDispatcher,
    hooks: Vec<ResolutionHook>,
}

impl SimulationLogic {
    pub fn new(scenario: ScenarioConfig) -> Result<Self, ConfigError> {
        let data = SimulationData::from_scenario(&scenario)?;
        Ok(Self {
            capture_engine: CaptureEngine::from_config(data.config()),
            dispatcher: ActionDispatcher::from_config(data.config()),
            scenario,
            data,
            hooks: Vec::new(),
        })
    }

    pub fn builtin() -> Self {
        Self::new(ScenarioConfig::builtin()).expect("builtin scenario should be valid")
    }

    pub fn with_scheduler(mut self, scheduler: Box<dyn Scheduler<TimerEvent>>) -> Self {
        self.data.scheduler = scheduler;
        self
    }

    pub fn with_random(mut self, rng: Box<dyn RandomSource>) -> Self {
        self.data.rng = rng;
        self
    }

    pub fn with_aim(mut self, aim: Box<dyn CannonAim>) -> Self {
        self.data.aim = aim;
        self
    }

    pub fn data(&self) -> &SimulationData {
        &self.data
    }

    pub fn faction_id(&self, name: &str) -> Option<FactionId> {
        self.data.roster().by_name(name).map(|faction| faction.id)
    }

    pub fn wheel(&self, faction: FactionId) -> Option<&OutcomeWheel> {
        self.data.wheel(faction)
    }

    pub fn multiplier(&self, faction: FactionId) -> Option<u32> {
        self.wheel(faction).map(OutcomeWheel::multiplier)
    }

    pub fn tick_count(&self) -> u64 {
        self.data.tick()
    }

    pub fn now_ms(&self) -> f64 {
        self.data.now_ms()
    }

    pub fn on_resolved(&mut self, hook: impl FnMut(&SpinOutcome) + 'static) {
        self.hooks.push(Box::new(hook));
    }

    /// Advance the clock by `dt_ms`. Projectiles move up to each due timer
    /// before it fires, so shots born mid-tick only travel for the rest of
    /// the tick; capture runs after every motion slice.
    pub fn tick(&mut self, dt_ms: f64) {
        let stopwatch = Stopwatch::start();
        let dt_ms = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };

        self.data.tick = self.data.tick.wrapping_add(1);
        let until_ms = self.data.now_ms() + dt_ms;
        let mut moved_to = self.data.now_ms();
        while let Some(event) = self.data.scheduler.pop_due(until_ms) {
            let due_ms = self.data.now_ms();
            self.capture_engine.step(&mut self.data, due_ms - moved_to);
            moved_to = due_ms;
            self.handle_timer(event);
        }
        self.data.scheduler.advance_to(until_ms);
        self.capture_engine.step(&mut self.data, until_ms - moved_to);

        self.data.metrics.update_tick(stopwatch.elapsed_ms());
    }

    fn handle_timer(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::AutoSpin { faction } => {
                if self.wheel(faction).is_some_and(OutcomeWheel::is_idle) {
                    self.spin(faction);
                }
            }
            TimerEvent::SpinAnimationDone { faction, spin } => {
                self.resolve_spin(faction, spin);
            }
            TimerEvent::SettleDone { faction, spin } => self.settle(faction, spin),
            TimerEvent::BurstShot {
                cell,
                faction,
                color,
            } => {
                self.dispatcher.fire_shot(cell, faction, color, &mut self.data);
            }
        }
    }

    /// Returns whether a spin actually began. A wheel whose faction holds no
    /// cells is destroyed here, along with its timers.
    pub fn spin(&mut self, faction: FactionId) -> bool {
        let data = &mut self.data;
        let owned = data.territory.owned_count(faction);
        let Some(slot) = data.wheels.get_mut(&faction) else {
            return false;
        };
        let was_destroyed = slot.wheel.is_destroyed();

        match slot.wheel.spin(owned, data.rng.as_mut()) {
            SpinStart::Started { spin, target_angle } => {
                slot.pending = Some(data.scheduler.schedule_once(
                    data.config.spin_animation_ms,
                    TimerEvent::SpinAnimationDone { faction, spin },
                ));
                tracing::debug!(
                    target: "conquest::wheel",
                    faction = %faction,
                    spin,
                    target_angle,
                    "spin.started"
                );
                data.emit(SimulationEvent::SpinStarted {
                    faction,
                    target_angle,
                });
                true
            }
            SpinStart::Busy => false,
            SpinStart::Destroyed => {
                if !was_destroyed {
                    slot.cancel_timers(data.scheduler.as_mut());
                    data.metrics.wheels_destroyed += 1;
                    data.emit(SimulationEvent::WheelDestroyed { faction });
                }
                false
            }
        }
    }

    /// The host's spin animation ended. Resolves now instead of waiting for
    /// the scheduled completion; a no-op unless the wheel is animating.
    pub fn finish_spin_animation(&mut self, faction: FactionId) -> Option<SpinOutcome> {
        let slot = self.data.wheels.get_mut(&faction)?;
        let WheelState::Spinning {
            spin,
            phase: SpinPhase::Animating { .. },
        } = slot.wheel.state()
        else {
            return None;
        };
        if let Some(handle) = slot.pending.take() {
            self.data.scheduler.cancel(handle);
        }
        self.resolve_spin(faction, spin)
    }

    fn resolve_spin(&mut self, faction: FactionId, spin: u64) -> Option<SpinOutcome> {
        let data = &mut self.data;
        let slot = data.wheels.get_mut(&faction)?;
        let outcome = slot.wheel.complete_animation(spin)?;
        slot.pending = Some(data.scheduler.schedule_once(
            data.config.settle_ms,
            TimerEvent::SettleDone { faction, spin },
        ));

        data.metrics.spins_resolved += 1;
        tracing::info!(
            target: "conquest::wheel",
            faction = %faction,
            label = %outcome.label,
            multiplier = outcome.multiplier,
            "spin.resolved"
        );
        data.emit(SimulationEvent::WheelResolved {
            faction,
            index: outcome.index,
            label: outcome.label,
            multiplier: outcome.multiplier,
        });

        self.dispatcher.dispatch(&outcome, &mut self.data);
        for hook in &mut self.hooks {
            hook(&outcome);
        }
        Some(outcome)
    }

    fn settle(&mut self, faction: FactionId, spin: u64) {
        let data = &mut self.data;
        let Some(slot) = data.wheels.get_mut(&faction) else {
            return;
        };
        if slot.wheel.settle(spin) {
            slot.pending = None;
            data.emit(SimulationEvent::WheelSettled { faction });
        }
    }

    /// Spin every live wheel now, then again on a fixed interval whenever it
    /// is idle. Calling it twice changes nothing.
    pub fn start_auto_spin(&mut self) {
        if self.data.auto_spin {
            return;
        }
        self.data.auto_spin = true;

        let factions: Vec<FactionId> = self.data.wheels.keys().copied().collect();
        for faction in factions {
            self.spin(faction);
            let data = &mut self.data;
            if let Some(slot) = data.wheels.get_mut(&faction) {
                if !slot.wheel.is_destroyed() && slot.auto_spin.is_none() {
                    slot.auto_spin = Some(data.scheduler.schedule_repeating(
                        data.config.auto_spin_interval_ms,
                        None,
                        TimerEvent::AutoSpin { faction },
                    ));
                }
            }
        }
        tracing::info!(
            target: "conquest::wheel",
            wheels = self.data.active_wheels().count(),
            interval_ms = self.data.config.auto_spin_interval_ms,
            "auto_spin.started"
        );
    }

    pub fn stop_auto_spin(&mut self) {
        let data = &mut self.data;
        for slot in data.wheels.values_mut() {
            if let Some(handle) = slot.auto_spin.take() {
                data.scheduler.cancel(handle);
            }
        }
        data.auto_spin = false;
    }

    /// Barrel angle the host is rendering for the cannon on `cell`.
    pub fn set_cannon_angle(&mut self, cell: CellCoord, radians: f32) {
        self.data.aim.report_angle(cell, radians);
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        self.data.build_snapshot()
    }

    pub fn drain_events(&mut self) -> Vec<SimulationEvent> {
        self.data.drain_events()
    }

    pub fn standings(&self) -> Vec<FactionStanding> {
        self.data.standings()
    }

    pub fn winner(&self) -> Option<FactionId> {
        self.data.winner()
    }

    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    pub(crate) fn flat_cells(&mut self) -> &[u32] {
        self.data.ensure_flat_snapshot_ready();
        self.data.flat_snapshot_slice()
    }

    /// Start the scenario over with fresh state and the default collaborators.
    /// Resolution hooks stay registered.
    pub fn reset(&mut self) -> Result<(), ConfigError> {
        self.data = SimulationData::from_scenario(&self.scenario)?;
        Ok(())
    }

    pub fn destroy(&mut self) {
        self.data.destroy();
        self.hooks.clear();
    }
}
