use serde_wasm_bindgen;
use wasm_bindgen::prelude::*;

use crate::config::load_scenario;
use crate::dependency::Stopwatch;
use crate::logic::SimulationLogic;
use crate::types::{CellCoord, FactionId};

/// Browser-facing handle. Factions are addressed by name; structured data
/// crosses the boundary through serde-wasm-bindgen.
#[wasm_bindgen]
pub struct Simulation {
    logic: SimulationLogic,
    last_snapshot_duration_ms: f64,
}

#[wasm_bindgen]
impl Simulation {
    /// `scenario_json` falls back to the builtin map when absent or invalid.
    #[wasm_bindgen(constructor)]
    pub fn new(scenario_json: Option<String>, seed: Option<u64>) -> Self {
        let mut scenario = load_scenario(scenario_json.as_deref());
        if let Some(seed) = seed {
            scenario.simulation.seed = seed;
        }
        let logic = SimulationLogic::new(scenario).unwrap_or_else(|err| {
            tracing::warn!(target: "conquest::config", error = %err, "scenario.rejected");
            SimulationLogic::builtin()
        });
        Self {
            logic,
            last_snapshot_duration_ms: 0.0,
        }
    }

    #[wasm_bindgen]
    pub fn tick(&mut self, dt_ms: f64) {
        self.logic.tick(dt_ms);
    }

    #[wasm_bindgen]
    pub fn spin(&mut self, faction: &str) -> bool {
        match self.faction(faction) {
            Some(id) => self.logic.spin(id),
            None => false,
        }
    }

    /// Call when the wheel animation for `faction` has finished. Returns the
    /// resolved outcome, or `null` if there was nothing to resolve.
    #[wasm_bindgen]
    pub fn finish_spin_animation(&mut self, faction: &str) -> JsValue {
        self.faction(faction)
            .and_then(|id| self.logic.finish_spin_animation(id))
            .and_then(|outcome| serde_wasm_bindgen::to_value(&outcome).ok())
            .unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen]
    pub fn start_auto_spin(&mut self) {
        self.logic.start_auto_spin();
    }

    #[wasm_bindgen]
    pub fn stop_auto_spin(&mut self) {
        self.logic.stop_auto_spin();
    }

    #[wasm_bindgen]
    pub fn set_cannon_angle(&mut self, x: u32, y: u32, radians: f32) {
        self.logic.set_cannon_angle(CellCoord::new(x, y), radians);
    }

    #[wasm_bindgen]
    pub fn get_snapshot(&mut self) -> JsValue {
        let stopwatch = Stopwatch::start();
        let result =
            serde_wasm_bindgen::to_value(&self.logic.snapshot()).unwrap_or(JsValue::NULL);
        self.last_snapshot_duration_ms = stopwatch.elapsed_ms();
        result
    }

    /// Cells as `[owner, color, has_cannon]` triples in row-major order.
    #[cfg(target_arch = "wasm32")]
    #[wasm_bindgen]
    pub fn get_flat_snapshot(&mut self) -> js_sys::Uint32Array {
        let stopwatch = Stopwatch::start();
        let array = js_sys::Uint32Array::from(self.logic.flat_cells());
        self.last_snapshot_duration_ms = stopwatch.elapsed_ms();
        array
    }

    #[wasm_bindgen]
    pub fn drain_events(&mut self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.logic.drain_events()).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen]
    pub fn get_standings(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.logic.standings()).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen]
    pub fn faction_names(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.names()).unwrap_or(JsValue::NULL)
    }

    /// Zero for unknown factions.
    #[wasm_bindgen]
    pub fn get_multiplier(&self, faction: &str) -> u32 {
        self.faction(faction)
            .and_then(|id| self.logic.multiplier(id))
            .unwrap_or(0)
    }

    #[wasm_bindgen]
    pub fn get_winner(&self) -> Option<String> {
        self.logic
            .winner()
            .map(|id| self.logic.data().roster().name_of(id).to_string())
    }

    #[wasm_bindgen]
    pub fn get_tick(&self) -> u64 {
        self.logic.tick_count()
    }

    #[wasm_bindgen]
    pub fn get_time_ms(&self) -> f64 {
        self.logic.now_ms()
    }

    #[wasm_bindgen]
    pub fn get_last_tick_duration(&self) -> f64 {
        self.logic.data().metrics().last_tick_duration_ms
    }

    #[wasm_bindgen]
    pub fn get_last_snapshot_duration(&self) -> f64 {
        self.last_snapshot_duration_ms
    }

    #[wasm_bindgen]
    pub fn reset(&mut self) -> Result<(), JsValue> {
        self.logic
            .reset()
            .map_err(|err| JsValue::from_str(&err.to_string()))
    }

    #[wasm_bindgen]
    pub fn destroy(&mut self) {
        self.logic.destroy();
    }
}

impl Simulation {
    fn faction(&self, name: &str) -> Option<FactionId> {
        self.logic.faction_id(name)
    }

    fn names(&self) -> Vec<String> {
        self.logic
            .data()
            .roster()
            .playable()
            .map(|faction| faction.name.clone())
            .collect()
    }
}

#[cfg(test)]
impl Simulation {
    pub(crate) fn logic(&self) -> &SimulationLogic {
        &self.logic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_simulation_starts_clean() {
        let sim = Simulation::new(None, Some(7));
        assert_eq!(sim.get_tick(), 0);
        assert_eq!(sim.names(), vec!["georgia", "armenia", "india", "russia"]);
        assert_eq!(sim.get_multiplier("india"), 1);
        assert_eq!(sim.get_multiplier("atlantis"), 0);
        assert_eq!(sim.get_winner(), None);
        assert_eq!(sim.logic().data().config().seed, 7);
    }

    #[test]
    fn invalid_scenario_falls_back_to_builtin() {
        let sim = Simulation::new(Some(r#"{ "factions": [] }"#.to_string()), None);
        assert_eq!(sim.names().len(), 4);
    }

    #[test]
    fn spin_by_name_and_tick() {
        let mut sim = Simulation::new(None, None);
        assert!(sim.spin("georgia"));
        assert!(!sim.spin("georgia"));
        assert!(!sim.spin("atlantis"));
        sim.tick(16.0);
        assert_eq!(sim.get_tick(), 1);
        assert_eq!(sim.get_time_ms(), 16.0);
    }

    #[test]
    fn custom_scenario_is_used() {
        let sim = Simulation::new(
            Some(
                r#"{ "map_size": 3, "factions": [
                    { "name": "north", "color": 1, "rows": [{ "x": [0, 2], "y": 0 }] },
                    { "name": "south", "color": 2, "rows": [{ "x": [0, 2], "y": 2 }] }
                ] }"#
                    .to_string(),
            ),
            None,
        );
        assert_eq!(sim.names(), vec!["north", "south"]);
        assert_eq!(sim.logic().data().territory().len(), 9);
    }

    #[test]
    fn destroy_stops_auto_spin() {
        let mut sim = Simulation::new(None, None);
        sim.start_auto_spin();
        sim.destroy();
        sim.tick(10_000.0);
        assert!(sim.logic().data().projectiles().is_empty());
        assert_eq!(sim.logic().data().active_wheels().count(), 0);
        assert!(!sim.spin("georgia"));
    }
}
