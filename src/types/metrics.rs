use serde::{Deserialize, Serialize};

/// Running counters plus the cost of the last tick.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct SimulationMetrics {
    pub last_tick_duration_ms: f64,
    pub shots_fired: u64,
    pub captures: u64,
    pub cannons_built: u64,
    pub spins_resolved: u64,
    pub wheels_destroyed: u64,
}

impl SimulationMetrics {
    pub fn update_tick(&mut self, duration: f64) {
        if duration >= 0.0 {
            self.last_tick_duration_ms = duration;
        }
    }
}
