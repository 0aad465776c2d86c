use std::collections::HashSet;
use std::{fs, io, path::Path, path::PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::constants::*;
use crate::logic::{LayoutError, WheelLayout, WheelSegment};
use crate::types::{CellCoord, SegmentLabel};

pub const BUILTIN_SCENARIO: &str = include_str!("data/default_scenario.json");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read scenario from {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("map size must be at least 1")]
    EmptyMap,
    #[error("map size {size} exceeds the limit of {max}")]
    MapTooLarge { size: u32, max: u32 },
    #[error("multiplier cap {cap} is outside 1..={max}")]
    MultiplierCap { cap: u32, max: u32 },
    #[error("scenario declares no factions")]
    NoFactions,
    #[error("faction {0:?} is declared twice")]
    DuplicateFaction(String),
    #[error("faction name {0:?} is reserved for unclaimed cells")]
    ReservedFactionName(String),
    #[error("faction {faction:?} row has x range {from}..={to} reversed")]
    ReversedRow { faction: String, from: u32, to: u32 },
    #[error("faction {faction:?} claims ({x}, {y}) outside a {size}x{size} map")]
    CellOutOfBounds {
        faction: String,
        x: u32,
        y: u32,
        size: u32,
    },
    #[error("cell ({x}, {y}) is claimed by {faction:?} and an earlier faction")]
    CellClaimedTwice { faction: String, x: u32, y: u32 },
    #[error("invalid wheel layout: {0}")]
    Layout(#[from] LayoutError),
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RowSpec {
    /// Inclusive column range.
    pub x: [u32; 2],
    pub y: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FactionSpec {
    pub name: String,
    pub color: u32,
    pub rows: Vec<RowSpec>,
}

impl FactionSpec {
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.rows
            .iter()
            .flat_map(|row| (row.x[0]..=row.x[1]).map(move |x| CellCoord::new(x, row.y)))
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SegmentSpec {
    pub angle: u32,
    pub label: SegmentLabel,
}

/// Timing and physics knobs. Every field defaults to the value in
/// `constants.rs`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub cell_size: f32,
    pub projectile_speed: f32,
    pub projectile_radius: f32,
    pub muzzle_offset: [f32; 2],
    pub cannon_rotation_period_ms: f64,
    pub burst_interval_ms: f64,
    pub spin_animation_ms: f64,
    pub settle_ms: f64,
    pub auto_spin_interval_ms: f64,
    pub full_turns: u32,
    pub multiplier_cap: u32,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            cell_size: CELL_SIZE,
            projectile_speed: PROJECTILE_SPEED,
            projectile_radius: PROJECTILE_RADIUS,
            muzzle_offset: MUZZLE_OFFSET,
            cannon_rotation_period_ms: CANNON_ROTATION_PERIOD_MS,
            burst_interval_ms: BURST_INTERVAL_MS,
            spin_animation_ms: SPIN_ANIMATION_MS,
            settle_ms: SETTLE_MS,
            auto_spin_interval_ms: AUTO_SPIN_INTERVAL_MS,
            full_turns: WHEEL_FULL_TURNS,
            multiplier_cap: MULTIPLIER_CAP,
            seed: DEFAULT_SEED,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default = "default_map_size")]
    pub map_size: u32,
    #[serde(default = "default_neutral_color")]
    pub neutral_color: u32,
    pub factions: Vec<FactionSpec>,
    #[serde(default = "default_wheel")]
    pub wheel: Vec<SegmentSpec>,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

fn default_map_size() -> u32 {
    DEFAULT_MAP_SIZE
}

fn default_neutral_color() -> u32 {
    NEUTRAL_COLOR
}

fn default_wheel() -> Vec<SegmentSpec> {
    WheelLayout::standard()
        .segments()
        .iter()
        .map(|segment| SegmentSpec {
            angle: segment.angle,
            label: segment.label,
        })
        .collect()
}

impl ScenarioConfig {
    pub fn builtin() -> Self {
        let config: Self =
            serde_json::from_str(BUILTIN_SCENARIO).expect("builtin scenario should parse");
        config
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn wheel_layout(&self) -> Result<WheelLayout, LayoutError> {
        WheelLayout::new(
            self.wheel
                .iter()
                .map(|spec| WheelSegment::new(spec.angle, spec.label))
                .collect(),
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map_size == 0 {
            return Err(ConfigError::EmptyMap);
        }
        if self.map_size > MAX_MAP_SIZE {
            return Err(ConfigError::MapTooLarge {
                size: self.map_size,
                max: MAX_MAP_SIZE,
            });
        }
        let cap = self.simulation.multiplier_cap;
        if !(INITIAL_MULTIPLIER..=MULTIPLIER_CAP).contains(&cap) {
            return Err(ConfigError::MultiplierCap {
                cap,
                max: MULTIPLIER_CAP,
            });
        }
        if self.factions.is_empty() {
            return Err(ConfigError::NoFactions);
        }
        self.wheel_layout()?;

        let mut names = HashSet::new();
        let mut claimed = HashSet::new();
        for faction in &self.factions {
            if faction.name == NEUTRAL_FACTION_NAME {
                return Err(ConfigError::ReservedFactionName(faction.name.clone()));
            }
            if !names.insert(faction.name.as_str()) {
                return Err(ConfigError::DuplicateFaction(faction.name.clone()));
            }
            for row in &faction.rows {
                if row.x[0] > row.x[1] {
                    return Err(ConfigError::ReversedRow {
                        faction: faction.name.clone(),
                        from: row.x[0],
                        to: row.x[1],
                    });
                }
            }
            for cell in faction.cells() {
                if cell.x >= self.map_size || cell.y >= self.map_size {
                    return Err(ConfigError::CellOutOfBounds {
                        faction: faction.name.clone(),
                        x: cell.x,
                        y: cell.y,
                        size: self.map_size,
                    });
                }
                if !claimed.insert(cell) {
                    return Err(ConfigError::CellClaimedTwice {
                        faction: faction.name.clone(),
                        x: cell.x,
                        y: cell.y,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Parse a host-supplied scenario, falling back to the builtin one.
pub fn load_scenario(json: Option<&str>) -> ScenarioConfig {
    if let Some(json) = json {
        match ScenarioConfig::from_json_str(json) {
            Ok(config) => {
                tracing::info!(
                    target: "conquest::config",
                    factions = config.factions.len(),
                    map_size = config.map_size,
                    "scenario.loaded=custom"
                );
                return config;
            }
            Err(err) => {
                tracing::warn!(
                    target: "conquest::config",
                    error = %err,
                    "scenario.load_failed"
                );
            }
        }
    }

    tracing::info!(target: "conquest::config", "scenario.loaded=builtin");
    ScenarioConfig::builtin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_scenario_is_valid() {
        let config = ScenarioConfig::builtin();
        config.validate().unwrap();
        assert_eq!(config.map_size, 14);
        assert_eq!(config.factions.len(), 4);
        assert_eq!(config.simulation.multiplier_cap, MULTIPLIER_CAP);
        let layout = config.wheel_layout().unwrap();
        assert_eq!(layout.thresholds(), vec![120, 240, 300, 360]);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config = ScenarioConfig::from_json_str(
            r#"{ "factions": [{ "name": "a", "color": 1, "rows": [{ "x": [0, 1], "y": 0 }] }] }"#,
        )
        .unwrap();
        assert_eq!(config.map_size, DEFAULT_MAP_SIZE);
        assert_eq!(config.wheel.len(), 4);
        assert_eq!(config.simulation.burst_interval_ms, BURST_INTERVAL_MS);
        assert_eq!(config.factions[0].cells().count(), 2);
    }

    #[test]
    fn rejects_overlapping_claims() {
        let err = ScenarioConfig::from_json_str(
            r#"{ "factions": [
                { "name": "a", "color": 1, "rows": [{ "x": [0, 2], "y": 0 }] },
                { "name": "b", "color": 2, "rows": [{ "x": [2, 3], "y": 0 }] }
            ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::CellClaimedTwice { x: 2, y: 0, .. }));
    }

    #[test]
    fn rejects_out_of_bounds_and_reserved_names() {
        let err = ScenarioConfig::from_json_str(
            r#"{ "map_size": 4, "factions": [{ "name": "a", "color": 1, "rows": [{ "x": [3, 4], "y": 0 }] }] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::CellOutOfBounds { x: 4, .. }));

        let err = ScenarioConfig::from_json_str(
            r#"{ "factions": [{ "name": "default", "color": 1, "rows": [] }] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ReservedFactionName(_)));
    }

    #[test]
    fn rejects_wheel_not_summing_to_full_turn() {
        let err = ScenarioConfig::from_json_str(
            r#"{ "factions": [{ "name": "a", "color": 1, "rows": [] }],
                 "wheel": [{ "angle": 180, "label": "fire" }, { "angle": 90, "label": "empty" }] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Layout(LayoutError::AngleSum { sum: 270 })));
    }

    #[test]
    fn rejects_multiplier_cap_above_the_hard_limit() {
        let err = ScenarioConfig::from_json_str(
            r#"{ "factions": [{ "name": "a", "color": 1, "rows": [] }],
                 "simulation": { "multiplier_cap": 100 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MultiplierCap { cap: 100, max: 30 }));

        let err = ScenarioConfig::from_json_str(
            r#"{ "factions": [{ "name": "a", "color": 1, "rows": [] }],
                 "simulation": { "multiplier_cap": 0 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MultiplierCap { cap: 0, .. }));
    }

    #[test]
    fn oversized_map_is_rejected_and_loader_falls_back() {
        let json = r#"{ "map_size": 70000, "factions": [{ "name": "a", "color": 1, "rows": [] }] }"#;
        let err = ScenarioConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, ConfigError::MapTooLarge { size: 70000, .. }));

        let config = load_scenario(Some(json));
        assert_eq!(config.map_size, DEFAULT_MAP_SIZE);
    }

    #[test]
    fn load_scenario_falls_back_on_bad_json() {
        let config = load_scenario(Some("not json"));
        assert_eq!(config.factions.len(), 4);
        assert_eq!(config.factions[0].name, "georgia");
    }
}
