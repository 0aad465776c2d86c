use serde::{Deserialize, Serialize};
use std::fmt;

use super::faction::FactionId;

/// What a wheel segment does when the arrow stops on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentLabel {
    Fire,
    Empty,
    BuildCannon,
    Multiply,
}

impl SegmentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentLabel::Fire => "fire",
            SegmentLabel::Empty => "empty",
            SegmentLabel::BuildCannon => "build-cannon",
            SegmentLabel::Multiply => "multiply",
        }
    }
}

impl fmt::Display for SegmentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved spin, handed to the dispatcher and to host hooks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinOutcome {
    pub index: usize,
    pub label: SegmentLabel,
    pub faction: FactionId,
    pub multiplier: u32,
    /// Arrow angle normalized to `[0, 360)`.
    pub angle: f64,
}
