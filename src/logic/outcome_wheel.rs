use thiserror::Error;

use crate::constants::{INITIAL_MULTIPLIER, MULTIPLIER_CAP, WHEEL_FULL_TURNS};
use crate::dependency::RandomSource;
use crate::types::{FactionId, SegmentLabel, SpinOutcome, WheelStatus};

const FULL_TURN_DEGREES: u64 = 360;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("wheel needs at least one segment")]
    Empty,
    #[error("segment {index} has zero width")]
    ZeroWidth { index: usize },
    #[error("segment angles sum to {sum}, expected 360")]
    AngleSum { sum: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelSegment {
    pub angle: u32,
    pub label: SegmentLabel,
}

impl WheelSegment {
    pub const fn new(angle: u32, label: SegmentLabel) -> Self {
        Self { angle, label }
    }
}

/// Ordered segments covering exactly one full turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelLayout {
    segments: Vec<WheelSegment>,
    thresholds: Vec<u32>,
}

impl WheelLayout {
    pub fn new(segments: Vec<WheelSegment>) -> Result<Self, LayoutError> {
        if segments.is_empty() {
            return Err(LayoutError::Empty);
        }
        if let Some(index) = segments.iter().position(|s| s.angle == 0) {
            return Err(LayoutError::ZeroWidth { index });
        }
        let sum: u64 = segments.iter().map(|s| u64::from(s.angle)).sum();
        if sum != FULL_TURN_DEGREES {
            return Err(LayoutError::AngleSum { sum });
        }

        let thresholds = segments
            .iter()
            .scan(0, |acc, s| {
                *acc += s.angle;
                Some(*acc)
            })
            .collect();
        Ok(Self {
            segments,
            thresholds,
        })
    }

    /// fire 120°, empty 120°, build-cannon 60°, multiply 60°.
    pub fn standard() -> Self {
        Self {
            segments: vec![
                WheelSegment::new(120, SegmentLabel::Fire),
                WheelSegment::new(120, SegmentLabel::Empty),
                WheelSegment::new(60, SegmentLabel::BuildCannon),
                WheelSegment::new(60, SegmentLabel::Multiply),
            ],
            thresholds: vec![120, 240, 300, 360],
        }
    }

    pub fn segments(&self) -> &[WheelSegment] {
        &self.segments
    }

    /// Cumulative end angle of each segment; the last is always 360.
    pub fn thresholds(&self) -> &[u32] {
        &self.thresholds
    }

    pub fn label(&self, index: usize) -> SegmentLabel {
        self.segments[index].label
    }

    /// Segment under `angle`: the first whose threshold is strictly greater
    /// than the normalized angle, so an angle sitting on a boundary belongs
    /// to the following segment.
    pub fn resolve(&self, angle: f64) -> usize {
        let angle = normalize_angle(angle);
        self.thresholds
            .iter()
            .position(|&threshold| angle < f64::from(threshold))
            .unwrap_or(self.segments.len() - 1)
    }
}

impl Default for WheelLayout {
    fn default() -> Self {
        Self::standard()
    }
}

/// Map any angle in degrees into `[0, 360)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let normalized = angle.rem_euclid(360.0);
    // rem_euclid can round a tiny negative input up to exactly 360.
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpinPhase {
    /// Arrow still moving toward `target_angle`.
    Animating { target_angle: f64 },
    /// Result emitted; the host holds the highlighted segment.
    Settling { outcome: SpinOutcome },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WheelState {
    Idle,
    Spinning { spin: u64, phase: SpinPhase },
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpinStart {
    Started { spin: u64, target_angle: f64 },
    /// A spin is already in flight; the request is ignored.
    Busy,
    /// The wheel is gone, either just now or earlier.
    Destroyed,
}

impl SpinStart {
    pub fn started(&self) -> bool {
        matches!(self, SpinStart::Started { .. })
    }
}

/// Per-faction outcome selector.
///
/// `Idle -> Spinning(Animating) -> Spinning(Settling) -> Idle`, with
/// `Destroyed` terminal. Timing lives outside: the owner calls
/// `complete_animation` and `settle` when its timers fire, passing back the
/// spin number so stale completions are ignored.
#[derive(Debug, Clone)]
pub struct OutcomeWheel {
    faction: FactionId,
    layout: WheelLayout,
    multiplier: u32,
    multiplier_cap: u32,
    full_turns: u32,
    state: WheelState,
    spins_started: u64,
}

impl OutcomeWheel {
    pub fn new(faction: FactionId, layout: WheelLayout) -> Self {
        Self::with_limits(faction, layout, MULTIPLIER_CAP, WHEEL_FULL_TURNS)
    }

    pub fn with_limits(
        faction: FactionId,
        layout: WheelLayout,
        multiplier_cap: u32,
        full_turns: u32,
    ) -> Self {
        Self {
            faction,
            layout,
            multiplier: INITIAL_MULTIPLIER,
            multiplier_cap: multiplier_cap.clamp(INITIAL_MULTIPLIER, MULTIPLIER_CAP),
            full_turns,
            state: WheelState::Idle,
            spins_started: 0,
        }
    }

    pub fn faction(&self) -> FactionId {
        self.faction
    }

    pub fn layout(&self) -> &WheelLayout {
        &self.layout
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    pub fn state(&self) -> WheelState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, WheelState::Idle)
    }

    pub fn is_destroyed(&self) -> bool {
        matches!(self.state, WheelState::Destroyed)
    }

    pub fn status(&self) -> WheelStatus {
        match self.state {
            WheelState::Idle => WheelStatus::Idle,
            WheelState::Spinning {
                phase: SpinPhase::Animating { .. },
                ..
            } => WheelStatus::Spinning,
            WheelState::Spinning {
                phase: SpinPhase::Settling { .. },
                ..
            } => WheelStatus::Settling,
            WheelState::Destroyed => WheelStatus::Destroyed,
        }
    }

    pub fn target_angle(&self) -> Option<f64> {
        match self.state {
            WheelState::Spinning {
                phase: SpinPhase::Animating { target_angle },
                ..
            } => Some(target_angle),
            _ => None,
        }
    }

    pub fn highlighted(&self) -> Option<usize> {
        match self.state {
            WheelState::Spinning {
                phase: SpinPhase::Settling { outcome },
                ..
            } => Some(outcome.index),
            _ => None,
        }
    }

    /// Start a spin if idle. An idle wheel whose faction owns no cells is
    /// destroyed instead and never spins again.
    pub fn spin(&mut self, owned_cells: usize, rng: &mut dyn RandomSource) -> SpinStart {
        match self.state {
            WheelState::Destroyed => return SpinStart::Destroyed,
            WheelState::Spinning { .. } => return SpinStart::Busy,
            WheelState::Idle => {}
        }

        if owned_cells == 0 {
            self.destroy();
            return SpinStart::Destroyed;
        }

        let offset = rng.int_in_range(0, 359);
        let target_angle = f64::from(self.full_turns) * 360.0 + f64::from(offset);
        self.spins_started += 1;
        let spin = self.spins_started;
        self.state = WheelState::Spinning {
            spin,
            phase: SpinPhase::Animating { target_angle },
        };
        SpinStart::Started { spin, target_angle }
    }

    /// Resolve the in-flight spin at its target angle. Returns `None` if
    /// `spin` is not the animating spin.
    pub fn complete_animation(&mut self, spin: u64) -> Option<SpinOutcome> {
        let WheelState::Spinning {
            spin: current,
            phase: SpinPhase::Animating { target_angle },
        } = self.state
        else {
            return None;
        };
        if current != spin {
            return None;
        }

        let index = self.layout.resolve(target_angle);
        let label = self.layout.label(index);
        if label == SegmentLabel::Multiply {
            self.multiplier = (self.multiplier + 1).min(self.multiplier_cap);
        }

        let outcome = SpinOutcome {
            index,
            label,
            faction: self.faction,
            multiplier: self.multiplier,
            angle: normalize_angle(target_angle),
        };
        self.state = WheelState::Spinning {
            spin,
            phase: SpinPhase::Settling { outcome },
        };
        Some(outcome)
    }

    /// End the settle hold and accept spins again.
    pub fn settle(&mut self, spin: u64) -> bool {
        match self.state {
            WheelState::Spinning {
                spin: current,
                phase: SpinPhase::Settling { .. },
            } if current == spin => {
                self.state = WheelState::Idle;
                true
            }
            _ => false,
        }
    }

    pub fn destroy(&mut self) {
        if !self.is_destroyed() {
            tracing::info!(
                target: "conquest::wheel",
                faction = %self.faction,
                spins = self.spins_started,
                "wheel.destroyed"
            );
        }
        self.state = WheelState::Destroyed;
    }
}
