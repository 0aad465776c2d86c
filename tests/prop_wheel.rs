//! Property tests for wheel resolution and whole-match invariants.
//!
//! Run with: PROPTEST_CASES=10000 cargo test --release prop_wheel

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;

use proptest::prelude::*;

use conquest_sim::constants::MULTIPLIER_CAP;
use conquest_sim::dependency::RandomSource;
use conquest_sim::logic::{normalize_angle, OutcomeWheel, SpinStart, WheelLayout, WheelSegment};
use conquest_sim::types::{FactionId, SegmentLabel};
use conquest_sim::{ScenarioConfig, SimulationLogic};

/// Hands out queued draws, then the low end of each range.
struct Draws(VecDeque<u32>);

impl RandomSource for Draws {
    fn int_in_range(&mut self, low: u32, high: u32) -> u32 {
        self.0.pop_front().unwrap_or(low).clamp(low, high.max(low))
    }
}

const LABELS: [SegmentLabel; 4] = [
    SegmentLabel::Fire,
    SegmentLabel::Empty,
    SegmentLabel::BuildCannon,
    SegmentLabel::Multiply,
];

/// Segment lists that cover exactly one turn, cut at random points.
fn layout() -> impl Strategy<Value = WheelLayout> {
    prop::collection::btree_set(1u32..360, 0..8).prop_map(|cuts| {
        let mut bounds: Vec<u32> = cuts.into_iter().collect();
        bounds.push(360);
        let mut start = 0;
        let segments = bounds
            .into_iter()
            .enumerate()
            .map(|(i, end)| {
                let segment = WheelSegment::new(end - start, LABELS[i % LABELS.len()]);
                start = end;
                segment
            })
            .collect();
        WheelLayout::new(segments).unwrap()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn segment_angles_always_sum_to_a_full_turn(layout in layout()) {
        let sum: u32 = layout.segments().iter().map(|s| s.angle).sum();
        prop_assert_eq!(sum, 360);
        prop_assert_eq!(layout.thresholds().last().copied(), Some(360));
    }

    #[test]
    fn resolution_is_total_and_lands_inside_its_segment(
        layout in layout(),
        angle in 0.0f64..360.0,
    ) {
        let index = layout.resolve(angle);
        prop_assert!(index < layout.segments().len());
        prop_assert_eq!(index, layout.resolve(angle));

        let end = f64::from(layout.thresholds()[index]);
        let start = if index == 0 { 0.0 } else { f64::from(layout.thresholds()[index - 1]) };
        prop_assert!(start <= angle && angle < end);
    }

    #[test]
    fn thresholds_belong_to_the_following_segment(layout in layout()) {
        let thresholds = layout.thresholds().to_vec();
        for (i, &threshold) in thresholds.iter().enumerate().take(thresholds.len() - 1) {
            prop_assert_eq!(layout.resolve(f64::from(threshold)), i + 1);
        }
    }

    #[test]
    fn resolution_ignores_whole_turns(offset in 0u32..360, turns in 0u32..50) {
        let layout = WheelLayout::standard();
        let angle = f64::from(turns) * 360.0 + f64::from(offset);
        prop_assert_eq!(layout.resolve(angle), layout.resolve(f64::from(offset)));
        prop_assert_eq!(normalize_angle(angle), f64::from(offset));
    }

    #[test]
    fn multiplier_never_exceeds_cap(offsets in prop::collection::vec(0u32..360, 1..120)) {
        let mut wheel = OutcomeWheel::new(FactionId(1), WheelLayout::standard());
        let mut rng = Draws(offsets.iter().copied().collect());
        let mut previous = wheel.multiplier();
        for _ in &offsets {
            let SpinStart::Started { spin, .. } = wheel.spin(1, &mut rng) else {
                panic!("idle wheel with cells should spin");
            };
            let outcome = wheel.complete_animation(spin).unwrap();
            prop_assert!(outcome.multiplier <= MULTIPLIER_CAP);
            prop_assert!(outcome.multiplier >= previous);
            previous = outcome.multiplier;
            prop_assert!(wheel.settle(spin));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn seeded_matches_keep_territory_consistent(seed in any::<u64>()) {
        let mut scenario = ScenarioConfig::builtin();
        scenario.simulation.seed = seed;
        let mut sim = SimulationLogic::new(scenario).unwrap();
        sim.start_auto_spin();
        for _ in 0..1500 {
            sim.tick(16.0);
        }

        let territory = sim.data().territory();
        let total: usize = sim.standings().iter().map(|s| s.cells).sum::<usize>()
            + territory.owned_count(FactionId::NEUTRAL);
        prop_assert_eq!(total, territory.len());
        for cell in territory.cells() {
            prop_assert!(territory.cells_owned_by(cell.owner).any(|c| c == cell.coord));
            if cell.has_cannon {
                prop_assert!(!cell.owner.is_neutral());
            }
        }
        for faction in sim.data().roster().playable() {
            if let Some(multiplier) = sim.multiplier(faction.id) {
                prop_assert!((1..=MULTIPLIER_CAP).contains(&multiplier));
            }
        }
    }
}
