use rand::{rngs::SmallRng, Rng, SeedableRng};

/// Uniform integer draws consumed by the wheel and the dispatcher.
pub trait RandomSource {
    /// Uniform integer in `low..=high`. Returns `low` when the range is empty.
    fn int_in_range(&mut self, low: u32, high: u32) -> u32;
}

/// Pick an index into a collection of `len` items, or `None` when empty.
pub fn pick_index(rng: &mut dyn RandomSource, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let upper = u32::try_from(len - 1).unwrap_or(u32::MAX);
    Some(rng.int_in_range(0, upper) as usize)
}

pub struct SeededRandom {
    rng: SmallRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn int_in_range(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..=high)
    }
}

/// Replays a fixed list of draws, clamped into the requested range.
#[cfg(test)]
pub(crate) struct ScriptedRandom {
    draws: std::collections::VecDeque<u32>,
}

#[cfg(test)]
impl ScriptedRandom {
    pub(crate) fn new(draws: &[u32]) -> Self {
        Self {
            draws: draws.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
impl RandomSource for ScriptedRandom {
    fn int_in_range(&mut self, low: u32, high: u32) -> u32 {
        let draw = self.draws.pop_front().unwrap_or(low);
        draw.clamp(low, high.max(low))
    }
}
