mod cannon_aim;
mod performance;
mod random;
mod scheduler;

pub use cannon_aim::{CannonAim, RotatingAim};
pub use performance::{performance_now, Stopwatch};
pub use random::{pick_index, RandomSource, SeededRandom};
pub use scheduler::{Scheduler, TimerHandle, TimerQueue};

#[cfg(test)]
pub(crate) use random::ScriptedRandom;
