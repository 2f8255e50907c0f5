//! Fixture scheduling: the circle-method round robin, the seeded cross-group
//! matcher and the two-phase group format built on both.

mod group_phase;
mod matching;
mod round_robin;

pub use group_phase::*;
pub use matching::{perfect_matching, BACKTRACK_BUDGET};
pub use round_robin::{Fixture, RoundRobinSchedule, ScheduledRound};
