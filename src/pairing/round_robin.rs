//! Round-robin strategy on top of the circle-method scheduler.
//!
//! The seed order is the rating order (the ranking before any result), so the
//! schedule stays the same from round to round. A roster change between
//! rounds therefore reshapes the schedule.

use super::{Pairer, PairingContext, PairingError, Proposal};
use crate::schedule::RoundRobinSchedule;

#[derive(Debug, Clone, Copy, Default)]
pub struct RoundRobinPairer;

impl Pairer for RoundRobinPairer {
    fn name(&self) -> &'static str {
        "round-robin"
    }

    fn propose(&self, ctx: &PairingContext<'_>) -> Result<Proposal, PairingError> {
        let mut seeds: Vec<usize> = (0..ctx.standings.len()).collect();
        seeds.sort_by(|&a, &b| {
            let (ra, rb) = (&ctx.standings[a], &ctx.standings[b]);
            rb.competitor
                .rating
                .cmp(&ra.competitor.rating)
                .then_with(|| ra.id().cmp(rb.id()))
        });

        let schedule = RoundRobinSchedule::new(seeds)?;
        let scheduled = schedule.round(ctx.round);

        Ok(Proposal {
            pairs: scheduled
                .fixtures
                .into_iter()
                .map(|f| (f.home, f.away))
                .collect(),
            bye: scheduled.bye,
        })
    }
}
