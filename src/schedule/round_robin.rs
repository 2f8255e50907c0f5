//! Round-robin fixture generation using the circle method.
//!
//! The first entity stays fixed while the rest rotate one step per round. An
//! odd entity count gets a sentinel slot; whoever meets the sentinel rests.
//! Pure and deterministic for a given entity order.

use serde::Serialize;

use crate::pairing::PairingError;

/// One game in a round-robin schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fixture<T> {
    pub home: T,
    pub away: T,
}

/// The fixtures and resting entity of one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledRound<T> {
    /// 1-based round within the cycle
    pub round: u32,
    pub fixtures: Vec<Fixture<T>>,
    pub bye: Option<T>,
}

/// A complete single round-robin cycle over an ordered entity list.
#[derive(Debug, Clone)]
pub struct RoundRobinSchedule<T> {
    slots: Vec<Option<T>>,
}

impl<T: Clone> RoundRobinSchedule<T> {
    /// Build a schedule. Needs at least two entities.
    pub fn new(entities: Vec<T>) -> Result<Self, PairingError> {
        if entities.len() < 2 {
            return Err(PairingError::InvalidConfig(format!(
                "Round robin needs at least 2 entities, got {}",
                entities.len()
            )));
        }

        let mut slots: Vec<Option<T>> = entities.into_iter().map(Some).collect();
        if slots.len() % 2 == 1 {
            slots.push(None);
        }

        Ok(Self { slots })
    }

    /// Number of real entities.
    pub fn entity_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Rounds in one full cycle: N-1 for even N, N for odd N.
    pub fn rounds(&self) -> u32 {
        self.slots.len() as u32 - 1
    }

    /// Fixtures for `round` (1-based). Rounds past the end of the cycle wrap
    /// around, so a schedule can be repeated to fill any number of rounds.
    pub fn round(&self, round: u32) -> ScheduledRound<T> {
        let cycle_index = (round.max(1) - 1) % self.rounds();
        let n = self.slots.len();

        let mut order: Vec<&Option<T>> = Vec::with_capacity(n);
        order.push(&self.slots[0]);
        let mut rest: Vec<&Option<T>> = self.slots[1..].iter().collect();
        let shift = cycle_index as usize % rest.len();
        rest.rotate_right(shift);
        order.extend(rest);

        let mut fixtures = Vec::with_capacity(n / 2);
        let mut bye = None;

        for i in 0..n / 2 {
            let (a, b) = (order[i], order[n - 1 - i]);
            match (a, b) {
                (Some(a), Some(b)) => {
                    // Alternate the fixed entity's seat so it is not always home.
                    let flip = i == 0 && cycle_index % 2 == 1;
                    let (home, away) = if flip { (b, a) } else { (a, b) };
                    fixtures.push(Fixture {
                        home: home.clone(),
                        away: away.clone(),
                    });
                }
                (Some(resting), None) | (None, Some(resting)) => bye = Some(resting.clone()),
                (None, None) => {}
            }
        }

        ScheduledRound {
            round: cycle_index + 1,
            fixtures,
            bye,
        }
    }

    /// Every round of one cycle.
    pub fn all_rounds(&self) -> Vec<ScheduledRound<T>> {
        (1..=self.rounds()).map(|r| self.round(r)).collect()
    }
}
