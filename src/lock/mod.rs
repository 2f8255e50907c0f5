//! Round lock state.
//!
//! A confirmed round is persisted and locked. Only the most recently paired
//! round can be unlocked, and only while no result references it; every
//! earlier round is frozen for good once a later round has pairings.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;
use tracing::debug;

use crate::models::TournamentSnapshot;

/// Precondition failures around locking. All recoverable by picking another
/// round.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LockError {
    #[error("Round {0} is locked; unlock it before regenerating")]
    RoundLocked(u32),

    #[error("Round {round} is immutable: round {latest} already has pairings")]
    RoundImmutable { round: u32, latest: u32 },

    #[error("Only the most recent round ({latest}) can be unlocked, not round {round}")]
    NotMostRecent { round: u32, latest: u32 },

    #[error("Round {round} already has {count} recorded result(s)")]
    HasResults { round: u32, count: usize },

    #[error("Round {0} has no pairings to lock")]
    NoPairings(u32),

    #[error("Round {round} is out of sequence; the next round to pair is {next}")]
    OutOfSequence { round: u32, next: u32 },

    #[error("Round {0} is not locked")]
    NotLocked(u32),
}

/// Which rounds are paired, locked and scored, derived from a snapshot.
#[derive(Debug, Clone, Default)]
pub struct RoundLedger {
    locked: BTreeSet<u32>,
    paired: BTreeSet<u32>,
    results_per_round: BTreeMap<u32, usize>,
}

impl RoundLedger {
    pub fn from_snapshot(snapshot: &TournamentSnapshot) -> Self {
        let results = snapshot.results_by_matchup();
        let mut results_per_round: BTreeMap<u32, usize> = BTreeMap::new();
        for m in &snapshot.matchups {
            if results.contains_key(&m.id) {
                *results_per_round.entry(m.round).or_default() += 1;
            }
        }

        let paired = snapshot
            .matchups
            .iter()
            .map(|m| m.round)
            .chain(snapshot.byes.iter().map(|b| b.round))
            .collect();

        Self {
            locked: snapshot.locked_rounds.clone(),
            paired,
            results_per_round,
        }
    }

    pub fn latest_paired(&self) -> Option<u32> {
        self.paired.last().copied()
    }

    /// The round after the most recent paired one.
    pub fn next_round(&self) -> u32 {
        self.latest_paired().map_or(1, |r| r + 1)
    }

    pub fn is_locked(&self, round: u32) -> bool {
        self.locked.contains(&round)
    }

    pub fn is_paired(&self, round: u32) -> bool {
        self.paired.contains(&round)
    }

    pub fn results_in(&self, round: u32) -> usize {
        self.results_per_round.get(&round).copied().unwrap_or(0)
    }

    /// Pairings for `round` may be generated (or regenerated).
    pub fn ensure_can_generate(&self, round: u32) -> Result<(), LockError> {
        let next = self.next_round();
        if round == 0 || round > next {
            return Err(LockError::OutOfSequence { round, next });
        }
        if self.is_locked(round) {
            return Err(LockError::RoundLocked(round));
        }
        if let Some(latest) = self.latest_paired().filter(|&latest| latest > round) {
            return Err(LockError::RoundImmutable { round, latest });
        }
        debug!("Round {} may be generated", round);
        Ok(())
    }

    /// `round` has pairings and is not locked yet.
    pub fn ensure_can_lock(&self, round: u32) -> Result<(), LockError> {
        if !self.is_paired(round) {
            return Err(LockError::NoPairings(round));
        }
        if self.is_locked(round) {
            return Err(LockError::RoundLocked(round));
        }
        Ok(())
    }

    /// `round` is locked, the most recent paired round, and unscored.
    pub fn ensure_can_unlock(&self, round: u32) -> Result<(), LockError> {
        if !self.is_locked(round) {
            return Err(LockError::NotLocked(round));
        }
        if let Some(latest) = self.latest_paired().filter(|&latest| latest != round) {
            return Err(LockError::NotMostRecent { round, latest });
        }
        let count = self.results_in(round);
        if count > 0 {
            return Err(LockError::HasResults { round, count });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ByeRecord, EntityId, Matchup, ResultRecord};

    fn paired(rounds: u32) -> TournamentSnapshot {
        let mut snapshot = TournamentSnapshot::default();
        for round in 1..=rounds {
            snapshot
                .matchups
                .push(Matchup::new(round, 1, EntityId::from("a"), EntityId::from("b")));
            snapshot.locked_rounds.insert(round);
        }
        snapshot
    }

    #[test]
    fn test_fresh_tournament_starts_at_round_one() {
        let ledger = RoundLedger::from_snapshot(&TournamentSnapshot::default());
        assert_eq!(ledger.next_round(), 1);
        assert_eq!(ledger.ensure_can_generate(1), Ok(()));
        assert_eq!(
            ledger.ensure_can_generate(2),
            Err(LockError::OutOfSequence { round: 2, next: 1 })
        );
        assert_eq!(ledger.ensure_can_lock(1), Err(LockError::NoPairings(1)));
    }

    #[test]
    fn test_locked_and_earlier_rounds_cannot_be_regenerated() {
        let mut snapshot = paired(3);
        let ledger = RoundLedger::from_snapshot(&snapshot);
        assert_eq!(ledger.ensure_can_generate(3), Err(LockError::RoundLocked(3)));
        assert_eq!(ledger.ensure_can_generate(4), Ok(()));

        snapshot.locked_rounds.remove(&2);
        let ledger = RoundLedger::from_snapshot(&snapshot);
        assert_eq!(
            ledger.ensure_can_generate(2),
            Err(LockError::RoundImmutable { round: 2, latest: 3 })
        );
    }

    #[test]
    fn test_unlock_rules() {
        let mut snapshot = paired(2);
        let ledger = RoundLedger::from_snapshot(&snapshot);
        assert_eq!(
            ledger.ensure_can_unlock(1),
            Err(LockError::NotMostRecent { round: 1, latest: 2 })
        );
        assert_eq!(ledger.ensure_can_unlock(2), Ok(()));

        let scored = snapshot.matchups[1].id.clone();
        snapshot.results.push(ResultRecord::new(scored, 3, 1));
        let ledger = RoundLedger::from_snapshot(&snapshot);
        assert_eq!(
            ledger.ensure_can_unlock(2),
            Err(LockError::HasResults { round: 2, count: 1 })
        );

        snapshot.locked_rounds.clear();
        let ledger = RoundLedger::from_snapshot(&snapshot);
        assert_eq!(ledger.ensure_can_unlock(2), Err(LockError::NotLocked(2)));
    }

    #[test]
    fn test_unlocked_latest_round_can_be_regenerated_and_relocked() {
        let mut snapshot = paired(2);
        snapshot.locked_rounds.remove(&2);
        let ledger = RoundLedger::from_snapshot(&snapshot);
        assert_eq!(ledger.ensure_can_generate(2), Ok(()));
        assert_eq!(ledger.ensure_can_lock(2), Ok(()));
        assert_eq!(ledger.ensure_can_lock(1), Err(LockError::RoundLocked(1)));
    }

    #[test]
    fn test_bye_only_round_counts_as_paired() {
        let mut snapshot = paired(1);
        snapshot.byes.push(ByeRecord {
            round: 2,
            competitor: EntityId::from("c"),
        });
        let ledger = RoundLedger::from_snapshot(&snapshot);
        assert_eq!(ledger.latest_paired(), Some(2));
        assert_eq!(ledger.next_round(), 3);
    }
}
