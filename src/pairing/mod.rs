//! Pairing strategies.
//!
//! Every strategy implements the `Pairer` trait: it looks at ranked standings
//! and the constraint snapshot and proposes pairs by standings index. The
//! `PairingEngine` then seats the tables, assigns first moves, and checks its
//! own output before handing it back.

mod extremal;
mod manual;
mod round_robin;
mod swiss;

pub use extremal::KingOfTheHillPairer;
pub use manual::ManualPairer;
pub use round_robin::RoundRobinPairer;
pub use swiss::SwissPairer;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::ConfigError;
use crate::constraints::{first_mover, ConstraintTracker, PairingRules, Seat};
use crate::models::{ByeRecord, CompetitorId, Matchup, RankedCompetitor};

/// Errors that can occur while generating pairings.
#[derive(Debug, Error)]
pub enum PairingError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Round {round} is out of range (1..={total_rounds})")]
    InvalidRound { round: u32, total_rounds: u32 },

    #[error("Could not pair {} competitor(s) in round {round}: {}", .competitors.len(), join_ids(.competitors))]
    Unmatched {
        round: u32,
        competitors: Vec<CompetitorId>,
    },

    #[error("Pairing output violates an invariant: {0}")]
    InvariantViolation(String),

    #[error("Invalid manual pairing: {0}")]
    InvalidPairing(String),

    #[error("Unknown or inactive competitor: {0}")]
    UnknownCompetitor(CompetitorId),

    #[error("Round {round} cannot be generated while the schedule is in {phase}")]
    PhaseMismatch { round: u32, phase: String },

    #[error("Phase 1 needs {required} completed rounds before the transition, got {completed}")]
    PhaseIncomplete { completed: u32, required: u32 },
}

fn join_ids(ids: &[CompetitorId]) -> String {
    ids.iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Selectable pairing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PairingStrategy {
    /// Score brackets, fold pairing inside each bracket
    Swiss,
    /// Narrowest brackets: adjacent ranks meet
    FonteSwiss,
    /// Extremal: 1 vs n, 2 vs n-1, ...
    KingOfTheHill,
    RoundRobin,
    Manual,
}

impl fmt::Display for PairingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PairingStrategy::Swiss => "swiss",
            PairingStrategy::FonteSwiss => "fonte-swiss",
            PairingStrategy::KingOfTheHill => "king-of-the-hill",
            PairingStrategy::RoundRobin => "round-robin",
            PairingStrategy::Manual => "manual",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for PairingStrategy {
    type Err = PairingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "swiss" => Ok(PairingStrategy::Swiss),
            "fonte-swiss" | "fonte" => Ok(PairingStrategy::FonteSwiss),
            "king-of-the-hill" | "koth" | "extremal" => Ok(PairingStrategy::KingOfTheHill),
            "round-robin" | "rr" => Ok(PairingStrategy::RoundRobin),
            "manual" => Ok(PairingStrategy::Manual),
            other => Err(PairingError::InvalidConfig(format!(
                "Unknown pairing strategy: {}",
                other
            ))),
        }
    }
}

/// Everything a strategy may look at.
#[derive(Debug, Clone, Copy)]
pub struct PairingContext<'a> {
    pub round: u32,
    /// Ranked standings, index 0 = rank 1
    pub standings: &'a [RankedCompetitor],
    pub constraints: &'a ConstraintTracker,
    pub rules: PairingRules,
}

impl<'a> PairingContext<'a> {
    pub fn id(&self, index: usize) -> &'a CompetitorId {
        self.standings[index].id()
    }

    /// Whether standings entries `a` and `b` may meet under the active rules.
    pub fn allows(&self, a: usize, b: usize) -> bool {
        self.constraints.allows(self.id(a), self.id(b), self.rules)
    }

    /// Bye for an odd field: the lowest-ranked competitor without a previous
    /// bye, or the lowest-ranked overall when everyone has had one.
    pub fn select_bye(&self) -> Option<usize> {
        let n = self.standings.len();
        if n % 2 == 0 {
            return None;
        }
        (0..n)
            .rev()
            .find(|&i| !self.constraints.had_bye(self.id(i)))
            .or(Some(n - 1))
    }
}

/// Pairs proposed by a strategy, as standings indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Proposal {
    pub pairs: Vec<(usize, usize)>,
    pub bye: Option<usize>,
}

/// Core trait for all pairing strategies.
pub trait Pairer {
    /// Strategy identifier for logging.
    fn name(&self) -> &'static str;

    /// Propose the round's pairs.
    fn propose(&self, ctx: &PairingContext<'_>) -> Result<Proposal, PairingError>;
}

/// A generated round: matchups plus the explicit bye, if any.
#[derive(Debug, Clone, Serialize)]
pub struct PairingOutcome {
    pub round: u32,
    pub strategy: PairingStrategy,
    pub matchups: Vec<Matchup>,
    pub bye: Option<ByeRecord>,
}

/// Dispatches to a strategy and validates what comes back.
#[derive(Debug, Clone)]
pub struct PairingEngine {
    strategy: PairingStrategy,
    rules: PairingRules,
    manual_pairs: Vec<(CompetitorId, CompetitorId)>,
}

impl PairingEngine {
    pub fn new(strategy: PairingStrategy, rules: PairingRules) -> Self {
        Self {
            strategy,
            rules,
            manual_pairs: Vec::new(),
        }
    }

    /// Builder method to supply the pairs for the manual strategy.
    pub fn with_manual_pairs(mut self, pairs: Vec<(CompetitorId, CompetitorId)>) -> Self {
        self.manual_pairs = pairs;
        self
    }

    pub fn strategy(&self) -> PairingStrategy {
        self.strategy
    }

    fn pairer(&self) -> Box<dyn Pairer + '_> {
        match self.strategy {
            PairingStrategy::Swiss => Box::new(SwissPairer::brackets()),
            PairingStrategy::FonteSwiss => Box::new(SwissPairer::narrow()),
            PairingStrategy::KingOfTheHill => Box::new(KingOfTheHillPairer),
            PairingStrategy::RoundRobin => Box::new(RoundRobinPairer),
            PairingStrategy::Manual => Box::new(ManualPairer::new(&self.manual_pairs)),
        }
    }

    /// Generate pairings for `round` from ranked standings.
    pub fn generate(
        &self,
        round: u32,
        standings: &[RankedCompetitor],
        constraints: &ConstraintTracker,
    ) -> Result<PairingOutcome, PairingError> {
        if round == 0 {
            return Err(PairingError::InvalidRound {
                round,
                total_rounds: 0,
            });
        }

        let ctx = PairingContext {
            round,
            standings,
            constraints,
            rules: self.rules,
        };
        let pairer = self.pairer();

        info!(
            "Pairing round {} for {} competitors with {}",
            round,
            standings.len(),
            pairer.name()
        );

        let proposal = pairer.propose(&ctx)?;
        let outcome = self.seat(&ctx, proposal);
        validate_round(&outcome, standings)?;

        debug!(
            "Round {}: {} matchups, bye = {:?}",
            round,
            outcome.matchups.len(),
            outcome.bye.as_ref().map(|b| b.competitor.as_str())
        );

        Ok(outcome)
    }

    /// Turn a proposal into numbered, seated matchups.
    ///
    /// Tables are numbered by the best rank at the table. Seat 1 is the
    /// higher-ranked side unless the strategy keeps its own seating (manual).
    fn seat(&self, ctx: &PairingContext<'_>, proposal: Proposal) -> PairingOutcome {
        let keep_seating = self.strategy == PairingStrategy::Manual;

        let mut pairs: Vec<(usize, usize)> = proposal
            .pairs
            .into_iter()
            .map(|(a, b)| if keep_seating || a < b { (a, b) } else { (b, a) })
            .collect();
        pairs.sort_by_key(|&(a, b)| a.min(b));

        let matchups = pairs
            .into_iter()
            .enumerate()
            .map(|(i, (a, b))| {
                let table = i as u32 + 1;
                let (ra, rb) = (&ctx.standings[a], &ctx.standings[b]);
                let first = first_mover(
                    table,
                    Seat {
                        id: ra.id(),
                        prior_starts: ra.prior_starts,
                        rank: ra.rank,
                    },
                    Seat {
                        id: rb.id(),
                        prior_starts: rb.prior_starts,
                        rank: rb.rank,
                    },
                );
                Matchup::new(ctx.round, table, ra.id().clone(), rb.id().clone())
                    .with_first_move(first.clone())
                    .with_clinched(ra.clinched, rb.clinched)
            })
            .collect();

        PairingOutcome {
            round: ctx.round,
            strategy: self.strategy,
            matchups,
            bye: proposal.bye.map(|i| ByeRecord {
                round: ctx.round,
                competitor: ctx.id(i).clone(),
            }),
        }
    }
}

/// Reject output that breaks the round invariants: self-pairings, anyone
/// seated twice, strangers, a wrong matchup count, or a misplaced first move.
pub fn validate_round(
    outcome: &PairingOutcome,
    standings: &[RankedCompetitor],
) -> Result<(), PairingError> {
    let active: HashSet<&CompetitorId> = standings.iter().map(|r| r.id()).collect();
    let mut seen: HashSet<&CompetitorId> = HashSet::new();

    for m in &outcome.matchups {
        if m.round != outcome.round {
            return Err(PairingError::InvariantViolation(format!(
                "table {} is labelled round {} in round {}",
                m.table, m.round, outcome.round
            )));
        }
        if m.player1 == m.player2 {
            return Err(PairingError::InvariantViolation(format!(
                "{} is paired with itself at table {}",
                m.player1, m.table
            )));
        }
        if !m.involves(&m.first_move) {
            return Err(PairingError::InvariantViolation(format!(
                "first move at table {} goes to {}, who is not seated there",
                m.table, m.first_move
            )));
        }
        for id in [&m.player1, &m.player2] {
            if !active.contains(id) {
                return Err(PairingError::InvariantViolation(format!(
                    "{} is not an active competitor",
                    id
                )));
            }
            if !seen.insert(id) {
                return Err(PairingError::InvariantViolation(format!(
                    "{} appears in more than one matchup",
                    id
                )));
            }
        }
    }

    if let Some(bye) = &outcome.bye {
        if !active.contains(&bye.competitor) || !seen.insert(&bye.competitor) {
            return Err(PairingError::InvariantViolation(format!(
                "bye recipient {} is unknown or also paired",
                bye.competitor
            )));
        }
    }

    let expected = standings.len() / 2;
    if outcome.matchups.len() != expected {
        return Err(PairingError::InvariantViolation(format!(
            "expected {} matchups for {} competitors, produced {}",
            expected,
            standings.len(),
            outcome.matchups.len()
        )));
    }

    Ok(())
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::models::{EntityId, ResultRecord, TournamentSnapshot};

    fn engine(strategy: PairingStrategy) -> PairingEngine {
        PairingEngine::new(strategy, PairingRules::default())
    }

    #[test]
    fn test_strategy_parse_and_display() {
        for s in [
            PairingStrategy::Swiss,
            PairingStrategy::FonteSwiss,
            PairingStrategy::KingOfTheHill,
            PairingStrategy::RoundRobin,
            PairingStrategy::Manual,
        ] {
            assert_eq!(s.to_string().parse::<PairingStrategy>().unwrap(), s);
        }
        assert_eq!("KOTH".parse::<PairingStrategy>().unwrap(), PairingStrategy::KingOfTheHill);
        assert!("lottery".parse::<PairingStrategy>().is_err());
    }

    #[test]
    fn test_king_of_the_hill_scenario() {
        let snapshot = TournamentSnapshot::new(field(8));
        let standings = standings(&snapshot, 1);
        let tracker = ConstraintTracker::from_snapshot(&snapshot, 1);

        let outcome = engine(PairingStrategy::KingOfTheHill)
            .generate(1, &standings, &tracker)
            .unwrap();

        let pairs: Vec<(u32, u32)> = outcome
            .matchups
            .iter()
            .map(|m| {
                let rank = |id: &CompetitorId| standings.iter().find(|r| r.id() == id).unwrap().rank;
                (rank(&m.player1), rank(&m.player2))
            })
            .collect();
        assert_eq!(pairs, vec![(1, 8), (2, 7), (3, 6), (4, 5)]);
        assert_eq!(
            outcome.matchups.iter().map(|m| m.table).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        assert!(outcome.bye.is_none());
    }

    #[test]
    fn test_first_moves_alternate_on_fresh_field() {
        let snapshot = TournamentSnapshot::new(field(4));
        let standings = standings(&snapshot, 1);
        let tracker = ConstraintTracker::from_snapshot(&snapshot, 1);

        let outcome = engine(PairingStrategy::Swiss)
            .generate(1, &standings, &tracker)
            .unwrap();

        // Table 1 (odd): lower-ranked side starts. Table 2 (even): higher-ranked.
        assert_eq!(outcome.matchups[0].first_move, outcome.matchups[0].player2);
        assert_eq!(outcome.matchups[1].first_move, outcome.matchups[1].player1);
    }

    #[test]
    fn test_odd_field_reports_bye() {
        let snapshot = TournamentSnapshot::new(field(5));
        let standings = standings(&snapshot, 1);
        let tracker = ConstraintTracker::from_snapshot(&snapshot, 1);

        let outcome = engine(PairingStrategy::Swiss)
            .generate(1, &standings, &tracker)
            .unwrap();
        assert_eq!(outcome.matchups.len(), 2);
        let bye = outcome.bye.expect("odd field needs a bye");
        assert_eq!(&bye.competitor, standings[4].id());
        assert_eq!(bye.round, 1);
    }

    #[test]
    fn test_validate_rejects_duplicates_and_self_pairs() {
        let snapshot = TournamentSnapshot::new(field(4));
        let standings = standings(&snapshot, 1);
        let (a, b, c) = (
            standings[0].id().clone(),
            standings[1].id().clone(),
            standings[2].id().clone(),
        );

        let duplicate = PairingOutcome {
            round: 1,
            strategy: PairingStrategy::Manual,
            matchups: vec![
                Matchup::new(1, 1, a.clone(), b.clone()),
                Matchup::new(1, 2, a.clone(), c.clone()),
            ],
            bye: None,
        };
        assert!(matches!(
            validate_round(&duplicate, &standings),
            Err(PairingError::InvariantViolation(_))
        ));

        let self_pair = PairingOutcome {
            matchups: vec![Matchup::new(1, 1, c.clone(), c.clone())],
            ..duplicate.clone()
        };
        assert!(matches!(
            validate_round(&self_pair, &standings),
            Err(PairingError::InvariantViolation(_))
        ));

        let stranger = PairingOutcome {
            matchups: vec![
                Matchup::new(1, 1, a.clone(), EntityId::from("ghost")),
                Matchup::new(1, 2, b, c),
            ],
            ..duplicate
        };
        assert!(validate_round(&stranger, &standings).is_err());
    }

    #[test]
    fn test_round_zero_rejected() {
        let snapshot = TournamentSnapshot::new(field(4));
        let standings = standings(&snapshot, 1);
        let tracker = ConstraintTracker::default();
        assert!(matches!(
            engine(PairingStrategy::Swiss).generate(0, &standings, &tracker),
            Err(PairingError::InvalidRound { .. })
        ));
    }

    #[test]
    fn test_unmatched_error_lists_competitors() {
        let err = PairingError::Unmatched {
            round: 3,
            competitors: vec![EntityId::from("a"), EntityId::from("b")],
        };
        assert_eq!(err.to_string(), "Could not pair 2 competitor(s) in round 3: a, b");
    }

    /// Play `rounds` rounds as the engine seats them (higher rating wins)
    /// and check that nobody drifts more than one start from an even split
    /// of the games they have played.
    fn assert_first_moves_balanced(strategy: PairingStrategy, players: u32, rounds: u32) {
        let mut snapshot = TournamentSnapshot::new(field(players));

        for round in 1..=rounds {
            let standings = standings(&snapshot, round);
            let tracker = ConstraintTracker::from_snapshot(&snapshot, round);
            let outcome = engine(strategy).generate(round, &standings, &tracker).unwrap();

            for m in &outcome.matchups {
                let r1 = snapshot.competitor(&m.player1).unwrap().rating;
                let r2 = snapshot.competitor(&m.player2).unwrap().rating;
                let (s1, s2) = if r1 > r2 { (2, 0) } else { (0, 2) };
                snapshot.results.push(ResultRecord::new(m.id.clone(), s1, s2));
            }
            snapshot.record_round(&outcome.matchups, outcome.bye.as_ref());

            for c in &snapshot.competitors {
                let games = snapshot.matchups.iter().filter(|m| m.involves(&c.id)).count() as i64;
                let starts = snapshot.matchups.iter().filter(|m| m.first_move == c.id).count() as i64;
                assert!(
                    (2 * starts - games).abs() <= 2,
                    "{}: {} moved first in {} of {} games after round {}",
                    strategy,
                    c.name,
                    starts,
                    games,
                    round
                );
            }
        }
    }

    #[test]
    fn test_first_move_balance_swiss() {
        assert_first_moves_balanced(PairingStrategy::Swiss, 8, 7);
        assert_first_moves_balanced(PairingStrategy::Swiss, 7, 7);
    }

    #[test]
    fn test_first_move_balance_fonte_swiss() {
        assert_first_moves_balanced(PairingStrategy::FonteSwiss, 8, 7);
        assert_first_moves_balanced(PairingStrategy::FonteSwiss, 5, 5);
    }

    #[test]
    fn test_first_move_balance_king_of_the_hill() {
        assert_first_moves_balanced(PairingStrategy::KingOfTheHill, 8, 10);
        assert_first_moves_balanced(PairingStrategy::KingOfTheHill, 7, 7);
    }

    #[test]
    fn test_first_move_balance_round_robin() {
        assert_first_moves_balanced(PairingStrategy::RoundRobin, 8, 7);
        assert_first_moves_balanced(PairingStrategy::RoundRobin, 7, 7);
    }

    #[test]
    fn test_no_rematches_over_several_swiss_rounds() {
        let players = field(8);
        let mut snapshot = TournamentSnapshot::new(players.clone());

        for round in 1..=4 {
            let standings = standings(&snapshot, round);
            let tracker = ConstraintTracker::from_snapshot(&snapshot, round);
            let outcome = engine(PairingStrategy::Swiss)
                .generate(round, &standings, &tracker)
                .unwrap();

            for m in &outcome.matchups {
                assert!(
                    !tracker.has_faced(&m.player1, &m.player2),
                    "rematch in round {}",
                    round
                );
                let a = snapshot.competitor(&m.player1).unwrap().clone();
                let b = snapshot.competitor(&m.player2).unwrap().clone();
                // Higher-rated player wins every game.
                let (w, l) = if a.rating > b.rating { (a, b) } else { (b, a) };
                record(&mut snapshot, round, &w, &l, false);
            }
        }
    }
}
