//! Result records attached to matchups.

use serde::{Deserialize, Serialize};

use super::MatchupId;

/// Outcome of a game from one side's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    /// Derive the outcome from own and opponent score.
    pub fn from_scores(own: i32, opponent: i32) -> Self {
        match own.cmp(&opponent) {
            std::cmp::Ordering::Greater => Outcome::Win,
            std::cmp::Ordering::Less => Outcome::Loss,
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }
}

/// The scores of a played matchup. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Matchup this result belongs to
    pub matchup_id: MatchupId,

    /// Score of seat 1
    pub score1: i32,

    /// Score of seat 2
    pub score2: i32,
}

impl ResultRecord {
    pub fn new(matchup_id: MatchupId, score1: i32, score2: i32) -> Self {
        Self {
            matchup_id,
            score1,
            score2,
        }
    }

    /// Outcome for seat 1.
    pub fn player1_outcome(&self) -> Outcome {
        Outcome::from_scores(self.score1, self.score2)
    }

    /// Outcome for seat 2.
    pub fn player2_outcome(&self) -> Outcome {
        Outcome::from_scores(self.score2, self.score1)
    }
}
