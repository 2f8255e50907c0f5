//! Derived standings models. Recomputed on every request, never persisted.

use serde::{Deserialize, Serialize};

use super::{Competitor, CompetitorId, Outcome};

/// Win/loss/draw record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct WinLossRecord {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl WinLossRecord {
    /// Create a new record.
    pub fn new(wins: u32, losses: u32, draws: u32) -> Self {
        Self {
            wins,
            losses,
            draws,
        }
    }

    /// Record one game.
    pub fn add(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Draw => self.draws += 1,
        }
    }

    /// Total games played.
    pub fn total_games(&self) -> u32 {
        self.wins + self.losses + self.draws
    }

    /// Points in halves (win = 2, draw = 1), exact for ordering.
    pub fn half_points(&self) -> u32 {
        self.wins * 2 + self.draws
    }

    /// Points (win = 1, draw = 0.5, loss = 0).
    pub fn points(&self) -> f64 {
        self.half_points() as f64 / 2.0
    }
}

/// A competitor with its accumulated record and rank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedCompetitor {
    #[serde(flatten)]
    pub competitor: Competitor,

    #[serde(flatten)]
    pub record: WinLossRecord,

    /// Points (win = 1, draw = 0.5)
    pub points: f64,

    /// Sum of own score minus opponent score over all scored games
    pub spread: i64,

    /// Times this competitor was given the first move in earlier rounds
    pub prior_starts: u32,

    /// 1-based rank after sorting
    pub rank: u32,

    /// Rank can no longer be caught by the competitor below
    pub clinched: bool,
}

impl RankedCompetitor {
    pub fn id(&self) -> &CompetitorId {
        &self.competitor.id
    }

    pub fn half_points(&self) -> u32 {
        self.record.half_points()
    }
}
