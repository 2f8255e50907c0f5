//! Matchup model: one table of one round, plus bye bookkeeping.

use serde::{Deserialize, Serialize};

use super::{CompetitorId, EntityId, MatchupId};

/// A single pairing between two competitors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matchup {
    /// Unique identifier
    pub id: MatchupId,

    /// Round number (1-based)
    pub round: u32,

    /// Table number (1-based)
    pub table: u32,

    /// Seat 1, the higher-ranked side when the engine seats the table
    pub player1: CompetitorId,

    /// Seat 2
    pub player2: CompetitorId,

    /// Competitor who moves first
    pub first_move: CompetitorId,

    #[serde(default)]
    pub player1_clinched: bool,

    #[serde(default)]
    pub player2_clinched: bool,
}

impl Matchup {
    /// Create a new Matchup with auto-generated ID. Seat 1 moves first
    /// until `with_first_move` says otherwise.
    pub fn new(round: u32, table: u32, player1: CompetitorId, player2: CompetitorId) -> Self {
        let id = EntityId::generate(&[
            &round.to_string(),
            &table.to_string(),
            player1.as_str(),
            player2.as_str(),
        ]);

        Self {
            id,
            round,
            table,
            first_move: player1.clone(),
            player1,
            player2,
            player1_clinched: false,
            player2_clinched: false,
        }
    }

    /// Builder method to set the first mover.
    pub fn with_first_move(mut self, first_move: CompetitorId) -> Self {
        self.first_move = first_move;
        self
    }

    /// Builder method to set both clinch flags.
    pub fn with_clinched(mut self, player1: bool, player2: bool) -> Self {
        self.player1_clinched = player1;
        self.player2_clinched = player2;
        self
    }

    /// Whether the competitor sits at this table.
    pub fn involves(&self, id: &CompetitorId) -> bool {
        &self.player1 == id || &self.player2 == id
    }

    /// The other side of the table, if `id` plays here.
    pub fn opponent_of(&self, id: &CompetitorId) -> Option<&CompetitorId> {
        if &self.player1 == id {
            Some(&self.player2)
        } else if &self.player2 == id {
            Some(&self.player1)
        } else {
            None
        }
    }
}

/// A round in which a competitor had no opponent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByeRecord {
    pub round: u32,
    pub competitor: CompetitorId,
}
