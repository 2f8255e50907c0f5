//! Flat tabular projection of a round's pairings.
//!
//! One row per table with both sides' name, rating and rank plus the name of
//! the competitor who moves first. Rendering to CSV or print is left to the
//! reporting side; rows serialize as plain JSON objects.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ByeRecord, CompetitorId, Matchup, RankedCompetitor};

/// A single table of a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairingRow {
    pub round: u32,
    pub table: u32,
    pub player1_name: String,
    pub player1_rating: u32,
    /// Rank going into the round; `None` when the player is no longer ranked
    pub player1_rank: Option<u32>,
    pub player2_name: String,
    pub player2_rating: u32,
    pub player2_rank: Option<u32>,
    pub first_move_name: String,
}

/// A round's export, stamped with when it was produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundExport {
    pub round: u32,
    pub generated_at: DateTime<Utc>,
    pub rows: Vec<PairingRow>,
    pub bye: Option<String>,
}

/// Project `matchups` against the standings the round was paired from.
///
/// Competitors missing from `standings` (withdrawn since) keep their ID as
/// name, a zero rating and no rank.
pub fn export_round(
    round: u32,
    matchups: &[Matchup],
    bye: Option<&ByeRecord>,
    standings: &[RankedCompetitor],
    generated_at: DateTime<Utc>,
) -> RoundExport {
    let by_id: HashMap<&CompetitorId, &RankedCompetitor> =
        standings.iter().map(|r| (r.id(), r)).collect();

    let name = |id: &CompetitorId| {
        by_id
            .get(id)
            .map_or_else(|| id.to_string(), |r| r.competitor.name.clone())
    };
    let rating = |id: &CompetitorId| by_id.get(id).map_or(0, |r| r.competitor.rating);
    let rank = |id: &CompetitorId| by_id.get(id).map(|r| r.rank);

    let mut rows: Vec<PairingRow> = matchups
        .iter()
        .filter(|m| m.round == round)
        .map(|m| PairingRow {
            round,
            table: m.table,
            player1_name: name(&m.player1),
            player1_rating: rating(&m.player1),
            player1_rank: rank(&m.player1),
            player2_name: name(&m.player2),
            player2_rating: rating(&m.player2),
            player2_rank: rank(&m.player2),
            first_move_name: name(&m.first_move),
        })
        .collect();
    rows.sort_by_key(|row| row.table);

    RoundExport {
        round,
        generated_at,
        rows,
        bye: bye.filter(|b| b.round == round).map(|b| name(&b.competitor)),
    }
}
