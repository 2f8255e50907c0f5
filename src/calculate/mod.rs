//! Standings calculation.
//!
//! Folds result history into ranked records:
//! - Points (win = 1, draw = 0.5), cumulative spread, first-move counts
//! - Total rank order with deterministic tie-breaks
//! - Clinch detection against the remaining rounds
//! - Team-match records for the group format (see `team`)

mod team;

pub use team::*;

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use crate::models::{CompetitorId, RankedCompetitor, TournamentSnapshot, WinLossRecord};

/// Order two ranked competitors: points, spread, rating (all descending),
/// then ID ascending so that no two ranks ever collide.
pub fn standing_order(a: &RankedCompetitor, b: &RankedCompetitor) -> Ordering {
    b.half_points()
        .cmp(&a.half_points())
        .then_with(|| b.spread.cmp(&a.spread))
        .then_with(|| b.competitor.rating.cmp(&a.competitor.rating))
        .then_with(|| a.id().cmp(b.id()))
}

/// Compute standings as seen before `target_round` is played.
///
/// Only matchups of earlier rounds count. Unscored matchups still count
/// towards `prior_starts`. Paused and withdrawn competitors are left out.
pub fn compute_standings(
    snapshot: &TournamentSnapshot,
    target_round: u32,
    total_rounds: u32,
) -> Vec<RankedCompetitor> {
    let results = snapshot.results_by_matchup();

    let mut tallies: HashMap<&CompetitorId, (WinLossRecord, i64, u32)> = snapshot
        .active_competitors()
        .map(|c| (&c.id, (WinLossRecord::default(), 0, 0)))
        .collect();

    for matchup in snapshot.matchups_before(target_round) {
        if let Some(tally) = tallies.get_mut(&matchup.first_move) {
            tally.2 += 1;
        }

        let Some(result) = results.get(&matchup.id) else {
            continue;
        };

        if let Some(tally) = tallies.get_mut(&matchup.player1) {
            tally.0.add(result.player1_outcome());
            tally.1 += i64::from(result.score1) - i64::from(result.score2);
        }
        if let Some(tally) = tallies.get_mut(&matchup.player2) {
            tally.0.add(result.player2_outcome());
            tally.1 += i64::from(result.score2) - i64::from(result.score1);
        }
    }

    let mut standings: Vec<RankedCompetitor> = snapshot
        .active_competitors()
        .map(|c| {
            let (record, spread, prior_starts) =
                tallies.get(&c.id).copied().unwrap_or_default();
            RankedCompetitor {
                competitor: c.clone(),
                record,
                points: record.points(),
                spread,
                prior_starts,
                rank: 0,
                clinched: false,
            }
        })
        .collect();

    standings.sort_by(standing_order);
    for (i, ranked) in standings.iter_mut().enumerate() {
        ranked.rank = i as u32 + 1;
    }

    let remaining = remaining_rounds(target_round, total_rounds);
    mark_clinched(&mut standings, remaining);

    debug!(
        "Computed standings for {} competitors before round {} ({} rounds remaining)",
        standings.len(),
        target_round,
        remaining
    );

    standings
}

/// Rounds still to be played, counting `target_round` itself.
pub fn remaining_rounds(target_round: u32, total_rounds: u32) -> u32 {
    total_rounds.saturating_sub(target_round.saturating_sub(1))
}

/// Flag every rank that the competitor below can no longer reach.
///
/// At most one point is available per round, so a lead strictly greater than
/// the remaining rounds is safe. With nothing left to play every rank is final.
pub fn mark_clinched(standings: &mut [RankedCompetitor], remaining: u32) {
    if remaining == 0 {
        for ranked in standings.iter_mut() {
            ranked.clinched = true;
        }
        return;
    }

    let max_gain = remaining * 2;
    let n = standings.len();
    for i in 0..n {
        let clinched = match standings.get(i + 1) {
            Some(next) => standings[i].half_points().saturating_sub(next.half_points()) > max_gain,
            None => false,
        };
        standings[i].clinched = clinched;
    }
}
