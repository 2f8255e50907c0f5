//! Team-match records for the two-phase group format.
//!
//! A team match is the set of board games two teams play in one round. The
//! team with more board wins takes the match; an even split is a team draw
//! and gives neither side a win.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::models::{CompetitorId, Outcome, TournamentSnapshot, WinLossRecord};

/// A team's accumulated record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub team: String,

    /// Team-match wins/losses/draws
    pub matches: WinLossRecord,

    /// Sum of board spreads
    pub spread: i64,

    /// Individual board wins
    pub board_wins: u32,
}

impl TeamRecord {
    fn new(team: &str) -> Self {
        Self {
            team: team.to_string(),
            ..Default::default()
        }
    }
}

/// Rank order inside a group: match wins, spread, board wins, then name.
pub fn team_order(a: &TeamRecord, b: &TeamRecord) -> Ordering {
    b.matches
        .wins
        .cmp(&a.matches.wins)
        .then_with(|| b.spread.cmp(&a.spread))
        .then_with(|| b.board_wins.cmp(&a.board_wins))
        .then_with(|| a.team.cmp(&b.team))
}

#[derive(Default)]
struct TeamMatchTally {
    board_wins: [u32; 2],
    spread: [i64; 2],
}

/// Fold scored board games of rounds `1..=through_round` into team records.
///
/// Every team on the roster gets a record, played or not. Board games between
/// members of the same team, or involving unaffiliated competitors, are ignored.
pub fn team_records(snapshot: &TournamentSnapshot, through_round: u32) -> BTreeMap<String, TeamRecord> {
    let team_of: HashMap<&CompetitorId, &str> = snapshot
        .competitors
        .iter()
        .filter_map(|c| c.team.as_deref().map(|t| (&c.id, t)))
        .collect();

    let mut records: BTreeMap<String, TeamRecord> = team_of
        .values()
        .map(|t| (t.to_string(), TeamRecord::new(t)))
        .collect();

    let results = snapshot.results_by_matchup();
    let mut tallies: BTreeMap<(u32, &str, &str), TeamMatchTally> = BTreeMap::new();

    for matchup in snapshot.matchups.iter().filter(|m| m.round <= through_round) {
        let Some(result) = results.get(&matchup.id) else {
            continue;
        };
        let (Some(&team1), Some(&team2)) =
            (team_of.get(&matchup.player1), team_of.get(&matchup.player2))
        else {
            continue;
        };
        if team1 == team2 {
            continue;
        }

        // Key sides by name so both seatings of a team match land together.
        let (key, side1) = if team1 < team2 {
            ((matchup.round, team1, team2), 0)
        } else {
            ((matchup.round, team2, team1), 1)
        };
        let side2 = 1 - side1;

        let tally = tallies.entry(key).or_default();
        match result.player1_outcome() {
            Outcome::Win => tally.board_wins[side1] += 1,
            Outcome::Loss => tally.board_wins[side2] += 1,
            Outcome::Draw => {}
        }
        let diff = i64::from(result.score1) - i64::from(result.score2);
        tally.spread[side1] += diff;
        tally.spread[side2] -= diff;
    }

    for ((_, first, second), tally) in &tallies {
        let outcome = Outcome::from_scores(tally.board_wins[0] as i32, tally.board_wins[1] as i32);
        let mirrored = match outcome {
            Outcome::Win => Outcome::Loss,
            Outcome::Loss => Outcome::Win,
            Outcome::Draw => Outcome::Draw,
        };

        for (side, team, team_outcome) in [(0, *first, outcome), (1, *second, mirrored)] {
            let record = records
                .entry(team.to_string())
                .or_insert_with(|| TeamRecord::new(team));
            record.matches.add(team_outcome);
            record.spread += tally.spread[side];
            record.board_wins += tally.board_wins[side];
        }
    }

    records
}
