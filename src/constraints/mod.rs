//! Pairing constraints and first-move balancing.
//!
//! `ConstraintTracker` is an immutable snapshot of who has already faced whom,
//! who plays for which team, and how often each competitor moved first. It is
//! rebuilt from history for every request, so no strategy can observe state
//! left behind by another.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::models::{CompetitorId, TournamentSnapshot};

/// Which constraints a strategy must respect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingRules {
    pub avoid_rematches: bool,
    pub avoid_same_team: bool,
}

impl Default for PairingRules {
    fn default() -> Self {
        Self {
            avoid_rematches: true,
            avoid_same_team: false,
        }
    }
}

/// Constraint state derived from all matchups before a target round.
#[derive(Debug, Clone, Default)]
pub struct ConstraintTracker {
    faced: BTreeMap<CompetitorId, BTreeSet<CompetitorId>>,
    team_of: BTreeMap<CompetitorId, String>,
    rosters: BTreeMap<String, Vec<CompetitorId>>,
    first_moves: BTreeMap<CompetitorId, u32>,
    had_bye: BTreeSet<CompetitorId>,
}

impl ConstraintTracker {
    /// Build the tracker from every matchup and bye of rounds before `round`.
    ///
    /// Assigned-but-unplayed matchups count as faced.
    pub fn from_snapshot(snapshot: &TournamentSnapshot, round: u32) -> Self {
        let mut tracker = Self::default();

        for matchup in snapshot.matchups_before(round) {
            tracker
                .faced
                .entry(matchup.player1.clone())
                .or_default()
                .insert(matchup.player2.clone());
            tracker
                .faced
                .entry(matchup.player2.clone())
                .or_default()
                .insert(matchup.player1.clone());
            *tracker
                .first_moves
                .entry(matchup.first_move.clone())
                .or_default() += 1;
        }

        tracker.had_bye = snapshot
            .byes
            .iter()
            .filter(|b| b.round < round)
            .map(|b| b.competitor.clone())
            .collect();

        // Rosters keep board order; competitors without a board go last in roster order.
        let mut members: Vec<_> = snapshot
            .competitors
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.team.as_ref().map(|t| (t, c.board.unwrap_or(u32::MAX), i, c)))
            .collect();
        members.sort_by(|a, b| a.0.cmp(b.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

        for (team, _, _, competitor) in members {
            tracker
                .team_of
                .insert(competitor.id.clone(), team.clone());
            if competitor.is_active() {
                tracker
                    .rosters
                    .entry(team.clone())
                    .or_default()
                    .push(competitor.id.clone());
            }
        }

        tracker
    }

    pub fn has_faced(&self, a: &CompetitorId, b: &CompetitorId) -> bool {
        self.faced.get(a).is_some_and(|set| set.contains(b))
    }

    pub fn opponents_of(&self, id: &CompetitorId) -> impl Iterator<Item = &CompetitorId> {
        self.faced.get(id).into_iter().flatten()
    }

    pub fn same_team(&self, a: &CompetitorId, b: &CompetitorId) -> bool {
        match (self.team_of.get(a), self.team_of.get(b)) {
            (Some(ta), Some(tb)) => ta == tb,
            _ => false,
        }
    }

    pub fn team_of(&self, id: &CompetitorId) -> Option<&str> {
        self.team_of.get(id).map(String::as_str)
    }

    /// Active members of `team`, in board order.
    pub fn roster(&self, team: &str) -> &[CompetitorId] {
        self.rosters.get(team).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Teams that `team` has already met on any board.
    pub fn faced_teams(&self, team: &str) -> BTreeSet<&str> {
        self.team_of
            .iter()
            .filter(|(_, t)| t.as_str() == team)
            .flat_map(|(id, _)| self.opponents_of(id))
            .filter_map(|opp| self.team_of(opp))
            .filter(|t| *t != team)
            .collect()
    }

    pub fn first_moves(&self, id: &CompetitorId) -> u32 {
        self.first_moves.get(id).copied().unwrap_or(0)
    }

    pub fn had_bye(&self, id: &CompetitorId) -> bool {
        self.had_bye.contains(id)
    }

    /// Whether `a` may be paired with `b` under `rules`.
    pub fn allows(&self, a: &CompetitorId, b: &CompetitorId, rules: PairingRules) -> bool {
        if a == b {
            return false;
        }
        if rules.avoid_rematches && self.has_faced(a, b) {
            return false;
        }
        if rules.avoid_same_team && self.same_team(a, b) {
            return false;
        }
        true
    }
}

/// One side of a table as seen by the first-move rule.
#[derive(Debug, Clone, Copy)]
pub struct Seat<'a> {
    pub id: &'a CompetitorId,
    pub prior_starts: u32,
    /// Standing position, lower is better
    pub rank: u32,
}

/// Decide who moves first at `table`.
///
/// The side with fewer prior starts moves first. On a tie, odd tables give the
/// move to the lower-ranked side and even tables to the higher-ranked side, so
/// ties alternate down the room. The engine seats the lower-ranked side in
/// seat 2, so an odd-table tie goes to seat 2.
pub fn first_mover<'a>(table: u32, a: Seat<'a>, b: Seat<'a>) -> &'a CompetitorId {
    if a.prior_starts != b.prior_starts {
        return if a.prior_starts < b.prior_starts { a.id } else { b.id };
    }

    let (higher, lower) = if a.rank <= b.rank { (a, b) } else { (b, a) };
    if table % 2 == 1 {
        lower.id
    } else {
        higher.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ByeRecord, Competitor, EntityId, Matchup, ParticipationStatus};

    fn id(s: &str) -> CompetitorId {
        EntityId::from(s)
    }

    #[test]
    fn test_faced_is_symmetric_and_round_bounded() {
        let mut snapshot = TournamentSnapshot::default();
        snapshot.matchups.push(Matchup::new(1, 1, id("a"), id("b")));
        snapshot.matchups.push(Matchup::new(2, 1, id("a"), id("c")));

        let tracker = ConstraintTracker::from_snapshot(&snapshot, 2);
        assert!(tracker.has_faced(&id("a"), &id("b")));
        assert!(tracker.has_faced(&id("b"), &id("a")));
        assert!(!tracker.has_faced(&id("a"), &id("c")));

        let later = ConstraintTracker::from_snapshot(&snapshot, 3);
        assert!(later.has_faced(&id("c"), &id("a")));
        assert_eq!(later.opponents_of(&id("a")).count(), 2);
    }

    #[test]
    fn test_allows_respects_rules() {
        let a = Competitor::new("a", 1500).with_team("Rooks", 1);
        let b = Competitor::new("b", 1500).with_team("Rooks", 2);
        let c = Competitor::new("c", 1500).with_team("Pawns", 1);
        let mut snapshot = TournamentSnapshot::new(vec![a.clone(), b.clone(), c.clone()]);
        snapshot.matchups.push(Matchup::new(1, 1, a.id.clone(), c.id.clone()));
        let tracker = ConstraintTracker::from_snapshot(&snapshot, 2);

        let strict = PairingRules {
            avoid_rematches: true,
            avoid_same_team: true,
        };
        assert!(!tracker.allows(&a.id, &b.id, strict));
        assert!(!tracker.allows(&a.id, &c.id, strict));
        assert!(!tracker.allows(&a.id, &a.id, strict));

        let loose = PairingRules {
            avoid_rematches: false,
            avoid_same_team: false,
        };
        assert!(tracker.allows(&a.id, &b.id, loose));
        assert!(tracker.allows(&a.id, &c.id, loose));
    }

    #[test]
    fn test_rosters_follow_board_order_and_skip_inactive() {
        let snapshot = TournamentSnapshot::new(vec![
            Competitor::new("third", 1500).with_team("Rooks", 3),
            Competitor::new("first", 1500).with_team("Rooks", 1),
            Competitor::new("benched", 1500)
                .with_team("Rooks", 2)
                .with_status(ParticipationStatus::Paused),
            Competitor::new("solo", 1500),
        ]);
        let tracker = ConstraintTracker::from_snapshot(&snapshot, 1);

        let roster = tracker.roster("Rooks");
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0], Competitor::new("first", 0).id);
        assert_eq!(roster[1], Competitor::new("third", 0).id);
        assert!(tracker.roster("Nobody").is_empty());
        assert_eq!(tracker.team_of(&Competitor::new("solo", 0).id), None);
    }

    #[test]
    fn test_faced_teams() {
        let a = Competitor::new("a", 1500).with_team("Rooks", 1);
        let b = Competitor::new("b", 1500).with_team("Pawns", 1);
        let c = Competitor::new("c", 1500).with_team("Kings", 1);
        let mut snapshot = TournamentSnapshot::new(vec![a.clone(), b.clone(), c.clone()]);
        snapshot.matchups.push(Matchup::new(1, 1, a.id.clone(), b.id.clone()));
        let tracker = ConstraintTracker::from_snapshot(&snapshot, 2);

        assert_eq!(tracker.faced_teams("Rooks"), BTreeSet::from(["Pawns"]));
        assert!(tracker.faced_teams("Kings").is_empty());
    }

    #[test]
    fn test_first_moves_and_byes() {
        let mut snapshot = TournamentSnapshot::default();
        snapshot
            .matchups
            .push(Matchup::new(1, 1, id("a"), id("b")).with_first_move(id("b")));
        snapshot.byes.push(ByeRecord {
            round: 1,
            competitor: id("c"),
        });

        let tracker = ConstraintTracker::from_snapshot(&snapshot, 2);
        assert_eq!(tracker.first_moves(&id("b")), 1);
        assert_eq!(tracker.first_moves(&id("a")), 0);
        assert!(tracker.had_bye(&id("c")));
        assert!(!ConstraintTracker::from_snapshot(&snapshot, 1).had_bye(&id("c")));
    }

    #[test]
    fn test_first_mover_prefers_fewer_starts() {
        let (a, b) = (id("a"), id("b"));
        let seat_a = Seat { id: &a, prior_starts: 2, rank: 1 };
        let seat_b = Seat { id: &b, prior_starts: 1, rank: 2 };
        assert_eq!(first_mover(1, seat_a, seat_b), &b);
        assert_eq!(first_mover(2, seat_a, seat_b), &b);
    }

    #[test]
    fn test_first_mover_tie_alternates_by_table() {
        let (a, b) = (id("a"), id("b"));
        let higher = Seat { id: &a, prior_starts: 1, rank: 3 };
        let lower = Seat { id: &b, prior_starts: 1, rank: 4 };
        assert_eq!(first_mover(1, higher, lower), &b);
        assert_eq!(first_mover(2, higher, lower), &a);
        assert_eq!(first_mover(2, lower, higher), &a);
    }
}
