//! Tournament snapshot: everything the engine reads for one request.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::{ByeRecord, Competitor, CompetitorId, Matchup, MatchupId, ResultRecord};

/// Roster plus pairing/result history, as loaded by the persistence
/// collaborator. Passed by reference; the engine never mutates it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TournamentSnapshot {
    pub competitors: Vec<Competitor>,
    #[serde(default)]
    pub matchups: Vec<Matchup>,
    #[serde(default)]
    pub results: Vec<ResultRecord>,
    #[serde(default)]
    pub byes: Vec<ByeRecord>,
    #[serde(default)]
    pub locked_rounds: BTreeSet<u32>,
}

impl TournamentSnapshot {
    pub fn new(competitors: Vec<Competitor>) -> Self {
        Self {
            competitors,
            ..Default::default()
        }
    }

    /// Competitors eligible for ranking and pairing.
    pub fn active_competitors(&self) -> impl Iterator<Item = &Competitor> {
        self.competitors.iter().filter(|c| c.is_active())
    }

    pub fn competitor(&self, id: &CompetitorId) -> Option<&Competitor> {
        self.competitors.iter().find(|c| &c.id == id)
    }

    /// Matchups of rounds strictly before `round`.
    pub fn matchups_before(&self, round: u32) -> impl Iterator<Item = &Matchup> {
        self.matchups.iter().filter(move |m| m.round < round)
    }

    pub fn matchups_in(&self, round: u32) -> impl Iterator<Item = &Matchup> {
        self.matchups.iter().filter(move |m| m.round == round)
    }

    /// Results keyed by matchup ID.
    pub fn results_by_matchup(&self) -> HashMap<&MatchupId, &ResultRecord> {
        self.results.iter().map(|r| (&r.matchup_id, r)).collect()
    }

    /// Highest round that has pairings, if any.
    pub fn latest_paired_round(&self) -> Option<u32> {
        self.matchups
            .iter()
            .map(|m| m.round)
            .chain(self.byes.iter().map(|b| b.round))
            .max()
    }

    /// Append a round's output to the history.
    pub fn record_round(&mut self, matchups: &[Matchup], bye: Option<&ByeRecord>) {
        self.matchups.extend_from_slice(matchups);
        if let Some(bye) = bye {
            self.byes.push(bye.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityId, ParticipationStatus};

    #[test]
    fn test_active_competitors_filters_status() {
        let snapshot = TournamentSnapshot::new(vec![
            Competitor::new("A", 1500),
            Competitor::new("B", 1500).with_status(ParticipationStatus::Paused),
            Competitor::new("C", 1500).with_status(ParticipationStatus::Withdrawn),
        ]);
        let names: Vec<_> = snapshot.active_competitors().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A"]);
    }

    #[test]
    fn test_latest_paired_round_counts_byes() {
        let mut snapshot = TournamentSnapshot::default();
        assert_eq!(snapshot.latest_paired_round(), None);

        let m = Matchup::new(1, 1, EntityId::from("a"), EntityId::from("b"));
        let bye = ByeRecord {
            round: 2,
            competitor: EntityId::from("c"),
        };
        snapshot.record_round(&[m], Some(&bye));
        assert_eq!(snapshot.latest_paired_round(), Some(2));
        assert_eq!(snapshot.matchups_before(2).count(), 1);
        assert_eq!(snapshot.matchups_in(2).count(), 0);
    }
}
