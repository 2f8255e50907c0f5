//! One tournament's files, read into and written from engine types.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use tracing::info;

use super::{EntityType, JsonlReader, JsonlWriter, StorageConfig, StorageError};
use crate::models::{ByeRecord, Competitor, GroupAssignment, Matchup, ResultRecord, TournamentSnapshot};

const LOCKED_ROUNDS_FILE: &str = "locked_rounds.json";

/// File-backed persistence for a single tournament.
#[derive(Debug, Clone)]
pub struct TournamentStore {
    config: StorageConfig,
    tournament_id: String,
}

impl TournamentStore {
    pub fn new(config: StorageConfig, tournament_id: &str) -> Result<Self, StorageError> {
        let id = tournament_id.trim();
        if id.is_empty() || id.contains(&['/', '\\'][..]) || id == "." || id == ".." {
            return Err(StorageError::InvalidPath(format!(
                "tournament id {:?} cannot be used as a directory name",
                tournament_id
            )));
        }
        Ok(Self {
            config,
            tournament_id: id.to_string(),
        })
    }

    pub fn tournament_id(&self) -> &str {
        &self.tournament_id
    }

    pub fn dir(&self) -> PathBuf {
        self.config.tournament_dir(&self.tournament_id)
    }

    fn reader<T: serde::de::DeserializeOwned>(&self, entity: EntityType) -> JsonlReader<T> {
        JsonlReader::for_entity(&self.config, entity, &self.tournament_id)
    }

    fn writer<T: serde::Serialize>(&self, entity: EntityType) -> JsonlWriter<T> {
        JsonlWriter::for_entity(&self.config, entity, &self.tournament_id)
    }

    /// Load roster, history and lock state.
    pub fn load_snapshot(&self) -> Result<TournamentSnapshot, StorageError> {
        let competitors: Vec<Competitor> = self.reader(EntityType::Competitor).read_all()?;
        if competitors.is_empty() && !self.dir().exists() {
            return Err(StorageError::PathNotFound(self.dir()));
        }

        let snapshot = TournamentSnapshot {
            competitors,
            matchups: self.reader(EntityType::Matchup).read_all()?,
            results: self.reader(EntityType::Result).read_all()?,
            byes: self.reader(EntityType::Bye).read_all()?,
            locked_rounds: self.locked_rounds()?,
        };

        info!(
            "Loaded {}: {} competitors, {} matchups, {} results",
            self.tournament_id,
            snapshot.competitors.len(),
            snapshot.matchups.len(),
            snapshot.results.len()
        );
        Ok(snapshot)
    }

    pub fn save_competitors(&self, competitors: &[Competitor]) -> Result<usize, StorageError> {
        self.writer(EntityType::Competitor).write_all(competitors)
    }

    pub fn append_results(&self, results: &[ResultRecord]) -> Result<usize, StorageError> {
        self.writer(EntityType::Result).append_batch(results)
    }

    /// Replace whatever is stored for `round` with the given pairings.
    pub fn save_round(&self, round: u32, matchups: &[Matchup], bye: Option<&ByeRecord>) -> Result<(), StorageError> {
        let mut stored: Vec<Matchup> = self.reader(EntityType::Matchup).read_all()?;
        stored.retain(|m| m.round != round);
        stored.extend(matchups.iter().cloned());
        stored.sort_by_key(|m| (m.round, m.table));
        self.writer(EntityType::Matchup).write_all(&stored)?;

        let mut byes: Vec<ByeRecord> = self.reader(EntityType::Bye).read_all()?;
        byes.retain(|b| b.round != round);
        byes.extend(bye.cloned());
        byes.sort_by_key(|b| b.round);
        self.writer(EntityType::Bye).write_all(&byes)?;

        info!(
            "Saved round {} of {}: {} matchups",
            round,
            self.tournament_id,
            matchups.len()
        );
        Ok(())
    }

    pub fn locked_rounds(&self) -> Result<BTreeSet<u32>, StorageError> {
        let path = self.dir().join(LOCKED_ROUNDS_FILE);
        if !path.exists() {
            return Ok(BTreeSet::new());
        }
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    fn write_locked_rounds(&self, rounds: &BTreeSet<u32>) -> Result<(), StorageError> {
        fs::create_dir_all(self.dir())?;
        let json = serde_json::to_string_pretty(rounds)?;
        fs::write(self.dir().join(LOCKED_ROUNDS_FILE), json)?;
        Ok(())
    }

    pub fn lock_round(&self, round: u32) -> Result<(), StorageError> {
        let mut rounds = self.locked_rounds()?;
        rounds.insert(round);
        self.write_locked_rounds(&rounds)?;
        info!("Locked round {} of {}", round, self.tournament_id);
        Ok(())
    }

    pub fn unlock_round(&self, round: u32) -> Result<(), StorageError> {
        let mut rounds = self.locked_rounds()?;
        rounds.remove(&round);
        self.write_locked_rounds(&rounds)?;
        info!("Unlocked round {} of {}", round, self.tournament_id);
        Ok(())
    }

    pub fn group_assignments(&self) -> Result<Vec<GroupAssignment>, StorageError> {
        self.reader(EntityType::GroupAssignment).read_all()
    }

    pub fn save_group_assignments(&self, assignments: &[GroupAssignment]) -> Result<usize, StorageError> {
        self.writer(EntityType::GroupAssignment).write_all(assignments)
    }
}
