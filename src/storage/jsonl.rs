//! JSONL (JSON Lines) files.
//!
//! One JSON object per line, one file per record kind and tournament.
//! Unparseable lines are logged and skipped so a hand-edited file with a
//! typo does not hide the rest of the history.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::{StorageConfig, StorageError};

/// Record kinds stored per tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Competitor,
    Matchup,
    Result,
    Bye,
    GroupAssignment,
}

impl EntityType {
    /// Get the filename for this entity type.
    pub fn filename(&self) -> &'static str {
        match self {
            EntityType::Competitor => "competitors.jsonl",
            EntityType::Matchup => "matchups.jsonl",
            EntityType::Result => "results.jsonl",
            EntityType::Bye => "byes.jsonl",
            EntityType::GroupAssignment => "group_assignments.jsonl",
        }
    }
}

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Writer for one record kind of a tournament.
    pub fn for_entity(config: &StorageConfig, entity: EntityType, tournament_id: &str) -> Self {
        Self::new(entity_path(config, entity, tournament_id))
    }

    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Append records to the end of the file.
    pub fn append_batch(&self, entities: &[T]) -> Result<usize, StorageError> {
        if entities.is_empty() {
            return Ok(0);
        }
        self.ensure_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let count = write_lines(BufWriter::new(file), entities)?;

        debug!("Appended {} records to {:?}", count, self.path);
        Ok(count)
    }

    /// Replace the whole file.
    pub fn write_all(&self, entities: &[T]) -> Result<usize, StorageError> {
        self.ensure_dir()?;

        let file = File::create(&self.path)?;
        let count = write_lines(BufWriter::new(file), entities)?;

        info!("Wrote {} records to {:?}", count, self.path);
        Ok(count)
    }
}

fn write_lines<W: Write, T: Serialize>(mut writer: W, entities: &[T]) -> Result<usize, StorageError> {
    for entity in entities {
        let json = serde_json::to_string(entity)?;
        writeln!(writer, "{}", json)?;
    }
    writer.flush()?;
    Ok(entities.len())
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Reader for one record kind of a tournament.
    pub fn for_entity(config: &StorageConfig, entity: EntityType, tournament_id: &str) -> Self {
        Self::new(entity_path(config, entity, tournament_id))
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read every record. A missing file reads as empty.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let mut entities = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(entity) => entities.push(entity),
                Err(e) => {
                    warn!("Skipping line {} in {:?}: {}", index + 1, self.path, e);
                }
            }
        }

        debug!("Read {} records from {:?}", entities.len(), self.path);
        Ok(entities)
    }
}

/// Tournament directories that exist under the data dir.
pub fn list_tournaments(config: &StorageConfig) -> Result<Vec<String>, StorageError> {
    let dir = config.tournaments_dir();
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut ids = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                ids.push(name.to_string());
            }
        }
    }

    ids.sort();
    Ok(ids)
}

/// Path of one record kind's file for a tournament.
pub fn entity_path(config: &StorageConfig, entity: EntityType, tournament_id: &str) -> PathBuf {
    config.tournament_dir(tournament_id).join(entity.filename())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Competitor, EntityId, ResultRecord};
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> StorageConfig {
        StorageConfig::new(temp_dir.path().to_path_buf())
    }

    #[test]
    fn test_write_all_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        let roster = vec![Competitor::new("Ada", 1800), Competitor::new("Ben", 1650).with_team("Rooks", 1)];

        let writer = JsonlWriter::for_entity(&config, EntityType::Competitor, "open");
        assert_eq!(writer.write_all(&roster).unwrap(), 2);

        let reader: JsonlReader<Competitor> = JsonlReader::for_entity(&config, EntityType::Competitor, "open");
        assert_eq!(reader.read_all().unwrap(), roster);
    }

    #[test]
    fn test_append_batch_keeps_existing_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("results.jsonl");
        let writer = JsonlWriter::new(path.clone());

        writer
            .append_batch(&[ResultRecord::new(EntityId::from("m1"), 3, 1)])
            .unwrap();
        writer
            .append_batch(&[ResultRecord::new(EntityId::from("m2"), 2, 2)])
            .unwrap();
        assert_eq!(writer.append_batch(&[]).unwrap(), 0);

        let read: Vec<ResultRecord> = JsonlReader::new(path).read_all().unwrap();
        assert_eq!(read.len(), 2);
        assert_eq!(read[1].matchup_id, EntityId::from("m2"));
    }

    #[test]
    fn test_write_all_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("roster.jsonl");
        let writer = JsonlWriter::new(path.clone());

        writer.write_all(&[Competitor::new("Old", 1000)]).unwrap();
        writer
            .write_all(&[Competitor::new("New1", 1100), Competitor::new("New2", 1200)])
            .unwrap();

        let read: Vec<Competitor> = JsonlReader::new(path).read_all().unwrap();
        assert_eq!(read.len(), 2);
        assert_eq!(read[0].name, "New1");
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let reader: JsonlReader<Competitor> = JsonlReader::new(temp_dir.path().join("none.jsonl"));
        assert!(!reader.exists());
        assert!(reader.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_read_all_skips_bad_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad_lines.jsonl");

        std::fs::write(
            &path,
            r#"{"matchup_id":"m1","score1":3,"score2":1}
not-valid-json

{"matchup_id":"m2","score1":0,"score2":2}
"#,
        )
        .unwrap();

        let read: Vec<ResultRecord> = JsonlReader::new(path).read_all().unwrap();
        assert_eq!(read.len(), 2);
        assert_eq!(read[0].score1, 3);
        assert_eq!(read[1].score2, 2);
    }

    #[test]
    fn test_list_tournaments() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        assert!(list_tournaments(&config).unwrap().is_empty());

        fs::create_dir_all(config.tournament_dir("winter")).unwrap();
        fs::create_dir_all(config.tournament_dir("autumn")).unwrap();

        assert_eq!(list_tournaments(&config).unwrap(), vec!["autumn", "winter"]);
    }

    #[test]
    fn test_entity_paths() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let path = entity_path(&config, EntityType::GroupAssignment, "open");
        assert!(path.ends_with("tournaments/open/group_assignments.jsonl"));
        assert_eq!(EntityType::Bye.filename(), "byes.jsonl");
        assert_eq!(EntityType::Matchup.filename(), "matchups.jsonl");
    }
}
