//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constraints::PairingRules;
use crate::pairing::PairingStrategy;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Per-tournament pairing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentSettings {
    /// Tournament identifier, also the storage directory name
    pub id: String,

    #[serde(default = "default_strategy")]
    pub strategy: PairingStrategy,

    #[serde(default = "default_total_rounds")]
    pub total_rounds: u32,

    #[serde(default = "default_true")]
    pub avoid_rematches: bool,

    #[serde(default)]
    pub avoid_same_team: bool,

    /// Seed for shuffles. A fresh one is drawn (and logged) when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Reshuffles tried by the cross-group matcher before it backtracks
    #[serde(default = "default_max_shuffle_attempts")]
    pub max_shuffle_attempts: u32,
}

fn default_strategy() -> PairingStrategy {
    PairingStrategy::Swiss
}

fn default_total_rounds() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

fn default_max_shuffle_attempts() -> u32 {
    64
}

impl Default for TournamentSettings {
    fn default() -> Self {
        Self {
            id: "default".to_string(),
            strategy: default_strategy(),
            total_rounds: default_total_rounds(),
            avoid_rematches: true,
            avoid_same_team: false,
            seed: None,
            max_shuffle_attempts: default_max_shuffle_attempts(),
        }
    }
}

impl TournamentSettings {
    pub fn rules(&self) -> PairingRules {
        PairingRules {
            avoid_rematches: self.avoid_rematches,
            avoid_same_team: self.avoid_same_team,
        }
    }
}

/// Shape of the two-phase large-group format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentFormatConfig {
    pub total_entities: u32,
    pub total_rounds: u32,
    pub phase1_rounds: u32,
    pub phase2_rounds: u32,
    /// Number of groups in each phase
    pub groups: u32,
    pub entities_per_group: u32,
}

impl TournamentFormatConfig {
    pub fn new(groups: u32, entities_per_group: u32, phase1_rounds: u32, phase2_rounds: u32) -> Self {
        Self {
            total_entities: groups.saturating_mul(entities_per_group),
            total_rounds: phase1_rounds.saturating_add(phase2_rounds),
            phase1_rounds,
            phase2_rounds,
            groups,
            entities_per_group,
        }
    }

    /// Validate the format invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rounds = self.phase1_rounds.checked_add(self.phase2_rounds);
        if rounds != Some(self.total_rounds) {
            return Err(ConfigError::ValidationError(format!(
                "phase1_rounds ({}) + phase2_rounds ({}) must equal total_rounds ({})",
                self.phase1_rounds, self.phase2_rounds, self.total_rounds
            )));
        }

        if self.groups < 2 {
            return Err(ConfigError::ValidationError(
                "Group format needs at least 2 groups".to_string(),
            ));
        }

        if self.entities_per_group < 2 {
            return Err(ConfigError::ValidationError(
                "Group format needs at least 2 entities per group".to_string(),
            ));
        }

        if self.groups.checked_mul(self.entities_per_group) != Some(self.total_entities) {
            return Err(ConfigError::ValidationError(format!(
                "{} entities cannot be split into {} groups of {}",
                self.total_entities, self.groups, self.entities_per_group
            )));
        }

        if self.total_entities % 2 != 0 {
            return Err(ConfigError::ValidationError(format!(
                "Cross-group rounds need an even entity count, got {}",
                self.total_entities
            )));
        }

        // Phase 1 never repeats a cross-group opponent.
        let opponents = self.total_entities - self.entities_per_group;
        if self.phase1_rounds > opponents {
            return Err(ConfigError::ValidationError(format!(
                "phase1_rounds ({}) exceeds the {} cross-group opponents each entity has",
                self.phase1_rounds, opponents
            )));
        }

        Ok(())
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub tournament: TournamentSettings,

    #[serde(default)]
    pub group_format: Option<TournamentFormatConfig>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            tournament: TournamentSettings::default(),
            group_format: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tournament.id.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Tournament id must not be empty".to_string(),
            ));
        }

        if self.tournament.total_rounds == 0 {
            return Err(ConfigError::ValidationError(
                "Total rounds must be greater than 0".to_string(),
            ));
        }

        if self.tournament.max_shuffle_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "max_shuffle_attempts must be greater than 0".to_string(),
            ));
        }

        if let Some(format) = &self.group_format {
            format.validate()?;
        }

        Ok(())
    }
}
