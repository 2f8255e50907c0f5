//! Competitor model: a player (or a whole team entity) on the roster.

use serde::{Deserialize, Serialize};

use super::{CompetitorId, EntityId};

/// Participation status. Only active competitors are ranked or paired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipationStatus {
    #[default]
    Active,
    Paused,
    Withdrawn,
}

impl std::fmt::Display for ParticipationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParticipationStatus::Active => write!(f, "active"),
            ParticipationStatus::Paused => write!(f, "paused"),
            ParticipationStatus::Withdrawn => write!(f, "withdrawn"),
        }
    }
}

/// A roster entry. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    /// Unique identifier
    pub id: CompetitorId,

    /// Display name
    pub name: String,

    /// Strength rating, used as the final standings tie-break
    pub rating: u32,

    /// Team affiliation (team formats only)
    #[serde(default)]
    pub team: Option<String>,

    /// Board (roster position) within the team, 1 = top board
    #[serde(default)]
    pub board: Option<u32>,

    /// Participation status
    #[serde(default)]
    pub status: ParticipationStatus,
}

impl Competitor {
    /// Create an active competitor whose ID is derived from its name.
    pub fn new(name: impl Into<String>, rating: u32) -> Self {
        let name = name.into();
        let id = EntityId::generate(&["competitor", &name]);

        Self {
            id,
            name,
            rating,
            team: None,
            board: None,
            status: ParticipationStatus::Active,
        }
    }

    /// Builder method to set the team affiliation and board.
    pub fn with_team(mut self, team: impl Into<String>, board: u32) -> Self {
        self.team = Some(team.into());
        self.board = Some(board);
        self
    }

    /// Builder method to set the participation status.
    pub fn with_status(mut self, status: ParticipationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == ParticipationStatus::Active
    }
}
