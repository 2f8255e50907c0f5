//! Group assignments for the two-phase large-group format.

use serde::{Deserialize, Serialize};

/// A team's group membership.
///
/// `position` stays empty through phase 1 and is filled once, at the phase
/// transition, with the team's rank inside its phase-1 group. The `group`
/// label is overwritten at the same moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupAssignment {
    pub team: String,
    pub group: String,
    #[serde(default)]
    pub position: Option<u32>,
}

impl GroupAssignment {
    pub fn new(team: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            team: team.into(),
            group: group.into(),
            position: None,
        }
    }
}

/// Label for the group at `index`: A, B, ..., Z, AA, AB, ...
pub fn group_label(index: usize) -> String {
    let mut label = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        label.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    label.reverse();
    String::from_utf8_lossy(&label).into_owned()
}
