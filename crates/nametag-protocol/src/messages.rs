use serde::{Deserialize, Serialize};

use crate::types::TeamName;

/// Scoreboard team action carried by a sync message.
///
/// Discriminants are the host's team-packet mode codes, so a transport can
/// map a [`SyncMessage`] onto the host packet without knowing its layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamAction {
    Create = 0,
    Remove = 1,
    Join = 3,
    Leave = 4,
}

impl TeamAction {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for TeamAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamAction::Create => write!(f, "create"),
            TeamAction::Remove => write!(f, "remove"),
            TeamAction::Join => write!(f, "join"),
            TeamAction::Leave => write!(f, "leave"),
        }
    }
}

/// Team state-sync message addressed to a single observer.
///
/// Each variant maps to a JSON object with `"type"` as the tag field.
/// Member lists carry display names, not subject ids.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SyncMessage {
    /// Declare a team. Members are always empty on creation; membership
    /// follows in `AddMembers`.
    #[serde(rename = "define_team")]
    DefineTeam {
        team: TeamName,
        prefix: String,
        suffix: String,
        #[serde(default)]
        members: Vec<String>,
    },

    #[serde(rename = "remove_team")]
    RemoveTeam { team: TeamName },

    #[serde(rename = "add_members")]
    AddMembers { team: TeamName, members: Vec<String> },

    #[serde(rename = "remove_members")]
    RemoveMembers { team: TeamName, members: Vec<String> },
}

impl SyncMessage {
    /// Name of the team this message addresses.
    pub fn team(&self) -> &TeamName {
        match self {
            SyncMessage::DefineTeam { team, .. }
            | SyncMessage::RemoveTeam { team }
            | SyncMessage::AddMembers { team, .. }
            | SyncMessage::RemoveMembers { team, .. } => team,
        }
    }

    pub fn action(&self) -> TeamAction {
        match self {
            SyncMessage::DefineTeam { .. } => TeamAction::Create,
            SyncMessage::RemoveTeam { .. } => TeamAction::Remove,
            SyncMessage::AddMembers { .. } => TeamAction::Join,
            SyncMessage::RemoveMembers { .. } => TeamAction::Leave,
        }
    }
}
