//! Domain types for team state.

use std::sync::atomic::{AtomicU64, Ordering};

use nametag_protocol::{SubjectId, TeamName};
use serde::Serialize;

/// Pool-managed team identifier, the integer rendered into the team name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TeamId(pub u32);

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A live team: a `(prefix, suffix)` pair under a pool-managed name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Team {
    pub id: TeamId,
    pub name: TeamName,
    pub prefix: String,
    pub suffix: String,
}

impl Team {
    pub fn new(id: TeamId, name_prefix: &str, prefix: &str, suffix: &str) -> Self {
        Self {
            id,
            name: TeamName::render(name_prefix, id.0),
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        }
    }

    /// Whether this team carries exactly the given attributes.
    pub fn matches(&self, prefix: &str, suffix: &str) -> bool {
        self.prefix == prefix && self.suffix == suffix
    }
}

/// Point-in-time view of a team and its members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamSnapshot {
    #[serde(flatten)]
    pub team: Team,
    pub members: Vec<SubjectId>,
}

static NEXT_GROUP_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque handle identifying a label group within this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct GroupId(u64);

impl GroupId {
    pub(crate) fn next() -> Self {
        Self(NEXT_GROUP_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "group-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_renders_name_from_id() {
        let team = Team::new(TeamId(3), "NTP", "[VIP] ", "");
        assert_eq!(team.name.as_str(), "NTP3");
        assert!(team.matches("[VIP] ", ""));
        assert!(!team.matches("[VIP] ", " *"));
        assert!(!team.matches("[VIP]", ""));
    }

    #[test]
    fn test_group_ids_are_unique() {
        let a = GroupId::next();
        let b = GroupId::next();
        assert_ne!(a, b);
        assert!(a.to_string().starts_with("group-"));
    }

    #[test]
    fn test_snapshot_serializes_flat() {
        let snapshot = TeamSnapshot {
            team: Team::new(TeamId(0), "NTP", "a", "b"),
            members: vec![SubjectId::new("alice")],
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["name"], "NTP0");
        assert_eq!(json["id"], 0);
        assert_eq!(json["prefix"], "a");
        assert_eq!(json["members"][0], "alice");
    }
}
