use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a labeled subject (a player name on the host).
///
/// Subjects double as observers: every subject registered with a group is
/// also sent that group's team state.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SubjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&SubjectId> for SubjectId {
    fn from(s: &SubjectId) -> Self {
        s.clone()
    }
}

impl Borrow<str> for SubjectId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Rendered team name: a fixed name prefix followed by the team's integer id
/// (e.g. `NTP0`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamName(String);

impl TeamName {
    /// Render the name for team `id` under `prefix`.
    pub fn render(prefix: &str, id: u32) -> Self {
        Self(format!("{prefix}{id}"))
    }

    /// Wrap an already rendered name, e.g. one received from a host.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the integer id back out of a name rendered under `prefix`.
    ///
    /// Returns `None` for names that are not managed under that prefix, so
    /// foreign teams on the host are never mistaken for pool-managed ones.
    pub fn managed_id(&self, prefix: &str) -> Option<u32> {
        let digits = self.0.strip_prefix(prefix)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        // Reject "NTP01": rendering never produces leading zeros.
        if digits.len() > 1 && digits.starts_with('0') {
            return None;
        }
        digits.parse().ok()
    }
}

impl fmt::Display for TeamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
