//! Replay script format.
//!
//! ```toml
//! [group]
//! observers = ["alice"]
//!
//! [[step]]
//! op = "connect"
//! subject = "alice"
//! name = "Alice"
//!
//! [[step]]
//! op = "set_prefix"
//! subject = "alice"
//! prefix = "[VIP] "
//! ```

use std::path::{Path, PathBuf};

use nametag_core::{LabelRequest, SubjectId};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("cannot read script '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid script '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ScriptError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ScriptError::Read { .. } => "SCRIPT_READ_ERROR",
            ScriptError::Parse { .. } => "SCRIPT_PARSE_ERROR",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    #[serde(default)]
    pub group: GroupSection,

    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

/// `[group]`: observers registered when the group is created.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupSection {
    #[serde(default)]
    pub observers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Add {
        subjects: Vec<String>,
    },
    Remove {
        subject: String,
    },
    Delete,
    /// Connect `subject`, shown as `name` (defaults to the subject id).
    Connect {
        subject: String,
        name: Option<String>,
    },
    Disconnect {
        subject: String,
    },
    SetPrefix {
        subject: String,
        prefix: String,
    },
    SetSuffix {
        subject: String,
        suffix: String,
    },
    SetHard {
        subject: String,
        #[serde(default)]
        prefix: String,
        #[serde(default)]
        suffix: String,
    },
    SetSoft {
        subject: String,
        #[serde(default)]
        prefix: String,
        #[serde(default)]
        suffix: String,
    },
    Reset {
        subject: String,
    },
    /// Cancel the next label change for `subject`.
    CancelNext {
        subject: String,
    },
}

impl Step {
    /// The `op` tag this step was written with.
    pub fn op(&self) -> &'static str {
        match self {
            Step::Add { .. } => "add",
            Step::Remove { .. } => "remove",
            Step::Delete => "delete",
            Step::Connect { .. } => "connect",
            Step::Disconnect { .. } => "disconnect",
            Step::SetPrefix { .. } => "set_prefix",
            Step::SetSuffix { .. } => "set_suffix",
            Step::SetHard { .. } => "set_hard",
            Step::SetSoft { .. } => "set_soft",
            Step::Reset { .. } => "reset",
            Step::CancelNext { .. } => "cancel_next",
        }
    }

    /// The label request this step submits, if it is a label step.
    pub fn to_request(&self) -> Option<LabelRequest> {
        let request = match self {
            Step::SetPrefix { subject, prefix } => LabelRequest::SetPrefix {
                subject: SubjectId::from(subject.as_str()),
                prefix: prefix.clone(),
            },
            Step::SetSuffix { subject, suffix } => LabelRequest::SetSuffix {
                subject: SubjectId::from(subject.as_str()),
                suffix: suffix.clone(),
            },
            Step::SetHard {
                subject,
                prefix,
                suffix,
            } => LabelRequest::SetHard {
                subject: SubjectId::from(subject.as_str()),
                prefix: prefix.clone(),
                suffix: suffix.clone(),
            },
            Step::SetSoft {
                subject,
                prefix,
                suffix,
            } => LabelRequest::SetSoft {
                subject: SubjectId::from(subject.as_str()),
                prefix: prefix.clone(),
                suffix: suffix.clone(),
            },
            Step::Reset { subject } => LabelRequest::Reset {
                subject: SubjectId::from(subject.as_str()),
            },
            _ => return None,
        };
        Some(request)
    }
}

impl Script {
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let content = std::fs::read_to_string(path).map_err(|source| ScriptError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ScriptError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_ops() {
        let script = Script::parse(
            r#"
[group]
observers = ["alice"]

[[step]]
op = "connect"
subject = "alice"
name = "Alice"

[[step]]
op = "add"
subjects = ["bob", "carol"]

[[step]]
op = "set_prefix"
subject = "bob"
prefix = "[B] "

[[step]]
op = "set_suffix"
subject = "bob"
suffix = " *"

[[step]]
op = "set_hard"
subject = "carol"
prefix = "[C] "

[[step]]
op = "set_soft"
subject = "carol"
suffix = " !"

[[step]]
op = "cancel_next"
subject = "bob"

[[step]]
op = "reset"
subject = "bob"

[[step]]
op = "disconnect"
subject = "alice"

[[step]]
op = "remove"
subject = "carol"

[[step]]
op = "delete"
"#,
        )
        .unwrap();

        assert_eq!(script.group.observers, vec!["alice"]);
        let ops: Vec<&str> = script.steps.iter().map(Step::op).collect();
        assert_eq!(
            ops,
            vec![
                "connect",
                "add",
                "set_prefix",
                "set_suffix",
                "set_hard",
                "set_soft",
                "cancel_next",
                "reset",
                "disconnect",
                "remove",
                "delete"
            ]
        );
        assert_eq!(
            script.steps[4],
            Step::SetHard {
                subject: "carol".to_string(),
                prefix: "[C] ".to_string(),
                suffix: String::new(),
            }
        );
    }

    #[test]
    fn test_empty_script() {
        let script = Script::parse("").unwrap();
        assert!(script.steps.is_empty());
        assert!(script.group.observers.is_empty());
    }

    #[test]
    fn test_unknown_op_rejected() {
        let result = Script::parse(
            r#"
[[step]]
op = "explode"
subject = "x"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_label_steps_map_to_requests() {
        let step = Step::SetPrefix {
            subject: "a".to_string(),
            prefix: "p".to_string(),
        };
        assert!(matches!(
            step.to_request(),
            Some(LabelRequest::SetPrefix { prefix, .. }) if prefix == "p"
        ));
        assert!(Step::Delete.to_request().is_none());
        assert!(
            Step::CancelNext {
                subject: "a".to_string()
            }
            .to_request()
            .is_none()
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = Script::load(Path::new("/nonexistent/session.toml")).unwrap_err();
        assert_eq!(err.error_code(), "SCRIPT_READ_ERROR");
    }
}
