//! Reviewable label change requests.
//!
//! A [`LabelRequest`] is turned into a [`LabelChange`], passed through every
//! [`ChangePolicy`] in a [`Policies`] chain, and then applied to the group
//! unless a reviewer cancelled it. Reviewers may also rewrite the new prefix
//! and suffix.

use nametag_protocol::SubjectId;
use serde::{Deserialize, Serialize};

/// How empty fields in a change are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Empty clears the field.
    Overwrite,
    /// Empty keeps the subject's current value.
    MergeIfPresent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeReason {
    SetPrefix,
    SetSuffix,
    /// Label reset to the host's default rendering.
    Vanilla,
    Custom,
}

/// A label change asked for by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelRequest {
    SetPrefix { subject: SubjectId, prefix: String },
    SetSuffix { subject: SubjectId, suffix: String },
    SetHard {
        subject: SubjectId,
        prefix: String,
        suffix: String,
    },
    SetSoft {
        subject: SubjectId,
        prefix: String,
        suffix: String,
    },
    Reset { subject: SubjectId },
}

impl LabelRequest {
    pub fn subject(&self) -> &SubjectId {
        match self {
            LabelRequest::SetPrefix { subject, .. }
            | LabelRequest::SetSuffix { subject, .. }
            | LabelRequest::SetHard { subject, .. }
            | LabelRequest::SetSoft { subject, .. }
            | LabelRequest::Reset { subject } => subject,
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            LabelRequest::SetHard { .. } | LabelRequest::Reset { .. } => ChangeKind::Overwrite,
            LabelRequest::SetPrefix { .. }
            | LabelRequest::SetSuffix { .. }
            | LabelRequest::SetSoft { .. } => ChangeKind::MergeIfPresent,
        }
    }

    pub fn reason(&self) -> ChangeReason {
        match self {
            LabelRequest::SetPrefix { .. } => ChangeReason::SetPrefix,
            LabelRequest::SetSuffix { .. } => ChangeReason::SetSuffix,
            LabelRequest::SetHard { .. } | LabelRequest::SetSoft { .. } => ChangeReason::Custom,
            LabelRequest::Reset { .. } => ChangeReason::Vanilla,
        }
    }

    /// Requested `(prefix, suffix)`, with unset fields empty.
    fn into_parts(self) -> (SubjectId, String, String) {
        match self {
            LabelRequest::SetPrefix { subject, prefix } => (subject, prefix, String::new()),
            LabelRequest::SetSuffix { subject, suffix } => (subject, String::new(), suffix),
            LabelRequest::SetHard {
                subject,
                prefix,
                suffix,
            }
            | LabelRequest::SetSoft {
                subject,
                prefix,
                suffix,
            } => (subject, prefix, suffix),
            LabelRequest::Reset { subject } => (subject, String::new(), String::new()),
        }
    }
}

/// A pending change under review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelChange {
    subject: SubjectId,
    current_prefix: String,
    current_suffix: String,
    prefix: String,
    suffix: String,
    kind: ChangeKind,
    reason: ChangeReason,
    cancelled: bool,
}

impl LabelChange {
    /// Build a change for `request` against the subject's current label.
    pub fn from_request(
        request: LabelRequest,
        current_prefix: impl Into<String>,
        current_suffix: impl Into<String>,
    ) -> Self {
        let kind = request.kind();
        let reason = request.reason();
        let (subject, prefix, suffix) = request.into_parts();
        Self {
            subject,
            current_prefix: current_prefix.into(),
            current_suffix: current_suffix.into(),
            prefix,
            suffix,
            kind,
            reason,
            cancelled: false,
        }
    }

    pub fn subject(&self) -> &SubjectId {
        &self.subject
    }

    /// Prefix the subject had when the change was built.
    pub fn current_prefix(&self) -> &str {
        &self.current_prefix
    }

    pub fn current_suffix(&self) -> &str {
        &self.current_suffix
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = prefix.into();
    }

    pub fn set_suffix(&mut self, suffix: impl Into<String>) {
        self.suffix = suffix.into();
    }

    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    pub fn reason(&self) -> ChangeReason {
        self.reason
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// Result of applying a reviewed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ChangeOutcome {
    /// The change went through; carries the subject's label afterwards.
    Applied { prefix: String, suffix: String },
    Cancelled,
}

impl ChangeOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ChangeOutcome::Applied { .. })
    }
}

/// Reviews a change before it is applied.
pub trait ChangePolicy {
    fn review(&self, change: &mut LabelChange);
}

impl<F> ChangePolicy for F
where
    F: Fn(&mut LabelChange),
{
    fn review(&self, change: &mut LabelChange) {
        self(change)
    }
}

/// Ordered chain of reviewers. Every reviewer sees the change, including
/// one an earlier reviewer cancelled.
#[derive(Default)]
pub struct Policies {
    chain: Vec<Box<dyn ChangePolicy>>,
}

impl Policies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, policy: impl ChangePolicy + 'static) -> Self {
        self.push(policy);
        self
    }

    pub fn push(&mut self, policy: impl ChangePolicy + 'static) {
        self.chain.push(Box::new(policy));
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn review(&self, change: &mut LabelChange) {
        for policy in &self.chain {
            policy.review(change);
        }
    }
}

impl std::fmt::Debug for Policies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Policies")
            .field("len", &self.chain.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject() -> SubjectId {
        SubjectId::new("alice")
    }

    #[test]
    fn test_request_kinds_and_reasons() {
        let cases = vec![
            (
                LabelRequest::SetPrefix {
                    subject: subject(),
                    prefix: "p".into(),
                },
                ChangeKind::MergeIfPresent,
                ChangeReason::SetPrefix,
            ),
            (
                LabelRequest::SetSuffix {
                    subject: subject(),
                    suffix: "s".into(),
                },
                ChangeKind::MergeIfPresent,
                ChangeReason::SetSuffix,
            ),
            (
                LabelRequest::SetHard {
                    subject: subject(),
                    prefix: "p".into(),
                    suffix: "".into(),
                },
                ChangeKind::Overwrite,
                ChangeReason::Custom,
            ),
            (
                LabelRequest::SetSoft {
                    subject: subject(),
                    prefix: "p".into(),
                    suffix: "".into(),
                },
                ChangeKind::MergeIfPresent,
                ChangeReason::Custom,
            ),
            (
                LabelRequest::Reset { subject: subject() },
                ChangeKind::Overwrite,
                ChangeReason::Vanilla,
            ),
        ];

        for (request, kind, reason) in cases {
            assert_eq!(request.kind(), kind, "{request:?}");
            assert_eq!(request.reason(), reason, "{request:?}");
            assert_eq!(request.subject(), &subject());
        }
    }

    #[test]
    fn test_set_prefix_change_leaves_suffix_empty() {
        let change = LabelChange::from_request(
            LabelRequest::SetPrefix {
                subject: subject(),
                prefix: "[A] ".into(),
            },
            "[old] ",
            " *",
        );
        assert_eq!(change.prefix(), "[A] ");
        assert_eq!(change.suffix(), "");
        assert_eq!(change.current_prefix(), "[old] ");
        assert_eq!(change.current_suffix(), " *");
        assert!(!change.is_cancelled());
    }

    #[test]
    fn test_policies_run_in_order() {
        let policies = Policies::new()
            .with(|change: &mut LabelChange| change.set_prefix("first"))
            .with(|change: &mut LabelChange| {
                let rewritten = format!("{}+second", change.prefix());
                change.set_prefix(rewritten);
            });
        assert_eq!(policies.len(), 2);

        let mut change = LabelChange::from_request(
            LabelRequest::SetHard {
                subject: subject(),
                prefix: "orig".into(),
                suffix: "".into(),
            },
            "",
            "",
        );
        policies.review(&mut change);
        assert_eq!(change.prefix(), "first+second");
    }

    #[test]
    fn test_later_policy_sees_cancellation() {
        let policies = Policies::new()
            .with(|change: &mut LabelChange| change.cancel())
            .with(|change: &mut LabelChange| {
                if change.reason() == ChangeReason::Vanilla {
                    change.set_cancelled(false);
                }
            });

        let mut reset = LabelChange::from_request(LabelRequest::Reset { subject: subject() }, "", "");
        policies.review(&mut reset);
        assert!(!reset.is_cancelled());

        let mut hard = LabelChange::from_request(
            LabelRequest::SetHard {
                subject: subject(),
                prefix: "x".into(),
                suffix: "".into(),
            },
            "",
            "",
        );
        policies.review(&mut hard);
        assert!(hard.is_cancelled());
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let applied = ChangeOutcome::Applied {
            prefix: "p".into(),
            suffix: "".into(),
        };
        let json = serde_json::to_value(&applied).unwrap();
        assert_eq!(json["outcome"], "applied");
        assert_eq!(json["prefix"], "p");
        assert!(applied.is_applied());

        let json = serde_json::to_value(ChangeOutcome::Cancelled).unwrap();
        assert_eq!(json["outcome"], "cancelled");
    }
}
