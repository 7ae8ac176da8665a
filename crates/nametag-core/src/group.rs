//! A set of observers sharing one team table.

use std::collections::BTreeSet;

use nametag_config::TeamsConfig;
use nametag_protocol::SubjectId;
use tracing::{debug, info};

use crate::broadcast::SyncBroadcaster;
use crate::directory::TeamDirectory;
use crate::errors::LabelError;
use crate::requests::{ChangeKind, ChangeOutcome, LabelChange, LabelRequest, Policies};
use crate::transport::SyncContext;
use crate::types::{GroupId, TeamSnapshot};

/// Observers of a group see every label applied within it.
///
/// A group is `Active` until [`delete`](Self::delete), after which every
/// mutation fails with [`LabelError::InvalidState`]. Queries keep working.
#[derive(Debug)]
pub struct LabelGroup {
    id: GroupId,
    directory: TeamDirectory,
    observers: BTreeSet<SubjectId>,
    deleted: bool,
}

impl LabelGroup {
    /// Create a group with the default team-name prefix.
    pub fn new<I, S>(context: SyncContext, initial: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SubjectId>,
    {
        Self::build(TeamDirectory::new(SyncBroadcaster::new(context)), initial)
    }

    pub fn with_config<I, S>(context: SyncContext, config: &TeamsConfig, initial: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SubjectId>,
    {
        Self::build(
            TeamDirectory::with_name_prefix(SyncBroadcaster::new(context), config.name_prefix()),
            initial,
        )
    }

    fn build<I, S>(directory: TeamDirectory, initial: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SubjectId>,
    {
        let mut group = Self {
            id: GroupId::next(),
            directory,
            observers: BTreeSet::new(),
            deleted: false,
        };
        for subject in initial {
            group.join(subject.into());
        }
        info!(
            event = "core.group.created",
            group = %group.id,
            observers = group.observers.len(),
            name_prefix = group.directory.name_prefix()
        );
        group
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    fn ensure_active(&self, operation: &'static str) -> Result<(), LabelError> {
        if self.deleted {
            return Err(LabelError::InvalidState {
                group: self.id,
                operation,
            });
        }
        Ok(())
    }

    /// Register subjects as observers. Each receives a full snapshot and
    /// starts with no label.
    pub fn add<I, S>(&mut self, subjects: I) -> Result<(), LabelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<SubjectId>,
    {
        self.ensure_active("add")?;
        for subject in subjects {
            self.join(subject.into());
        }
        Ok(())
    }

    fn join(&mut self, subject: SubjectId) {
        self.observers.insert(subject.clone());
        let report = self
            .directory
            .broadcaster()
            .full_snapshot(self.directory.live(), &subject);
        self.directory.clear(&subject, &self.observers);
        debug!(
            event = "core.group.observer_added",
            group = %self.id,
            subject = %subject,
            delivered = report.delivered,
            offline = report.offline > 0
        );
    }

    /// Drop `subject` from the group, clearing its label first.
    pub fn remove(&mut self, subject: &SubjectId) -> Result<(), LabelError> {
        self.ensure_active("remove")?;
        self.directory.clear(subject, &self.observers);
        self.observers.remove(subject);
        debug!(
            event = "core.group.observer_removed",
            group = %self.id,
            subject = %subject
        );
        Ok(())
    }

    /// Tear down every team and mark the group deleted.
    pub fn delete(&mut self) -> Result<(), LabelError> {
        self.ensure_active("delete")?;
        let teams = self.directory.len();
        self.directory.teardown(&self.observers);
        self.deleted = true;
        info!(
            event = "core.group.deleted",
            group = %self.id,
            teams = teams,
            observers = self.observers.len()
        );
        Ok(())
    }

    /// Overwrite `subject`'s label. Empty fields are cleared.
    pub fn set_label(
        &mut self,
        subject: &SubjectId,
        prefix: &str,
        suffix: &str,
    ) -> Result<(), LabelError> {
        self.ensure_active("set_label")?;
        let team = self.directory.get_or_create(prefix, suffix, &self.observers);
        self.directory.assign(&team, subject, &self.observers);
        debug!(
            event = "core.group.label_set",
            group = %self.id,
            subject = %subject,
            team = %team.name
        );
        Ok(())
    }

    /// Update `subject`'s label. Empty fields keep the current value.
    pub fn merge_label(
        &mut self,
        subject: &SubjectId,
        prefix: &str,
        suffix: &str,
    ) -> Result<(), LabelError> {
        self.ensure_active("merge_label")?;
        let prefix = match prefix {
            "" => self.directory.lookup_prefix(subject),
            given => given.to_string(),
        };
        let suffix = match suffix {
            "" => self.directory.lookup_suffix(subject),
            given => given.to_string(),
        };
        self.set_label(subject, &prefix, &suffix)
    }

    pub fn clear_label(&mut self, subject: &SubjectId) -> Result<(), LabelError> {
        self.ensure_active("clear_label")?;
        self.directory.clear(subject, &self.observers);
        Ok(())
    }

    /// Remove empty teams now instead of waiting for the next label change.
    pub fn reclaim(&mut self) -> Result<usize, LabelError> {
        self.ensure_active("reclaim")?;
        Ok(self.directory.reclaim(&self.observers))
    }

    /// Review `request` with `policies` and apply it unless cancelled.
    pub fn apply(
        &mut self,
        request: LabelRequest,
        policies: &Policies,
    ) -> Result<ChangeOutcome, LabelError> {
        self.ensure_active("apply")?;

        let is_reset = matches!(request, LabelRequest::Reset { .. });
        let subject = request.subject().clone();
        let mut change = LabelChange::from_request(
            request,
            self.prefix(&subject),
            self.suffix(&subject),
        );
        policies.review(&mut change);

        if change.is_cancelled() {
            debug!(
                event = "core.group.change_cancelled",
                group = %self.id,
                subject = %subject,
                reason = ?change.reason()
            );
            return Ok(ChangeOutcome::Cancelled);
        }

        // A reset stays a clear unless a reviewer gave it values.
        if is_reset && change.prefix().is_empty() && change.suffix().is_empty() {
            self.clear_label(&subject)?;
        } else {
            match change.kind() {
                ChangeKind::Overwrite => {
                    self.set_label(&subject, change.prefix(), change.suffix())?
                }
                ChangeKind::MergeIfPresent => {
                    self.merge_label(&subject, change.prefix(), change.suffix())?
                }
            }
        }

        Ok(ChangeOutcome::Applied {
            prefix: self.prefix(&subject),
            suffix: self.suffix(&subject),
        })
    }

    pub fn prefix(&self, subject: &SubjectId) -> String {
        self.directory.lookup_prefix(subject)
    }

    pub fn suffix(&self, subject: &SubjectId) -> String {
        self.directory.lookup_suffix(subject)
    }

    /// `prefix + subject + suffix`.
    pub fn formatted_name(&self, subject: &SubjectId) -> String {
        format!(
            "{}{}{}",
            self.directory.lookup_prefix(subject),
            subject,
            self.directory.lookup_suffix(subject)
        )
    }

    pub fn is_managed(&self, subject: &SubjectId) -> bool {
        self.directory.is_managed(subject)
    }

    pub fn teams(&self) -> Vec<TeamSnapshot> {
        self.directory.snapshot()
    }

    pub fn observers(&self) -> &BTreeSet<SubjectId> {
        &self.observers
    }

    pub fn directory(&self) -> &TeamDirectory {
        &self.directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryPresence, MemoryTransport};
    use crate::types::TeamId;
    use nametag_protocol::SyncMessage;
    use std::sync::Arc;

    fn context() -> (Arc<MemoryPresence>, Arc<MemoryTransport>, SyncContext) {
        let presence = Arc::new(MemoryPresence::new());
        let transport = Arc::new(MemoryTransport::new());
        let context = SyncContext::new(transport.clone(), presence.clone());
        (presence, transport, context)
    }

    fn s(name: &str) -> SubjectId {
        SubjectId::new(name)
    }

    #[test]
    fn test_new_group_registers_initial_observers() {
        let (presence, _transport, context) = context();
        presence.connect("a", "a");
        let group = LabelGroup::new(context, ["a", "b"]);

        assert_eq!(group.observers().len(), 2);
        assert!(!group.is_deleted());
        assert!(group.teams().is_empty());
    }

    #[test]
    fn test_set_and_query_label() {
        let (_presence, _transport, context) = context();
        let mut group = LabelGroup::new(context, ["a"]);

        group.set_label(&s("a"), "[VIP] ", " *").unwrap();
        assert_eq!(group.prefix(&s("a")), "[VIP] ");
        assert_eq!(group.suffix(&s("a")), " *");
        assert_eq!(group.formatted_name(&s("a")), "[VIP] a *");
        assert!(group.is_managed(&s("a")));
        assert!(!group.is_managed(&s("b")));
        assert_eq!(group.formatted_name(&s("b")), "b");
    }

    #[test]
    fn test_merge_keeps_current_values() {
        let (_presence, _transport, context) = context();
        let mut group = LabelGroup::new(context, ["a"]);

        group.set_label(&s("a"), "[A] ", " *").unwrap();
        group.merge_label(&s("a"), "[B] ", "").unwrap();
        assert_eq!(group.prefix(&s("a")), "[B] ");
        assert_eq!(group.suffix(&s("a")), " *");

        group.set_label(&s("a"), "", " !").unwrap();
        assert_eq!(group.prefix(&s("a")), "");
        assert_eq!(group.suffix(&s("a")), " !");
    }

    #[test]
    fn test_add_clears_existing_label() {
        let (_presence, _transport, context) = context();
        let mut group = LabelGroup::new(context, ["a"]);
        group.set_label(&s("a"), "x", "").unwrap();

        group.add(["a"]).unwrap();
        assert!(!group.is_managed(&s("a")));
    }

    #[test]
    fn test_delete_is_terminal() {
        let (presence, transport, context) = context();
        let conn = presence.connect("a", "a");
        let mut group = LabelGroup::new(context, ["a"]);
        group.set_label(&s("a"), "x", "").unwrap();
        transport.take();

        group.delete().unwrap();
        assert!(group.is_deleted());
        assert!(group.teams().is_empty());
        assert_eq!(
            transport.messages_for(conn.id),
            vec![SyncMessage::RemoveTeam {
                team: nametag_protocol::TeamName::new("NTP0")
            }]
        );

        let errors = [
            group.add(["b"]).unwrap_err(),
            group.remove(&s("a")).unwrap_err(),
            group.delete().unwrap_err(),
            group.set_label(&s("a"), "x", "").unwrap_err(),
            group.merge_label(&s("a"), "x", "").unwrap_err(),
            group.clear_label(&s("a")).unwrap_err(),
            group.reclaim().unwrap_err(),
            group
                .apply(
                    LabelRequest::Reset { subject: s("a") },
                    &Policies::new(),
                )
                .unwrap_err(),
        ];
        for err in errors {
            assert!(matches!(err, LabelError::InvalidState { group: g, .. } if g == group.id()));
        }
    }

    #[test]
    fn test_remove_notifies_and_drops_observer() {
        let (presence, transport, context) = context();
        let conn_b = presence.connect("b", "b");
        let mut group = LabelGroup::new(context, ["a", "b"]);
        group.set_label(&s("a"), "x", "").unwrap();
        transport.take();

        group.remove(&s("a")).unwrap();
        assert!(!group.observers().contains(&s("a")));
        assert!(!group.is_managed(&s("a")));
        assert!(matches!(
            transport.messages_for(conn_b.id).as_slice(),
            [SyncMessage::RemoveMembers { members, .. }] if members == &vec!["a".to_string()]
        ));
    }

    #[test]
    fn test_apply_cancelled_leaves_state() {
        let (_presence, transport, context) = context();
        let mut group = LabelGroup::new(context, ["a"]);
        group.set_label(&s("a"), "keep", "").unwrap();
        let before = transport.len();

        let policies = Policies::new().with(|change: &mut LabelChange| change.cancel());
        let outcome = group
            .apply(
                LabelRequest::SetHard {
                    subject: s("a"),
                    prefix: "new".into(),
                    suffix: "".into(),
                },
                &policies,
            )
            .unwrap();

        assert_eq!(outcome, ChangeOutcome::Cancelled);
        assert_eq!(group.prefix(&s("a")), "keep");
        assert_eq!(transport.len(), before);
    }

    #[test]
    fn test_apply_uses_rewritten_values() {
        let (_presence, _transport, context) = context();
        let mut group = LabelGroup::new(context, ["a"]);

        let policies = Policies::new().with(|change: &mut LabelChange| {
            let upper = change.prefix().to_uppercase();
            change.set_prefix(upper);
        });
        let outcome = group
            .apply(
                LabelRequest::SetPrefix {
                    subject: s("a"),
                    prefix: "[mod] ".into(),
                },
                &policies,
            )
            .unwrap();

        assert_eq!(
            outcome,
            ChangeOutcome::Applied {
                prefix: "[MOD] ".into(),
                suffix: "".into()
            }
        );
    }

    #[test]
    fn test_apply_set_suffix_merges_prefix() {
        let (_presence, _transport, context) = context();
        let mut group = LabelGroup::new(context, ["a"]);
        group.set_label(&s("a"), "[A] ", "").unwrap();

        group
            .apply(
                LabelRequest::SetSuffix {
                    subject: s("a"),
                    suffix: " *".into(),
                },
                &Policies::new(),
            )
            .unwrap();
        assert_eq!(group.formatted_name(&s("a")), "[A] a *");
    }

    #[test]
    fn test_apply_reset_clears() {
        let (_presence, _transport, context) = context();
        let mut group = LabelGroup::new(context, ["a"]);
        group.set_label(&s("a"), "x", "y").unwrap();

        let outcome = group
            .apply(LabelRequest::Reset { subject: s("a") }, &Policies::new())
            .unwrap();
        assert!(outcome.is_applied());
        assert!(!group.is_managed(&s("a")));
    }

    #[test]
    fn test_with_config_uses_name_prefix() {
        let (_presence, _transport, context) = context();
        let config = TeamsConfig {
            name_prefix: Some("GRP".to_string()),
        };
        let mut group = LabelGroup::with_config(context, &config, ["a"]);
        group.set_label(&s("a"), "x", "").unwrap();
        assert_eq!(group.teams()[0].team.name.as_str(), "GRP0");
    }

    #[test]
    fn test_end_to_end_lifecycle() {
        let (presence, transport, context) = context();
        presence.connect("A", "A");
        let conn_b = presence.connect("B", "B");
        let mut group = LabelGroup::new(context, Vec::<SubjectId>::new());
        let (a, b) = (s("A"), s("B"));

        group.add([a.clone()]).unwrap();
        group.set_label(&a, "[VIP]", "").unwrap();
        let teams = group.teams();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].members, vec![a.clone()]);
        let vip = teams[0].team.id;

        group.add([b.clone()]).unwrap();
        let snapshot = transport.messages_for(conn_b.id);
        assert!(matches!(&snapshot[0], SyncMessage::DefineTeam { prefix, .. } if prefix == "[VIP]"));
        assert!(matches!(&snapshot[1], SyncMessage::AddMembers { members, .. }
            if members == &vec!["A".to_string()]));

        group.set_label(&b, "[VIP]", "").unwrap();
        let teams = group.teams();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].members, vec![a.clone(), b.clone()]);

        // A second team holds the next id so reuse is observable
        let c = s("C");
        group.add([c.clone()]).unwrap();
        group.set_label(&c, "[ALT]", "").unwrap();
        let alt = group.directory().team_of(&c).map(|team| team.id);
        assert_eq!(alt, Some(TeamId(1)));

        group.remove(&a).unwrap();
        assert_eq!(group.teams()[0].members, vec![b.clone()]);

        group.clear_label(&b).unwrap();
        assert_eq!(group.reclaim().unwrap(), 1);
        let teams = group.teams();
        assert_eq!(teams.len(), 1);
        assert_eq!(Some(teams[0].team.id), alt);

        group.set_label(&b, "[NEW]", "").unwrap();
        let reused = group.directory().team_of(&b).map(|team| team.id);
        assert_eq!(reused, Some(vip));
        assert_eq!(vip, TeamId(0));
        assert_eq!(group.teams().len(), 2);
    }
}
