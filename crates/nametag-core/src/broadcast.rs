//! Per-observer fan-out of team changes.
//!
//! Every send is guarded against the directory's live table at call time, so
//! a stale notification for a team that has since been removed or recreated
//! is dropped instead of delivered.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use nametag_protocol::{SubjectId, SyncMessage};
use serde::Serialize;
use tracing::{debug, warn};

use crate::transport::{Connection, Presence, SyncContext, SyncTransport};
use crate::types::{Team, TeamId, TeamSnapshot};

/// Live team table owned by a [`TeamDirectory`](crate::TeamDirectory).
pub type LiveTeams = BTreeMap<TeamId, TeamSnapshot>;

/// Outcome of one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    /// Messages handed to the transport successfully.
    pub delivered: usize,
    /// Observers skipped because they have no live connection.
    pub offline: usize,
    /// Observers whose send failed.
    pub failed: usize,
}

/// Turns directory mutations into [`SyncMessage`]s for each observer.
#[derive(Clone)]
pub struct SyncBroadcaster {
    transport: Arc<dyn SyncTransport>,
    presence: Arc<dyn Presence>,
}

impl std::fmt::Debug for SyncBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncBroadcaster").finish_non_exhaustive()
    }
}

impl SyncBroadcaster {
    pub fn new(context: SyncContext) -> Self {
        Self {
            transport: context.transport,
            presence: context.presence,
        }
    }

    /// Announce a newly registered team. Members are always empty here.
    pub fn team_created(&self, team: &Team, observers: &BTreeSet<SubjectId>) -> DeliveryReport {
        let message = SyncMessage::DefineTeam {
            team: team.name.clone(),
            prefix: team.prefix.clone(),
            suffix: team.suffix.clone(),
            members: Vec::new(),
        };
        self.fan_out(observers, &message)
    }

    /// Announce removal of `team`, provided it is still live with the same
    /// identity.
    pub fn team_removed(
        &self,
        live: &LiveTeams,
        team: &Team,
        observers: &BTreeSet<SubjectId>,
    ) -> DeliveryReport {
        if !is_live(live, team) {
            debug!(
                event = "core.broadcast.stale_skipped",
                team = %team.name,
                action = "remove"
            );
            return DeliveryReport::default();
        }
        let message = SyncMessage::RemoveTeam {
            team: team.name.clone(),
        };
        self.fan_out(observers, &message)
    }

    pub fn member_added(
        &self,
        live: &LiveTeams,
        team: &Team,
        subject: &SubjectId,
        observers: &BTreeSet<SubjectId>,
    ) -> DeliveryReport {
        if !is_live(live, team) {
            debug!(
                event = "core.broadcast.stale_skipped",
                team = %team.name,
                action = "join"
            );
            return DeliveryReport::default();
        }
        let message = SyncMessage::AddMembers {
            team: team.name.clone(),
            members: vec![self.display_name(subject)],
        };
        self.fan_out(observers, &message)
    }

    /// Announce that `subject` left `team`. Sent only while the subject is
    /// still listed under that team.
    pub fn member_removed(
        &self,
        live: &LiveTeams,
        team: &Team,
        subject: &SubjectId,
        observers: &BTreeSet<SubjectId>,
    ) -> DeliveryReport {
        let listed = live
            .get(&team.id)
            .is_some_and(|entry| entry.team == *team && entry.members.contains(subject));
        if !listed {
            debug!(
                event = "core.broadcast.stale_skipped",
                team = %team.name,
                subject = %subject,
                action = "leave"
            );
            return DeliveryReport::default();
        }
        let message = SyncMessage::RemoveMembers {
            team: team.name.clone(),
            members: vec![self.display_name(subject)],
        };
        self.fan_out(observers, &message)
    }

    /// Send every live team and its full membership to one observer.
    ///
    /// The first failed send ends the snapshot for that observer.
    pub fn full_snapshot(&self, live: &LiveTeams, observer: &SubjectId) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        let Some(connection) = self.presence.connection(observer) else {
            report.offline = 1;
            return report;
        };

        for entry in live.values() {
            let members = entry
                .members
                .iter()
                .map(|member| self.display_name(member))
                .collect();
            let messages = [
                SyncMessage::DefineTeam {
                    team: entry.team.name.clone(),
                    prefix: entry.team.prefix.clone(),
                    suffix: entry.team.suffix.clone(),
                    members: Vec::new(),
                },
                SyncMessage::AddMembers {
                    team: entry.team.name.clone(),
                    members,
                },
            ];
            for message in &messages {
                if let Err(e) = self.transport.send(&connection, message) {
                    warn!(
                        event = "core.broadcast.snapshot_aborted",
                        observer = %observer,
                        connection = %connection.id,
                        team = %entry.team.name,
                        error = %e,
                        error_code = e.error_code()
                    );
                    report.failed = 1;
                    return report;
                }
                report.delivered += 1;
            }
        }

        debug!(
            event = "core.broadcast.snapshot_sent",
            observer = %observer,
            teams = live.len(),
            delivered = report.delivered
        );
        report
    }

    /// Send `message` to every observer with a live connection.
    ///
    /// Offline observers are skipped and a failed send is logged; neither
    /// stops delivery to the rest.
    pub fn fan_out(&self, observers: &BTreeSet<SubjectId>, message: &SyncMessage) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        for observer in observers {
            let Some(connection) = self.presence.connection(observer) else {
                report.offline += 1;
                continue;
            };
            match self.transport.send(&connection, message) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!(
                        event = "core.broadcast.delivery_failed",
                        observer = %observer,
                        connection = %connection.id,
                        team = %message.team(),
                        action = %message.action(),
                        error = %e,
                        error_code = e.error_code()
                    );
                    report.failed += 1;
                }
            }
        }

        debug!(
            event = "core.broadcast.fan_out_completed",
            team = %message.team(),
            action = %message.action(),
            delivered = report.delivered,
            offline = report.offline,
            failed = report.failed
        );
        report
    }

    /// Best-known display identity: live connection name, then offline
    /// name, then the raw subject id.
    pub fn display_name(&self, subject: &SubjectId) -> String {
        self.presence
            .connection(subject)
            .map(|Connection { display_name, .. }| display_name)
            .or_else(|| self.presence.offline_name(subject))
            .unwrap_or_else(|| subject.to_string())
    }
}

fn is_live(live: &LiveTeams, team: &Team) -> bool {
    live.get(&team.id).is_some_and(|entry| entry.team == *team)
}
