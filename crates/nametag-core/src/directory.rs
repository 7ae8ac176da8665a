//! Team table for a single group.
//!
//! Maps each live team to its members, allocates team ids from the pool,
//! and drives the broadcaster for every mutation. All lookups are linear
//! scans; groups hold tens of teams, not thousands.

use std::collections::BTreeSet;

use nametag_config::DEFAULT_TEAM_NAME_PREFIX;
use nametag_protocol::SubjectId;
use tracing::{debug, info, warn};

use crate::broadcast::{LiveTeams, SyncBroadcaster};
use crate::pool::IdentifierPool;
use crate::types::{Team, TeamId, TeamSnapshot};

#[derive(Debug)]
pub struct TeamDirectory {
    live: LiveTeams,
    pool: IdentifierPool,
    name_prefix: String,
    broadcaster: SyncBroadcaster,
}

impl TeamDirectory {
    pub fn new(broadcaster: SyncBroadcaster) -> Self {
        Self::with_name_prefix(broadcaster, DEFAULT_TEAM_NAME_PREFIX)
    }

    /// Directory whose team names render as `name_prefix` + id.
    pub fn with_name_prefix(broadcaster: SyncBroadcaster, name_prefix: &str) -> Self {
        Self {
            live: LiveTeams::new(),
            pool: IdentifierPool::new(),
            name_prefix: name_prefix.to_string(),
            broadcaster,
        }
    }

    pub fn name_prefix(&self) -> &str {
        &self.name_prefix
    }

    pub fn broadcaster(&self) -> &SyncBroadcaster {
        &self.broadcaster
    }

    /// Live team carrying exactly this `(prefix, suffix)` pair.
    pub fn find_by_attributes(&self, prefix: &str, suffix: &str) -> Option<Team> {
        self.live
            .values()
            .find(|entry| entry.team.matches(prefix, suffix))
            .map(|entry| entry.team.clone())
    }

    /// Team for `(prefix, suffix)`, creating it if none is live.
    ///
    /// Empty teams are reclaimed first, so a freed id is reused before a
    /// fresh one is allocated.
    pub fn get_or_create(
        &mut self,
        prefix: &str,
        suffix: &str,
        observers: &BTreeSet<SubjectId>,
    ) -> Team {
        self.reclaim(observers);

        if let Some(team) = self.find_by_attributes(prefix, suffix) {
            return team;
        }

        let id = self.pool.allocate();
        let team = Team::new(id, &self.name_prefix, prefix, suffix);
        self.live.insert(
            id,
            TeamSnapshot {
                team: team.clone(),
                members: Vec::new(),
            },
        );

        let report = self.broadcaster.team_created(&team, observers);
        info!(
            event = "core.directory.team_created",
            team = %team.name,
            prefix = %team.prefix,
            suffix = %team.suffix,
            delivered = report.delivered,
            failed = report.failed
        );
        team
    }

    /// Remove every pool-managed team that has no members. Returns how many
    /// were removed.
    pub fn reclaim(&mut self, observers: &BTreeSet<SubjectId>) -> usize {
        if self.pool.is_empty() {
            return 0;
        }

        let empty: Vec<Team> = self
            .live
            .values()
            .filter(|entry| entry.members.is_empty())
            .filter(|entry| {
                entry
                    .team
                    .name
                    .managed_id(&self.name_prefix)
                    .is_some_and(|id| self.pool.contains(TeamId(id)))
            })
            .map(|entry| entry.team.clone())
            .collect();

        for team in &empty {
            let report = self.broadcaster.team_removed(&self.live, team, observers);
            self.live.remove(&team.id);
            self.pool.release(team.id);
            info!(
                event = "core.directory.team_removed",
                team = %team.name,
                reason = "empty",
                delivered = report.delivered,
                failed = report.failed
            );
        }

        empty.len()
    }

    /// Move `subject` into `team`, leaving whatever team held it before.
    pub fn assign(&mut self, team: &Team, subject: &SubjectId, observers: &BTreeSet<SubjectId>) {
        self.clear(subject, observers);

        let Some(entry) = self
            .live
            .get_mut(&team.id)
            .filter(|entry| entry.team == *team)
        else {
            warn!(
                event = "core.directory.assign_to_dead_team",
                team = %team.name,
                subject = %subject
            );
            return;
        };
        entry.members.push(subject.clone());

        let report = self
            .broadcaster
            .member_added(&self.live, team, subject, observers);
        debug!(
            event = "core.directory.member_added",
            team = %team.name,
            subject = %subject,
            delivered = report.delivered
        );
    }

    /// Remove `subject` from its team. No-op if it has none.
    pub fn clear(&mut self, subject: &SubjectId, observers: &BTreeSet<SubjectId>) {
        let Some(team) = self.team_of(subject) else {
            return;
        };

        let report = self
            .broadcaster
            .member_removed(&self.live, &team, subject, observers);
        if let Some(entry) = self.live.get_mut(&team.id) {
            entry.members.retain(|member| member != subject);
        }
        debug!(
            event = "core.directory.member_removed",
            team = %team.name,
            subject = %subject,
            delivered = report.delivered
        );
    }

    pub fn lookup_prefix(&self, subject: &SubjectId) -> String {
        self.team_of(subject)
            .map(|team| team.prefix)
            .unwrap_or_default()
    }

    pub fn lookup_suffix(&self, subject: &SubjectId) -> String {
        self.team_of(subject)
            .map(|team| team.suffix)
            .unwrap_or_default()
    }

    pub fn team_of(&self, subject: &SubjectId) -> Option<Team> {
        self.live
            .values()
            .find(|entry| entry.members.contains(subject))
            .map(|entry| entry.team.clone())
    }

    /// Whether `subject` sits in a live team.
    ///
    /// Subject ids are compared exactly, so `notch` and `Notch` are
    /// different subjects.
    pub fn is_managed(&self, subject: &SubjectId) -> bool {
        self.live
            .values()
            .any(|entry| entry.members.contains(subject))
    }

    /// Live teams and their members, ordered by id.
    pub fn snapshot(&self) -> Vec<TeamSnapshot> {
        self.live.values().cloned().collect()
    }

    pub(crate) fn live(&self) -> &LiveTeams {
        &self.live
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Remove every live team and reset the pool.
    pub fn teardown(&mut self, observers: &BTreeSet<SubjectId>) {
        let released = self.pool.len();
        let teams: Vec<Team> = self.live.values().map(|entry| entry.team.clone()).collect();
        for team in &teams {
            let report = self.broadcaster.team_removed(&self.live, team, observers);
            self.live.remove(&team.id);
            info!(
                event = "core.directory.team_removed",
                team = %team.name,
                reason = "teardown",
                delivered = report.delivered,
                failed = report.failed
            );
        }
        self.pool = IdentifierPool::new();
        debug!(event = "core.directory.pool_reset", released = released);
    }
}
