use std::cell::RefCell;
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use clap::ArgMatches;
use serde::Serialize;
use tracing::{debug, error, info};

use nametag_config::{NametagConfig, TeamsConfig};
use nametag_core::{
    GroupId, LabelChange, LabelError, LabelGroup, LabelRequest, MemoryPresence, MemoryTransport,
    Policies, SubjectId, SyncContext, SyncMessage, TeamSnapshot,
};

use crate::script::{Script, Step};

/// One delivered message as printed on stdout.
#[derive(Serialize)]
struct Delivery<'a> {
    to: &'a str,
    message: &'a SyncMessage,
}

#[derive(Serialize)]
struct ReplaySummary {
    group: GroupId,
    deleted: bool,
    observers: Vec<SubjectId>,
    teams: Vec<TeamSnapshot>,
}

#[derive(Serialize)]
struct SummaryLine {
    summary: ReplaySummary,
}

/// An in-memory group plus the collaborators a script drives.
struct ReplaySession {
    presence: Arc<MemoryPresence>,
    transport: Arc<MemoryTransport>,
    group: LabelGroup,
    policies: Policies,
    cancel_next: Rc<RefCell<BTreeSet<SubjectId>>>,
}

impl ReplaySession {
    fn new(teams: &TeamsConfig, observers: &[String]) -> Self {
        let presence = Arc::new(MemoryPresence::new());
        let transport = Arc::new(MemoryTransport::new());
        let context = SyncContext::new(transport.clone(), presence.clone());
        let group = LabelGroup::with_config(context, teams, observers.iter().map(String::as_str));

        let cancel_next: Rc<RefCell<BTreeSet<SubjectId>>> = Rc::default();
        let pending = Rc::clone(&cancel_next);
        let policies = Policies::new().with(move |change: &mut LabelChange| {
            if pending.borrow_mut().remove(change.subject()) {
                change.cancel();
            }
        });

        Self {
            presence,
            transport,
            group,
            policies,
            cancel_next,
        }
    }

    fn run_step(&mut self, step: &Step) -> Result<(), LabelError> {
        match step {
            Step::Add { subjects } => self.group.add(subjects.iter().map(String::as_str)),
            Step::Remove { subject } => self.group.remove(&SubjectId::from(subject.as_str())),
            Step::Delete => self.group.delete(),
            Step::Connect { subject, name } => {
                let display_name = name.as_deref().unwrap_or(subject);
                self.presence.connect(subject.as_str(), display_name);
                Ok(())
            }
            Step::Disconnect { subject } => {
                self.presence.disconnect(&SubjectId::from(subject.as_str()));
                Ok(())
            }
            Step::CancelNext { subject } => {
                self.cancel_next
                    .borrow_mut()
                    .insert(SubjectId::from(subject.as_str()));
                Ok(())
            }
            label_step => match label_step.to_request() {
                Some(request) => self.apply(request),
                None => Ok(()),
            },
        }
    }

    fn apply(&mut self, request: LabelRequest) -> Result<(), LabelError> {
        let subject = request.subject().clone();
        let outcome = self.group.apply(request, &self.policies)?;
        debug!(
            event = "cli.replay.change_reviewed",
            subject = %subject,
            applied = outcome.is_applied()
        );
        Ok(())
    }

    /// Print and forget every message delivered since the last flush.
    fn flush(&self, out: &mut impl Write) -> io::Result<usize> {
        let deliveries = self.transport.take();
        for (connection, message) in &deliveries {
            let line = Delivery {
                to: &connection.display_name,
                message,
            };
            writeln!(out, "{}", serde_json::to_string(&line)?)?;
        }
        Ok(deliveries.len())
    }

    fn summary(&self) -> SummaryLine {
        SummaryLine {
            summary: ReplaySummary {
                group: self.group.id(),
                deleted: self.group.is_deleted(),
                observers: self.group.observers().iter().cloned().collect(),
                teams: self.group.teams(),
            },
        }
    }
}

pub(crate) fn handle_replay_command(
    matches: &ArgMatches,
    config: &NametagConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let script_path = matches
        .get_one::<String>("script")
        .ok_or("Script argument is required")?;
    let show_summary = matches.get_flag("summary");

    info!(
        event = "cli.replay_started",
        script = script_path,
        summary = show_summary
    );

    let script = match Script::load(Path::new(script_path)) {
        Ok(script) => script,
        Err(e) => {
            eprintln!("❌ {}", e);
            error!(
                event = "cli.replay_failed",
                error = %e,
                error_code = e.error_code()
            );
            return Err(e.into());
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut session = ReplaySession::new(&config.teams, &script.group.observers);
    let mut delivered = session.flush(&mut out)?;

    for (index, step) in script.steps.iter().enumerate() {
        let number = index + 1;
        let result = session.run_step(step);
        delivered += session.flush(&mut out)?;

        if let Err(e) = result {
            eprintln!("❌ Step {} ({}) failed: {}", number, step.op(), e);
            error!(
                event = "cli.replay.step_failed",
                step = number,
                op = step.op(),
                error = %e,
                error_code = e.error_code()
            );
            return Err(e.into());
        }
    }

    if show_summary {
        writeln!(out, "{}", serde_json::to_string(&session.summary())?)?;
    }
    out.flush()?;

    info!(
        event = "cli.replay_completed",
        steps = script.steps.len(),
        delivered = delivered
    );
    Ok(())
}
