//! Hand-off of label requests to the thread that owns a group.
//!
//! Any thread may [`submit`](RequestSender::submit). The owning thread calls
//! [`RequestQueue::drain`] once per tick to apply everything pending.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::LabelError;
use crate::group::LabelGroup;
use crate::requests::{ChangeOutcome, LabelRequest, Policies};

/// Create a connected sender/queue pair.
pub fn request_channel() -> (RequestSender, RequestQueue) {
    let (tx, rx) = mpsc::channel();
    (RequestSender { tx }, RequestQueue { rx })
}

#[derive(Debug, Clone)]
pub struct RequestSender {
    tx: Sender<LabelRequest>,
}

impl RequestSender {
    pub fn submit(&self, request: LabelRequest) -> Result<(), LabelError> {
        self.tx.send(request).map_err(|_| LabelError::QueueClosed)
    }
}

/// Counts from one [`RequestQueue::drain`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrainSummary {
    pub applied: usize,
    pub cancelled: usize,
    pub failed: usize,
}

impl DrainSummary {
    pub fn total(&self) -> usize {
        self.applied + self.cancelled + self.failed
    }
}

#[derive(Debug)]
pub struct RequestQueue {
    rx: Receiver<LabelRequest>,
}

impl RequestQueue {
    /// Apply every pending request to `group` in submission order.
    ///
    /// Never blocks. A failed request is logged and counted; the rest still
    /// run.
    pub fn drain(&self, group: &mut LabelGroup, policies: &Policies) -> DrainSummary {
        let mut summary = DrainSummary::default();

        loop {
            match self.rx.try_recv() {
                Ok(request) => {
                    let subject = request.subject().clone();
                    match group.apply(request, policies) {
                        Ok(ChangeOutcome::Applied { .. }) => summary.applied += 1,
                        Ok(ChangeOutcome::Cancelled) => summary.cancelled += 1,
                        Err(e) => {
                            warn!(
                                event = "core.queue.request_rejected",
                                group = %group.id(),
                                subject = %subject,
                                error = %e,
                                error_code = e.error_code()
                            );
                            summary.failed += 1;
                        }
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    debug!(event = "core.queue.senders_dropped", group = %group.id());
                    break;
                }
            }
        }

        if summary.total() > 0 {
            debug!(
                event = "core.queue.drained",
                group = %group.id(),
                applied = summary.applied,
                cancelled = summary.cancelled,
                failed = summary.failed
            );
        }
        summary
    }
}
