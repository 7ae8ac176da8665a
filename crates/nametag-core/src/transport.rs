//! Boundary traits the host implements.
//!
//! The core never looks up connections or writes packets itself. A
//! [`Presence`] answers "is this subject connected, and what is it called",
//! and a [`SyncTransport`] delivers one [`SyncMessage`] to one connection.

use std::sync::Arc;

use nametag_protocol::{SubjectId, SyncMessage};

use crate::errors::DeliveryError;

/// Identifier of a live connection on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(pub u64);

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A live connection handle capable of receiving sync messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    /// Name the host shows for this connection. May differ from the subject
    /// id in case.
    pub display_name: String,
}

/// Resolves subjects to live connections and display identities.
pub trait Presence: Send + Sync {
    /// Live connection for `subject`, or `None` if it is not connected.
    fn connection(&self, subject: &SubjectId) -> Option<Connection>;

    /// Best-effort display identity for a subject that is not connected.
    fn offline_name(&self, subject: &SubjectId) -> Option<String>;
}

/// Fire-and-forget delivery of sync messages to a single connection.
pub trait SyncTransport: Send + Sync {
    fn send(&self, connection: &Connection, message: &SyncMessage) -> Result<(), DeliveryError>;
}

/// Collaborators injected into every group.
#[derive(Clone)]
pub struct SyncContext {
    pub transport: Arc<dyn SyncTransport>,
    pub presence: Arc<dyn Presence>,
}

impl SyncContext {
    pub fn new(transport: Arc<dyn SyncTransport>, presence: Arc<dyn Presence>) -> Self {
        Self {
            transport,
            presence,
        }
    }
}

impl std::fmt::Debug for SyncContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncContext").finish_non_exhaustive()
    }
}
