//! In-process [`Presence`] and [`SyncTransport`] implementations.
//!
//! Used by the replay CLI and by tests. The transport records every
//! delivery in order and can be told to fail for specific connections.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use nametag_protocol::{SubjectId, SyncMessage};
use tracing::error;

use crate::errors::DeliveryError;
use crate::transport::{Connection, ConnectionId, Presence, SyncTransport};

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &'static str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            error!(event = "core.memory.lock_poisoned", lock = what);
            poisoned.into_inner()
        }
    }
}

#[derive(Default)]
struct PresenceState {
    online: HashMap<SubjectId, Connection>,
    offline_names: HashMap<SubjectId, String>,
}

/// Presence table kept in memory.
#[derive(Default)]
pub struct MemoryPresence {
    state: Mutex<PresenceState>,
    next_connection_id: AtomicU64,
}

impl MemoryPresence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `subject` connected under `display_name` and return its new
    /// connection. Reconnecting replaces the previous connection.
    pub fn connect(&self, subject: impl Into<SubjectId>, display_name: &str) -> Connection {
        let subject = subject.into();
        let connection = Connection {
            id: ConnectionId(self.next_connection_id.fetch_add(1, Ordering::Relaxed) + 1),
            display_name: display_name.to_string(),
        };
        let mut state = lock(&self.state, "presence");
        state
            .offline_names
            .insert(subject.clone(), display_name.to_string());
        state.online.insert(subject, connection.clone());
        connection
    }

    /// Drop `subject`'s live connection. Its last display name is kept as
    /// the offline identity.
    pub fn disconnect(&self, subject: &SubjectId) -> Option<Connection> {
        lock(&self.state, "presence").online.remove(subject)
    }

    /// Record an offline display identity without connecting.
    pub fn remember(&self, subject: impl Into<SubjectId>, offline_name: &str) {
        lock(&self.state, "presence")
            .offline_names
            .insert(subject.into(), offline_name.to_string());
    }

    pub fn is_connected(&self, subject: &SubjectId) -> bool {
        lock(&self.state, "presence").online.contains_key(subject)
    }
}

impl Presence for MemoryPresence {
    fn connection(&self, subject: &SubjectId) -> Option<Connection> {
        lock(&self.state, "presence").online.get(subject).cloned()
    }

    fn offline_name(&self, subject: &SubjectId) -> Option<String> {
        lock(&self.state, "presence")
            .offline_names
            .get(subject)
            .cloned()
    }
}

#[derive(Default)]
struct TransportState {
    delivered: Vec<(Connection, SyncMessage)>,
    failing: HashSet<ConnectionId>,
}

/// Transport that records deliveries instead of writing packets.
#[derive(Default)]
pub struct MemoryTransport {
    state: Mutex<TransportState>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send to `connection` fail as disconnected.
    pub fn fail_for(&self, connection: ConnectionId) {
        lock(&self.state, "transport").failing.insert(connection);
    }

    /// Undo [`fail_for`](Self::fail_for).
    pub fn restore(&self, connection: ConnectionId) {
        lock(&self.state, "transport").failing.remove(&connection);
    }

    /// Messages delivered to `connection`, in delivery order.
    pub fn messages_for(&self, connection: ConnectionId) -> Vec<SyncMessage> {
        lock(&self.state, "transport")
            .delivered
            .iter()
            .filter(|(to, _)| to.id == connection)
            .map(|(_, message)| message.clone())
            .collect()
    }

    /// All deliveries so far, in order.
    pub fn deliveries(&self) -> Vec<(Connection, SyncMessage)> {
        lock(&self.state, "transport").delivered.clone()
    }

    /// Drain and return all deliveries so far.
    pub fn take(&self) -> Vec<(Connection, SyncMessage)> {
        std::mem::take(&mut lock(&self.state, "transport").delivered)
    }

    pub fn len(&self) -> usize {
        lock(&self.state, "transport").delivered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SyncTransport for MemoryTransport {
    fn send(&self, connection: &Connection, message: &SyncMessage) -> Result<(), DeliveryError> {
        let mut state = lock(&self.state, "transport");
        if state.failing.contains(&connection.id) {
            return Err(DeliveryError::Disconnected {
                connection: connection.id,
            });
        }
        state.delivered.push((connection.clone(), message.clone()));
        Ok(())
    }
}
