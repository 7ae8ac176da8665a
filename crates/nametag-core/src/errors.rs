//! Error types for nametag-core.

use crate::transport::ConnectionId;
use crate::types::GroupId;

/// Errors surfaced to callers of a [`LabelGroup`](crate::LabelGroup).
#[derive(Debug, thiserror::Error)]
pub enum LabelError {
    #[error("cannot {operation}: {group} has been deleted")]
    InvalidState {
        group: GroupId,
        operation: &'static str,
    },

    #[error("request queue closed")]
    QueueClosed,
}

impl LabelError {
    /// Error code for programmatic handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            LabelError::InvalidState { .. } => "invalid_state",
            LabelError::QueueClosed => "queue_closed",
        }
    }

    /// Whether this error is caused by the caller's lifecycle handling.
    pub fn is_user_error(&self) -> bool {
        matches!(self, LabelError::InvalidState { .. })
    }
}

/// A single observer's message could not be delivered.
///
/// Never aborts a broadcast: the broadcaster logs it and moves on to the
/// next observer.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("connection {connection} closed")]
    Disconnected { connection: ConnectionId },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DeliveryError {
    pub fn error_code(&self) -> &'static str {
        match self {
            DeliveryError::Disconnected { .. } => "disconnected",
            DeliveryError::Transport(_) => "transport_error",
            DeliveryError::Io(_) => "io_error",
        }
    }
}
