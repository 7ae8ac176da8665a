//! Team bucketing engine for prefix/suffix nametags.
//!
//! Binds each labeled subject to a small-integer-named team whose prefix and
//! suffix render around the subject's name, and keeps every observer of a
//! [`LabelGroup`] in sync with the group's teams.
//!
//! The host supplies two collaborators: a [`Presence`] that resolves subjects
//! to live connections, and a [`SyncTransport`] that delivers
//! [`SyncMessage`]s. Everything else lives here.

pub mod broadcast;
pub mod directory;
pub mod errors;
pub mod group;
pub mod logging;
pub mod memory;
mod pool;
pub mod queue;
pub mod requests;
pub mod transport;
pub mod types;

pub use broadcast::{DeliveryReport, SyncBroadcaster};
pub use directory::TeamDirectory;
pub use errors::{DeliveryError, LabelError};
pub use group::LabelGroup;
pub use logging::{init_logging, init_logging_with, with_bootstrap_logging};
pub use memory::{MemoryPresence, MemoryTransport};
pub use queue::{DrainSummary, RequestQueue, RequestSender, request_channel};
pub use requests::{
    ChangeKind, ChangeOutcome, ChangePolicy, ChangeReason, LabelChange, LabelRequest, Policies,
};
pub use transport::{Connection, ConnectionId, Presence, SyncContext, SyncTransport};
pub use types::{GroupId, Team, TeamId, TeamSnapshot};

pub use nametag_protocol::{SubjectId, SyncMessage, TeamAction, TeamName};
