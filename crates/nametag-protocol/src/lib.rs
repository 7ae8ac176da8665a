mod messages;
mod types;

pub use messages::{SyncMessage, TeamAction};
pub use types::{SubjectId, TeamName};
