//! Smallest-free-integer allocator for team ids.

use std::collections::BTreeSet;

use crate::types::TeamId;

/// Set of team ids currently held by live teams in one group.
#[derive(Debug, Default)]
pub(crate) struct IdentifierPool {
    allocated: BTreeSet<u32>,
}

impl IdentifierPool {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Allocate the smallest non-negative id not currently held.
    pub(crate) fn allocate(&mut self) -> TeamId {
        // The set is ordered, so the first gap is the first id that does not
        // equal its position.
        let id = self
            .allocated
            .iter()
            .zip(0u32..)
            .find(|(held, expected)| **held != *expected)
            .map(|(_, expected)| expected)
            .unwrap_or(self.allocated.len() as u32);
        self.allocated.insert(id);
        TeamId(id)
    }

    /// Release `id`. No-op if it is not held.
    pub(crate) fn release(&mut self, id: TeamId) {
        self.allocated.remove(&id.0);
    }

    pub(crate) fn contains(&self, id: TeamId) -> bool {
        self.allocated.contains(&id.0)
    }

    pub(crate) fn len(&self) -> usize {
        self.allocated.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.allocated.is_empty()
    }
}
