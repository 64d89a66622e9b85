//! Single-slot matchmaking.

use gridduel_protocol::ConnectionId;

/// Result of [`MatchQueue::enqueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    /// The caller is now the waiting connection.
    Waiting,
    /// The caller was paired with the connection that had been waiting.
    Paired {
        waiting: ConnectionId,
        joiner: ConnectionId,
    },
}

/// Holds at most one connection waiting for an opponent.
#[derive(Debug, Default)]
pub struct MatchQueue {
    waiting: Option<ConnectionId>,
}

impl MatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers `id` for a match.
    ///
    /// The first caller waits; the next distinct caller is paired with it
    /// and the slot empties. Enqueuing the waiting id again is a no-op.
    pub fn enqueue(&mut self, id: ConnectionId) -> MatchResult {
        match self.waiting {
            Some(waiting) if waiting == id => MatchResult::Waiting,
            Some(waiting) => {
                self.waiting = None;
                MatchResult::Paired { waiting, joiner: id }
            }
            None => {
                self.waiting = Some(id);
                MatchResult::Waiting
            }
        }
    }

    /// Clears the slot if `id` holds it. Returns `true` if it did.
    pub fn remove(&mut self, id: ConnectionId) -> bool {
        if self.waiting == Some(id) {
            self.waiting = None;
            true
        } else {
            false
        }
    }

    pub fn waiting(&self) -> Option<ConnectionId> {
        self.waiting
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_none()
    }
}
