//! Owner of every session, indexed by participant.
//!
//! Sessions are never removed once created; a finished session stays
//! reachable for chat and replay until [`SessionRegistry::clear`].

use std::collections::HashMap;

use gridduel_protocol::ConnectionId;
use gridduel_replay::Timestamp;

use crate::{GameSession, RoomConfig, SessionId};

/// Result of [`SessionRegistry::add_spectator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectatorJoin {
    /// Watching this session. `added` is `false` if it already was.
    Watching { session: SessionId, added: bool },
    /// No session exists yet; the spectator joins the next one created.
    Pending,
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<SessionId, GameSession>,
    by_connection: HashMap<ConnectionId, SessionId>,
    next_id: u64,
    latest: Option<SessionId>,
    pending_spectators: Vec<ConnectionId>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session with `a` as side A and `b` as side B.
    ///
    /// Both participants are indexed to the new session, replacing any
    /// older session they were in. Parked spectators are attached to it.
    pub fn create_session(
        &mut self,
        a: ConnectionId,
        b: ConnectionId,
        config: &RoomConfig,
        started_at: Timestamp,
    ) -> SessionId {
        self.next_id += 1;
        let id = SessionId::new(self.next_id);

        let mut session = GameSession::new(id, a, b, config, started_at);
        for spectator in self.pending_spectators.drain(..) {
            session.add_spectator(spectator);
        }

        self.by_connection.insert(a, id);
        self.by_connection.insert(b, id);
        self.sessions.insert(id, session);
        self.latest = Some(id);

        tracing::info!(session = %id, player_a = %a, player_b = %b, "session created");
        id
    }

    /// The session `conn` most recently played in.
    pub fn lookup(&self, conn: ConnectionId) -> Option<&GameSession> {
        self.by_connection
            .get(&conn)
            .and_then(|id| self.sessions.get(id))
    }

    pub fn lookup_mut(&mut self, conn: ConnectionId) -> Option<&mut GameSession> {
        self.by_connection
            .get(&conn)
            .and_then(|id| self.sessions.get_mut(id))
    }

    pub fn get(&self, id: SessionId) -> Option<&GameSession> {
        self.sessions.get(&id)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut GameSession> {
        self.sessions.get_mut(&id)
    }

    /// The most recently created session.
    pub fn latest(&self) -> Option<SessionId> {
        self.latest
    }

    /// Registers `conn` as a spectator of the most recent session, or parks
    /// it until one is created.
    pub fn add_spectator(&mut self, conn: ConnectionId) -> SpectatorJoin {
        match self.latest.and_then(|id| self.sessions.get_mut(&id)) {
            Some(session) => SpectatorJoin::Watching {
                session: session.id(),
                added: session.add_spectator(conn),
            },
            None => {
                if !self.pending_spectators.contains(&conn) {
                    self.pending_spectators.push(conn);
                }
                SpectatorJoin::Pending
            }
        }
    }

    /// Removes `conn` from every spectator set and the pending list.
    /// Returns the number of sessions it was removed from.
    pub fn remove_spectator(&mut self, conn: ConnectionId) -> usize {
        self.pending_spectators.retain(|id| *id != conn);
        self.sessions
            .values_mut()
            .map(|s| s.remove_spectator(conn))
            .filter(|removed| *removed)
            .count()
    }

    /// Drops every session and parked spectator. Ids keep increasing.
    pub fn clear(&mut self) {
        self.sessions.clear();
        self.by_connection.clear();
        self.pending_spectators.clear();
        self.latest = None;
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
