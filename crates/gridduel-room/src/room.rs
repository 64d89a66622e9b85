//! A single two-player session: grid, turn state, spectators, replay log.
//!
//! The session referees moves but never talks to the network. The
//! dispatcher asks it to [`apply_move`](GameSession::apply_move) and turns
//! the returned [`MoveOutcome`] into outbound events.

use std::fmt;

use gridduel_protocol::{ConnectionId, Side};
use gridduel_replay::{ReplayLog, SessionMeta, Timestamp};

use crate::{evaluate, Cell, Grid, MovePolicy, Outcome, RoomConfig, RoomError, SessionState};

/// Registry-assigned session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

/// An accepted move and what it did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub side: Side,
    pub x: usize,
    pub y: usize,
    pub outcome: Outcome,
}

/// One refereed game between two connections.
#[derive(Debug)]
pub struct GameSession {
    id: SessionId,
    player_a: ConnectionId,
    player_b: ConnectionId,
    grid: Grid,
    move_count: usize,
    spectators: Vec<ConnectionId>,
    state: SessionState,
    policy: MovePolicy,
    last_side: Option<Side>,
    replay: ReplayLog,
    replay_index: Option<u32>,
}

impl GameSession {
    /// Creates a session with an empty grid. `player_a` moves first.
    pub fn new(
        id: SessionId,
        player_a: ConnectionId,
        player_b: ConnectionId,
        config: &RoomConfig,
        started_at: Timestamp,
    ) -> Self {
        let replay = ReplayLog::new(SessionMeta {
            player_a,
            player_b,
            grid_width: config.grid_width,
            grid_height: config.grid_height,
            started_at,
        });
        Self {
            id,
            player_a,
            player_b,
            grid: Grid::new(config.grid_width, config.grid_height),
            move_count: 0,
            spectators: Vec::new(),
            state: SessionState::AwaitingFirstMove,
            policy: config.move_policy,
            last_side: None,
            replay,
            replay_index: None,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn player_a(&self) -> ConnectionId {
        self.player_a
    }

    pub fn player_b(&self) -> ConnectionId {
        self.player_b
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn move_count(&self) -> usize {
        self.move_count
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn replay(&self) -> &ReplayLog {
        &self.replay
    }

    /// The index this session was persisted under, once saved.
    pub fn replay_index(&self) -> Option<u32> {
        self.replay_index
    }

    pub fn set_replay_index(&mut self, index: u32) {
        self.replay_index = Some(index);
    }

    /// Spectators in the order they joined.
    pub fn spectators(&self) -> &[ConnectionId] {
        &self.spectators
    }

    // -----------------------------------------------------------------------
    // Participants
    // -----------------------------------------------------------------------

    /// The side `conn` plays, or `None` if it isn't a participant.
    pub fn side_of(&self, conn: ConnectionId) -> Option<Side> {
        if conn == self.player_a {
            Some(Side::A)
        } else if conn == self.player_b {
            Some(Side::B)
        } else {
            None
        }
    }

    /// The connection playing `side`.
    pub fn participant(&self, side: Side) -> ConnectionId {
        match side {
            Side::A => self.player_a,
            Side::B => self.player_b,
        }
    }

    /// The other participant, if `conn` is one of the two.
    pub fn opponent(&self, conn: ConnectionId) -> Option<ConnectionId> {
        self.side_of(conn).map(|side| self.participant(side.other()))
    }

    /// The side expected to move next, or `None` once the game is over.
    pub fn side_to_move(&self) -> Option<Side> {
        if self.is_terminal() {
            return None;
        }
        Some(self.last_side.map_or(Side::A, Side::other))
    }

    /// Every connection that receives session broadcasts: both players,
    /// then spectators in join order.
    pub fn recipients(&self) -> Vec<ConnectionId> {
        let mut out = Vec::with_capacity(2 + self.spectators.len());
        out.push(self.player_a);
        out.push(self.player_b);
        out.extend(
            self.spectators
                .iter()
                .copied()
                .filter(|id| *id != self.player_a && *id != self.player_b),
        );
        out
    }

    // -----------------------------------------------------------------------
    // Spectators
    // -----------------------------------------------------------------------

    /// Adds a spectator. Returns `false` if it was already watching.
    pub fn add_spectator(&mut self, conn: ConnectionId) -> bool {
        if self.spectators.contains(&conn) {
            return false;
        }
        self.spectators.push(conn);
        true
    }

    /// Removes a spectator. Returns `true` if it was watching.
    pub fn remove_spectator(&mut self, conn: ConnectionId) -> bool {
        let before = self.spectators.len();
        self.spectators.retain(|id| *id != conn);
        self.spectators.len() != before
    }

    // -----------------------------------------------------------------------
    // Moves
    // -----------------------------------------------------------------------

    /// Validates and applies a play by `conn` at `(x, y)`.
    ///
    /// On success the cell is marked, the move count advances, a move
    /// record stamped `at` is appended to the replay log, and the grid is
    /// evaluated for a win or draw.
    ///
    /// # Errors
    /// - [`RoomError::NotParticipant`] if `conn` isn't a player here
    /// - [`RoomError::SessionOver`] if the game is already decided
    /// - [`RoomError::OutOfBounds`] if `(x, y)` is outside the grid
    /// - [`RoomError::NotYourTurn`] if the other side is due (strict only)
    /// - [`RoomError::CellOccupied`] if the cell is taken (strict only)
    pub fn apply_move(
        &mut self,
        conn: ConnectionId,
        x: usize,
        y: usize,
        at: Timestamp,
    ) -> Result<MoveOutcome, RoomError> {
        let side = self
            .side_of(conn)
            .ok_or(RoomError::NotParticipant(conn, self.id))?;

        if self.is_terminal() {
            return Err(RoomError::SessionOver(self.id));
        }
        let Some(cell) = self.grid.get(x, y) else {
            return Err(RoomError::OutOfBounds { x, y });
        };

        if self.policy == MovePolicy::Strict {
            if self.side_to_move() != Some(side) {
                return Err(RoomError::NotYourTurn(conn));
            }
            if cell != Cell::Empty {
                return Err(RoomError::CellOccupied { x, y });
            }
        }

        self.grid.set(x, y, side);
        self.move_count += 1;
        self.last_side = Some(side);
        self.replay.append(side, x, y, at);

        let outcome = evaluate(&self.grid, side, x, y, self.move_count);
        self.state = match outcome {
            Outcome::Win(winner, _) => SessionState::Won(winner),
            Outcome::Draw => SessionState::Drawn,
            Outcome::Continue => SessionState::InProgress,
        };

        tracing::debug!(
            session = %self.id,
            %conn,
            %side,
            x,
            y,
            state = %self.state,
            "move applied"
        );
        Ok(MoveOutcome { side, x, y, outcome })
    }
}

// =========================================================================
// Tests
// =========================================================================
