//! Error types for the room layer.

use gridduel_protocol::ConnectionId;

use crate::SessionId;

/// Reasons a play is refused.
///
/// None of these reach the client: the dispatcher logs them and moves on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// The connection is not one of the session's two participants.
    #[error("{0} is not a participant of session {1}")]
    NotParticipant(ConnectionId, SessionId),

    /// The coordinates fall outside the grid.
    #[error("cell ({x}, {y}) is outside the grid")]
    OutOfBounds { x: usize, y: usize },

    /// The cell already has an owner (strict policy only).
    #[error("cell ({x}, {y}) is already occupied")]
    CellOccupied { x: usize, y: usize },

    /// The other side is due to move (strict policy only).
    #[error("{0} played out of turn")]
    NotYourTurn(ConnectionId),

    /// The session has already been won or drawn.
    #[error("session {0} is over")]
    SessionOver(SessionId),
}
