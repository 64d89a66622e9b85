//! Unified error type for the GridDuel server.

use std::path::PathBuf;

use gridduel_account::AccountError;
use gridduel_protocol::ProtocolError;
use gridduel_replay::ReplayError;
use gridduel_room::RoomError;
use gridduel_transport::TransportError;

/// Top-level error that wraps every crate-specific error.
///
/// Each layer keeps its own error enum; this one exists so the server
/// surface can use `?` across all of them.
#[derive(Debug, thiserror::Error)]
pub enum GridDuelError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame could not be parsed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The account store failed or rejected a request.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// A play was refused by the session.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// Replay storage failed.
    #[error(transparent)]
    Replay(#[from] ReplayError),

    /// The server configuration file could not be read or parsed.
    #[error("invalid config {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    /// The hub task has stopped and can no longer accept events.
    #[error("hub is not running")]
    HubUnavailable,
}
