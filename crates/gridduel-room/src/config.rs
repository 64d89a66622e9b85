//! Room configuration and session state machine.

use gridduel_protocol::Side;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// How strictly incoming plays are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovePolicy {
    /// Reject occupied cells and out-of-turn plays.
    #[default]
    Strict,
    /// Accept any in-bounds play: occupied cells are overwritten and turn
    /// order is not checked. Matches the behavior of older servers.
    Lenient,
}

/// Configuration applied to every session created by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Number of columns.
    pub grid_width: usize,

    /// Number of rows.
    pub grid_height: usize,

    /// Move validation policy.
    pub move_policy: MovePolicy,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            grid_width: 3,
            grid_height: 3,
            move_policy: MovePolicy::Strict,
        }
    }
}

impl RoomConfig {
    /// Total number of cells, which is also the move count at which an
    /// undecided game becomes a draw.
    pub fn cell_count(&self) -> usize {
        self.grid_width * self.grid_height
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The lifecycle state of a session.
///
/// ```text
/// AwaitingFirstMove → InProgress ⟲ → { Won, Drawn }
/// ```
///
/// `Won` and `Drawn` are terminal: the session stays in the registry for
/// chat and replay requests but accepts no more moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingFirstMove,
    InProgress,
    Won(Side),
    Drawn,
}

impl SessionState {
    /// Returns `true` once the game has been decided.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Won(_) | Self::Drawn)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AwaitingFirstMove => write!(f, "AwaitingFirstMove"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Won(side) => write!(f, "Won({side})"),
            Self::Drawn => write!(f, "Drawn"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_config_default_is_strict_three_by_three() {
        let config = RoomConfig::default();
        assert_eq!(config.grid_width, 3);
        assert_eq!(config.grid_height, 3);
        assert_eq!(config.cell_count(), 9);
        assert_eq!(config.move_policy, MovePolicy::Strict);
    }

    #[test]
    fn test_room_config_deserializes_with_defaults() {
        let config: RoomConfig =
            serde_json::from_str(r#"{"move_policy":"lenient"}"#).unwrap();
        assert_eq!(config.move_policy, MovePolicy::Lenient);
        assert_eq!(config.grid_width, 3);
    }

    #[test]
    fn test_session_state_is_terminal() {
        assert!(!SessionState::AwaitingFirstMove.is_terminal());
        assert!(!SessionState::InProgress.is_terminal());
        assert!(SessionState::Won(Side::A).is_terminal());
        assert!(SessionState::Drawn.is_terminal());
    }

    #[test]
    fn test_session_state_display() {
        assert_eq!(SessionState::Won(Side::B).to_string(), "Won(B)");
        assert_eq!(SessionState::InProgress.to_string(), "InProgress");
    }
}
