//! Core protocol types for GridDuel's wire format.
//!
//! Every frame on the wire maps to exactly one of the two enums here:
//! [`ClientCommand`] for client → server, [`ServerEvent`] for
//! server → client. The numeric signifiers are fixed; clients built
//! against this table must agree with it byte for byte.

use std::fmt;

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// One of the two fixed seats in a session.
///
/// The session converts a participant's connection id into a `Side`
/// once, and everything downstream (grid cells, replay records, mark
/// events) talks in sides rather than connection ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The player who was waiting in the queue. Moves first.
    A,
    /// The player whose join completed the pairing.
    B,
}

impl Side {
    /// The integer token used for this side on the wire.
    pub fn token(self) -> u8 {
        match self {
            Self::A => 1,
            Self::B => 2,
        }
    }

    /// Parses a wire token back into a side.
    pub fn from_token(token: u8) -> Option<Self> {
        match token {
            1 => Some(Self::A),
            2 => Some(Self::B),
            _ => None,
        }
    }

    /// The opposing side.
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

// ---------------------------------------------------------------------------
// Signifiers
// ---------------------------------------------------------------------------

/// Field-0 values for client → server frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ClientSignifier {
    CreateAccount = 1,
    Login = 2,
    JoinQueueForGameRoom = 3,
    JoinQueueAsObserver = 4,
    Play = 5,
    ChatSend = 6,
    RequestReplay = 7,
}

impl ClientSignifier {
    /// The numeric value written in field 0.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Looks up a signifier by its numeric value.
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            1 => Self::CreateAccount,
            2 => Self::Login,
            3 => Self::JoinQueueForGameRoom,
            4 => Self::JoinQueueAsObserver,
            5 => Self::Play,
            6 => Self::ChatSend,
            7 => Self::RequestReplay,
            _ => return None,
        })
    }
}

/// Field-0 values for server → client frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ServerSignifier {
    LoginComplete = 1,
    LoginFailed = 2,
    AccountCreationComplete = 3,
    AccountCreationFailed = 4,
    GameStart = 5,
    GameStartForObserver = 6,
    DoTurn = 7,
    WaitForTurn = 8,
    MarkSpace = 9,
    Draw = 10,
    CurrentPlayerWin = 11,
    OtherPlayerWin = 12,
    ChatRelay = 13,
    ReplayTransferStart = 14,
    ReplayTransferData = 15,
    ReplayTransferEnd = 16,
}

impl ServerSignifier {
    /// The numeric value written in field 0.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Looks up a signifier by its numeric value.
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            1 => Self::LoginComplete,
            2 => Self::LoginFailed,
            3 => Self::AccountCreationComplete,
            4 => Self::AccountCreationFailed,
            5 => Self::GameStart,
            6 => Self::GameStartForObserver,
            7 => Self::DoTurn,
            8 => Self::WaitForTurn,
            9 => Self::MarkSpace,
            10 => Self::Draw,
            11 => Self::CurrentPlayerWin,
            12 => Self::OtherPlayerWin,
            13 => Self::ChatRelay,
            14 => Self::ReplayTransferStart,
            15 => Self::ReplayTransferData,
            16 => Self::ReplayTransferEnd,
            _ => return None,
        })
    }
}

// ---------------------------------------------------------------------------
// ClientCommand
// ---------------------------------------------------------------------------

/// A parsed client → server frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// Register a new account.
    CreateAccount { name: String, password: String },

    /// Authenticate against an existing account.
    Login { name: String, password: String },

    /// Enter the matchmaking queue as a player.
    JoinQueueForGameRoom,

    /// Ask to watch a session as a spectator.
    JoinQueueAsObserver,

    /// Mark the cell at column `x`, row `y`.
    Play { x: usize, y: usize },

    /// Send a chat line to everyone in the sender's session.
    /// Commas inside the text survive: every trailing field is re-joined.
    ChatSend { text: String },

    /// Ask for the replay log to be streamed back.
    RequestReplay,
}

impl ClientCommand {
    /// The signifier this command is sent under.
    pub fn signifier(&self) -> ClientSignifier {
        match self {
            Self::CreateAccount { .. } => ClientSignifier::CreateAccount,
            Self::Login { .. } => ClientSignifier::Login,
            Self::JoinQueueForGameRoom => ClientSignifier::JoinQueueForGameRoom,
            Self::JoinQueueAsObserver => ClientSignifier::JoinQueueAsObserver,
            Self::Play { .. } => ClientSignifier::Play,
            Self::ChatSend { .. } => ClientSignifier::ChatSend,
            Self::RequestReplay => ClientSignifier::RequestReplay,
        }
    }
}

// ---------------------------------------------------------------------------
// ServerEvent
// ---------------------------------------------------------------------------

/// A server → client frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    LoginComplete,
    LoginFailed,
    AccountCreationComplete,
    AccountCreationFailed,

    /// Sent to each participant when a session forms, from their seat.
    GameStart { me: Side, opponent: Side },

    /// Sent to a spectator when it is attached to a session.
    GameStartForObserver { first: Side, second: Side },

    /// "It's your move."
    DoTurn,

    /// "Your opponent is moving."
    WaitForTurn,

    /// A move was accepted; `side` now owns `(x, y)`.
    MarkSpace { x: usize, y: usize, side: Side },

    Draw,

    /// The recipient is (or is watching) the player who just won.
    CurrentPlayerWin,

    /// The recipient's opponent just won.
    OtherPlayerWin,

    /// A chat line, already prefixed with `[sender]: `.
    ChatRelay { text: String },

    ReplayTransferStart,

    /// One serialized replay record, verbatim.
    ReplayTransferData { record: String },

    ReplayTransferEnd,
}

impl ServerEvent {
    /// The signifier this event is sent under.
    pub fn signifier(&self) -> ServerSignifier {
        match self {
            Self::LoginComplete => ServerSignifier::LoginComplete,
            Self::LoginFailed => ServerSignifier::LoginFailed,
            Self::AccountCreationComplete => {
                ServerSignifier::AccountCreationComplete
            }
            Self::AccountCreationFailed => ServerSignifier::AccountCreationFailed,
            Self::GameStart { .. } => ServerSignifier::GameStart,
            Self::GameStartForObserver { .. } => {
                ServerSignifier::GameStartForObserver
            }
            Self::DoTurn => ServerSignifier::DoTurn,
            Self::WaitForTurn => ServerSignifier::WaitForTurn,
            Self::MarkSpace { .. } => ServerSignifier::MarkSpace,
            Self::Draw => ServerSignifier::Draw,
            Self::CurrentPlayerWin => ServerSignifier::CurrentPlayerWin,
            Self::OtherPlayerWin => ServerSignifier::OtherPlayerWin,
            Self::ChatRelay { .. } => ServerSignifier::ChatRelay,
            Self::ReplayTransferStart => ServerSignifier::ReplayTransferStart,
            Self::ReplayTransferData { .. } => {
                ServerSignifier::ReplayTransferData
            }
            Self::ReplayTransferEnd => ServerSignifier::ReplayTransferEnd,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_token_values_are_fixed() {
        assert_eq!(Side::A.token(), 1);
        assert_eq!(Side::B.token(), 2);
        assert_eq!(Side::from_token(1), Some(Side::A));
        assert_eq!(Side::from_token(2), Some(Side::B));
        assert_eq!(Side::from_token(0), None);
        assert_eq!(Side::from_token(3), None);
    }

    #[test]
    fn test_side_other_flips() {
        assert_eq!(Side::A.other(), Side::B);
        assert_eq!(Side::B.other(), Side::A);
    }

    #[test]
    fn test_client_signifier_codes_cover_one_through_seven() {
        for code in 1..=7 {
            let sig = ClientSignifier::from_code(code).expect("known code");
            assert_eq!(sig.code(), code);
        }
        assert_eq!(ClientSignifier::from_code(0), None);
        assert_eq!(ClientSignifier::from_code(8), None);
    }

    #[test]
    fn test_server_signifier_codes_cover_one_through_sixteen() {
        for code in 1..=16 {
            let sig = ServerSignifier::from_code(code).expect("known code");
            assert_eq!(sig.code(), code);
        }
        assert_eq!(ServerSignifier::from_code(17), None);
    }

    #[test]
    fn test_client_command_signifier_matches_variant() {
        assert_eq!(
            ClientCommand::Play { x: 0, y: 0 }.signifier(),
            ClientSignifier::Play
        );
        assert_eq!(
            ClientCommand::RequestReplay.signifier(),
            ClientSignifier::RequestReplay
        );
    }

    #[test]
    fn test_server_event_signifier_matches_variant() {
        let mark = ServerEvent::MarkSpace { x: 1, y: 2, side: Side::B };
        assert_eq!(mark.signifier(), ServerSignifier::MarkSpace);
        assert_eq!(mark.signifier().code(), 9);
        assert_eq!(ServerEvent::ReplayTransferEnd.signifier().code(), 16);
    }
}
