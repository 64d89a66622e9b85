//! Codec trait and the comma-separated implementation.
//!
//! A codec converts between typed frames and the text the transport
//! carries. The server only needs the half that decodes commands and
//! encodes events; [`CsvCodec`] also offers the mirror-image half so
//! clients and tests can speak the same format without duplicating it.

use std::str::FromStr;

use crate::{
    ClientCommand, ClientSignifier, ProtocolError, ServerEvent,
    ServerSignifier, Side,
};

/// Field separator used by every frame.
pub const FIELD_SEPARATOR: char = ',';

/// Converts inbound text frames to commands and outbound events to text.
///
/// `Send + Sync + 'static` because the codec lives inside the hub task
/// for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Parses one inbound frame.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] if the signifier is unknown or a
    /// required field is missing or unparseable.
    fn decode(&self, frame: &str) -> Result<ClientCommand, ProtocolError>;

    /// Serializes one outbound event.
    fn encode(&self, event: &ServerEvent) -> String;
}

// ---------------------------------------------------------------------------
// CsvCodec
// ---------------------------------------------------------------------------

/// The comma-separated codec: `signifier,field,field,...`.
///
/// ```rust
/// use gridduel_protocol::{ClientCommand, Codec, CsvCodec, ServerEvent, Side};
///
/// let codec = CsvCodec;
/// let cmd = codec.decode("5,2,0").unwrap();
/// assert_eq!(cmd, ClientCommand::Play { x: 2, y: 0 });
///
/// let frame = codec.encode(&ServerEvent::MarkSpace { x: 2, y: 0, side: Side::A });
/// assert_eq!(frame, "9,2,0,1");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvCodec;

impl Codec for CsvCodec {
    fn decode(&self, frame: &str) -> Result<ClientCommand, ProtocolError> {
        let mut fields = Fields::new(frame)?;
        let code = fields.signifier()?;
        let signifier = ClientSignifier::from_code(code).ok_or_else(|| {
            ProtocolError::UnknownSignifier(code.to_string())
        })?;

        Ok(match signifier {
            ClientSignifier::CreateAccount => ClientCommand::CreateAccount {
                name: fields.text("CreateAccount", "name")?,
                password: fields.text("CreateAccount", "password")?,
            },
            ClientSignifier::Login => ClientCommand::Login {
                name: fields.text("Login", "name")?,
                password: fields.text("Login", "password")?,
            },
            ClientSignifier::JoinQueueForGameRoom => {
                ClientCommand::JoinQueueForGameRoom
            }
            ClientSignifier::JoinQueueAsObserver => {
                ClientCommand::JoinQueueAsObserver
            }
            ClientSignifier::Play => ClientCommand::Play {
                x: fields.number("Play", "x")?,
                y: fields.number("Play", "y")?,
            },
            ClientSignifier::ChatSend => ClientCommand::ChatSend {
                text: fields.rest(),
            },
            ClientSignifier::RequestReplay => ClientCommand::RequestReplay,
        })
    }

    fn encode(&self, event: &ServerEvent) -> String {
        let code = event.signifier().code();
        match event {
            ServerEvent::GameStart { me, opponent } => {
                format!("{code},{},{}", me.token(), opponent.token())
            }
            ServerEvent::GameStartForObserver { first, second } => {
                format!("{code},{},{}", first.token(), second.token())
            }
            ServerEvent::MarkSpace { x, y, side } => {
                format!("{code},{x},{y},{}", side.token())
            }
            ServerEvent::ChatRelay { text } => format!("{code},{text}"),
            ServerEvent::ReplayTransferData { record } => {
                format!("{code},{record}")
            }
            _ => code.to_string(),
        }
    }
}

impl CsvCodec {
    /// Serializes a command the way a client would send it.
    pub fn encode_command(&self, command: &ClientCommand) -> String {
        let code = command.signifier().code();
        match command {
            ClientCommand::CreateAccount { name, password }
            | ClientCommand::Login { name, password } => {
                format!("{code},{name},{password}")
            }
            ClientCommand::Play { x, y } => format!("{code},{x},{y}"),
            ClientCommand::ChatSend { text } => format!("{code},{text}"),
            ClientCommand::JoinQueueForGameRoom
            | ClientCommand::JoinQueueAsObserver
            | ClientCommand::RequestReplay => code.to_string(),
        }
    }

    /// Parses a server frame the way a client would receive it.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] on unknown signifiers or bad fields.
    pub fn decode_event(
        &self,
        frame: &str,
    ) -> Result<ServerEvent, ProtocolError> {
        let mut fields = Fields::new(frame)?;
        let code = fields.signifier()?;
        let signifier = ServerSignifier::from_code(code).ok_or_else(|| {
            ProtocolError::UnknownSignifier(code.to_string())
        })?;

        Ok(match signifier {
            ServerSignifier::LoginComplete => ServerEvent::LoginComplete,
            ServerSignifier::LoginFailed => ServerEvent::LoginFailed,
            ServerSignifier::AccountCreationComplete => {
                ServerEvent::AccountCreationComplete
            }
            ServerSignifier::AccountCreationFailed => {
                ServerEvent::AccountCreationFailed
            }
            ServerSignifier::GameStart => ServerEvent::GameStart {
                me: fields.side("GameStart", "me")?,
                opponent: fields.side("GameStart", "opponent")?,
            },
            ServerSignifier::GameStartForObserver => {
                ServerEvent::GameStartForObserver {
                    first: fields.side("GameStartForObserver", "first")?,
                    second: fields.side("GameStartForObserver", "second")?,
                }
            }
            ServerSignifier::DoTurn => ServerEvent::DoTurn,
            ServerSignifier::WaitForTurn => ServerEvent::WaitForTurn,
            ServerSignifier::MarkSpace => ServerEvent::MarkSpace {
                x: fields.number("MarkSpace", "x")?,
                y: fields.number("MarkSpace", "y")?,
                side: fields.side("MarkSpace", "side")?,
            },
            ServerSignifier::Draw => ServerEvent::Draw,
            ServerSignifier::CurrentPlayerWin => ServerEvent::CurrentPlayerWin,
            ServerSignifier::OtherPlayerWin => ServerEvent::OtherPlayerWin,
            ServerSignifier::ChatRelay => ServerEvent::ChatRelay {
                text: fields.rest(),
            },
            ServerSignifier::ReplayTransferStart => {
                ServerEvent::ReplayTransferStart
            }
            ServerSignifier::ReplayTransferData => {
                ServerEvent::ReplayTransferData { record: fields.rest() }
            }
            ServerSignifier::ReplayTransferEnd => ServerEvent::ReplayTransferEnd,
        })
    }
}

// ---------------------------------------------------------------------------
// Field cursor
// ---------------------------------------------------------------------------

/// Positional cursor over the fields of one frame.
struct Fields<'a> {
    iter: std::str::Split<'a, char>,
}

impl<'a> Fields<'a> {
    fn new(frame: &'a str) -> Result<Self, ProtocolError> {
        if frame.trim().is_empty() {
            return Err(ProtocolError::EmptyFrame);
        }
        Ok(Self {
            iter: frame.split(FIELD_SEPARATOR),
        })
    }

    fn signifier(&mut self) -> Result<u8, ProtocolError> {
        let raw = self.iter.next().ok_or(ProtocolError::EmptyFrame)?;
        raw.trim()
            .parse()
            .map_err(|_| ProtocolError::UnknownSignifier(raw.to_string()))
    }

    fn text(
        &mut self,
        kind: &'static str,
        field: &'static str,
    ) -> Result<String, ProtocolError> {
        self.iter
            .next()
            .map(str::to_string)
            .ok_or(ProtocolError::MissingField { kind, field })
    }

    fn number<T: FromStr>(
        &mut self,
        kind: &'static str,
        field: &'static str,
    ) -> Result<T, ProtocolError> {
        let raw = self
            .iter
            .next()
            .ok_or(ProtocolError::MissingField { kind, field })?;
        raw.trim().parse().map_err(|_| ProtocolError::InvalidField {
            field,
            value: raw.to_string(),
        })
    }

    fn side(
        &mut self,
        kind: &'static str,
        field: &'static str,
    ) -> Result<Side, ProtocolError> {
        let token: u8 = self.number(kind, field)?;
        Side::from_token(token).ok_or(ProtocolError::InvalidField {
            field,
            value: token.to_string(),
        })
    }

    /// Re-joins every remaining field, restoring the separators.
    fn rest(self) -> String {
        let parts: Vec<&str> = self.iter.collect();
        parts.join(",")
    }
}

// =========================================================================
// Tests
// =========================================================================
