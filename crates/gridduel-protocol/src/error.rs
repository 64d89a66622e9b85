//! Error types for the protocol layer.
//!
//! A `ProtocolError` always means the frame itself is unusable: unknown
//! kind, missing positional field, or a field that doesn't parse. The
//! dispatcher drops such frames without telling the sender.

/// Errors that can occur while decoding a frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// The frame had no signifier at all.
    #[error("empty frame")]
    EmptyFrame,

    /// Field 0 was not a known signifier.
    #[error("unknown signifier: {0:?}")]
    UnknownSignifier(String),

    /// A required positional field was absent.
    #[error("{kind} is missing field `{field}`")]
    MissingField {
        /// The command kind being parsed.
        kind: &'static str,
        /// The name of the absent field.
        field: &'static str,
    },

    /// A positional field was present but could not be parsed.
    #[error("invalid value {value:?} for field `{field}`")]
    InvalidField {
        /// The name of the offending field.
        field: &'static str,
        /// The raw text that failed to parse.
        value: String,
    },
}
