//! Error types for the replay layer.

/// Errors that can occur while decoding or persisting replay data.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// A record of a known kind had missing or unparseable fields.
    #[error("malformed record {line:?}: {reason}")]
    Malformed {
        /// The offending record text.
        line: String,
        /// Which field was wrong.
        reason: &'static str,
    },

    /// A log had no session-settings record.
    #[error("replay log has no session settings record")]
    MissingSettings,

    /// No replay file exists for this index.
    #[error("replay {0} not found")]
    NotFound(u32),

    /// Reading or writing a replay or index file failed.
    #[error("replay I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ReplayError {
    pub(crate) fn malformed(line: &str, reason: &'static str) -> Self {
        Self::Malformed {
            line: line.to_string(),
            reason,
        }
    }
}
