//! Error types for the account layer.

/// Errors that can occur while registering or authenticating.
///
/// Everything except [`AccountError::Io`] is a validation failure and
/// is reported back to the client as an explicit failure event.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// An account with this name already exists.
    #[error("account {0:?} already exists")]
    DuplicateName(String),

    /// The name is empty or contains the field separator.
    #[error("invalid account name {0:?}")]
    InvalidName(String),

    /// No account with this name exists.
    #[error("account {0:?} not found")]
    UnknownAccount(String),

    /// The account exists but the password didn't match.
    #[error("wrong password for account {0:?}")]
    WrongPassword(String),

    /// The backing store could not be read or written.
    #[error("account store I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
