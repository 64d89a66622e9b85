//! Account management for GridDuel.
//!
//! This crate handles who a connection claims to be:
//!
//! 1. **Storage**: the [`AccountStore`] trait is the seam to whatever
//!    holds name/password pairs. [`MemoryAccountStore`] and
//!    [`FileAccountStore`] are provided.
//! 2. **Registration and login**: [`AccountService`] applies the rules
//!    (unique names, matching passwords) and remembers which account
//!    each connection logged in as.
//!
//! # How it fits in the stack
//!
//! ```text
//! Dispatcher (above)  ← turns AccountError into *Failed events
//!     ↕
//! Account Layer (this crate)
//!     ↕
//! Protocol Layer (below)  ← provides ConnectionId
//! ```

mod error;
mod service;
mod store;

pub use error::AccountError;
pub use service::AccountService;
pub use store::{Account, AccountStore, FileAccountStore, MemoryAccountStore};
