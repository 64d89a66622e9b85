//! Wire protocol for GridDuel.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`ClientCommand`], [`ServerEvent`], [`Side`], the
//!   signifier enums): the typed form of every frame.
//! - **Codec** ([`Codec`] trait, [`CsvCodec`]): how those types are
//!   converted to and from comma-separated text frames.
//! - **Errors** ([`ProtocolError`]): what can go wrong while parsing.
//!
//! # Frame layout
//!
//! Field 0 is an integer signifier naming the command or event kind.
//! The remaining fields are positional and kind-specific:
//!
//! ```text
//! 1,alice,secret      CreateAccount(name, password)
//! 5,2,0               Play(x = 2, y = 0)
//! 9,2,0,1             MarkSpace(x = 2, y = 0, token = A)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, CsvCodec, FIELD_SEPARATOR};
pub use error::ProtocolError;
pub use gridduel_transport::ConnectionId;
pub use types::{
    ClientCommand, ClientSignifier, ServerEvent, ServerSignifier, Side,
};
