//! # GridDuel
//!
//! An authoritative server for two-player grid games (tic-tac-toe by
//! default): accounts, matchmaking, refereed sessions, spectators, chat,
//! and persisted replays.
//!
//! ```text
//! WebSocket ──→ handler task ──HubCommand──→ hub task ──→ Dispatcher
//!     ↑                                          │
//!     └──────── writer task ←── encoded frames ──┘
//! ```
//!
//! Connections are independent tasks, but all game state lives behind the
//! single hub task, which handles one inbound event at a time.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gridduel::prelude::*;
//!
//! # async fn start() -> Result<(), GridDuelError> {
//! let server = GridDuelServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build(MemoryAccountStore::new())
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod dispatcher;
mod error;
mod handler;
mod hub;
mod server;

pub use config::{DispatchConfig, ReplaySource, ServerConfig};
pub use dispatcher::{Dispatcher, Outbound};
pub use error::GridDuelError;
pub use server::{GridDuelServer, GridDuelServerBuilder};

/// Everything needed to run a server, in one import.
pub mod prelude {
    pub use crate::{
        DispatchConfig, Dispatcher, GridDuelError, GridDuelServer, GridDuelServerBuilder,
        Outbound, ReplaySource, ServerConfig,
    };
    pub use gridduel_account::{
        Account, AccountError, AccountService, AccountStore, FileAccountStore,
        MemoryAccountStore,
    };
    pub use gridduel_protocol::{
        ClientCommand, Codec, ConnectionId, CsvCodec, ProtocolError, ServerEvent, Side,
    };
    pub use gridduel_replay::{ReplayError, ReplayLog, ReplayStore, Timestamp};
    pub use gridduel_room::{MovePolicy, RoomConfig, SessionState};
}
