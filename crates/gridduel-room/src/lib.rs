//! Session orchestration for GridDuel.
//!
//! Everything that turns two connections into a refereed game lives
//! here, none of it async: the dispatcher drives it one event at a time.
//!
//! # Key types
//!
//! - [`MatchQueue`]: holds at most one waiting connection, pairs the next
//! - [`SessionRegistry`]: owns every [`GameSession`], indexed by participant
//! - [`GameSession`]: one grid, its move count, spectators, and replay log
//! - [`Grid`] / [`evaluate`]: cell storage and win/draw detection
//! - [`RoomConfig`]: grid dimensions and move-validation policy

mod config;
mod error;
mod queue;
mod registry;
mod room;
mod rules;

pub use config::{MovePolicy, RoomConfig, SessionState};
pub use error::RoomError;
pub use queue::{MatchQueue, MatchResult};
pub use registry::{SessionRegistry, SpectatorJoin};
pub use room::{GameSession, MoveOutcome, SessionId};
pub use rules::{evaluate, Cell, Grid, Line, Outcome};
