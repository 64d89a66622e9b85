//! Replay logs for GridDuel.
//!
//! A replay log is the ordered record of one session: a settings record
//! (who played, on what grid, starting when) followed by one record per
//! accepted move. This crate provides:
//!
//! - [`ReplayRecord`] / [`ReplayLog`]: the record types and the
//!   line-per-record text codec
//! - [`IndexLog`]: the index-management log mapping replay numbers to
//!   participants
//! - [`ReplayStore`]: persistence of both under a data directory
//!
//! # Record layout
//!
//! ```text
//! 1,3,4,3,3,2026,10,14,9,30,0     settings: A=conn 3, B=conn 4, 3×3, start time
//! 2,1,0,0,2026,10,14,9,30,5       move: side A at (0,0)
//! 2,2,1,1,2026,10,14,9,30,9       move: side B at (1,1)
//! ```
//!
//! Decoding ignores record kinds it doesn't know, so newer writers can
//! add kinds without breaking older readers.

mod error;
mod index;
mod log;
mod record;
mod store;

pub use error::ReplayError;
pub use index::{IndexEntry, IndexLog, IndexRecord};
pub use log::ReplayLog;
pub use record::{Move, ReplayRecord, SessionMeta, Timestamp};
pub use store::ReplayStore;
