//! The append-only replay log of one session.

use gridduel_protocol::Side;

use crate::{Move, ReplayError, ReplayRecord, SessionMeta, Timestamp};

/// Session metadata plus every accepted move, in acceptance order.
///
/// Append-only: moves can be added but never edited or removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayLog {
    meta: SessionMeta,
    moves: Vec<Move>,
}

impl ReplayLog {
    /// Starts an empty log for a session.
    pub fn new(meta: SessionMeta) -> Self {
        Self {
            meta,
            moves: Vec::new(),
        }
    }

    /// Records one accepted move.
    pub fn append(&mut self, side: Side, x: usize, y: usize, at: Timestamp) {
        self.moves.push(Move { side, x, y, at });
    }

    /// The settings this log was started with.
    pub fn meta(&self) -> &SessionMeta {
        &self.meta
    }

    /// Every recorded move, oldest first.
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// The most recent move, if any.
    pub fn last_move(&self) -> Option<&Move> {
        self.moves.last()
    }

    /// Number of recorded moves.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Returns `true` if no move has been recorded.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// The log as an ordered record sequence, settings first.
    pub fn records(&self) -> impl Iterator<Item = ReplayRecord> + '_ {
        std::iter::once(ReplayRecord::SessionSettings(self.meta))
            .chain(self.moves.iter().copied().map(ReplayRecord::Move))
    }

    /// Encodes every record, one line each, settings first.
    pub fn serialize(&self) -> Vec<String> {
        self.records().map(|r| r.encode()).collect()
    }

    /// Rebuilds a log from encoded records.
    ///
    /// Unknown record kinds are skipped. The first settings record wins;
    /// later ones are ignored.
    ///
    /// # Errors
    /// - [`ReplayError::Malformed`] if a known record has bad fields
    /// - [`ReplayError::MissingSettings`] if no settings record is present
    pub fn deserialize<I, S>(records: I) -> Result<Self, ReplayError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut meta = None;
        let mut moves = Vec::new();

        for line in records {
            match ReplayRecord::decode(line.as_ref())? {
                Some(ReplayRecord::SessionSettings(m)) => {
                    if meta.is_none() {
                        meta = Some(m);
                    }
                }
                Some(ReplayRecord::Move(mv)) => moves.push(mv),
                None => {}
            }
        }

        let meta = meta.ok_or(ReplayError::MissingSettings)?;
        Ok(Self { meta, moves })
    }
}

// =========================================================================
// Tests
// =========================================================================
