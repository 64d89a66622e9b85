//! The index-management log: which replay number belongs to whom.
//!
//! Stored as a record sequence in the same style as replay files, with
//! two kinds:
//!
//! ```text
//! 1,<lastUsedIndex>
//! 2,<index>,<playerA>,<playerB>
//! ```
//!
//! The file is rewritten whole on every save so the `LastUsedIndex`
//! record is always current.

use crate::record::Cursor;
use crate::ReplayError;

const LAST_USED_KIND: &str = "1";
const INDEX_AND_NAME_KIND: &str = "2";

/// One line of the index file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexRecord {
    LastUsedIndex(u32),
    IndexAndName { index: u32, label: String },
}

impl IndexRecord {
    /// Serializes the record to its one-line form.
    pub fn encode(&self) -> String {
        match self {
            Self::LastUsedIndex(index) => format!("{LAST_USED_KIND},{index}"),
            Self::IndexAndName { index, label } => {
                format!("{INDEX_AND_NAME_KIND},{index},{label}")
            }
        }
    }

    /// Parses one line. Unknown kinds and blank lines yield `Ok(None)`.
    ///
    /// # Errors
    /// Returns [`ReplayError::Malformed`] if a known kind has bad fields.
    pub fn decode(line: &str) -> Result<Option<Self>, ReplayError> {
        let mut fields = Cursor::new(line);
        let record = match fields.kind() {
            Some(LAST_USED_KIND) => Self::LastUsedIndex(fields.number("index")?),
            Some(INDEX_AND_NAME_KIND) => {
                let index = fields.number("index")?;
                Self::IndexAndName {
                    index,
                    label: fields.rest(),
                }
            }
            _ => return Ok(None),
        };
        Ok(Some(record))
    }
}

/// A saved replay's number and the participants it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub index: u32,
    pub label: String,
}

/// In-memory form of the index file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexLog {
    last_used: u32,
    entries: Vec<IndexEntry>,
}

impl IndexLog {
    /// The highest index handed out so far. `0` means none.
    pub fn last_used(&self) -> u32 {
        self.last_used
    }

    /// The index the next save will receive.
    pub fn next_index(&self) -> u32 {
        self.last_used.saturating_add(1)
    }

    /// Every saved replay, in save order.
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Looks up the participants label for an index.
    pub fn label(&self, index: u32) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.index == index)
            .map(|e| e.label.as_str())
    }

    /// Records a save under `index`, advancing `last_used` if needed.
    pub fn record(&mut self, index: u32, label: impl Into<String>) {
        self.last_used = self.last_used.max(index);
        self.entries.push(IndexEntry {
            index,
            label: label.into(),
        });
    }

    /// Encodes the whole log: `LastUsedIndex` first, then one entry per save.
    pub fn encode(&self) -> Vec<String> {
        std::iter::once(IndexRecord::LastUsedIndex(self.last_used))
            .chain(self.entries.iter().map(|e| IndexRecord::IndexAndName {
                index: e.index,
                label: e.label.clone(),
            }))
            .map(|r| r.encode())
            .collect()
    }

    /// Rebuilds the log from its lines.
    ///
    /// `last_used` ends up as the larger of the stored `LastUsedIndex`
    /// and the highest entry index, so a stale counter can never hand out
    /// an index that is already taken.
    ///
    /// # Errors
    /// Returns [`ReplayError::Malformed`] if a known record has bad fields.
    pub fn decode<I, S>(lines: I) -> Result<Self, ReplayError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut log = Self::default();
        for line in lines {
            match IndexRecord::decode(line.as_ref())? {
                Some(IndexRecord::LastUsedIndex(index)) => {
                    log.last_used = log.last_used.max(index);
                }
                Some(IndexRecord::IndexAndName { index, label }) => {
                    log.record(index, label);
                }
                None => {}
            }
        }
        Ok(log)
    }
}

// =========================================================================
// Tests
// =========================================================================
