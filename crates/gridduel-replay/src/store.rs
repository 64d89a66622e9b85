//! On-disk replay persistence.
//!
//! Layout under the data directory:
//!
//! ```text
//! replay_index.txt    index-management log
//! replay_1.txt        one replay file per saved session
//! replay_2.txt
//! ```
//!
//! Every file is written to a `.tmp` sibling and renamed into place, so
//! readers see either the old file or the complete new one.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::{IndexEntry, IndexLog, ReplayError, ReplayLog};

const INDEX_FILE: &str = "replay_index.txt";

/// Owns the replay directory and the process-wide index counter.
///
/// The counter is recovered from the index file at [`open`](Self::open)
/// and only advances once both the replay file and the rewritten index
/// file are on disk.
#[derive(Debug)]
pub struct ReplayStore {
    dir: PathBuf,
    index: IndexLog,
}

impl ReplayStore {
    /// Opens the store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    /// - [`ReplayError::Io`] if the directory or index file can't be read
    /// - [`ReplayError::Malformed`] if the index file is corrupt
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let index = match fs::read_to_string(dir.join(INDEX_FILE)) {
            Ok(text) => IndexLog::decode(text.lines())?,
            Err(e) if e.kind() == ErrorKind::NotFound => IndexLog::default(),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            dir = %dir.display(),
            last_used = index.last_used(),
            saved = index.entries().len(),
            "replay store opened"
        );
        Ok(Self { dir, index })
    }

    /// Persists a finished session under the next index and returns it.
    ///
    /// # Errors
    /// Returns [`ReplayError::Io`] if either file can't be written. The
    /// counter is left unchanged in that case.
    pub fn save(
        &mut self,
        log: &ReplayLog,
        label: &str,
    ) -> Result<u32, ReplayError> {
        let index = self.index.next_index();
        write_lines(&self.replay_path(index), &log.serialize())?;

        let mut updated = self.index.clone();
        updated.record(index, label);
        write_lines(&self.index_path(), &updated.encode())?;

        self.index = updated;
        tracing::info!(index, label, moves = log.len(), "replay saved");
        Ok(index)
    }

    /// Reads the raw records of a saved replay, exactly as stored.
    ///
    /// # Errors
    /// - [`ReplayError::NotFound`] if no file exists for `index`
    /// - [`ReplayError::Io`] on any other read failure
    pub fn load_records(&self, index: u32) -> Result<Vec<String>, ReplayError> {
        match fs::read_to_string(self.replay_path(index)) {
            Ok(text) => Ok(text.lines().map(str::to_string).collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ReplayError::NotFound(index))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Reads and decodes a saved replay.
    ///
    /// # Errors
    /// Any error from [`load_records`](Self::load_records) or
    /// [`ReplayLog::deserialize`].
    pub fn load(&self, index: u32) -> Result<ReplayLog, ReplayError> {
        ReplayLog::deserialize(self.load_records(index)?)
    }

    /// The highest index handed out so far, if any.
    pub fn last_used(&self) -> Option<u32> {
        match self.index.last_used() {
            0 => None,
            n => Some(n),
        }
    }

    /// Every saved replay, in save order.
    pub fn entries(&self) -> &[IndexEntry] {
        self.index.entries()
    }

    /// Rewrites the index file from memory.
    ///
    /// # Errors
    /// Returns [`ReplayError::Io`] if the write fails.
    pub fn flush(&self) -> Result<(), ReplayError> {
        write_lines(&self.index_path(), &self.index.encode())?;
        tracing::debug!(last_used = self.index.last_used(), "replay index flushed");
        Ok(())
    }

    /// The directory this store writes into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    fn replay_path(&self, index: u32) -> PathBuf {
        self.dir.join(format!("replay_{index}.txt"))
    }
}

/// Writes one record per line via a temporary sibling and a rename.
///
/// The file contents are synced before the rename and the directory entry
/// after it, so a returned `Ok` survives a power loss.
fn write_lines(path: &Path, lines: &[String]) -> Result<(), ReplayError> {
    let mut body = lines.join("\n");
    body.push('\n');

    let tmp = path.with_extension("tmp");
    let mut file = File::create(&tmp)?;
    file.write_all(body.as_bytes())?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp, path)?;
    sync_parent(path)
}

#[cfg(unix)]
fn sync_parent(path: &Path) -> Result<(), ReplayError> {
    if let Some(dir) = path.parent() {
        File::open(dir)?.sync_all()?;
    }
    Ok(())
}

// Directories can't be opened as files here; the rename is as far as it goes.
#[cfg(not(unix))]
fn sync_parent(_path: &Path) -> Result<(), ReplayError> {
    Ok(())
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SessionMeta, Timestamp};
    use gridduel_protocol::{ConnectionId, Side};

    fn log_for(a: u64, b: u64) -> ReplayLog {
        let at = Timestamp::from_fields(2026, 10, 14, 8, 0, 0).unwrap();
        let mut log = ReplayLog::new(SessionMeta {
            player_a: ConnectionId::new(a),
            player_b: ConnectionId::new(b),
            grid_width: 3,
            grid_height: 3,
            started_at: at,
        });
        log.append(Side::A, 1, 1, at);
        log
    }

    #[test]
    fn test_open_empty_dir_has_no_last_used() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReplayStore::open(dir.path()).unwrap();
        assert_eq!(store.last_used(), None);
        assert!(store.entries().is_empty());
    }

    #[test]
    fn test_save_allocates_increasing_indices() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ReplayStore::open(dir.path()).unwrap();

        let first = store.save(&log_for(1, 2), "1,2").unwrap();
        let second = store.save(&log_for(3, 4), "3,4").unwrap();

        assert_eq!((first, second), (1, 2));
        assert_eq!(store.last_used(), Some(2));
    }

    #[test]
    fn test_save_rewrites_index_file_in_full() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ReplayStore::open(dir.path()).unwrap();
        store.save(&log_for(1, 2), "1,2").unwrap();
        store.save(&log_for(3, 4), "3,4").unwrap();

        let text = fs::read_to_string(dir.path().join(INDEX_FILE)).unwrap();
        assert_eq!(text, "1,2\n2,1,1,2\n2,2,3,4\n");
    }

    #[test]
    fn test_open_recovers_counter_after_restart() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = ReplayStore::open(dir.path()).unwrap();
            store.save(&log_for(1, 2), "1,2").unwrap();
        }

        let mut store = ReplayStore::open(dir.path()).unwrap();
        assert_eq!(store.last_used(), Some(1));
        assert_eq!(store.save(&log_for(5, 6), "5,6").unwrap(), 2);
    }

    #[test]
    fn test_load_returns_saved_log() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ReplayStore::open(dir.path()).unwrap();
        let log = log_for(1, 2);
        let index = store.save(&log, "1,2").unwrap();

        assert_eq!(store.load(index).unwrap(), log);
        assert_eq!(store.load_records(index).unwrap(), log.serialize());
    }

    #[test]
    fn test_load_missing_index_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReplayStore::open(dir.path()).unwrap();
        assert!(matches!(store.load_records(7), Err(ReplayError::NotFound(7))));
    }

    #[test]
    fn test_save_leaves_no_temporary_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ReplayStore::open(dir.path()).unwrap();
        store.save(&log_for(1, 2), "1,2").unwrap();

        let mut names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["replay_1.txt", "replay_index.txt"]);
    }

    #[test]
    fn test_save_into_missing_dir_fails_without_advancing() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ReplayStore::open(dir.path()).unwrap();
        store.save(&log_for(1, 2), "1,2").unwrap();
        fs::remove_dir_all(dir.path()).unwrap();

        assert!(matches!(
            store.save(&log_for(3, 4), "3,4"),
            Err(ReplayError::Io(_))
        ));
        assert_eq!(store.last_used(), Some(1));
    }

    #[test]
    fn test_flush_writes_current_index() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReplayStore::open(dir.path()).unwrap();
        store.flush().unwrap();

        let text = fs::read_to_string(dir.path().join(INDEX_FILE)).unwrap();
        assert_eq!(text, "1,0\n");
    }
}
