//! Account storage: the seam between GridDuel and wherever accounts live.
//!
//! GridDuel only needs three operations from a store: look a name up,
//! check whether it exists, and add a new pair. Anything that can do
//! that (a flat file, a database, a remote service) implements
//! [`AccountStore`] and plugs into [`AccountService`](crate::AccountService).

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::AccountError;

/// A registered account. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Unique key.
    pub name: String,
    /// Stored as given. No hashing is applied.
    pub password: String,
}

impl Account {
    /// Creates an account value.
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
        }
    }
}

/// Name → password storage.
///
/// `Send + 'static` so the store can move into the hub task that owns
/// the dispatcher.
pub trait AccountStore: Send + 'static {
    /// Returns the account with this exact name, if any.
    fn lookup(&self, name: &str) -> Option<&Account>;

    /// Returns `true` if an account with this name exists.
    fn exists(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Stores a new account.
    ///
    /// # Errors
    /// - [`AccountError::DuplicateName`] if the name is taken
    /// - [`AccountError::Io`] if a persistent store fails to write
    fn add(&mut self, account: Account) -> Result<(), AccountError>;

    /// Number of stored accounts.
    fn len(&self) -> usize;

    /// Returns `true` if the store holds no accounts.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// MemoryAccountStore
// ---------------------------------------------------------------------------

/// A store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: HashMap<String, Account>,
}

impl MemoryAccountStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for MemoryAccountStore {
    fn lookup(&self, name: &str) -> Option<&Account> {
        self.accounts.get(name)
    }

    fn add(&mut self, account: Account) -> Result<(), AccountError> {
        if self.accounts.contains_key(&account.name) {
            return Err(AccountError::DuplicateName(account.name));
        }
        self.accounts.insert(account.name.clone(), account);
        Ok(())
    }

    fn len(&self) -> usize {
        self.accounts.len()
    }
}

// ---------------------------------------------------------------------------
// FileAccountStore
// ---------------------------------------------------------------------------

/// A store backed by a text file with one `name,password` line per account.
///
/// The whole file is read once at open. New accounts are appended to the
/// file before they become visible in memory, so a failed write never
/// leaves an account that would vanish on restart.
#[derive(Debug)]
pub struct FileAccountStore {
    path: PathBuf,
    accounts: MemoryAccountStore,
}

impl FileAccountStore {
    /// Opens (or lazily creates) the account file at `path`.
    ///
    /// Malformed lines are skipped with a warning.
    ///
    /// # Errors
    /// Returns [`AccountError::Io`] if the file exists but can't be read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AccountError> {
        let path = path.as_ref().to_path_buf();
        let mut accounts = MemoryAccountStore::new();

        let contents = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => return Err(AccountError::Io(e)),
        };

        for (line_no, line) in contents.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let Some((name, password)) = line.split_once(',') else {
                tracing::warn!(
                    path = %path.display(),
                    line = line_no + 1,
                    "skipping malformed account line"
                );
                continue;
            };
            if let Err(e) = accounts.add(Account::new(name, password)) {
                tracing::warn!(
                    path = %path.display(),
                    line = line_no + 1,
                    error = %e,
                    "skipping account line"
                );
            }
        }

        tracing::info!(
            path = %path.display(),
            accounts = accounts.len(),
            "account store loaded"
        );
        Ok(Self { path, accounts })
    }

    /// The file this store reads and appends to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AccountStore for FileAccountStore {
    fn lookup(&self, name: &str) -> Option<&Account> {
        self.accounts.lookup(name)
    }

    fn add(&mut self, account: Account) -> Result<(), AccountError> {
        if self.accounts.exists(&account.name) {
            return Err(AccountError::DuplicateName(account.name));
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{},{}", account.name, account.password)?;

        self.accounts.add(account)
    }

    fn len(&self) -> usize {
        self.accounts.len()
    }
}

// =========================================================================
// Tests
// =========================================================================
