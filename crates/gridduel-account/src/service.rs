//! The account service: registration, login, and the login table.
//!
//! # Concurrency note
//!
//! `AccountService` is not thread-safe by itself. It is owned by the
//! dispatcher, which processes one inbound event at a time, so plain
//! `HashMap`s are enough.

use std::collections::HashMap;

use gridduel_protocol::{ConnectionId, FIELD_SEPARATOR};

use crate::{Account, AccountError, AccountStore};

/// Applies account rules on top of an [`AccountStore`] and tracks which
/// connection is logged in as which account.
///
/// ```text
/// create_account() ──→ [stored]
///                          │
/// login() ─────────────────┴──→ [logged in] ──→ logout() / disconnect
/// ```
pub struct AccountService<S: AccountStore> {
    store: S,

    /// Connection → account name for every successful login.
    /// A connection can be logged in as at most one account; logging in
    /// again replaces the previous entry.
    logins: HashMap<ConnectionId, String>,
}

impl<S: AccountStore> AccountService<S> {
    /// Wraps a store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            logins: HashMap::new(),
        }
    }

    /// Registers a new account.
    ///
    /// # Errors
    /// - [`AccountError::InvalidName`] if the name is empty or contains the
    ///   field separator
    /// - [`AccountError::DuplicateName`] if the name is taken; the existing
    ///   account is left untouched
    /// - [`AccountError::Io`] if the store fails to persist it
    pub fn create_account(
        &mut self,
        conn_id: ConnectionId,
        name: &str,
        password: &str,
    ) -> Result<(), AccountError> {
        if name.is_empty() || name.contains(FIELD_SEPARATOR) {
            return Err(AccountError::InvalidName(name.to_string()));
        }
        if self.store.exists(name) {
            return Err(AccountError::DuplicateName(name.to_string()));
        }

        self.store.add(Account::new(name, password))?;
        tracing::info!(%conn_id, name, "account created");
        Ok(())
    }

    /// Checks credentials and records the login.
    ///
    /// # Errors
    /// - [`AccountError::UnknownAccount`] if no such name exists
    /// - [`AccountError::WrongPassword`] if the password doesn't match
    pub fn login(
        &mut self,
        conn_id: ConnectionId,
        name: &str,
        password: &str,
    ) -> Result<(), AccountError> {
        let account = self
            .store
            .lookup(name)
            .ok_or_else(|| AccountError::UnknownAccount(name.to_string()))?;

        if account.password != password {
            return Err(AccountError::WrongPassword(name.to_string()));
        }

        self.logins.insert(conn_id, name.to_string());
        tracing::info!(%conn_id, name, "login succeeded");
        Ok(())
    }

    /// Forgets the connection's login, returning the account name it had.
    pub fn logout(&mut self, conn_id: ConnectionId) -> Option<String> {
        let name = self.logins.remove(&conn_id);
        if let Some(name) = &name {
            tracing::debug!(%conn_id, name, "logged out");
        }
        name
    }

    /// The account a connection is logged in as, if any.
    pub fn account_name(&self, conn_id: ConnectionId) -> Option<&str> {
        self.logins.get(&conn_id).map(String::as_str)
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryAccountStore;

    fn service() -> AccountService<MemoryAccountStore> {
        AccountService::new(MemoryAccountStore::new())
    }

    fn cid(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    #[test]
    fn test_create_account_new_name_succeeds() {
        let mut svc = service();
        svc.create_account(cid(1), "bob", "pw").unwrap();
        assert!(svc.store().exists("bob"));
    }

    #[test]
    fn test_create_account_duplicate_fails_and_keeps_first_password() {
        let mut svc = service();
        svc.create_account(cid(1), "bob", "pw").unwrap();

        let result = svc.create_account(cid(2), "bob", "other");

        assert!(matches!(result, Err(AccountError::DuplicateName(_))));
        assert_eq!(svc.store().len(), 1);
        assert_eq!(svc.store().lookup("bob").unwrap().password, "pw");
    }

    #[test]
    fn test_create_account_empty_name_is_invalid() {
        let mut svc = service();
        let result = svc.create_account(cid(1), "", "pw");
        assert!(matches!(result, Err(AccountError::InvalidName(_))));
        assert!(svc.store().is_empty());
    }

    #[test]
    fn test_login_correct_password_records_login() {
        let mut svc = service();
        svc.create_account(cid(1), "bob", "pw").unwrap();

        svc.login(cid(2), "bob", "pw").unwrap();

        assert_eq!(svc.account_name(cid(2)), Some("bob"));
        assert_eq!(svc.account_name(cid(1)), None);
    }

    #[test]
    fn test_login_wrong_password_fails() {
        let mut svc = service();
        svc.create_account(cid(1), "bob", "pw").unwrap();

        let result = svc.login(cid(1), "bob", "nope");

        assert!(matches!(result, Err(AccountError::WrongPassword(_))));
        assert_eq!(svc.account_name(cid(1)), None);
    }

    #[test]
    fn test_login_unknown_account_fails() {
        let mut svc = service();
        let result = svc.login(cid(1), "ghost", "pw");
        assert!(matches!(result, Err(AccountError::UnknownAccount(_))));
    }

    #[test]
    fn test_logout_returns_name_once() {
        let mut svc = service();
        svc.create_account(cid(1), "bob", "pw").unwrap();
        svc.login(cid(1), "bob", "pw").unwrap();

        assert_eq!(svc.logout(cid(1)).as_deref(), Some("bob"));
        assert_eq!(svc.logout(cid(1)), None);
    }
}
