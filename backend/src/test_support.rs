//! Test doubles shared by unit tests and the HTTP integration suite.
//!
//! Compiled for `cfg(test)` and for the `test-support` feature that
//! integration tests enable.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    EmailAddress, NewUserRecord, PasswordHash, User, UserChangeset, UserCredentials, UserId,
};

const EMAIL_CONSTRAINT: &str = "users_email_key";

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: PasswordHash,
}

#[derive(Debug, Default)]
struct Table {
    next_id: i64,
    rows: Vec<StoredUser>,
}

impl Table {
    fn email_taken(&self, email: &EmailAddress, except: Option<UserId>) -> bool {
        self.rows
            .iter()
            .any(|row| row.user.email() == email && Some(row.user.id()) != except)
    }

    fn position(&self, id: UserId) -> Result<usize, UserPersistenceError> {
        self.rows
            .iter()
            .position(|row| row.user.id() == id)
            .ok_or_else(UserPersistenceError::not_found)
    }
}

/// In-memory [`UserRepository`] with the same uniqueness and not-found
/// behaviour as the PostgreSQL adapter.
///
/// # Examples
/// ```
/// use user_accounts::test_support::InMemoryUserRepository;
///
/// let repo = InMemoryUserRepository::new();
/// assert_eq!(repo.len(), 0);
/// ```
#[derive(Clone)]
pub struct InMemoryUserRepository {
    table: Arc<Mutex<Table>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }
}

impl InMemoryUserRepository {
    /// Empty repository stamping times from the system clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp `created_at`/`updated_at` from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            table: Arc::new(Mutex::new(Table {
                next_id: 1,
                rows: Vec::new(),
            })),
            clock,
        }
    }

    /// Number of stored users.
    pub fn len(&self) -> usize {
        self.lock().map(|table| table.rows.len()).unwrap_or_default()
    }

    /// Whether no users are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored hash for `email`, for asserting what was persisted.
    pub fn stored_hash(&self, email: &str) -> Option<PasswordHash> {
        let table = self.lock().ok()?;
        table
            .rows
            .iter()
            .find(|row| row.user.email().as_ref() == email)
            .map(|row| row.password_hash.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Table>, UserPersistenceError> {
        self.table
            .lock()
            .map_err(|_| UserPersistenceError::connection("in-memory table poisoned"))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, record: &NewUserRecord) -> Result<User, UserPersistenceError> {
        let now = self.clock.utc();
        let mut table = self.lock()?;
        if table.email_taken(&record.email, None) {
            return Err(UserPersistenceError::unique_violation(EMAIL_CONSTRAINT));
        }
        let id = UserId::new(table.next_id)
            .map_err(|err| UserPersistenceError::query(err.to_string()))?;
        table.next_id += 1;
        let user = User::new(id, record.name.clone(), record.email.clone(), now, now);
        table.rows.push(StoredUser {
            user: user.clone(),
            password_hash: record.password_hash.clone(),
        });
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let table = self.lock()?;
        let mut users: Vec<User> = table.rows.iter().map(|row| row.user.clone()).collect();
        users.sort_by_key(User::id);
        Ok(users)
    }

    async fn find_by_id(&self, id: UserId) -> Result<User, UserPersistenceError> {
        let table = self.lock()?;
        let index = table.position(id)?;
        Ok(table.rows[index].user.clone())
    }

    async fn find_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserCredentials>, UserPersistenceError> {
        let table = self.lock()?;
        Ok(table
            .rows
            .iter()
            .find(|row| row.user.email() == email)
            .map(|row| UserCredentials {
                id: row.user.id(),
                password_hash: row.password_hash.clone(),
            }))
    }

    async fn update(
        &self,
        id: UserId,
        changes: &UserChangeset,
    ) -> Result<User, UserPersistenceError> {
        let now = self.clock.utc();
        let mut table = self.lock()?;
        let index = table.position(id)?;
        let email_taken = changes
            .email
            .as_ref()
            .is_some_and(|email| table.email_taken(email, Some(id)));
        if email_taken {
            return Err(UserPersistenceError::unique_violation(EMAIL_CONSTRAINT));
        }
        let row = &mut table.rows[index];
        let current = &row.user;
        row.user = User::new(
            id,
            changes.name.clone().unwrap_or_else(|| current.name().clone()),
            changes
                .email
                .clone()
                .unwrap_or_else(|| current.email().clone()),
            current.created_at(),
            now,
        );
        if let Some(hash) = &changes.password_hash {
            row.password_hash = hash.clone();
        }
        Ok(row.user.clone())
    }

    async fn delete(&self, id: UserId) -> Result<User, UserPersistenceError> {
        let mut table = self.lock()?;
        let index = table.position(id)?;
        Ok(table.rows.remove(index).user)
    }
}
