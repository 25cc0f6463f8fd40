//! Durable account records.
//!
//! The record store is a single table keyed by `identifier`. It knows nothing
//! about credential hashing or validation; the account service layers those
//! on top.

pub mod sqlite;

pub use sqlite::SqliteRecordStore;

use crate::account::Account;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Primary-key collision on insert.
    #[error("record already exists: {identifier}")]
    Duplicate { identifier: String },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Table operations the account service relies on.
///
/// Implementations are synchronous; callers move them onto a blocking
/// thread.
pub trait RecordStore: Send + Sync {
    /// Insert a new row. Fails with [`StoreError::Duplicate`] when the key
    /// is taken.
    fn insert(&self, record: &Account) -> StoreResult<()>;

    /// Point lookup by key.
    fn get(&self, identifier: &str) -> StoreResult<Option<Account>>;

    /// Lookup requiring both key and stored secret to match exactly.
    fn find_by_credentials(
        &self,
        identifier: &str,
        credential_secret: &str,
    ) -> StoreResult<Option<Account>>;

    /// Overwrite the profile columns of an existing row. Returns `false`
    /// when no row has that key.
    fn update_profile(&self, record: &Account) -> StoreResult<bool>;

    /// Number of stored rows.
    fn count(&self) -> StoreResult<u64>;
}
