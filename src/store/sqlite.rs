//! SQLite-backed account store.
//!
//! Tables:
//! - `accounts`: identifier, display_name, credential_secret, phone, address,
//!   created_at, updated_at

use super::{RecordStore, StoreError, StoreResult};
use crate::account::Account;
use crate::config::StoreConfig;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const ACCOUNT_COLUMNS: &str = "identifier, display_name, credential_secret, phone, address";

pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
}

impl SqliteRecordStore {
    /// Open (or create) the account database at the given path.
    pub fn open(db_path: &Path, busy_timeout: Duration) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create account store dir: {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open account DB: {}", db_path.display()))?;
        conn.busy_timeout(busy_timeout)?;

        // WAL mode for concurrent reads + crash safety
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        Self::init(conn)
    }

    /// Open the store described by the `[store]` config section.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        Self::open(
            &config.db_path(),
            Duration::from_millis(config.busy_timeout_ms),
        )
    }

    /// Private, non-durable store; used by tests and previews.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory account DB")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS accounts (
                identifier TEXT PRIMARY KEY NOT NULL,
                display_name TEXT NOT NULL,
                credential_secret TEXT NOT NULL,
                phone TEXT NOT NULL,
                address TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );",
        )
        .context("Failed to create accounts table")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl RecordStore for SqliteRecordStore {
    fn insert(&self, record: &Account) -> StoreResult<()> {
        let now = epoch_secs();
        let conn = self.conn.lock();
        let result = conn.execute(
            "INSERT INTO accounts
                (identifier, display_name, credential_secret, phone, address, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                record.identifier,
                record.display_name,
                record.credential_secret,
                record.phone,
                record.address,
                now,
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::Duplicate {
                    identifier: record.identifier.clone(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn get(&self, identifier: &str) -> StoreResult<Option<Account>> {
        let conn = self.conn.lock();
        let account = conn
            .query_row(
                &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE identifier = ?1"),
                params![identifier],
                row_to_account,
            )
            .optional()?;
        Ok(account)
    }

    fn find_by_credentials(
        &self,
        identifier: &str,
        credential_secret: &str,
    ) -> StoreResult<Option<Account>> {
        let conn = self.conn.lock();
        let account = conn
            .query_row(
                &format!(
                    "SELECT {ACCOUNT_COLUMNS} FROM accounts
                     WHERE identifier = ?1 AND credential_secret = ?2"
                ),
                params![identifier, credential_secret],
                row_to_account,
            )
            .optional()?;
        Ok(account)
    }

    fn update_profile(&self, record: &Account) -> StoreResult<bool> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE accounts
             SET display_name = ?2, phone = ?3, address = ?4, updated_at = ?5
             WHERE identifier = ?1",
            params![
                record.identifier,
                record.display_name,
                record.phone,
                record.address,
                epoch_secs(),
            ],
        )?;
        Ok(changed > 0)
    }

    fn count(&self) -> StoreResult<u64> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM accounts", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn row_to_account(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        identifier: row.get(0)?,
        display_name: row.get(1)?,
        credential_secret: row.get(2)?,
        phone: row.get(3)?,
        address: row.get(4)?,
    })
}

/// Current Unix epoch in seconds.
fn epoch_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
