//! SQLite persistence for canonical observations, integrations, and the
//! wide per-day nutrition table
//!
//! Three tables, no other pipeline state:
//! - `observations`: sparse tall table, unique on
//!   (user_id, observed_at, type, source). That key is what makes
//!   re-running or overlapping sync jobs safe.
//! - `daily_snapshots`: one wide row per calendar day, keyed by date,
//!   overwritten wholesale on re-import.
//! - `integrations`: one row per (user, vendor) connection, sole holder
//!   of vendor credentials.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings so that
//! lexicographic comparison in SQL matches chronological order.

mod integrations;
mod observations;
mod snapshots;

pub use observations::{ObservationPoint, UpsertReport};
pub use snapshots::SnapshotPoint;

use std::path::Path;

use rusqlite::Connection;

use crate::error::{Result, TesseraError};
use crate::models::DailySnapshot;

/// Storage handle. Connections are cheap to open; each short-lived sync
/// run opens its own.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create the database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| TesseraError::store(format!("Failed to open database: {}", e)))?;

        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| TesseraError::store(format!("Failed to open in-memory database: {}", e)))?;

        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Run migrations
    fn migrate(&self) -> Result<()> {
        self.conn
            .execute_batch(&format!(
                r#"
                CREATE TABLE IF NOT EXISTS integrations (
                    id TEXT PRIMARY KEY,
                    vendor TEXT NOT NULL,
                    access_token TEXT,
                    refresh_token TEXT,
                    external_user_id TEXT,
                    scope TEXT,
                    expires_at TEXT,
                    garmin_email TEXT,
                    garmin_password TEXT,
                    user_id TEXT NOT NULL,
                    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                    UNIQUE (user_id, vendor)
                );

                CREATE TABLE IF NOT EXISTS observations (
                    id TEXT PRIMARY KEY,
                    source TEXT NOT NULL,
                    type TEXT NOT NULL,
                    label TEXT NOT NULL,
                    unit TEXT,
                    value REAL NOT NULL,
                    observed_at TEXT NOT NULL,
                    user_id TEXT NOT NULL,
                    integration_id TEXT NOT NULL,
                    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                    UNIQUE (user_id, observed_at, type, source)
                );

                CREATE INDEX IF NOT EXISTS idx_observations_scan
                ON observations(user_id, observed_at, source, type);

                CREATE TABLE IF NOT EXISTS daily_snapshots (
                    id TEXT PRIMARY KEY,
                    date TEXT NOT NULL UNIQUE,
                    {snapshot_columns}
                    imported_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                    raw TEXT
                );

                CREATE INDEX IF NOT EXISTS idx_snapshots_date ON daily_snapshots(date);
                "#,
                snapshot_columns = snapshot_column_ddl(),
            ))
            .map_err(|e| TesseraError::store(format!("Failed to run migrations: {}", e)))?;

        Ok(())
    }
}

/// DDL fragment for the wide snapshot payload, derived from the model so
/// the column set cannot drift.
fn snapshot_column_ddl() -> String {
    DailySnapshot::COLUMNS
        .iter()
        .map(|col| format!("{} REAL,\n                    ", col))
        .collect()
}
