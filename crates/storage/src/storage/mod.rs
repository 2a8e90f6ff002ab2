//! `SQLite` storage implementation, one module per record partition.
//!
//! All methods are synchronous and owner-scoped: every read filters on
//! `owner`, every by-id mutation uses `WHERE id = ? AND owner = ?`.

mod admin;
mod categories;
mod inbox;
mod okr;
mod settings;
mod stages;
mod stats;
mod tasks;

use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Utc};
use planbot_core::env_config::env_parse_with_default;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use rusqlite::types::Type;

pub use admin::Export;

use crate::error::Result;
use crate::migrations;

/// Type alias for pooled connection
pub(crate) type PooledConn = PooledConnection<SqliteConnectionManager>;

const DEFAULT_POOL_SIZE: u32 = 4;

/// Main storage struct wrapping `SQLite` connection pool
#[derive(Clone, Debug)]
pub struct Storage {
    pub(crate) pool: Pool<SqliteConnectionManager>,
}

/// Get a connection from the pool
pub(crate) fn get_conn(pool: &Pool<SqliteConnectionManager>) -> Result<PooledConn> {
    Ok(pool.get()?)
}

/// Wrap a decode failure of column `idx` so list queries can skip the row.
pub(crate) fn decode_err<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into())
}

pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(idx: usize, s: &str) -> rusqlite::Result<T> {
    serde_json::from_str(s).map_err(|e| decode_err(idx, e))
}

pub(crate) fn parse_utc(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s).map(|d| d.with_timezone(&Utc)).map_err(|e| decode_err(idx, e))
}

pub(crate) fn parse_fixed(idx: usize, s: &str) -> rusqlite::Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s).map_err(|e| decode_err(idx, e))
}

pub(crate) fn parse_date(idx: usize, s: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| decode_err(idx, e))
}

pub(crate) fn parse_enum<T>(idx: usize, s: &str) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    s.parse().map_err(|e| decode_err(idx, e))
}

pub(crate) fn format_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

pub(crate) fn format_ts<Tz: chrono::TimeZone>(ts: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Log row read errors and filter them out
pub(crate) fn log_row_error<T>(result: rusqlite::Result<T>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(error = %e, "Skipping undecodable row");
            None
        },
    }
}

/// Connection initializer for concurrency settings
fn init_connection(conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA busy_timeout = 30000;
         PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;",
    )?;
    Ok(())
}

impl Storage {
    /// Open (creating if needed) the store at `db_path` and bring its schema up to date.
    ///
    /// Pool size comes from `PLANBOT_DB_POOL_SIZE`.
    ///
    /// # Errors
    /// Returns error if the pool cannot be built or a migration fails.
    pub fn open(db_path: &Path) -> Result<Self> {
        Self::open_with_pool_size(db_path, env_parse_with_default("PLANBOT_DB_POOL_SIZE", DEFAULT_POOL_SIZE))
    }

    /// # Errors
    /// Returns error if the pool cannot be built or a migration fails.
    pub fn open_with_pool_size(db_path: &Path, pool_size: u32) -> Result<Self> {
        let manager = SqliteConnectionManager::file(db_path).with_init(init_connection);
        let pool = Pool::builder().max_size(pool_size.max(1)).build(manager)?;

        let conn = pool.get()?;
        migrations::run_migrations(&conn)?;
        drop(conn);

        tracing::info!(pool_size, path = %db_path.display(), "Storage initialized with connection pool");

        Ok(Self { pool })
    }

    /// Checkpoint the WAL into the main file and release the pool.
    ///
    /// # Errors
    /// Returns error if no connection is available or the checkpoint fails.
    pub fn close(self) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))?;
        drop(conn);
        tracing::info!("Storage closed");
        Ok(())
    }
}
