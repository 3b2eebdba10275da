//! Database module for persistent storage.
//!
//! Provides async SQLite access using SQLx for the two record sets the bot
//! mirrors in memory:
//! - custom text commands (`commands` table, keyed by name)
//! - Taler counters (`talers` table, keyed by username)

mod commands;
mod models;
mod talers;

pub use commands::CommandRepository;
pub use models::{CommandRecord, TalerRecord};
pub use talers::TalerRepository;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

static MEMDB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("database integrity check failed: {0}")]
    Integrity(String),
}

/// Database handle with connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Startup fails instead of hanging when the file is locked elsewhere.
    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Open the database, creating tables if they don't exist yet.
    ///
    /// `:memory:` gives every call its own private database, which lives as
    /// long as the returned handle (or a clone of it).
    pub async fn new(path: &str) -> Result<Self, DbError> {
        let options = if path == ":memory:" {
            let id = MEMDB_COUNTER.fetch_add(1, Ordering::Relaxed);
            SqliteConnectOptions::new()
                .filename(format!(
                    "file:talerbot-{}-{}?mode=memory&cache=shared",
                    std::process::id(),
                    id
                ))
                .shared_cache(true)
                .create_if_missing(true)
        } else {
            if let Some(parent) = Path::new(path).parent()
                && !parent.as_os_str().is_empty()
                && let Err(e) = std::fs::create_dir_all(parent)
            {
                warn!(path = %parent.display(), error = %e, "Failed to create database directory");
            }

            SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
        };

        // The dispatcher is the only writer, so one connection is enough. It
        // is never reaped, which also keeps a `:memory:` database alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .acquire_timeout(Self::ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await?;

        info!(path = %path, "Database opened");

        Self::ensure_schema(&pool).await?;

        // Also serves as the startup connectivity check.
        let integrity: String = sqlx::query_scalar("PRAGMA integrity_check")
            .fetch_one(&pool)
            .await?;
        if integrity != "ok" {
            error!(integrity_check = %integrity, "Database integrity check failed");
            return Err(DbError::Integrity(integrity));
        }

        Ok(Self { pool })
    }

    /// Create both tables if missing. Existing tables are left untouched.
    async fn ensure_schema(pool: &SqlitePool) -> Result<(), DbError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS commands (
                name TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL DEFAULT '',
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS talers (
                username TEXT PRIMARY KEY NOT NULL,
                amount INTEGER NOT NULL DEFAULT 0,
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Close every pooled connection. Later queries fail with `PoolClosed`.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Get command repository.
    pub fn commands(&self) -> CommandRepository<'_> {
        CommandRepository::new(&self.pool)
    }

    /// Get taler repository.
    pub fn talers(&self) -> TalerRepository<'_> {
        TalerRepository::new(&self.pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_databases_are_isolated() {
        let a = Database::new(":memory:").await.unwrap();
        let b = Database::new(":memory:").await.unwrap();

        a.commands()
            .upsert(&CommandRecord::new("discord", "https://discord.gg/x"))
            .await
            .unwrap();

        assert_eq!(a.commands().load_all().await.unwrap().len(), 1);
        assert!(b.commands().load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("bot.db");
        let path = path.to_str().unwrap();

        {
            let db = Database::new(path).await.unwrap();
            db.talers().upsert(&TalerRecord::new("bob", 7)).await.unwrap();
            db.close().await;
        }

        let db = Database::new(path).await.unwrap();
        let talers = db.talers().load_all().await.unwrap();
        assert_eq!(talers, vec![TalerRecord::new("bob", 7)]);
    }

    #[tokio::test]
    async fn test_closed_pool_reports_error() {
        let db = Database::new(":memory:").await.unwrap();
        db.close().await;

        let err = db.commands().load_all().await.unwrap_err();
        assert!(matches!(err, DbError::Sqlx(sqlx::Error::PoolClosed)));
    }
}
