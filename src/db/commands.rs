//! Command repository for database queries.

use super::models::CommandRecord;
use crate::db::DbError;
use sqlx::SqlitePool;

/// Repository for custom command operations.
pub struct CommandRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CommandRepository<'a> {
    /// Create a new command repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Load every stored command in insertion order.
    pub async fn load_all(&self) -> Result<Vec<CommandRecord>, DbError> {
        let rows = sqlx::query_as::<_, (String, String)>(
            r#"
            SELECT name, value
            FROM commands
            ORDER BY rowid
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, value)| CommandRecord { name, value })
            .collect())
    }

    /// Insert the command, or overwrite the text of the row with the same name.
    pub async fn upsert(&self, command: &CommandRecord) -> Result<(), DbError> {
        let now = chrono::Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO commands (name, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&command.name)
        .bind(&command.value)
        .bind(now)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Delete a command by name. Returns whether a row was removed.
    pub async fn delete(&self, name: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM commands WHERE name = ?")
            .bind(name)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
