//! Taler repository for database queries.

use super::models::TalerRecord;
use crate::db::DbError;
use sqlx::SqlitePool;

/// Repository for Taler counter operations.
pub struct TalerRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TalerRepository<'a> {
    /// Create a new taler repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Load every stored counter in insertion order.
    pub async fn load_all(&self) -> Result<Vec<TalerRecord>, DbError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT username, amount
            FROM talers
            ORDER BY rowid
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(username, amount)| TalerRecord { username, amount })
            .collect())
    }

    /// Insert the counter, or overwrite the amount of the row with the same username.
    pub async fn upsert(&self, taler: &TalerRecord) -> Result<(), DbError> {
        let now = chrono::Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO talers (username, amount, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(username) DO UPDATE SET
                amount = excluded.amount,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&taler.username)
        .bind(taler.amount)
        .bind(now)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Delete a counter by username. Returns whether a row was removed.
    pub async fn delete(&self, username: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM talers WHERE username = ?")
            .bind(username)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
