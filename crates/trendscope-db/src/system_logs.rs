//! Database operations for `system_logs`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `system_logs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SystemLogRow {
    pub id: i64,
    pub log_level: String,
    pub module: String,
    pub message: String,
    pub logged_at: DateTime<Utc>,
}

/// Writes one operational log row. Failures are swallowed with a tracing
/// warning: a broken audit trail must never take the pipeline down with it.
pub async fn log(pool: &PgPool, level: &str, module: &str, message: &str) {
    let result = sqlx::query(
        "INSERT INTO system_logs (log_level, module, message) VALUES ($1, $2, $3)",
    )
    .bind(level)
    .bind(module)
    .bind(message)
    .execute(pool)
    .await;

    if let Err(err) = result {
        tracing::warn!(error = %err, module, "failed to persist system log entry");
    }
}

/// The most recent log entries, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_logs(pool: &PgPool, limit: i64) -> Result<Vec<SystemLogRow>, DbError> {
    let rows = sqlx::query_as::<_, SystemLogRow>(
        "SELECT id, log_level, module, message, logged_at \
         FROM system_logs \
         ORDER BY logged_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
