//! Database operations for `pipeline_runs`.
//!
//! The table doubles as an advisory run lock: a partial unique index on
//! `run_date WHERE status = 'running'` lets the database reject a second
//! concurrent run for the same date, so overlapping cron and manual triggers
//! cannot double-collect.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `pipeline_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PipelineRunRow {
    pub id: i64,
    pub run_date: NaiveDate,
    pub trigger_source: String,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub items_collected: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Opens a run record for `date` in status `running`, acquiring the
/// advisory lock.
///
/// Returns the new run id.
///
/// # Errors
///
/// Returns [`DbError::RunInProgress`] if another run for the same date is
/// still active, or [`DbError::Sqlx`] for any other database failure.
pub async fn begin_run(
    pool: &PgPool,
    date: NaiveDate,
    trigger_source: &str,
) -> Result<i64, DbError> {
    let result: Result<(i64,), sqlx::Error> = sqlx::query_as(
        "INSERT INTO pipeline_runs (run_date, trigger_source, status) \
         VALUES ($1, $2, 'running') \
         RETURNING id",
    )
    .bind(date)
    .bind(trigger_source)
    .fetch_one(pool)
    .await;

    match result {
        Ok((id,)) => Ok(id),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Err(DbError::RunInProgress { date })
        }
        Err(err) => Err(DbError::Sqlx(err)),
    }
}

/// Marks a running run as completed, releasing the advisory lock.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not currently in
/// status `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn complete_run(pool: &PgPool, id: i64, items_collected: i32) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE pipeline_runs \
         SET status = 'completed', completed_at = NOW(), items_collected = $2 \
         WHERE id = $1 AND status = 'running'",
    )
    .bind(id)
    .bind(items_collected)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            id,
            expected_status: "running",
        });
    }
    Ok(())
}

/// Marks a running run as failed with an error message, releasing the
/// advisory lock.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not currently in
/// status `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn fail_run(pool: &PgPool, id: i64, error_message: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE pipeline_runs \
         SET status = 'failed', completed_at = NOW(), error_message = $2 \
         WHERE id = $1 AND status = 'running'",
    )
    .bind(id)
    .bind(error_message)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            id,
            expected_status: "running",
        });
    }
    Ok(())
}

/// Fetches one run record by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no run with that id exists, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_run(pool: &PgPool, id: i64) -> Result<PipelineRunRow, DbError> {
    let row = sqlx::query_as::<_, PipelineRunRow>(
        "SELECT id, run_date, trigger_source, status, started_at, completed_at, \
                items_collected, error_message, created_at \
         FROM pipeline_runs \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.ok_or(DbError::NotFound)
}
