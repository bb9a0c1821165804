//! Database operations for `prediction_validations`.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `prediction_validations` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PredictionValidationRow {
    pub id: i64,
    pub prediction_date: NaiveDate,
    pub actual_date: NaiveDate,
    pub accuracy_score: f64,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// Records the outcome of scoring a past prediction against observed data.
///
/// Returns the new row id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_prediction_validation(
    pool: &PgPool,
    prediction_date: NaiveDate,
    actual_date: NaiveDate,
    accuracy_score: f64,
    notes: &str,
) -> Result<i64, DbError> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO prediction_validations \
             (prediction_date, actual_date, accuracy_score, notes) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id",
    )
    .bind(prediction_date)
    .bind(actual_date)
    .bind(accuracy_score)
    .bind(notes)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Validation history, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_prediction_validations(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<PredictionValidationRow>, DbError> {
    let rows = sqlx::query_as::<_, PredictionValidationRow>(
        "SELECT id, prediction_date, actual_date, accuracy_score, notes, created_at \
         FROM prediction_validations \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
