//! Database operations for `ai_analyses`.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `ai_analyses` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AiAnalysisRow {
    pub id: i64,
    pub analysis_date: NaiveDate,
    pub kind: String,
    pub trend_summary: serde_json::Value,
    pub prediction_result: serde_json::Value,
    pub confidence_score: f64,
    pub raw_response: String,
    pub created_at: DateTime<Utc>,
}

/// Appends one analysis record. Analyses are append-only: re-running a day
/// adds a new row rather than replacing the old one, so history survives.
///
/// Returns the new row id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn append_analysis(
    pool: &PgPool,
    analysis_date: NaiveDate,
    kind: &str,
    trend_summary: &serde_json::Value,
    prediction_result: &serde_json::Value,
    confidence_score: f64,
    raw_response: &str,
) -> Result<i64, DbError> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO ai_analyses \
             (analysis_date, kind, trend_summary, prediction_result, \
              confidence_score, raw_response) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING id",
    )
    .bind(analysis_date)
    .bind(kind)
    .bind(trend_summary)
    .bind(prediction_result)
    .bind(confidence_score)
    .bind(raw_response)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// The most recent analyses across all kinds, newest first. Ties on
/// `created_at` break on `id DESC` so ordering is stable.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn recent_analyses(pool: &PgPool, limit: i64) -> Result<Vec<AiAnalysisRow>, DbError> {
    let rows = sqlx::query_as::<_, AiAnalysisRow>(
        "SELECT id, analysis_date, kind, trend_summary, prediction_result, \
                confidence_score, raw_response, created_at \
         FROM ai_analyses \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
