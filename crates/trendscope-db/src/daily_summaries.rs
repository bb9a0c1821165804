//! Database operations for `daily_summaries`.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use trendscope_core::{ContentType, DailyStats, TopItem};

use crate::DbError;

/// A row from the `daily_summaries` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DailySummaryRow {
    pub id: i64,
    pub summary_date: NaiveDate,
    pub novel_count: i32,
    pub drama_count: i32,
    pub comic_count: i32,
    pub news_count: i32,
    pub entertainment_count: i32,
    pub total_count: i32,
    pub top_novels: serde_json::Value,
    pub top_dramas: serde_json::Value,
    pub top_comics: serde_json::Value,
    pub top_news: serde_json::Value,
    pub top_entertainment: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Replaces the summary for `date` with a freshly computed one.
///
/// Delete-then-insert inside one transaction: a reader never observes a
/// half-updated summary, and re-running for the same date with unchanged
/// items produces identical contents.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the transaction fails.
pub async fn upsert_daily_summary(
    pool: &PgPool,
    date: NaiveDate,
    stats: DailyStats,
    tops: &[(ContentType, Vec<TopItem>)],
) -> Result<(), DbError> {
    let top_json = |wanted: ContentType| -> serde_json::Value {
        tops.iter()
            .find(|(ct, _)| *ct == wanted)
            .map_or_else(|| serde_json::json!([]), |(_, items)| serde_json::json!(items))
    };

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM daily_summaries WHERE summary_date = $1")
        .bind(date)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "INSERT INTO daily_summaries \
             (summary_date, novel_count, drama_count, comic_count, news_count, \
              entertainment_count, total_count, top_novels, top_dramas, top_comics, \
              top_news, top_entertainment) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
    )
    .bind(date)
    .bind(i32::try_from(stats.novel).unwrap_or(i32::MAX))
    .bind(i32::try_from(stats.drama).unwrap_or(i32::MAX))
    .bind(i32::try_from(stats.comic).unwrap_or(i32::MAX))
    .bind(i32::try_from(stats.news).unwrap_or(i32::MAX))
    .bind(i32::try_from(stats.entertainment).unwrap_or(i32::MAX))
    .bind(i32::try_from(stats.total).unwrap_or(i32::MAX))
    .bind(top_json(ContentType::Novel))
    .bind(top_json(ContentType::Drama))
    .bind(top_json(ContentType::Comic))
    .bind(top_json(ContentType::News))
    .bind(top_json(ContentType::Entertainment))
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Returns the summary for `date`, or `None` if aggregation has not run yet.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_daily_summary(
    pool: &PgPool,
    date: NaiveDate,
) -> Result<Option<DailySummaryRow>, DbError> {
    let row = sqlx::query_as::<_, DailySummaryRow>(
        "SELECT id, summary_date, novel_count, drama_count, comic_count, news_count, \
                entertainment_count, total_count, top_novels, top_dramas, top_comics, \
                top_news, top_entertainment, created_at \
         FROM daily_summaries \
         WHERE summary_date = $1",
    )
    .bind(date)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
