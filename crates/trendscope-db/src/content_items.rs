//! Database operations for `content_items`.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::PgPool;

use trendscope_core::{ContentType, DailyStats, NewContentItem, TopItem};

use crate::DbError;

/// A row from the `content_items` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ContentItemRow {
    pub id: i64,
    pub content_type: String,
    pub title: String,
    pub category: String,
    pub url: String,
    pub popularity_score: f64,
    pub score_source: String,
    pub crawl_date: NaiveDate,
    pub source_site: String,
    pub raw_payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Appends a batch of collected items.
///
/// No uniqueness is enforced here: batch-level dedup is the collectors'
/// responsibility. The whole batch is written in one transaction so a
/// mid-batch failure leaves nothing behind.
///
/// Returns the number of rows inserted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails.
pub async fn insert_items(pool: &PgPool, items: &[NewContentItem]) -> Result<usize, DbError> {
    if items.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;

    for item in items {
        sqlx::query(
            "INSERT INTO content_items \
                 (content_type, title, category, url, popularity_score, \
                  score_source, crawl_date, source_site, raw_payload) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(item.content_type.as_str())
        .bind(&item.title)
        .bind(&item.category)
        .bind(&item.url)
        .bind(item.popularity_score)
        .bind(item.score_source.as_str())
        .bind(item.crawl_date)
        .bind(&item.source_site)
        .bind(&item.raw_payload)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(items.len())
}

/// Per-vertical item counts for one calendar date. Verticals with no items
/// report zero.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn daily_stats(pool: &PgPool, date: NaiveDate) -> Result<DailyStats, DbError> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        "SELECT content_type, COUNT(*) \
         FROM content_items \
         WHERE crawl_date = $1 \
         GROUP BY content_type",
    )
    .bind(date)
    .fetch_all(pool)
    .await?;

    let mut stats = DailyStats::default();
    for (content_type, count) in rows {
        if let Some(ct) = ContentType::parse(&content_type) {
            stats.set_count(ct, count);
        }
    }

    Ok(stats)
}

/// Top items of one vertical for one date, ordered by popularity score
/// descending; ties break on insertion order (`id ASC`) so repeated calls
/// return the same ranking.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn top_items_by_type(
    pool: &PgPool,
    content_type: ContentType,
    date: NaiveDate,
    limit: i64,
) -> Result<Vec<TopItem>, DbError> {
    let rows = sqlx::query_as::<_, (String, String, f64, String)>(
        "SELECT title, category, popularity_score, url \
         FROM content_items \
         WHERE content_type = $1 AND crawl_date = $2 \
         ORDER BY popularity_score DESC, id ASC \
         LIMIT $3",
    )
    .bind(content_type.as_str())
    .bind(date)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(title, category, popularity_score, url)| TopItem {
            title,
            category,
            popularity_score,
            url,
        })
        .collect())
}

/// Per-date stats for the `days` calendar days ending at `end` (inclusive),
/// oldest first. Dates with no items yield all-zero stats, so the series
/// always has exactly `days` entries.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn stats_series(
    pool: &PgPool,
    end: NaiveDate,
    days: i64,
) -> Result<Vec<(NaiveDate, DailyStats)>, DbError> {
    let start = end - Duration::days(days - 1);

    let rows = sqlx::query_as::<_, (NaiveDate, String, i64)>(
        "SELECT crawl_date, content_type, COUNT(*) \
         FROM content_items \
         WHERE crawl_date BETWEEN $1 AND $2 \
         GROUP BY crawl_date, content_type",
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    let mut series: Vec<(NaiveDate, DailyStats)> = (0..days)
        .map(|offset| (start + Duration::days(offset), DailyStats::default()))
        .collect();

    for (date, content_type, count) in rows {
        let Some(ct) = ContentType::parse(&content_type) else {
            continue;
        };
        let offset = (date - start).num_days();
        if let Ok(index) = usize::try_from(offset) {
            if let Some((_, stats)) = series.get_mut(index) {
                stats.set_count(ct, count);
            }
        }
    }

    Ok(series)
}
