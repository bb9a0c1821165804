//! Time series feeding the dashboard trend charts.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use trendscope_core::DailyStats;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

const DEFAULT_DAYS: i64 = 7;
const MAX_DAYS: i64 = 30;

#[derive(Debug, Deserialize)]
pub struct TrendSeriesQuery {
    pub days: Option<i64>,
}

/// Parallel arrays, oldest day first, sized for direct chart binding.
#[derive(Debug, Serialize)]
pub struct TrendSeries {
    pub dates: Vec<String>,
    pub novel_counts: Vec<i64>,
    pub drama_counts: Vec<i64>,
    pub comic_counts: Vec<i64>,
    pub news_counts: Vec<i64>,
    pub entertainment_counts: Vec<i64>,
}

pub async fn trend_series(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<TrendSeriesQuery>,
) -> Result<Json<ApiResponse<TrendSeries>>, ApiError> {
    let days = query.days.unwrap_or(DEFAULT_DAYS).clamp(1, MAX_DAYS);
    let today = Utc::now().date_naive();

    let series = trendscope_db::stats_series(&state.pool, today, days)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: build_series(&series),
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn build_series(rows: &[(NaiveDate, DailyStats)]) -> TrendSeries {
    let mut out = TrendSeries {
        dates: Vec::with_capacity(rows.len()),
        novel_counts: Vec::with_capacity(rows.len()),
        drama_counts: Vec::with_capacity(rows.len()),
        comic_counts: Vec::with_capacity(rows.len()),
        news_counts: Vec::with_capacity(rows.len()),
        entertainment_counts: Vec::with_capacity(rows.len()),
    };

    for (date, stats) in rows {
        out.dates.push(date.format("%m-%d").to_string());
        out.novel_counts.push(stats.novel);
        out.drama_counts.push(stats.drama);
        out.comic_counts.push(stats.comic);
        out.news_counts.push(stats.news);
        out.entertainment_counts.push(stats.entertainment);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_keeps_columns_aligned_oldest_first() {
        let rows = vec![
            (
                NaiveDate::from_ymd_opt(2025, 8, 24).expect("valid date"),
                DailyStats {
                    novel: 10,
                    drama: 20,
                    comic: 5,
                    news: 15,
                    entertainment: 25,
                    total: 75,
                },
            ),
            (
                NaiveDate::from_ymd_opt(2025, 8, 25).expect("valid date"),
                DailyStats {
                    novel: 12,
                    drama: 22,
                    comic: 6,
                    news: 18,
                    entertainment: 28,
                    total: 86,
                },
            ),
        ];

        let series = build_series(&rows);
        assert_eq!(series.dates, vec!["08-24", "08-25"]);
        assert_eq!(series.novel_counts, vec![10, 12]);
        assert_eq!(series.entertainment_counts, vec![25, 28]);
    }

    #[test]
    fn empty_series_is_still_well_formed() {
        let series = build_series(&[]);
        let json = serde_json::to_value(&series).expect("serialize");
        assert_eq!(json["dates"].as_array().map(Vec::len), Some(0));
        assert_eq!(json["novel_counts"].as_array().map(Vec::len), Some(0));
    }
}
