//! Dashboard rollup: today's counts next to yesterday's, with day-over-day
//! growth per vertical.

use axum::{extract::State, Extension, Json};
use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;

use trendscope_core::DailyStats;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Serialize)]
pub struct VerticalCounts {
    pub novel: i64,
    pub drama: i64,
    pub comic: i64,
    pub news: i64,
    pub entertainment: i64,
    pub total: i64,
}

impl From<DailyStats> for VerticalCounts {
    fn from(stats: DailyStats) -> Self {
        Self {
            novel: stats.novel,
            drama: stats.drama,
            comic: stats.comic,
            news: stats.news,
            entertainment: stats.entertainment,
            total: stats.total,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VerticalGrowth {
    pub novel: f64,
    pub drama: f64,
    pub comic: f64,
    pub news: f64,
    pub entertainment: f64,
    pub total: f64,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub date: NaiveDate,
    pub today: VerticalCounts,
    pub yesterday: VerticalCounts,
    pub growth: VerticalGrowth,
}

pub async fn dashboard_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<DashboardStats>>, ApiError> {
    let today = Utc::now().date_naive();
    let yesterday = today - Duration::days(1);

    let today_stats = trendscope_db::daily_stats(&state.pool, today)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let yesterday_stats = trendscope_db::daily_stats(&state.pool, yesterday)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = DashboardStats {
        date: today,
        growth: growth_between(today_stats, yesterday_stats),
        today: today_stats.into(),
        yesterday: yesterday_stats.into(),
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn growth_between(today: DailyStats, yesterday: DailyStats) -> VerticalGrowth {
    VerticalGrowth {
        novel: growth_percent(today.novel, yesterday.novel),
        drama: growth_percent(today.drama, yesterday.drama),
        comic: growth_percent(today.comic, yesterday.comic),
        news: growth_percent(today.news, yesterday.news),
        entertainment: growth_percent(today.entertainment, yesterday.entertainment),
        total: growth_percent(today.total, yesterday.total),
    }
}

/// Day-over-day growth as a percentage, rounded to one decimal place.
///
/// A zero yesterday has no meaningful ratio: any activity today counts as
/// 100% growth, no activity as 0%.
#[allow(clippy::cast_precision_loss)]
fn growth_percent(today: i64, yesterday: i64) -> f64 {
    if yesterday == 0 {
        return if today > 0 { 100.0 } else { 0.0 };
    }
    let ratio = (today - yesterday) as f64 / yesterday as f64;
    (ratio * 1_000.0).round() / 10.0
}
