//! Today's hot-trend snapshot: per-vertical counts and labeled top lists.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use trendscope_core::ContentType;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

/// Counts for the verticals the trend board shows. Novels are deliberately
/// absent; the board tracks the broadcast-style verticals only.
#[derive(Debug, Serialize)]
pub struct HotTrendStats {
    pub drama_count: i64,
    pub comic_count: i64,
    pub news_count: i64,
    pub entertainment_count: i64,
}

#[derive(Debug, Serialize)]
pub struct HotTrendItem {
    pub title: String,
    pub category: String,
    pub popularity_score: f64,
    pub url: String,
    pub trend_type: String,
}

#[derive(Debug, Deserialize)]
pub struct HotTrendQuery {
    pub limit: Option<i64>,
}

pub async fn hot_trend_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<HotTrendStats>>, ApiError> {
    let today = chrono::Utc::now().date_naive();
    let stats = trendscope_db::daily_stats(&state.pool, today)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: HotTrendStats {
            drama_count: stats.drama,
            comic_count: stats.comic,
            news_count: stats.news,
            entertainment_count: stats.entertainment,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub async fn hot_trends_by_type(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(content_type): Path<String>,
    Query(query): Query<HotTrendQuery>,
) -> Result<Json<ApiResponse<Vec<HotTrendItem>>>, ApiError> {
    let Some(parsed) = ContentType::parse(&content_type) else {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            format!("unknown content type: {content_type}"),
        ));
    };

    let today = chrono::Utc::now().date_naive();
    let limit = normalize_limit(query.limit);

    let items = trendscope_db::top_items_by_type(&state.pool, parsed, today, limit)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let trends = items
        .into_iter()
        .map(|item| HotTrendItem {
            title: item.title,
            category: item.category,
            popularity_score: item.popularity_score,
            url: item.url,
            trend_type: format!("爆款{content_type}"),
        })
        .collect();

    Ok(Json(ApiResponse {
        data: trends,
        meta: ResponseMeta::new(req_id.0),
    }))
}
