//! Top-ranked content for one vertical on one date.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use trendscope_core::{ContentType, TopItem};

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub struct TopContentQuery {
    pub date: Option<NaiveDate>,
    pub limit: Option<i64>,
}

pub async fn top_content(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(content_type): Path<String>,
    Query(query): Query<TopContentQuery>,
) -> Result<Json<ApiResponse<Vec<TopItem>>>, ApiError> {
    let Some(content_type) = ContentType::parse(&content_type) else {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            format!("unknown content type: {content_type}"),
        ));
    };

    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let limit = normalize_limit(query.limit);

    let items = trendscope_db::top_items_by_type(&state.pool, content_type, date, limit)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: items,
        meta: ResponseMeta::new(req_id.0),
    }))
}
