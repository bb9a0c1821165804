//! Recent model analyses, newest first.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub struct RecentAnalysesQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisItem {
    pub id: i64,
    pub analysis_date: NaiveDate,
    pub kind: String,
    pub trend_summary: serde_json::Value,
    pub prediction_result: serde_json::Value,
    pub confidence_score: f64,
    pub created_at: DateTime<Utc>,
}

impl From<trendscope_db::AiAnalysisRow> for AnalysisItem {
    fn from(row: trendscope_db::AiAnalysisRow) -> Self {
        Self {
            id: row.id,
            analysis_date: row.analysis_date,
            kind: row.kind,
            trend_summary: row.trend_summary,
            prediction_result: row.prediction_result,
            confidence_score: row.confidence_score,
            created_at: row.created_at,
        }
    }
}

pub async fn recent_analyses(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<RecentAnalysesQuery>,
) -> Result<Json<ApiResponse<Vec<AnalysisItem>>>, ApiError> {
    let limit = normalize_limit(query.limit);

    let rows = trendscope_db::recent_analyses(&state.pool, limit)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(AnalysisItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}
