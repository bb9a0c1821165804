//! Manual pipeline triggers.
//!
//! A full run collects from every source and can take minutes, so it is
//! spawned and the response returns immediately. The predict trigger only
//! re-aggregates and re-analyzes already-collected data, which is fast
//! enough to answer inline.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use trendscope_pipeline::PipelineError;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Default, Deserialize)]
pub struct TriggerRequest {
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RunStarted {
    pub status: &'static str,
    pub date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct PredictData {
    pub date: NaiveDate,
    pub predictions: Vec<String>,
    pub risks: Vec<String>,
    pub confidence_score: f64,
}

pub async fn trigger_run(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Option<Json<TriggerRequest>>,
) -> (StatusCode, Json<ApiResponse<RunStarted>>) {
    let model = body.and_then(|Json(b)| b.model);
    let date = Utc::now().date_naive();
    let deps = Arc::clone(&state.deps);

    tokio::spawn(async move {
        match trendscope_pipeline::run(&deps, date, "api", model.as_deref()).await {
            Ok(summary) => {
                tracing::info!(
                    run_id = summary.run_id,
                    items = summary.items_collected,
                    "api-triggered pipeline run finished"
                );
            }
            Err(PipelineError::RunInProgress { date }) => {
                tracing::warn!(%date, "api-triggered run skipped, another run is active");
            }
            Err(e) => {
                tracing::error!(error = %e, "api-triggered pipeline run failed");
            }
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(ApiResponse {
            data: RunStarted {
                status: "started",
                date,
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    )
}

pub async fn trigger_predict(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Option<Json<TriggerRequest>>,
) -> Result<Json<ApiResponse<PredictData>>, ApiError> {
    let model = body.and_then(|Json(b)| b.model);
    let date = Utc::now().date_naive();

    let summary = trendscope_pipeline::analyze(&state.deps, date, model.as_deref())
        .await
        .map_err(|e| match e {
            PipelineError::RunInProgress { .. } => {
                ApiError::new(req_id.0.clone(), "conflict", e.to_string())
            }
            PipelineError::Db(db) => super::map_db_error(req_id.0.clone(), &db),
        })?;

    let Some(prediction) = summary.prediction else {
        return Err(ApiError::new(
            req_id.0,
            "model_unavailable",
            "prediction model did not return a usable reply",
        ));
    };

    Ok(Json(ApiResponse {
        data: PredictData {
            date,
            predictions: prediction.predictions,
            risks: prediction.risks,
            confidence_score: prediction.confidence_score,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
