//! Model discovery for the configured analysis backend.

use axum::{extract::State, Extension, Json};
use serde::Serialize;

use super::{ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Serialize)]
pub struct ModelsData {
    pub models: Vec<String>,
    pub default_model: String,
}

pub async fn list_models(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<ModelsData>> {
    // Backend failures degrade to the default model inside the client, so
    // this endpoint always answers.
    let models = state.deps.llm.available_models().await;

    Json(ApiResponse {
        data: ModelsData {
            models,
            default_model: state.deps.llm.default_model().to_string(),
        },
        meta: ResponseMeta::new(req_id.0),
    })
}
