// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, http::StatusCode, Json};

use super::response::{HealthResponse, StatusResponse};
use crate::api::http_server::AppState;
use crate::version::get_version_info;

/// GET /debug/health - 200 when both models are loaded, 503 otherwise
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let models_loaded = state.models.models_loaded();
    let status = if models_loaded {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(HealthResponse::from_models_loaded(models_loaded)))
}

/// GET /debug/status - Version, model availability and probe state
pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        version: get_version_info(),
        models_loaded: state.models.models_loaded(),
        models: state.models.list_models(),
        voltage: state.voltage.snapshot(),
        dashboard_clients: state.events.subscriber_count(),
        max_body_bytes: state.config.max_body_bytes,
        inference_timeout_secs: state.config.inference_timeout.as_secs(),
    })
}
