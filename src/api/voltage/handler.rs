// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Probe device and dashboard control handlers

use axum::{body::Bytes, extract::rejection::BytesRejection, extract::State, Json};
use tracing::{debug, warn};

use super::request::EspVoltageRequest;
use super::response::{
    CheckResetResponse, CheckResumeResponse, EspVoltageResponse, ResetSequenceResponse,
    ResumeLoopResponse,
};
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::voltage::ScanCommand;

/// POST /detect/esp_voltage - Report one probe reading
///
/// # Request
/// - `point`: probe point id, e.g. "A1" (required)
/// - `value`: measured volts (required)
///
/// # Response
/// - `{"success": true, "command": "PAUSE", "point": "<id>"}` on a failing reading
/// - `{"success": true, "command": "CONTINUE"}` otherwise (unknown points included)
///
/// # Errors
/// - 400 Bad Request: `point` or `value` missing, or `value` not a number
pub async fn esp_voltage_handler(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<EspVoltageResponse>, ApiError> {
    let body = body.map_err(|e| ApiError::from_body_rejection(e, state.config.max_body_bytes))?;

    let (point, value) = EspVoltageRequest::parse(&body).map_err(|e| {
        warn!("Rejected probe reading: {}", e);
        e
    })?;

    let outcome = state.voltage.report(&point, value);
    let response = match outcome.command {
        ScanCommand::Pause => EspVoltageResponse::pause(point),
        ScanCommand::Continue => EspVoltageResponse::proceed(),
    };
    Ok(Json(response))
}

/// GET /detect/check_resume - Device poll while paused
pub async fn check_resume_handler(State(state): State<AppState>) -> Json<CheckResumeResponse> {
    Json(CheckResumeResponse {
        success: true,
        command: state.voltage.check_resume(),
    })
}

/// POST /detect/resume_loop - Technician clicked "Recheck"
pub async fn resume_loop_handler(State(state): State<AppState>) -> Json<ResumeLoopResponse> {
    state.voltage.resume();
    Json(ResumeLoopResponse {
        success: true,
        status: "Resumed".to_string(),
    })
}

/// POST /detect/reset_sequence - Send the device back to the first point
pub async fn reset_sequence_handler(
    State(state): State<AppState>,
) -> Json<ResetSequenceResponse> {
    state.voltage.request_reset();
    Json(ResetSequenceResponse { success: true })
}

/// GET /detect/check_reset - True once after each reset request
pub async fn check_reset_handler(State(state): State<AppState>) -> Json<CheckResetResponse> {
    let reset = state.voltage.check_reset();
    if reset {
        debug!("Reset flag consumed by device");
    }
    Json(CheckResetResponse { reset })
}
