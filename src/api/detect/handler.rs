// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection endpoint handlers

use anyhow::Context;
use axum::{extract::State, Json};
use std::time::Instant;
use tracing::{error, info, warn};

use super::request::ImageSource;
use super::response::DetectResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::vision::image_utils::{encode_base64, fit_to_limit, MAX_INFERENCE_DIMENSION};
use crate::vision::DetectionKind;

/// POST /detect/missing - Flag missing components
///
/// # Request
/// One of:
/// - `application/json`: `{"image_base64": "..."}` (data-URI prefix allowed)
/// - `multipart/form-data`: file field `image`
/// - any other content type: the raw image bytes
///
/// # Response
/// - `success`: always true
/// - `image_base64`: annotated JPEG
/// - `detections`: `label`, `label_id`, `confidence`, `bbox`
///
/// # Errors
/// - 400 Bad Request: no image, undecodable image, unknown JSON fields
/// - 413 Payload Too Large: body over the configured limit
/// - 500 Internal Server Error: model not loaded, inference or encoding failed
/// - 504 Gateway Timeout: inference took longer than the configured timeout
pub async fn detect_missing_handler(
    State(state): State<AppState>,
    source: Result<ImageSource, ApiError>,
) -> Result<Json<DetectResponse>, ApiError> {
    run_detection(&state, DetectionKind::Missing, source).await
}

/// POST /detect/burnt - Flag burnt components
///
/// Same request and response shapes as `/detect/missing`.
pub async fn detect_burnt_handler(
    State(state): State<AppState>,
    source: Result<ImageSource, ApiError>,
) -> Result<Json<DetectResponse>, ApiError> {
    run_detection(&state, DetectionKind::Burnt, source).await
}

/// Decode, detect, annotate.
///
/// Detection and annotation run on the blocking pool under the configured
/// timeout. Both see the same downscaled image so boxes match pixels.
pub async fn run_detection(
    state: &AppState,
    kind: DetectionKind,
    source: Result<ImageSource, ApiError>,
) -> Result<Json<DetectResponse>, ApiError> {
    let image = source.and_then(|s| s.decode()).map_err(|e| {
        warn!("Validation error on {} detection: {}", kind, e);
        e
    })?;

    let started = Instant::now();
    let adapter = state.models.adapter(kind).clone();
    let annotator = state.annotator.clone();

    let task = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
        let processed = fit_to_limit(&image, MAX_INFERENCE_DIMENSION);
        let detections = adapter.detect(&processed)?;
        let jpeg = annotator
            .annotate(&processed, &detections)
            .context("Failed to annotate detections")?;
        Ok((detections, encode_base64(&jpeg)))
    });

    let include_details = state.config.enable_error_details;
    let outcome = match tokio::time::timeout(state.config.inference_timeout, task).await {
        Err(_) => {
            error!(
                "{} detection timed out after {:?}",
                kind, state.config.inference_timeout
            );
            return Err(ApiError::Timeout);
        }
        Ok(joined) => joined
            .context("Detection task panicked")
            .and_then(|result| result),
    };

    let (detections, image_base64) = outcome.map_err(|e| {
        error!("Failed to process {} detection: {:#}", kind, e);
        ApiError::detection_failed(&e, include_details)
    })?;

    info!(
        "Detections for '{}': {} found in {}ms",
        kind,
        detections.len(),
        started.elapsed().as_millis()
    );

    Ok(Json(DetectResponse::new(image_base64, detections)))
}
