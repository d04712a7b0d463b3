// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::{FromRequest, Request, State},
    Json,
};
use axum_extra::extract::Multipart;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::detect::request::read_multipart_field;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::vision::image_utils::encode_base64;

pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Multipart field carrying the file
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    /// File contents as plain base64 (no data-URI prefix)
    pub image_base64: String,
}

/// Case-insensitive check of the part after the last dot
pub fn is_allowed_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// POST /upload - Return an uploaded image file as base64
///
/// # Request
/// `multipart/form-data` with a file field `file`
///
/// # Errors
/// - 400 Bad Request: no `file` part, empty filename, extension not png/jpg/jpeg/bmp
/// - 413 Payload Too Large: body over the configured limit
pub async fn upload_handler(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<UploadResponse>, ApiError> {
    let max_body_bytes = state.config.max_body_bytes;
    let multipart = Multipart::from_request(request, &state)
        .await
        .map_err(|_| ApiError::ValidationError("No file part in the request.".to_string()))?;

    let (file_name, data) = read_multipart_field(multipart, FILE_FIELD, max_body_bytes)
        .await?
        .ok_or_else(|| ApiError::ValidationError("No file part in the request.".to_string()))?;

    let file_name = file_name.unwrap_or_default();
    if file_name.is_empty() {
        warn!("Upload rejected: empty filename");
        return Err(ApiError::ValidationError("Empty filename provided.".to_string()));
    }
    if !is_allowed_extension(&file_name) {
        warn!("Upload rejected: unsupported file {}", file_name);
        return Err(ApiError::ValidationError(
            "Unsupported file type. Allowed types: png, jpg, jpeg, bmp.".to_string(),
        ));
    }

    info!("Upload accepted: {} ({} bytes)", file_name, data.len());

    Ok(Json(UploadResponse {
        success: true,
        image_base64: encode_base64(&data),
    }))
}
