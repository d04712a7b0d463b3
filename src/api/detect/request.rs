// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection request types and image extraction

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use axum_extra::extract::multipart::MultipartError;
use axum_extra::extract::Multipart;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::vision::image_utils::{decode_base64_image, decode_image_bytes, ImageError};

/// Multipart field carrying the uploaded image
pub const IMAGE_FIELD: &str = "image";

pub const MISSING_IMAGE_MESSAGE: &str =
    "Request must include image file (form field 'image') or JSON 'image_base64'.";

/// JSON body for the detection endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetectRequest {
    /// Base64 image, optionally prefixed with `data:image/...;base64,`
    #[serde(default)]
    pub image_base64: Option<String>,
}

impl DetectRequest {
    /// Validate the request
    pub fn validate(&self) -> Result<(), ApiError> {
        match self.image_base64.as_deref() {
            Some(image) if !image.trim().is_empty() => Ok(()),
            _ => Err(ApiError::ValidationError(MISSING_IMAGE_MESSAGE.to_string())),
        }
    }
}

/// Where the image of a detection request came from
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// `application/json` with `image_base64`
    Base64(String),
    /// `multipart/form-data` field `image`
    Upload(Bytes),
    /// Any other content type: the body itself
    Raw(Bytes),
}

impl ImageSource {
    pub fn kind(&self) -> &'static str {
        match self {
            ImageSource::Base64(_) => "base64",
            ImageSource::Upload(_) => "upload",
            ImageSource::Raw(_) => "raw",
        }
    }

    /// Decode into pixels; every failure is the client's fault
    pub fn decode(&self) -> Result<DynamicImage, ApiError> {
        let decoded = match self {
            ImageSource::Base64(data) => decode_base64_image(data),
            ImageSource::Upload(bytes) => decode_image_bytes(bytes),
            ImageSource::Raw(bytes) => decode_image_bytes(bytes),
        };

        let (image, info) = decoded.map_err(|e| image_error(self, e))?;
        debug!(
            "Decoded {} image: {}x{} {:?}, {} bytes",
            self.kind(),
            info.width,
            info.height,
            info.format,
            info.size_bytes
        );
        Ok(image)
    }
}

fn image_error(source: &ImageSource, error: ImageError) -> ApiError {
    let message = match (source, &error) {
        (ImageSource::Base64(_), ImageError::InvalidBase64(_)) => error.to_string(),
        (ImageSource::Base64(_), _) => format!("Could not decode base64 image data: {}", error),
        (ImageSource::Upload(_), _) => {
            format!("Uploaded file could not be decoded as an image: {}", error)
        }
        (ImageSource::Raw(_), ImageError::EmptyData) => MISSING_IMAGE_MESSAGE.to_string(),
        (ImageSource::Raw(_), _) => format!("Request body could not be decoded as an image: {}", error),
    };
    ApiError::ValidationError(message)
}

fn multipart_error(error: MultipartError, max_body_bytes: usize) -> ApiError {
    if error.status() == axum::http::StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(max_body_bytes)
    } else {
        ApiError::ValidationError(error.body_text())
    }
}

/// Read the first multipart field called `name`
pub(crate) async fn read_multipart_field(
    mut multipart: Multipart,
    name: &str,
    max_body_bytes: usize,
) -> Result<Option<(Option<String>, Bytes)>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_body_bytes))?
    {
        if field.name() != Some(name) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, max_body_bytes))?;
        return Ok(Some((file_name, data)));
    }
    Ok(None)
}

#[async_trait]
impl FromRequest<AppState> for ImageSource {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let max_body_bytes = state.config.max_body_bytes;
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::ValidationError(e.body_text()))?;

            return match read_multipart_field(multipart, IMAGE_FIELD, max_body_bytes).await? {
                Some((_, data)) => Ok(ImageSource::Upload(data)),
                None => Err(ApiError::ValidationError(MISSING_IMAGE_MESSAGE.to_string())),
            };
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::from_body_rejection(e, max_body_bytes))?;

        if content_type.starts_with("application/json") {
            let request: DetectRequest = serde_json::from_slice(&body)
                .map_err(|e| ApiError::ValidationError(format!("Invalid JSON body: {}", e)))?;
            request.validate()?;
            return Ok(ImageSource::Base64(request.image_base64.unwrap_or_default()));
        }

        if body.is_empty() {
            return Err(ApiError::ValidationError(MISSING_IMAGE_MESSAGE.to_string()));
        }
        Ok(ImageSource::Raw(body))
    }
}
