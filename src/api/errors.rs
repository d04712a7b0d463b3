// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Message returned for any detection failure the client cannot fix
pub const DETECTION_FAILED_MESSAGE: &str =
    "Internal server error during detection. See server logs.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

/// `{"success": false, "error": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    ValidationError(String),
    NotFound(String),
    PayloadTooLarge(String),
    InternalError {
        message: String,
        trace: Option<String>,
    },
    Timeout,
}

impl ApiError {
    /// Generic detection failure; `trace` carries the cause only when
    /// error details are enabled
    pub fn detection_failed(cause: &anyhow::Error, include_details: bool) -> Self {
        ApiError::InternalError {
            message: DETECTION_FAILED_MESSAGE.to_string(),
            trace: include_details.then(|| format!("{:#}", cause)),
        }
    }

    pub fn payload_too_large(max_body_bytes: usize) -> Self {
        ApiError::PayloadTooLarge(format!(
            "File too large. Maximum size is {}MB.",
            max_body_bytes / (1024 * 1024)
        ))
    }

    /// Map a body extraction failure, keeping the size limit distinct
    pub fn from_body_rejection(rejection: BytesRejection, max_body_bytes: usize) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::payload_too_large(max_body_bytes)
        } else {
            ApiError::ValidationError(rejection.body_text())
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::ValidationError(msg)
            | ApiError::NotFound(msg)
            | ApiError::PayloadTooLarge(msg) => msg.clone(),
            ApiError::InternalError { message, .. } => message.clone(),
            ApiError::Timeout => "Detection timed out. Try a smaller image.".to_string(),
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let trace = match self {
            ApiError::InternalError { trace, .. } => trace.clone(),
            _ => None,
        };

        ErrorResponse {
            success: false,
            error: ErrorBody {
                message: self.message(),
                trace,
            },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            ApiError::InternalError { message, .. } => write!(f, "Internal error: {}", message),
            ApiError::Timeout => write!(f, "Request timed out"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_response())).into_response()
    }
}
