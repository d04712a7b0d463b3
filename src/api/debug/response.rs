// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};

use crate::vision::DetectionModelInfo;
use crate::voltage::SystemState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: String,
    pub models_loaded: bool,
    pub message: String,
}

impl HealthResponse {
    pub fn from_models_loaded(models_loaded: bool) -> Self {
        if models_loaded {
            Self {
                status: "healthy".to_string(),
                models_loaded,
                message: "Application is running".to_string(),
            }
        } else {
            Self {
                status: "degraded".to_string(),
                models_loaded,
                message: "Models not loaded".to_string(),
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub version: serde_json::Value,
    pub models_loaded: bool,
    pub models: Vec<DetectionModelInfo>,
    pub voltage: SystemState,
    /// Connected dashboard WebSocket clients
    pub dashboard_clients: usize,
    pub max_body_bytes: usize,
    pub inference_timeout_secs: u64,
}
