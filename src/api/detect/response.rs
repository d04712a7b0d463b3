// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection response types

use serde::{Deserialize, Serialize};

use crate::vision::Detection;

/// Response from a detection endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectResponse {
    pub success: bool,
    /// Annotated image as base64 JPEG (no data-URI prefix)
    pub image_base64: String,
    /// Detections in model order
    pub detections: Vec<Detection>,
}

impl DetectResponse {
    pub fn new(image_base64: String, detections: Vec<Detection>) -> Self {
        Self {
            success: true,
            image_base64,
            detections,
        }
    }
}
