// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};

use crate::voltage::{ResumeCommand, ScanCommand};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EspVoltageResponse {
    pub success: bool,
    pub command: ScanCommand,
    /// Failing point, only sent with PAUSE
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point: Option<String>,
}

impl EspVoltageResponse {
    pub fn pause(point: String) -> Self {
        Self {
            success: true,
            command: ScanCommand::Pause,
            point: Some(point),
        }
    }

    pub fn proceed() -> Self {
        Self {
            success: true,
            command: ScanCommand::Continue,
            point: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResumeResponse {
    pub success: bool,
    pub command: ResumeCommand,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeLoopResponse {
    pub success: bool,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetSequenceResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResetResponse {
    pub reset: bool,
}
