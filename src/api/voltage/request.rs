// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::errors::ApiError;

pub const MISSING_READING_MESSAGE: &str = "Missing 'point' or 'value'";

pub const INVALID_VALUE_MESSAGE: &str = "Invalid 'value': expected a number";

/// One probe reading, e.g. `{"point": "A1", "value": 3.28}`.
///
/// Both fields are kept loosely typed: device firmware has sent numeric
/// point ids and quoted voltages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EspVoltageRequest {
    #[serde(default)]
    pub point: Option<Value>,
    #[serde(default)]
    pub value: Option<Value>,
}

impl EspVoltageRequest {
    /// Parse a request body. A body that is not a JSON object counts as a
    /// missing reading.
    pub fn parse(body: &[u8]) -> Result<(String, f64), ApiError> {
        let request: EspVoltageRequest = serde_json::from_slice(body).unwrap_or_default();
        request.into_reading()
    }

    pub fn into_reading(self) -> Result<(String, f64), ApiError> {
        let point = match self.point {
            None | Some(Value::Null) => None,
            Some(Value::String(point)) => Some(point),
            // Non-string ids never match the map and report UNKNOWN
            Some(other) => Some(other.to_string()),
        };
        let (point, value) = match (point, self.value) {
            (Some(point), Some(value)) if !value.is_null() => (point, value),
            _ => return Err(ApiError::ValidationError(MISSING_READING_MESSAGE.to_string())),
        };

        let value = match &value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|v| v.is_finite())
        .ok_or_else(|| ApiError::ValidationError(INVALID_VALUE_MESSAGE.to_string()))?;

        Ok((point, value))
    }
}
