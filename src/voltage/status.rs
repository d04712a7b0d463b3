// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};
use std::fmt;

use super::expected::VOLTAGE_TOLERANCE;

/// Verdict for one probe reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoltageStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "NOT OK")]
    NotOk,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl VoltageStatus {
    /// Compare a reading against the expected value.
    ///
    /// Ground points only fail on readings above the tolerance (negative
    /// noise is fine); powered points fail on deviation either way.
    pub fn evaluate(expected: Option<f64>, value: f64) -> Self {
        match expected {
            None => VoltageStatus::Unknown,
            Some(e) if e == 0.0 => {
                if value > VOLTAGE_TOLERANCE {
                    VoltageStatus::NotOk
                } else {
                    VoltageStatus::Ok
                }
            }
            Some(e) => {
                if (value - e).abs() > VOLTAGE_TOLERANCE {
                    VoltageStatus::NotOk
                } else {
                    VoltageStatus::Ok
                }
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VoltageStatus::Ok => "OK",
            VoltageStatus::NotOk => "NOT OK",
            VoltageStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for VoltageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
