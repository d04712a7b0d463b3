// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Scan-loop state shared between the probe device and the dashboard
//!
//! The probe device walks the board point by point, reporting each reading.
//! A failing reading pauses the walk until a technician resumes it from the
//! dashboard; the dashboard can also ask the device to restart from the
//! first point.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::expected::expected_voltage;
use super::publisher::EventPublisher;
use super::status::VoltageStatus;

/// Event name used for every reading pushed to the dashboard
pub const VOLTAGE_UPDATE_EVENT: &str = "voltage_update";

/// Pause state of the scan loop
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemState {
    pub paused: bool,
    pub failed_point: Option<String>,
}

/// Reply to a reported reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScanCommand {
    Pause,
    Continue,
}

/// Reply to a resume poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResumeCommand {
    Resume,
    Wait,
}

/// Payload of a `voltage_update` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoltageUpdate {
    pub point: String,
    /// Reading rounded to millivolts
    pub value: f64,
    pub status: VoltageStatus,
    pub expected: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportOutcome {
    pub command: ScanCommand,
    pub status: VoltageStatus,
    pub expected: Option<f64>,
}

/// Owner of the scan-loop state.
///
/// One instance lives in the server state; handlers share it by reference.
pub struct VoltageBridge {
    state: Mutex<SystemState>,
    reset_requested: AtomicBool,
    publisher: Arc<dyn EventPublisher>,
}

impl std::fmt::Debug for VoltageBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoltageBridge")
            .field("state", &self.snapshot())
            .field("reset_requested", &self.reset_requested.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl VoltageBridge {
    pub fn new(publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            state: Mutex::new(SystemState::default()),
            reset_requested: AtomicBool::new(false),
            publisher,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, SystemState> {
        // State stays consistent under panic: every write sets both fields together
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record a probe reading.
    ///
    /// Publishes a `voltage_update` event and pauses the scan on a failing
    /// reading. Points missing from the map are reported `UNKNOWN` and never
    /// pause.
    pub fn report(&self, point: &str, value: f64) -> ReportOutcome {
        let expected = expected_voltage(point);
        let status = VoltageStatus::evaluate(expected, value);

        let update = VoltageUpdate {
            point: point.to_string(),
            value: round_millivolts(value),
            status,
            expected,
        };
        match serde_json::to_value(&update) {
            Ok(payload) => self.publisher.publish(VOLTAGE_UPDATE_EVENT, payload),
            Err(e) => warn!("Failed to serialize voltage update for {}: {}", point, e),
        }

        let command = if status == VoltageStatus::NotOk {
            let mut state = self.lock_state();
            state.paused = true;
            state.failed_point = Some(point.to_string());
            warn!(
                "Probe point {} read {:.3} V (expected {:?}), pausing scan",
                point, value, expected
            );
            ScanCommand::Pause
        } else {
            debug!("Probe point {} read {:.3} V: {}", point, value, status);
            ScanCommand::Continue
        };

        ReportOutcome {
            command,
            status,
            expected,
        }
    }

    pub fn check_resume(&self) -> ResumeCommand {
        if self.lock_state().paused {
            ResumeCommand::Wait
        } else {
            ResumeCommand::Resume
        }
    }

    /// Clear the pause unconditionally
    pub fn resume(&self) {
        let mut state = self.lock_state();
        if let Some(point) = state.failed_point.take() {
            info!("Scan resumed after failure at {}", point);
        }
        state.paused = false;
    }

    pub fn request_reset(&self) {
        self.reset_requested.store(true, Ordering::SeqCst);
        info!("Scan reset requested");
    }

    /// Returns true once per `request_reset`, then false until the next one
    pub fn check_reset(&self) -> bool {
        self.reset_requested.swap(false, Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> SystemState {
        self.lock_state().clone()
    }
}

fn round_millivolts(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
