// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Live voltage-probe bridge
//!
//! Readings from the probe device are checked against the expected map,
//! pushed to dashboard clients, and used to pause or resume the device's
//! scan sequence.

pub mod bridge;
pub mod expected;
pub mod publisher;
pub mod status;

pub use bridge::{
    ReportOutcome, ResumeCommand, ScanCommand, SystemState, VoltageBridge, VoltageUpdate,
    VOLTAGE_UPDATE_EVENT,
};
pub use expected::{expected_voltage, EXPECTED_VOLTAGES, VOLTAGE_TOLERANCE};
pub use publisher::{BroadcastPublisher, EventPublisher, LiveEvent, DEFAULT_EVENT_CAPACITY};
pub use status::VoltageStatus;
