// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Probe device endpoints
//!
//! The device posts readings to `/detect/esp_voltage` and polls
//! `/detect/check_resume` while paused and `/detect/check_reset` between
//! points. The dashboard drives `/detect/resume_loop` and
//! `/detect/reset_sequence`.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{
    check_reset_handler, check_resume_handler, esp_voltage_handler, reset_sequence_handler,
    resume_loop_handler,
};
pub use request::EspVoltageRequest;
pub use response::{
    CheckResetResponse, CheckResumeResponse, EspVoltageResponse, ResetSequenceResponse,
    ResumeLoopResponse,
};
