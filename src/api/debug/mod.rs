// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Diagnostic endpoints: GET /debug/health and GET /debug/status

pub mod handler;
pub mod response;

pub use handler::{health_handler, status_handler};
pub use response::{HealthResponse, StatusResponse};
