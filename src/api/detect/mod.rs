// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Component detection endpoints
//!
//! Provides POST /detect/missing and POST /detect/burnt.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{detect_burnt_handler, detect_missing_handler, run_detection};
pub use request::{DetectRequest, ImageSource};
pub use response::DetectResponse;
