// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod debug;
pub mod detect;
pub mod errors;
pub mod http_server;
pub mod upload;
pub mod voltage;
pub mod websocket;

pub use debug::{health_handler, status_handler, HealthResponse, StatusResponse};
pub use detect::{detect_burnt_handler, detect_missing_handler, DetectRequest, DetectResponse};
pub use errors::{ApiError, ErrorResponse};
pub use http_server::{create_router, start_server, AppState};
pub use upload::{upload_handler, UploadResponse};
pub use websocket::websocket_handler;
