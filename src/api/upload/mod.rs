// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! POST /upload - turn an image file into base64 for the detection endpoints

pub mod handler;

pub use handler::{is_allowed_extension, upload_handler, UploadResponse, ALLOWED_EXTENSIONS};
