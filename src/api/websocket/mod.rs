// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Dashboard live channel over WebSocket

pub mod handler;

pub use handler::{websocket_handler, CONNECTED_EVENT};
