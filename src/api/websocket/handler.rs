// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use serde_json::json;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::api::http_server::AppState;
use crate::voltage::LiveEvent;

/// First frame a client receives after the upgrade
pub const CONNECTED_EVENT: &str = "connected";

/// GET /ws - Stream published events to a dashboard client
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    // Subscribe before the upgrade so nothing published in between is lost
    let events = state.events.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, events))
}

async fn handle_socket(mut socket: WebSocket, mut events: broadcast::Receiver<LiveEvent>) {
    info!("Dashboard client connected");

    let welcome = json!({
        "event": CONNECTED_EVENT,
        "data": {"message": "WebSocket connected successfully"}
    });
    if socket.send(Message::Text(welcome.to_string())).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(event) => {
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!("Failed to serialize '{}' event: {}", event.event, e);
                            continue;
                        }
                    };
                    if socket.send(Message::Text(text)).await.is_err() {
                        debug!("Dashboard client went away mid-send");
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Dashboard client lagging, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Ping(payload))) => {
                    if socket.send(Message::Pong(payload)).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!("WebSocket receive error: {}", e);
                    break;
                }
            },
        }
    }

    info!("Dashboard client disconnected");
}
