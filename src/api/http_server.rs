// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP server: shared state, router and serve loop

use axum::{
    extract::DefaultBodyLimit,
    http::Uri,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::debug::{health_handler, status_handler};
use super::detect::{detect_burnt_handler, detect_missing_handler};
use super::errors::ApiError;
use super::upload::upload_handler;
use super::voltage::{
    check_reset_handler, check_resume_handler, esp_voltage_handler, reset_sequence_handler,
    resume_loop_handler,
};
use super::websocket::websocket_handler;
use crate::config::NodeConfig;
use crate::vision::{Annotator, DetectionModelManager};
use crate::voltage::{BroadcastPublisher, EventPublisher, VoltageBridge};

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<NodeConfig>,
    pub models: Arc<DetectionModelManager>,
    pub annotator: Arc<Annotator>,
    pub voltage: Arc<VoltageBridge>,
    /// Dashboard fan-out; the WebSocket endpoint subscribes here
    pub events: BroadcastPublisher,
}

impl AppState {
    /// Voltage updates go out over the dashboard broadcast channel
    pub fn new(config: NodeConfig, models: DetectionModelManager) -> anyhow::Result<Self> {
        let events = BroadcastPublisher::new(config.event_channel_capacity);
        let publisher: Arc<dyn EventPublisher> = Arc::new(events.clone());
        Self::build(config, models, events, publisher)
    }

    /// Voltage updates go to `publisher` instead of the broadcast channel
    pub fn with_publisher(
        config: NodeConfig,
        models: DetectionModelManager,
        publisher: Arc<dyn EventPublisher>,
    ) -> anyhow::Result<Self> {
        let events = BroadcastPublisher::new(config.event_channel_capacity);
        Self::build(config, models, events, publisher)
    }

    fn build(
        config: NodeConfig,
        models: DetectionModelManager,
        events: BroadcastPublisher,
        publisher: Arc<dyn EventPublisher>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            config: Arc::new(config),
            models: Arc::new(models),
            annotator: Arc::new(Annotator::new()?),
            voltage: Arc::new(VoltageBridge::new(publisher)),
            events,
        })
    }

    /// Default config, no models loaded
    pub fn new_for_test() -> Self {
        Self::new(NodeConfig::default(), DetectionModelManager::empty())
            .expect("embedded annotation font must load")
    }
}

pub fn create_router(state: AppState) -> Router {
    let max_body_bytes = state.config.max_body_bytes;

    Router::new()
        // Component detection
        .route("/detect/missing", post(detect_missing_handler))
        .route("/detect/burnt", post(detect_burnt_handler))
        // Probe device control
        .route("/detect/esp_voltage", post(esp_voltage_handler))
        .route("/detect/check_resume", get(check_resume_handler))
        .route("/detect/resume_loop", post(resume_loop_handler))
        .route("/detect/reset_sequence", post(reset_sequence_handler))
        .route("/detect/check_reset", get(check_reset_handler))
        // Diagnostics
        .route("/debug/health", get(health_handler))
        .route("/debug/status", get(status_handler))
        .route("/upload", post(upload_handler))
        // Dashboard live updates
        .route("/ws", get(websocket_handler))
        .fallback(not_found_handler)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn not_found_handler(uri: Uri) -> ApiError {
    if uri.path().starts_with("/detect/") {
        ApiError::NotFound("Endpoint not found.".to_string())
    } else {
        ApiError::NotFound("Not found.".to_string())
    }
}

/// Bind and serve until Ctrl+C
pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.listen_addr;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("PCB inspection API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received, draining connections");
        })
        .await?;

    Ok(())
}
