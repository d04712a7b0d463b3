// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use clap::Parser;
use pcb_inspection_node::{
    api::{start_server, AppState},
    cli::Cli,
    config::NodeConfig,
    vision::DetectionModelManager,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Optional .env next to the binary; real environment wins
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("🚀 Starting PCB Inspection Node...\n");
    println!("📦 BUILD VERSION: {}", pcb_inspection_node::version::VERSION);
    println!("📅 Build Date: {}", pcb_inspection_node::version::BUILD_DATE);
    println!();
    tracing::info!("{}", pcb_inspection_node::version::get_version_string());

    let config = Cli::parse().apply_to(NodeConfig::from_env());
    config
        .validate()
        .map_err(|e| anyhow!("Invalid configuration: {}", e))?;

    println!("🔍 Loading detection models...");
    println!("   missing: {}", config.missing_model_dir.display());
    println!("   burnt:   {}", config.burnt_model_dir.display());
    let models = DetectionModelManager::new(config.model_config()).await?;
    if models.models_loaded() {
        println!("✅ Detection models loaded");
    } else {
        println!("⚠️  Detection models incomplete, detection endpoints will return errors");
    }

    let state = AppState::new(config, models)?;

    println!("🌐 API server: http://{}", state.config.listen_addr);
    println!("📡 Dashboard WebSocket: ws://{}/ws", state.config.listen_addr);
    println!();

    start_server(state).await?;

    println!("👋 PCB Inspection Node stopped");
    Ok(())
}
