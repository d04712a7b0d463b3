// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use clap::builder::BoolishValueParser;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::NodeConfig;
use crate::version::VERSION_NUMBER;

/// PCB Inspection Node
///
/// Flags override the environment, which `NodeConfig::from_env` reads; a flag
/// that is not given leaves the environment value (or its default) in place.
#[derive(Parser, Debug, Default)]
#[command(name = "pcb-inspection-node")]
#[command(version = VERSION_NUMBER)]
#[command(about = "Component detection and voltage-probe bridge for PCB inspection", long_about = None)]
pub struct Cli {
    /// Address to listen on
    #[arg(long)]
    pub listen_addr: Option<SocketAddr>,

    /// Directory holding the missing-component model
    #[arg(long)]
    pub missing_model_dir: Option<PathBuf>,

    /// Directory holding the burnt-component model
    #[arg(long)]
    pub burnt_model_dir: Option<PathBuf>,

    /// Square input size the models were exported with
    #[arg(long)]
    pub model_input_size: Option<u32>,

    /// ONNX Runtime threads per model
    #[arg(long)]
    pub inference_threads: Option<usize>,

    /// Seconds before a detection request gives up
    #[arg(long)]
    pub inference_timeout_secs: Option<u64>,

    /// Largest accepted request body in bytes
    #[arg(long)]
    pub max_body_bytes: Option<usize>,

    /// Include internal error details in 500 responses (true/false, yes/no, 1/0)
    #[arg(long, value_parser = BoolishValueParser::new())]
    pub error_details: Option<bool>,

    /// Dashboard event buffer per WebSocket client
    #[arg(long)]
    pub event_channel_capacity: Option<usize>,
}

impl Cli {
    /// Overlay the flags that were given onto `config`
    pub fn apply_to(self, mut config: NodeConfig) -> NodeConfig {
        if let Some(addr) = self.listen_addr {
            config.listen_addr = addr;
        }
        if let Some(dir) = self.missing_model_dir {
            config.missing_model_dir = dir;
        }
        if let Some(dir) = self.burnt_model_dir {
            config.burnt_model_dir = dir;
        }
        if let Some(size) = self.model_input_size {
            config.model_input_size = size;
        }
        if let Some(threads) = self.inference_threads {
            config.inference_threads = threads;
        }
        if let Some(secs) = self.inference_timeout_secs {
            config.inference_timeout = Duration::from_secs(secs);
        }
        if let Some(bytes) = self.max_body_bytes {
            config.max_body_bytes = bytes;
        }
        if let Some(details) = self.error_details {
            config.enable_error_details = details;
        }
        if let Some(capacity) = self.event_channel_capacity {
            config.event_channel_capacity = capacity;
        }
        config
    }
}
