// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Node configuration

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::vision::DetectionModelConfig;

/// Default maximum request body (32MB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Configuration for the inspection node
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Address the HTTP server binds to
    pub listen_addr: SocketAddr,
    /// Missing-component model directory
    pub missing_model_dir: PathBuf,
    /// Burnt-component model directory
    pub burnt_model_dir: PathBuf,
    /// Square model input edge in pixels
    pub model_input_size: u32,
    /// ONNX Runtime intra-op threads per model
    pub inference_threads: usize,
    /// Upper bound on one detection call
    pub inference_timeout: Duration,
    /// Largest accepted request body
    pub max_body_bytes: usize,
    /// Include internal error details in 500 responses
    pub enable_error_details: bool,
    /// Dashboard events a slow WebSocket client may lag behind by
    pub event_channel_capacity: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            missing_model_dir: PathBuf::from("./models/missing"),
            burnt_model_dir: PathBuf::from("./models/burnt"),
            model_input_size: 640,
            inference_threads: 4,
            inference_timeout: Duration::from_secs(120),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            enable_error_details: false,
            event_channel_capacity: 100,
        }
    }
}

impl NodeConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparsable values keep their default
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            listen_addr: parse_var(&lookup, "PCB_LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            missing_model_dir: lookup("MISSING_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.missing_model_dir),
            burnt_model_dir: lookup("BURNT_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.burnt_model_dir),
            model_input_size: parse_var(&lookup, "MODEL_INPUT_SIZE").unwrap_or(defaults.model_input_size),
            inference_threads: parse_var(&lookup, "INFERENCE_THREADS").unwrap_or(defaults.inference_threads),
            inference_timeout: parse_var(&lookup, "INFERENCE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.inference_timeout),
            max_body_bytes: parse_var(&lookup, "MAX_BODY_BYTES").unwrap_or(defaults.max_body_bytes),
            enable_error_details: lookup("PCB_ERROR_DETAILS")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.enable_error_details),
            event_channel_capacity: parse_var(&lookup, "EVENT_CHANNEL_CAPACITY")
                .unwrap_or(defaults.event_channel_capacity),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.model_input_size == 0 {
            return Err("Model input size must be greater than 0".to_string());
        }
        if self.inference_threads == 0 {
            return Err("Inference threads must be greater than 0".to_string());
        }
        if self.inference_timeout.is_zero() {
            return Err("Inference timeout must be greater than 0".to_string());
        }
        if self.max_body_bytes == 0 {
            return Err("Max body size must be greater than 0".to_string());
        }
        if self.event_channel_capacity == 0 {
            return Err("Event channel capacity must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Model loading settings derived from this config
    pub fn model_config(&self) -> DetectionModelConfig {
        DetectionModelConfig {
            missing_model_dir: Some(self.missing_model_dir.clone()),
            burnt_model_dir: Some(self.burnt_model_dir.clone()),
            input_size: self.model_input_size,
            intra_threads: self.inference_threads,
        }
    }
}

/// Same spellings clap's boolish parser accepts for `--error-details`
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.trim().parse().ok())
}
