// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLO detection model (ultralytics export, ONNX Runtime)
//!
//! A model directory holds:
//! - `model.onnx` - the exported network
//! - `labels.txt` (optional) - one class name per line, line N is class id N

use anyhow::{Context, Result};
use image::DynamicImage;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use super::postprocess::decode_output;
use super::preprocessing::preprocess;
use super::{ObjectDetector, RawBox};

pub const MODEL_FILE: &str = "model.onnx";
pub const LABELS_FILE: &str = "labels.txt";

/// YOLO detector backed by an ONNX Runtime session.
///
/// Runs on CPU only. The session is guarded by a mutex so concurrent
/// requests are serialized per model.
#[derive(Clone)]
pub struct YoloModel {
    session: Arc<Mutex<Session>>,
    input_name: String,
    input_size: u32,
    class_names: Vec<String>,
}

impl std::fmt::Debug for YoloModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloModel")
            .field("input_name", &self.input_name)
            .field("input_size", &self.input_size)
            .field("classes", &self.class_names.len())
            .finish_non_exhaustive()
    }
}

impl YoloModel {
    /// Load a model directory
    ///
    /// # Arguments
    /// - `model_dir`: Directory containing `model.onnx` and optionally `labels.txt`
    /// - `input_size`: Square input edge the model was exported with
    /// - `intra_threads`: ONNX Runtime intra-op thread count
    ///
    /// # Errors
    /// Returns error if:
    /// - `model.onnx` is missing
    /// - ONNX Runtime initialization fails
    /// - `labels.txt` exists but cannot be read
    pub async fn load<P: AsRef<Path>>(
        model_dir: P,
        input_size: u32,
        intra_threads: usize,
    ) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let model_path = model_dir.join(MODEL_FILE);

        if !model_path.exists() {
            anyhow::bail!("Detection model not found: {}", model_path.display());
        }

        info!("Loading detection model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(intra_threads)
            .context("Failed to set intra threads")?
            .commit_from_file(&model_path)
            .context(format!(
                "Failed to load detection model from {}",
                model_path.display()
            ))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        if let Some(input) = session.inputs.first() {
            debug!("Detection model input: {} {:?}", input.name, input.input_type);
        }

        let class_names = load_labels(&model_dir.join(LABELS_FILE)).await?;
        if class_names.is_empty() {
            warn!(
                "No {} in {}, class ids will be reported as labels",
                LABELS_FILE,
                model_dir.display()
            );
        }

        info!(
            "✅ Detection model loaded from {} ({} classes, CPU-only)",
            model_dir.display(),
            class_names.len()
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            input_size,
            class_names,
        })
    }
}

impl ObjectDetector for YoloModel {
    fn predict(&self, image: &DynamicImage, confidence_threshold: f32) -> Result<Vec<RawBox>> {
        let (tensor, placement) = preprocess(image, self.input_size);

        let input_value = Value::from_array(tensor).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("Detection session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Detection inference failed")?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        debug!("Detection output shape: {:?}", output_tensor.shape());

        let boxes = decode_output(output_tensor.view(), &placement, confidence_threshold)?;
        Ok(boxes)
    }

    fn class_name(&self, class_id: usize) -> Option<&str> {
        self.class_names
            .get(class_id)
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }
}

/// Read `labels.txt`; a missing file yields no names
async fn load_labels(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read labels from {}", path.display()))?;

    Ok(parse_labels(&content))
}

/// One name per line; trailing blank lines are dropped but inner ones keep their id
pub fn parse_labels(content: &str) -> Vec<String> {
    let mut labels: Vec<String> = content.lines().map(|l| l.trim().to_string()).collect();
    while labels.last().is_some_and(|l| l.is_empty()) {
        labels.pop();
    }
    labels
}
