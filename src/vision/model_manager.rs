// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection model manager for the "missing" and "burnt" inspection models

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::vision::detector::{DetectionAdapter, DetectionKind, ObjectDetector, YoloModel};
use crate::vision::detector::preprocessing::DEFAULT_INPUT_SIZE;

/// Configuration for loading detection models
#[derive(Debug, Clone)]
pub struct DetectionModelConfig {
    /// Directory of the missing-component model (optional)
    pub missing_model_dir: Option<PathBuf>,
    /// Directory of the burnt-component model (optional)
    pub burnt_model_dir: Option<PathBuf>,
    /// Square input edge both models were exported with
    pub input_size: u32,
    /// ONNX Runtime intra-op threads per model
    pub intra_threads: usize,
}

impl Default for DetectionModelConfig {
    fn default() -> Self {
        Self {
            missing_model_dir: Some(PathBuf::from("./models/missing")),
            burnt_model_dir: Some(PathBuf::from("./models/burnt")),
            input_size: DEFAULT_INPUT_SIZE,
            intra_threads: 4,
        }
    }
}

/// Information about a configured detection model
#[derive(Debug, Clone, Serialize)]
pub struct DetectionModelInfo {
    pub name: String,
    pub kind: DetectionKind,
    pub available: bool,
}

/// Holds one adapter per detection kind.
///
/// A model that fails to load is kept as an unavailable adapter so the node
/// still serves the other model and reports itself degraded.
pub struct DetectionModelManager {
    missing: DetectionAdapter,
    burnt: DetectionAdapter,
}

impl DetectionModelManager {
    /// Load both models. Missing directories are handled gracefully.
    pub async fn new(config: DetectionModelConfig) -> anyhow::Result<Self> {
        let missing = load_detector(
            DetectionKind::Missing,
            config.missing_model_dir.as_ref(),
            &config,
        )
        .await;
        let burnt = load_detector(
            DetectionKind::Burnt,
            config.burnt_model_dir.as_ref(),
            &config,
        )
        .await;

        Ok(Self::from_detectors(missing, burnt))
    }

    /// Build from already constructed detectors (tests inject fakes here)
    pub fn from_detectors(
        missing: Option<Arc<dyn ObjectDetector>>,
        burnt: Option<Arc<dyn ObjectDetector>>,
    ) -> Self {
        Self {
            missing: DetectionAdapter::new(DetectionKind::Missing, missing),
            burnt: DetectionAdapter::new(DetectionKind::Burnt, burnt),
        }
    }

    /// A manager with no models loaded
    pub fn empty() -> Self {
        Self::from_detectors(None, None)
    }

    pub fn adapter(&self, kind: DetectionKind) -> &DetectionAdapter {
        match kind {
            DetectionKind::Missing => &self.missing,
            DetectionKind::Burnt => &self.burnt,
        }
    }

    /// True only when every model is available
    pub fn models_loaded(&self) -> bool {
        self.missing.is_available() && self.burnt.is_available()
    }

    pub fn list_models(&self) -> Vec<DetectionModelInfo> {
        DetectionKind::ALL
            .iter()
            .map(|&kind| DetectionModelInfo {
                name: format!("{}-components", kind),
                kind,
                available: self.adapter(kind).is_available(),
            })
            .collect()
    }
}

async fn load_detector(
    kind: DetectionKind,
    dir: Option<&PathBuf>,
    config: &DetectionModelConfig,
) -> Option<Arc<dyn ObjectDetector>> {
    let dir = dir?;
    match YoloModel::load(dir, config.input_size, config.intra_threads).await {
        Ok(model) => {
            tracing::info!("✅ {} components model loaded from {}", kind, dir.display());
            Some(Arc::new(model))
        }
        Err(e) => {
            tracing::warn!(
                "⚠️ Failed to load {} components model from {}: {:#}",
                kind,
                dir.display(),
                e
            );
            None
        }
    }
}
