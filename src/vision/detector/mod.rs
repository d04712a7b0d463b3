// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Component detection
//!
//! This module provides:
//! - The `ObjectDetector` seam every backing model implements
//! - `DetectionAdapter`, which turns raw model boxes into `Detection` records
//! - The YOLO ONNX backend used in production

pub mod postprocess;
pub mod preprocessing;
pub mod yolo;

use std::fmt;
use std::sync::Arc;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::image_utils::{fit_to_limit, MAX_INFERENCE_DIMENSION};

pub use yolo::YoloModel;

/// Confidence filter applied to every inference call
pub const DETECTION_CONFIDENCE: f32 = 0.25;

/// Which inspection model a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionKind {
    Missing,
    Burnt,
}

impl DetectionKind {
    pub const ALL: [DetectionKind; 2] = [DetectionKind::Missing, DetectionKind::Burnt];

    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionKind::Missing => "missing",
            DetectionKind::Burnt => "burnt",
        }
    }
}

impl fmt::Display for DetectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A box as produced by the model, in the pixel space of the input image
#[derive(Debug, Clone, PartialEq)]
pub struct RawBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub confidence: f32,
    pub class_id: usize,
}

/// One detected component, as returned to API clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub label_id: Option<i64>,
    pub confidence: f32,
    /// [x1, y1, x2, y2] in pixels
    pub bbox: [i32; 4],
}

impl Detection {
    /// Convert a raw model box. Confidence is rounded to 4 decimals and
    /// coordinates are truncated to whole pixels.
    pub fn from_raw(raw: &RawBox, label: Option<&str>) -> Self {
        let label = label
            .map(str::to_string)
            .unwrap_or_else(|| raw.class_id.to_string());

        Self {
            label,
            label_id: Some(raw.class_id as i64),
            confidence: (raw.confidence * 10_000.0).round() / 10_000.0,
            bbox: [
                raw.x1 as i32,
                raw.y1 as i32,
                raw.x2 as i32,
                raw.y2 as i32,
            ],
        }
    }

    pub fn has_valid_bbox(&self) -> bool {
        let [x1, y1, x2, y2] = self.bbox;
        x1 < x2 && y1 < y2
    }
}

/// Narrow interface over a pre-trained detection model.
///
/// Implementations must be callable from several request threads at once.
pub trait ObjectDetector: Send + Sync {
    /// Run the model on `image`, keeping boxes at or above `confidence_threshold`
    fn predict(
        &self,
        image: &DynamicImage,
        confidence_threshold: f32,
    ) -> anyhow::Result<Vec<RawBox>>;

    /// Human readable class name for a class id, if the model ships one
    fn class_name(&self, class_id: usize) -> Option<&str>;
}

#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("{0} components model not loaded")]
    ModelUnavailable(DetectionKind),

    #[error("{kind} detection failed: {message}")]
    Inference { kind: DetectionKind, message: String },
}

/// Binds a detection kind to its (possibly absent) model
#[derive(Clone)]
pub struct DetectionAdapter {
    kind: DetectionKind,
    detector: Option<Arc<dyn ObjectDetector>>,
}

impl fmt::Debug for DetectionAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectionAdapter")
            .field("kind", &self.kind)
            .field("available", &self.detector.is_some())
            .finish()
    }
}

impl DetectionAdapter {
    pub fn new(kind: DetectionKind, detector: Option<Arc<dyn ObjectDetector>>) -> Self {
        Self { kind, detector }
    }

    pub fn kind(&self) -> DetectionKind {
        self.kind
    }

    pub fn is_available(&self) -> bool {
        self.detector.is_some()
    }

    /// Detect components in `image`.
    ///
    /// Inputs larger than `MAX_INFERENCE_DIMENSION` are shrunk first; callers
    /// that annotate the result should pass an image already run through
    /// `fit_to_limit` so boxes line up with pixels.
    pub fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>, DetectionError> {
        let detector = self
            .detector
            .as_ref()
            .ok_or(DetectionError::ModelUnavailable(self.kind))?;

        let image = fit_to_limit(image, MAX_INFERENCE_DIMENSION);

        let raw_boxes = detector
            .predict(&image, DETECTION_CONFIDENCE)
            .map_err(|e| DetectionError::Inference {
                kind: self.kind,
                message: format!("{:#}", e),
            })?;

        let detections: Vec<Detection> = raw_boxes
            .iter()
            .map(|raw| Detection::from_raw(raw, detector.class_name(raw.class_id)))
            .filter(Detection::has_valid_bbox)
            .collect();

        debug!(
            "{} model returned {} boxes, {} kept",
            self.kind,
            raw_boxes.len(),
            detections.len()
        );

        Ok(detections)
    }
}
