// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing for PCB inspection
//!
//! This module provides:
//! - Component detection (missing / burnt) via YOLO ONNX models
//! - Callout annotation of detection results
//!
//! Inference runs on CPU only.

pub mod annotate;
pub mod detector;
pub mod image_utils;
pub mod model_manager;

pub use annotate::{plan_callout, AnnotateError, Annotator, CalloutLayout, LabelBox, LabelSide};
pub use detector::{
    Detection, DetectionAdapter, DetectionError, DetectionKind, ObjectDetector, RawBox,
    DETECTION_CONFIDENCE,
};
pub use image_utils::{decode_base64_image, decode_image_bytes, detect_format, ImageError, ImageInfo};
pub use model_manager::{DetectionModelConfig, DetectionModelInfo, DetectionModelManager};
