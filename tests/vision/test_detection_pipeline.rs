// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Adapter and manager behaviour with stand-in detectors

use image::{DynamicImage, GenericImageView, RgbImage};
use pcb_inspection_node::vision::{
    DetectionError, DetectionKind, DetectionModelConfig, DetectionModelManager, ObjectDetector,
    RawBox, DETECTION_CONFIDENCE,
};
use std::sync::{Arc, Mutex};

/// Records the size of every image it sees
struct SizeProbe {
    seen: Mutex<Vec<(u32, u32)>>,
    thresholds: Mutex<Vec<f32>>,
}

impl SizeProbe {
    fn new() -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
            thresholds: Mutex::new(Vec::new()),
        }
    }
}

impl ObjectDetector for SizeProbe {
    fn predict(&self, image: &DynamicImage, threshold: f32) -> anyhow::Result<Vec<RawBox>> {
        self.seen.lock().unwrap().push(image.dimensions());
        self.thresholds.lock().unwrap().push(threshold);
        Ok(vec![
            RawBox {
                x1: 100.0,
                y1: 100.0,
                x2: 300.0,
                y2: 250.0,
                confidence: 0.66666,
                class_id: 4,
            },
            // Collapses to zero width once truncated
            RawBox {
                x1: 10.2,
                y1: 10.0,
                x2: 10.9,
                y2: 40.0,
                confidence: 0.9,
                class_id: 0,
            },
        ])
    }

    fn class_name(&self, _class_id: usize) -> Option<&str> {
        None
    }
}

#[test]
fn test_large_images_are_downscaled_before_inference() {
    let probe = Arc::new(SizeProbe::new());
    let detector: Arc<dyn ObjectDetector> = probe.clone();
    let manager = DetectionModelManager::from_detectors(Some(detector), None);

    let image = DynamicImage::ImageRgb8(RgbImage::new(3000, 2000));
    let detections = manager
        .adapter(DetectionKind::Missing)
        .detect(&image)
        .unwrap();

    assert_eq!(probe.seen.lock().unwrap()[0], (1500, 1000));
    assert_eq!(probe.thresholds.lock().unwrap()[0], DETECTION_CONFIDENCE);

    assert_eq!(detections.len(), 1);
    let detection = &detections[0];
    // No class names: the id doubles as the label
    assert_eq!(detection.label, "4");
    assert_eq!(detection.label_id, Some(4));
    assert_eq!(detection.confidence, 0.6667);
    assert_eq!(detection.bbox, [100, 100, 300, 250]);
}

#[test]
fn test_small_images_pass_through() {
    let probe = Arc::new(SizeProbe::new());
    let detector: Arc<dyn ObjectDetector> = probe.clone();
    let manager = DetectionModelManager::from_detectors(None, Some(detector));

    let image = DynamicImage::ImageRgb8(RgbImage::new(640, 480));
    manager.adapter(DetectionKind::Burnt).detect(&image).unwrap();
    assert_eq!(probe.seen.lock().unwrap()[0], (640, 480));
}

#[test]
fn test_unloaded_kind_reports_unavailable() {
    let probe: Arc<dyn ObjectDetector> = Arc::new(SizeProbe::new());
    let manager = DetectionModelManager::from_detectors(Some(probe), None);

    assert!(!manager.models_loaded());
    let image = DynamicImage::ImageRgb8(RgbImage::new(32, 32));
    let err = manager
        .adapter(DetectionKind::Burnt)
        .detect(&image)
        .unwrap_err();
    assert!(matches!(err, DetectionError::ModelUnavailable(DetectionKind::Burnt)));
    assert_eq!(err.to_string(), "burnt components model not loaded");

    let models = manager.list_models();
    assert!(models[0].available);
    assert!(!models[1].available);
}

#[tokio::test]
async fn test_manager_survives_missing_model_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("missing")).unwrap();

    let config = DetectionModelConfig {
        missing_model_dir: Some(dir.path().join("missing")),
        burnt_model_dir: Some(dir.path().join("burnt")),
        ..Default::default()
    };
    let manager = DetectionModelManager::new(config).await.unwrap();
    assert!(!manager.models_loaded());
    assert!(manager.list_models().iter().all(|m| !m.available));
}

#[tokio::test]
#[ignore] // Requires exported YOLO models under ./models
async fn test_real_models_load() {
    let manager = DetectionModelManager::new(DetectionModelConfig::default())
        .await
        .unwrap();
    assert!(manager.models_loaded());
}
