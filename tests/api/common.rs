// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared helpers for the HTTP endpoint tests
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use pcb_inspection_node::{
    api::{create_router, AppState},
    config::NodeConfig,
    vision::{DetectionModelManager, ObjectDetector, RawBox},
    voltage::EventPublisher,
};
use serde_json::Value;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

/// Returns the same boxes for every image
pub struct FixedDetector {
    pub boxes: Vec<RawBox>,
    pub names: Vec<String>,
    pub delay: Option<Duration>,
}

impl FixedDetector {
    pub fn new(boxes: Vec<RawBox>, names: &[&str]) -> Self {
        Self {
            boxes,
            names: names.iter().map(|s| s.to_string()).collect(),
            delay: None,
        }
    }
}

impl ObjectDetector for FixedDetector {
    fn predict(&self, _image: &DynamicImage, threshold: f32) -> anyhow::Result<Vec<RawBox>> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        Ok(self
            .boxes
            .iter()
            .filter(|b| b.confidence >= threshold)
            .cloned()
            .collect())
    }

    fn class_name(&self, class_id: usize) -> Option<&str> {
        self.names.get(class_id).map(String::as_str)
    }
}

/// Collects every published event
#[derive(Default)]
pub struct RecordingPublisher {
    pub events: Mutex<Vec<(String, Value)>>,
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, event: &str, payload: Value) {
        self.events
            .lock()
            .unwrap()
            .push((event.to_string(), payload));
    }
}

pub fn raw_box(x1: f32, y1: f32, x2: f32, y2: f32, confidence: f32, class_id: usize) -> RawBox {
    RawBox {
        x1,
        y1,
        x2,
        y2,
        confidence,
        class_id,
    }
}

/// Both models answer with `detector`
pub fn state_with_detector(config: NodeConfig, detector: FixedDetector) -> AppState {
    let detector: Arc<dyn ObjectDetector> = Arc::new(detector);
    let models = DetectionModelManager::from_detectors(Some(detector.clone()), Some(detector));
    AppState::new(config, models).unwrap()
}

pub fn router(state: AppState) -> Router {
    create_router(state)
}

/// Solid gray board photo
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb([90, 120, 90]));
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image)
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

/// JPEG tagged with an EXIF orientation (6 = rotate 90 degrees clockwise)
pub fn oriented_jpeg_bytes(width: u32, height: u32, orientation: u8) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb([90, 120, 90]));
    let jpeg = pcb_inspection_node::vision::image_utils::encode_jpeg(&image).unwrap();

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1, 0x00, 0x22]);
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(b"MM\0\x2A\0\0\0\x08");
    out.extend_from_slice(&[
        0x00, 0x01, 0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01, 0x00, orientation, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00,
    ]);
    out.extend_from_slice(&jpeg[2..]);
    out
}

pub fn png_base64(width: u32, height: u32) -> String {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    STANDARD.encode(png_bytes(width, height))
}

pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub const BOUNDARY: &str = "pcb-test-boundary";

/// One-file multipart body
pub fn multipart_request(uri: &str, field: &str, filename: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
