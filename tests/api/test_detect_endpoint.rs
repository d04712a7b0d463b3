// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! POST /detect/missing and POST /detect/burnt

use super::common::*;
use axum::http::{Method, StatusCode};
use pcb_inspection_node::{
    api::{
        detect::request::MISSING_IMAGE_MESSAGE, errors::DETECTION_FAILED_MESSAGE, AppState,
    },
    config::NodeConfig,
    vision::decode_base64_image,
};
use serde_json::json;
use std::time::Duration;

fn board_detector() -> FixedDetector {
    FixedDetector::new(
        vec![
            raw_box(10.0, 10.0, 60.5, 50.9, 0.876_54, 0),
            raw_box(100.0, 40.0, 150.0, 90.0, 0.41, 1),
            // Below the detection threshold
            raw_box(5.0, 5.0, 20.0, 20.0, 0.1, 1),
        ],
        &["capacitor", "resistor"],
    )
}

#[tokio::test]
async fn test_detect_missing_json_base64() {
    let app = router(state_with_detector(NodeConfig::default(), board_detector()));

    let request = json_request(
        Method::POST,
        "/detect/missing",
        json!({"image_base64": png_base64(200, 100)}),
    );
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);

    let detections = body["detections"].as_array().unwrap();
    assert_eq!(detections.len(), 2);
    assert_eq!(detections[0]["label"], "capacitor");
    assert_eq!(detections[0]["label_id"], 0);
    assert_eq!(detections[0]["bbox"], json!([10, 10, 60, 50]));
    let confidence = detections[0]["confidence"].as_f64().unwrap();
    assert!((confidence - 0.8765).abs() < 1e-6);
    assert_eq!(detections[1]["label"], "resistor");

    // Annotated JPEG keeps the input dimensions
    let (annotated, info) = decode_base64_image(body["image_base64"].as_str().unwrap()).unwrap();
    assert_eq!(info.format, image::ImageFormat::Jpeg);
    assert_eq!((annotated.width(), annotated.height()), (200, 100));
}

#[tokio::test]
async fn test_detect_accepts_data_uri_prefix() {
    let app = router(state_with_detector(NodeConfig::default(), board_detector()));

    let image = format!("data:image/png;base64,{}", png_base64(64, 64));
    let response = send(
        &app,
        json_request(Method::POST, "/detect/burnt", json!({ "image_base64": image })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_detect_burnt_multipart_upload() {
    let app = router(state_with_detector(NodeConfig::default(), board_detector()));

    let request = multipart_request("/detect/burnt", "image", "board.png", &png_bytes(200, 100));
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["detections"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_detect_multipart_without_image_field() {
    let app = router(state_with_detector(NodeConfig::default(), board_detector()));

    let request = multipart_request("/detect/missing", "photo", "board.png", &png_bytes(32, 32));
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["message"], MISSING_IMAGE_MESSAGE);
}

#[tokio::test]
async fn test_detect_uprights_exif_rotated_photo() {
    let app = router(state_with_detector(NodeConfig::default(), board_detector()));

    let request = multipart_request(
        "/detect/missing",
        "image",
        "phone.jpg",
        &oriented_jpeg_bytes(200, 100, 6),
    );
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let (annotated, _) = decode_base64_image(body["image_base64"].as_str().unwrap()).unwrap();
    assert_eq!((annotated.width(), annotated.height()), (100, 200));
}

#[tokio::test]
async fn test_detect_raw_body() {
    let app = router(state_with_detector(NodeConfig::default(), board_detector()));

    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/detect/missing")
        .header("content-type", "image/png")
        .body(axum::body::Body::from(png_bytes(80, 80)))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_detect_without_image() {
    let app = router(state_with_detector(NodeConfig::default(), board_detector()));

    let response = send(&app, json_request(Method::POST, "/detect/missing", json!({}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], MISSING_IMAGE_MESSAGE);

    let response = send(&app, empty_request(Method::POST, "/detect/missing")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_detect_invalid_base64() {
    let app = router(state_with_detector(NodeConfig::default(), board_detector()));

    let response = send(
        &app,
        json_request(
            Method::POST,
            "/detect/missing",
            json!({"image_base64": "not-valid-base64!!!"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], "Invalid base64 image data provided.");
}

#[tokio::test]
async fn test_detect_rejects_unknown_fields() {
    let app = router(state_with_detector(NodeConfig::default(), board_detector()));

    let response = send(
        &app,
        json_request(
            Method::POST,
            "/detect/missing",
            json!({"image_base64": png_base64(8, 8), "threshold": 0.5}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_detect_without_models_is_generic_500() {
    let app = router(AppState::new_for_test());

    let response = send(
        &app,
        json_request(
            Method::POST,
            "/detect/missing",
            json!({"image_base64": png_base64(32, 32)}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["message"], DETECTION_FAILED_MESSAGE);
    assert!(body["error"].get("trace").is_none());
}

#[tokio::test]
async fn test_detect_error_details_include_trace() {
    let config = NodeConfig {
        enable_error_details: true,
        ..Default::default()
    };
    let state = AppState::new(config, pcb_inspection_node::vision::DetectionModelManager::empty())
        .unwrap();
    let app = router(state);

    let response = send(
        &app,
        json_request(
            Method::POST,
            "/detect/burnt",
            json!({"image_base64": png_base64(32, 32)}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    let trace = body["error"]["trace"].as_str().unwrap();
    assert!(trace.contains("burnt components model not loaded"));
}

#[tokio::test]
async fn test_detect_timeout() {
    let config = NodeConfig {
        inference_timeout: Duration::from_millis(50),
        ..Default::default()
    };
    let mut detector = board_detector();
    detector.delay = Some(Duration::from_millis(500));
    let app = router(state_with_detector(config, detector));

    let response = send(
        &app,
        json_request(
            Method::POST,
            "/detect/missing",
            json!({"image_base64": png_base64(32, 32)}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn test_body_over_limit() {
    let config = NodeConfig {
        max_body_bytes: 2 * 1024 * 1024,
        ..Default::default()
    };
    let app = router(state_with_detector(config, board_detector()));

    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/detect/missing")
        .header("content-type", "application/octet-stream")
        .body(axum::body::Body::from(vec![0u8; 3 * 1024 * 1024]))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], "File too large. Maximum size is 2MB.");
}

#[tokio::test]
async fn test_unknown_detect_route() {
    let app = router(AppState::new_for_test());

    let response = send(&app, empty_request(Method::POST, "/detect/unknown")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(
        body,
        json!({"success": false, "error": {"message": "Endpoint not found."}})
    );
}
