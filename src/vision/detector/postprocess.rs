// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLO output decoding and non-maximum suppression

use anyhow::Result;
use ndarray::{ArrayViewD, Axis, Ix2};

use super::preprocessing::Letterbox;
use super::RawBox;

/// Overlap above which a same-class box is suppressed
pub const NMS_IOU_THRESHOLD: f32 = 0.7;

/// Upper bound on boxes returned per image
pub const MAX_DETECTIONS: usize = 300;

/// Decode a YOLO head output into boxes in source image pixels.
///
/// Accepts `[1, 4 + classes, anchors]` (the ultralytics export layout) or the
/// transposed `[1, anchors, 4 + classes]`. The first four channels are
/// `cx, cy, w, h` in model input space, the rest are per-class scores.
pub fn decode_output(
    output: ArrayViewD<f32>,
    placement: &Letterbox,
    confidence_threshold: f32,
) -> Result<Vec<RawBox>> {
    let shape = output.shape().to_vec();
    if shape.len() != 3 || shape[0] != 1 {
        anyhow::bail!("Unexpected detection output shape: {:?}", shape);
    }

    let view = output.index_axis(Axis(0), 0).into_dimensionality::<Ix2>()?;
    // More anchors than channels in any real export
    let view = if shape[1] <= shape[2] {
        view
    } else {
        view.reversed_axes()
    };

    let channels = view.shape()[0];
    if channels < 5 {
        anyhow::bail!("Detection output has {} channels, need at least 5", channels);
    }

    let mut candidates = Vec::new();
    for column in view.axis_iter(Axis(1)) {
        let (class_id, confidence) = column
            .iter()
            .skip(4)
            .enumerate()
            .fold((0usize, f32::MIN), |best, (i, &score)| {
                if score > best.1 {
                    (i, score)
                } else {
                    best
                }
            });

        if confidence < confidence_threshold {
            continue;
        }

        let (cx, cy, w, h) = (column[0], column[1], column[2], column[3]);
        let (x1, y1) = placement.to_source(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = placement.to_source(cx + w / 2.0, cy + h / 2.0);

        candidates.push(RawBox {
            x1,
            y1,
            x2,
            y2,
            confidence,
            class_id,
        });
    }

    Ok(non_max_suppression(candidates, NMS_IOU_THRESHOLD, MAX_DETECTIONS))
}

/// Per-class greedy NMS. Output is sorted by confidence, highest first.
pub fn non_max_suppression(
    mut boxes: Vec<RawBox>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<RawBox> {
    boxes.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<RawBox> = Vec::new();
    for candidate in boxes {
        if kept.len() >= max_detections {
            break;
        }
        let suppressed = kept
            .iter()
            .any(|k| k.class_id == candidate.class_id && iou(k, &candidate) > iou_threshold);
        if !suppressed {
            kept.push(candidate);
        }
    }

    kept
}

/// Intersection over union of two corner-form boxes
pub fn iou(a: &RawBox, b: &RawBox) -> f32 {
    let x1 = a.x1.max(b.x1);
    let y1 = a.y1.max(b.y1);
    let x2 = a.x2.min(b.x2);
    let y2 = a.y2.min(b.y2);

    let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let area_a = (a.x2 - a.x1).max(0.0) * (a.y2 - a.y1).max(0.0);
    let area_b = (b.x2 - b.x1).max(0.0) * (b.y2 - b.y1).max(0.0);
    let union = area_a + area_b - intersection;

    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}
