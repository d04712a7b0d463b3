// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Callout annotation of detection results
//!
//! Each detection gets a box outline, a short line leaving the box from the
//! middle of its right edge (left edge when the caption would not fit), and a
//! translucent caption box at the end of the line.

use ab_glyph::{Font, FontRef, PxScale, ScaleFont};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use thiserror::Error;

use super::detector::Detection;
use super::image_utils::{encode_jpeg, ImageError};

/// Box colors, picked by `label_id mod 7`
pub const PALETTE: [Rgb<u8>; 7] = [
    Rgb([0, 0, 255]),
    Rgb([0, 255, 0]),
    Rgb([255, 0, 0]),
    Rgb([0, 255, 255]),
    Rgb([255, 0, 255]),
    Rgb([255, 255, 0]),
    Rgb([0, 165, 255]),
];

/// Distance from the box edge to the caption anchor
pub const CALLOUT_LENGTH: i32 = 30;

/// Space between caption text and its background box
pub const LABEL_PADDING: i32 = 6;

pub const LABEL_BG_ALPHA: f32 = 0.5;

const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Glyph pixel height at font scale 1.0
const PX_PER_FONT_SCALE: f32 = 30.0;

static FONT_DATA: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error("Failed to load annotation font")]
    FontLoad,

    #[error(transparent)]
    Encode(#[from] ImageError),
}

/// Font scale and stroke thickness for an image of the given size
pub fn font_metrics(width: u32, height: u32) -> (f32, u32) {
    let scale = (width.min(height) as f32 / 1200.0).max(0.5);
    let thickness = ((scale * 2.0).floor() as u32).max(1);
    (scale, thickness)
}

/// Palette entry for a detection; the draw index stands in for a missing id
pub fn color_for(label_id: Option<i64>, index: usize) -> Rgb<u8> {
    let slot = match label_id {
        Some(id) => id.rem_euclid(PALETTE.len() as i64) as usize,
        None => index % PALETTE.len(),
    };
    PALETTE[slot]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSide {
    Right,
    Left,
}

/// Caption background, already clamped to the image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl LabelBox {
    pub fn is_empty(&self) -> bool {
        self.x2 <= self.x1 || self.y2 <= self.y1
    }
}

/// Where every piece of one callout goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalloutLayout {
    pub side: LabelSide,
    /// Point on the box edge where the line starts
    pub box_anchor: (i32, i32),
    /// Unclamped end of the callout line
    pub label_anchor: (i32, i32),
    /// Line end clamped horizontally to the image
    pub line_end: (i32, i32),
    pub label_box: LabelBox,
    /// Top-left of the caption text
    pub text_origin: (i32, i32),
}

/// Lay out one callout without drawing anything.
///
/// `text_width`/`text_height` are the rendered caption extents and `descent`
/// is the space below the baseline.
pub fn plan_callout(
    bbox: [i32; 4],
    text_width: u32,
    text_height: u32,
    descent: u32,
    image_width: u32,
    image_height: u32,
) -> CalloutLayout {
    let [x1, y1, x2, y2] = bbox;
    let (text_w, text_h, descent) = (text_width as i32, text_height as i32, descent as i32);
    let (img_w, img_h) = (image_width as i32, image_height as i32);

    let center_y = (y1 + y2) / 2;
    let caption_span = text_w + 2 * LABEL_PADDING;

    let (side, box_anchor, label_anchor) = if x2 + CALLOUT_LENGTH + caption_span > img_w {
        (
            LabelSide::Left,
            (x1, center_y),
            (x1 - CALLOUT_LENGTH, center_y),
        )
    } else {
        (
            LabelSide::Right,
            (x2, center_y),
            (x2 + CALLOUT_LENGTH, center_y),
        )
    };

    let line_end = (label_anchor.0.clamp(0, img_w), center_y);

    let (box_x1, box_x2) = match side {
        LabelSide::Left => (label_anchor.0 - caption_span, label_anchor.0),
        LabelSide::Right => (label_anchor.0, label_anchor.0 + caption_span),
    };
    let label_box = LabelBox {
        x1: box_x1.max(0),
        y1: (center_y - text_h / 2 - LABEL_PADDING).max(0),
        x2: box_x2.min(img_w),
        y2: (center_y + text_h / 2 + LABEL_PADDING + descent).min(img_h),
    };

    CalloutLayout {
        side,
        box_anchor,
        label_anchor,
        line_end,
        label_box,
        text_origin: (label_box.x1 + LABEL_PADDING, center_y - text_h / 2),
    }
}

/// Draws detection callouts and re-encodes the result as JPEG
pub struct Annotator {
    font: FontRef<'static>,
}

impl std::fmt::Debug for Annotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Annotator").finish_non_exhaustive()
    }
}

impl Annotator {
    pub fn new() -> Result<Self, AnnotateError> {
        let font = FontRef::try_from_slice(FONT_DATA).map_err(|_| AnnotateError::FontLoad)?;
        Ok(Self { font })
    }

    /// Annotate a copy of `image` and return it as JPEG bytes
    pub fn annotate(
        &self,
        image: &DynamicImage,
        detections: &[Detection],
    ) -> Result<Vec<u8>, AnnotateError> {
        let canvas = self.render(image, detections);
        Ok(encode_jpeg(&canvas)?)
    }

    /// Draw all callouts onto an RGB copy of `image`.
    ///
    /// Detections are drawn top to bottom (by `bbox[1]`) so later captions
    /// sit over earlier lines rather than the other way around.
    pub fn render(&self, image: &DynamicImage, detections: &[Detection]) -> RgbImage {
        let mut canvas = image.to_rgb8();

        let mut ordered: Vec<&Detection> = detections.iter().collect();
        ordered.sort_by_key(|d| d.bbox[1]);

        let (scale, thickness) = font_metrics(canvas.width(), canvas.height());
        let px = PxScale::from(scale * PX_PER_FONT_SCALE);
        let descent = (-self.font.as_scaled(px).descent()).ceil().max(0.0) as u32;

        for (index, detection) in ordered.into_iter().enumerate() {
            let color = color_for(detection.label_id, index);
            let caption = format!("{} {:.2}", detection.label, detection.confidence);
            let (text_w, text_h) = text_size(px, &self.font, &caption);

            draw_box(&mut canvas, detection.bbox, color, thickness);

            let layout = plan_callout(
                detection.bbox,
                text_w,
                text_h,
                descent,
                canvas.width(),
                canvas.height(),
            );

            draw_thick_line(&mut canvas, layout.box_anchor, layout.line_end, color, thickness);

            if layout.label_box.is_empty() {
                continue;
            }
            blend_rect(&mut canvas, &layout.label_box, color, LABEL_BG_ALPHA);

            // Faux bold: restrike the caption once per extra pixel of thickness
            for dx in 0..thickness as i32 {
                draw_text_mut(
                    &mut canvas,
                    TEXT_COLOR,
                    layout.text_origin.0 + dx,
                    layout.text_origin.1,
                    px,
                    &self.font,
                    &caption,
                );
            }
        }

        canvas
    }
}

fn draw_box(canvas: &mut RgbImage, bbox: [i32; 4], color: Rgb<u8>, thickness: u32) {
    let [x1, y1, x2, y2] = bbox;
    for t in 0..thickness as i32 {
        let width = x2 - x1 + 1 - 2 * t;
        let height = y2 - y1 + 1 - 2 * t;
        if width <= 0 || height <= 0 {
            break;
        }
        let rect = Rect::at(x1 + t, y1 + t).of_size(width as u32, height as u32);
        draw_hollow_rect_mut(canvas, rect, color);
    }
}

fn draw_thick_line(
    canvas: &mut RgbImage,
    start: (i32, i32),
    end: (i32, i32),
    color: Rgb<u8>,
    thickness: u32,
) {
    let offset = thickness as i32 / 2;
    for t in 0..thickness as i32 {
        let dy = (t - offset) as f32;
        draw_line_segment_mut(
            canvas,
            (start.0 as f32, start.1 as f32 + dy),
            (end.0 as f32, end.1 as f32 + dy),
            color,
        );
    }
}

/// Mix `color` into every pixel of `area` with weight `alpha`
fn blend_rect(canvas: &mut RgbImage, area: &LabelBox, color: Rgb<u8>, alpha: f32) {
    let x_end = (area.x2.max(0) as u32).min(canvas.width());
    let y_end = (area.y2.max(0) as u32).min(canvas.height());

    for y in area.y1.max(0) as u32..y_end {
        for x in area.x1.max(0) as u32..x_end {
            let pixel = canvas.get_pixel_mut(x, y);
            for c in 0..3 {
                let mixed = alpha * color[c] as f32 + (1.0 - alpha) * pixel[c] as f32;
                pixel[c] = mixed.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}
