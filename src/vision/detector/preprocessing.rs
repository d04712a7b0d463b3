// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Letterbox preprocessing for YOLO detection models

use image::{imageops, DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

/// Default square input edge for exported YOLO models
pub const DEFAULT_INPUT_SIZE: u32 = 640;

/// Gray used to pad letterboxed inputs
pub const PAD_VALUE: u8 = 114;

/// How an image was placed inside the square model input.
///
/// Needed to map boxes back into source pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    pub source_width: u32,
    pub source_height: u32,
}

impl Letterbox {
    /// Map a point from model input space to source image space, clamped to the image
    pub fn to_source(&self, x: f32, y: f32) -> (f32, f32) {
        let sx = ((x - self.pad_x) / self.scale).clamp(0.0, self.source_width as f32);
        let sy = ((y - self.pad_y) / self.scale).clamp(0.0, self.source_height as f32);
        (sx, sy)
    }
}

/// Resize with aspect ratio preserved and pad to `target_size` square.
///
/// The resized image is centered; leftover area is filled with `PAD_VALUE`.
pub fn letterbox(image: &DynamicImage, target_size: u32) -> (RgbImage, Letterbox) {
    let (orig_w, orig_h) = image.dimensions();
    let mut output = RgbImage::from_pixel(target_size, target_size, Rgb([PAD_VALUE; 3]));

    if orig_w == 0 || orig_h == 0 {
        let placement = Letterbox {
            scale: 1.0,
            pad_x: 0.0,
            pad_y: 0.0,
            source_width: orig_w,
            source_height: orig_h,
        };
        return (output, placement);
    }

    let scale = (target_size as f32 / orig_w as f32).min(target_size as f32 / orig_h as f32);
    let new_w = ((orig_w as f32 * scale).round() as u32).clamp(1, target_size);
    let new_h = ((orig_h as f32 * scale).round() as u32).clamp(1, target_size);

    let resized = image
        .resize_exact(new_w, new_h, imageops::FilterType::Triangle)
        .to_rgb8();

    let offset_x = (target_size - new_w) / 2;
    let offset_y = (target_size - new_h) / 2;
    imageops::replace(&mut output, &resized, offset_x as i64, offset_y as i64);

    let placement = Letterbox {
        scale,
        pad_x: offset_x as f32,
        pad_y: offset_y as f32,
        source_width: orig_w,
        source_height: orig_h,
    };
    (output, placement)
}

/// Build the NCHW float tensor ([1, 3, H, W], values in 0..1) the model expects
pub fn to_input_tensor(rgb: &RgbImage) -> Array4<f32> {
    let (width, height) = rgb.dimensions();
    let mut tensor = Array4::zeros((1, 3, height as usize, width as usize));

    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
        }
    }

    tensor
}

/// Letterbox then tensorize in one step
pub fn preprocess(image: &DynamicImage, target_size: u32) -> (Array4<f32>, Letterbox) {
    let (padded, placement) = letterbox(image, target_size);
    (to_input_tensor(&padded), placement)
}
