// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Segmenter stage with a fixed confidence.
//!
//! Stands in for a real segmentation model: it checks that the image is a
//! PNG or JPEG, decodes it and returns a central disc (radius a quarter of
//! the shorter side) as the mask. Both the mask (8-bit gray, 255 inside the
//! disc) and the overlay (the frame with the disc painted opaque red) are
//! PNG-encoded.

use async_trait::async_trait;
use image::{DynamicImage, GrayImage, ImageFormat, ImageReader, Luma, Rgba};
use std::io::Cursor;

use crate::config::consts::MAX_MASK_PIXELS;
use crate::errors::ServiceError;
use crate::observability::messages::stage::SegmentationCompleted;
use crate::observability::messages::StructuredLog;
use crate::proto::{BoundingBox, Reply, RequestBody, SegmentationResult};
use crate::stages::contracts::expect_segment;
use crate::traits::OperationHandler;

/// Format and `(width, height)` of an encoded PNG or JPEG image. Only the
/// header is decoded.
pub fn image_dimensions(bytes: &[u8]) -> Option<(ImageFormat, u32, u32)> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?;
    let format = match reader.format() {
        Some(format @ (ImageFormat::Png | ImageFormat::Jpeg)) => format,
        _ => return None,
    };
    let (width, height) = reader.into_dimensions().ok()?;
    (width > 0 && height > 0).then_some((format, width, height))
}

const OVERLAY_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Central disc of radius `min(w, h) / 4` and its inclusive bounding box.
pub fn central_disc_mask(width: u32, height: u32) -> (GrayImage, BoundingBox) {
    let (cx, cy) = ((width / 2) as i64, (height / 2) as i64);
    let radius = (width.min(height) / 4) as i64;
    let radius_sq = radius * radius;

    let mut mask = GrayImage::new(width, height);
    for y in (cy - radius).max(0)..=(cy + radius).min(height as i64 - 1) {
        for x in (cx - radius).max(0)..=(cx + radius).min(width as i64 - 1) {
            let (dx, dy) = (x - cx, y - cy);
            if dx * dx + dy * dy <= radius_sq {
                mask.put_pixel(x as u32, y as u32, Luma([255]));
            }
        }
    }

    let bbox = BoundingBox {
        x0: (cx - radius).max(0) as i32,
        y0: (cy - radius).max(0) as i32,
        x1: (cx + radius).min(width as i64 - 1) as i32,
        y1: (cy + radius).min(height as i64 - 1) as i32,
    };
    (mask, bbox)
}

/// The frame as RGBA with every masked pixel painted [`OVERLAY_COLOR`].
pub fn overlay_mask(frame: &DynamicImage, mask: &GrayImage) -> DynamicImage {
    let mut overlay = frame.to_rgba8();
    for (x, y, pixel) in mask.enumerate_pixels() {
        if pixel[0] > 0 {
            overlay.put_pixel(x, y, OVERLAY_COLOR);
        }
    }
    DynamicImage::ImageRgba8(overlay)
}

fn encode_png(image: &DynamicImage, what: &str) -> Result<Vec<u8>, ServiceError> {
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, ImageFormat::Png)
        .map_err(|error| {
            ServiceError::UpstreamUnavailable(format!("failed to encode {}: {}", what, error))
        })?;
    Ok(bytes.into_inner())
}

/// `segment` handler.
pub struct FixedConfidenceSegmenter {
    confidence: f64,
}

impl FixedConfidenceSegmenter {
    pub fn new(confidence: f64) -> Self {
        Self {
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    pub fn segment(&self, image: &[u8]) -> Result<SegmentationResult, ServiceError> {
        let (format, width, height) = image_dimensions(image)
            .ok_or_else(|| ServiceError::malformed("image", "is not a decodable PNG or JPEG image"))?;

        // Checked on the header so oversized frames are never decoded.
        if width as u64 * height as u64 > MAX_MASK_PIXELS {
            return Err(ServiceError::malformed(
                "image",
                format!("{}x{} exceeds {} pixels", width, height, MAX_MASK_PIXELS),
            ));
        }

        let frame = image::load_from_memory_with_format(image, format).map_err(|error| {
            ServiceError::malformed("image", format!("could not be decoded: {}", error))
        })?;

        let (mask, bbox) = central_disc_mask(width, height);
        let overlay = encode_png(&overlay_mask(&frame, &mask), "overlay")?;
        let mask = encode_png(&DynamicImage::ImageLuma8(mask), "mask")?;

        SegmentationCompleted {
            width,
            height,
            score: self.confidence,
        }
        .log();

        Ok(SegmentationResult {
            mask,
            bbox: Some(bbox),
            score: self.confidence,
            overlay,
        })
    }
}

#[async_trait]
impl OperationHandler for FixedConfidenceSegmenter {
    async fn handle(&self, body: RequestBody) -> Result<Reply, ServiceError> {
        let request = expect_segment(body)?;
        Ok(Reply::Segmentation(self.segment(&request.image)?))
    }

    fn name(&self) -> &'static str {
        "fixed_confidence_segmenter"
    }
}

/// Small encoded test images.
#[cfg(test)]
pub(crate) mod fixtures {
    use image::{GrayImage, ImageFormat, Luma};
    use std::io::Cursor;

    fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let image = GrayImage::from_pixel(width, height, Luma([96]));
        let mut bytes = Cursor::new(Vec::new());
        image
            .write_to(&mut bytes, format)
            .expect("encoding a gray test image");
        bytes.into_inner()
    }

    pub fn png_image(width: u32, height: u32) -> Vec<u8> {
        encode(width, height, ImageFormat::Png)
    }

    pub fn jpeg_image(width: u16, height: u16) -> Vec<u8> {
        encode(width as u32, height as u32, ImageFormat::Jpeg)
    }
}
