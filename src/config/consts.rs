// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Spoken when the segmentation score falls below the quality gate
pub const DEFAULT_GUIDANCE_TEXT: &str = "Please adjust the probe position to improve image quality.";
/// Segmentation scores at or above this value proceed to diagnosis
pub const DEFAULT_QUALITY_THRESHOLD: f64 = 0.5;
/// Pause between coordinator iterations (milliseconds)
pub const DEFAULT_THROTTLE_MS: u64 = 1_000;
pub const DEFAULT_TARGET_ORGAN: &str = "liver";

/// Upper bound on every stage call (milliseconds)
pub const DEFAULT_CALL_TIMEOUT_MS: u64 = 5_000;
/// Largest wire frame accepted by either side of a TCP channel (64 MiB)
pub const DEFAULT_MAX_FRAME_BYTES: usize = 64 * 1024 * 1024;
/// Requests buffered ahead of a service's dispatcher
pub const DEFAULT_QUEUE_DEPTH: usize = 32;

pub const DEFAULT_FRAME_SOURCE_ADDRESS: &str = "127.0.0.1:7401";
pub const DEFAULT_SEGMENTER_ADDRESS: &str = "127.0.0.1:7402";
pub const DEFAULT_DIAGNOSTICIAN_ADDRESS: &str = "127.0.0.1:7403";
pub const DEFAULT_ANNOUNCER_ADDRESS: &str = "127.0.0.1:7404";

/// Drop directory scanned by the frame source
pub const DEFAULT_IMAGE_DIRECTORY: &str = "sample_images";
/// Acquisition settings attached to every frame
pub const DEFAULT_DEPTH: f64 = 70.0;
pub const DEFAULT_GAIN: f64 = 35.0;

pub const DEFAULT_SEGMENTATION_CONFIDENCE: f64 = 0.8;
/// Largest image (in pixels) the segmenter will build a mask for
pub const MAX_MASK_PIXELS: u64 = 4096 * 4096;

pub const DEFAULT_DIAGNOSIS: &str = "No abnormal findings";
pub const DEFAULT_IMAGE_QUALITY: f64 = 0.72;
/// Diagnosis reported when the assessment backend is unavailable
pub const FALLBACK_DIAGNOSIS: &str = "Unable to complete health assessment at this time.";

pub const DEFAULT_LOG_FILTER: &str = "info";
