// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for events inside the stage services.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Frame source refreshed its source set.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use sono_triage::observability::messages::stage::SourcesReloaded;
///
/// let msg = SourcesReloaded {
///     origin: "sample_images",
///     count: 4,
/// };
///
/// assert_eq!(msg.to_string(), "Loaded 4 images from sample_images");
/// ```
pub struct SourcesReloaded<'a> {
    pub origin: &'a str,
    pub count: usize,
}

impl Display for SourcesReloaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Loaded {} images from {}", self.count, self.origin)
    }
}

impl StructuredLog for SourcesReloaded<'_> {
    fn log(&self) {
        tracing::info!(origin = self.origin, count = self.count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("sources_reloaded", span_name = name, origin = self.origin)
    }
}

pub struct FrameServed<'a> {
    pub source: &'a str,
    pub size: usize,
}

impl Display for FrameServed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Serving frame from {} ({} bytes)", self.source, self.size)
    }
}

impl StructuredLog for FrameServed<'_> {
    fn log(&self) {
        tracing::info!(source = self.source, size = self.size, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("frame_served", span_name = name, source = self.source)
    }
}

/// Segmentation finished for one image.
pub struct SegmentationCompleted {
    pub width: u32,
    pub height: u32,
    pub score: f64,
}

impl Display for SegmentationCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Segmentation complete for {}x{} image with score {}",
            self.width, self.height, self.score
        )
    }
}

impl StructuredLog for SegmentationCompleted {
    fn log(&self) {
        tracing::info!(
            width = self.width,
            height = self.height,
            score = self.score,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("segmentation", span_name = name, score = self.score)
    }
}

/// Assessment backend unavailable; the fallback diagnosis is returned instead.
///
/// # Log Level
/// `warn!` - Degraded but still serving
pub struct AssessmentDegraded<'a> {
    pub target_organ: &'a str,
    pub reason: &'a str,
}

impl Display for AssessmentDegraded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Assessment of '{}' degraded to fallback diagnosis: {}",
            self.target_organ, self.reason
        )
    }
}

impl StructuredLog for AssessmentDegraded<'_> {
    fn log(&self) {
        tracing::warn!(
            target_organ = self.target_organ,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("assessment_degraded", span_name = name, target_organ = self.target_organ)
    }
}

pub struct SpeechSynthesized<'a> {
    pub text: &'a str,
    pub audio_size: usize,
}

impl Display for SpeechSynthesized<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        // Cap the echoed text; announcements can be long diagnoses.
        let preview: String = self.text.chars().take(100).collect();
        write!(
            f,
            "Synthesized speech ({} bytes) for: {}",
            self.audio_size, preview
        )
    }
}

impl StructuredLog for SpeechSynthesized<'_> {
    fn log(&self) {
        tracing::info!(audio_size = self.audio_size, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("speech", span_name = name, audio_size = self.audio_size)
    }
}

pub struct SpeechUnavailable<'a> {
    pub reason: &'a str,
}

impl Display for SpeechUnavailable<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Speech synthesis unavailable: {}", self.reason)
    }
}

impl StructuredLog for SpeechUnavailable<'_> {
    fn log(&self) {
        tracing::warn!(reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("speech_unavailable", span_name = name)
    }
}
