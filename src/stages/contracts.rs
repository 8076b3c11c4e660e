// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Request/reply schemas of the four pipeline stages.
//!
//! | Stage         | Operation   | Request                       | Reply                  |
//! |---------------|-------------|-------------------------------|------------------------|
//! | Frame Source  | `nextFrame` | none                          | `Frame`                |
//! | Segmenter     | `segment`   | `image`                       | `SegmentationResult`   |
//! | Diagnostician | `assess`    | `image, mask, target_organ`   | `DiagnosticResult`     |
//! | Announcer     | `speak`     | `text`                        | `{audio}` or `{error}` |
//!
//! Requests are checked by the `expect_*` functions on the service side before
//! they reach stage logic; replies are checked by the `*_from_reply` functions
//! on the caller side before they reach the coordinator.

use serde::Deserialize;
use std::fmt;

use crate::errors::ServiceError;
use crate::proto::{
    AssessRequest, DiagnosticResult, Frame, NextFrameRequest, Reply, RequestBody,
    SegmentRequest, SegmentationResult, SpeakReply, SpeakRequest,
};

pub const NEXT_FRAME: &str = "nextFrame";
pub const SEGMENT: &str = "segment";
pub const ASSESS: &str = "assess";
pub const SPEAK: &str = "speak";

/// One of the four pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    FrameSource,
    Segmenter,
    Diagnostician,
    Announcer,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::FrameSource,
        Stage::Segmenter,
        Stage::Diagnostician,
        Stage::Announcer,
    ];

    /// Name under which the stage's service registers itself.
    pub fn service_name(&self) -> &'static str {
        match self {
            Stage::FrameSource => "ultrasound-ingest",
            Stage::Segmenter => "segmentation",
            Stage::Diagnostician => "diagnostic",
            Stage::Announcer => "voice-tts",
        }
    }

    /// The single operation the stage serves.
    pub fn operation(&self) -> &'static str {
        match self {
            Stage::FrameSource => NEXT_FRAME,
            Stage::Segmenter => SEGMENT,
            Stage::Diagnostician => ASSESS,
            Stage::Announcer => SPEAK,
        }
    }

    /// Parse a command-line stage name (`frame-source`, `segmenter`, ...).
    pub fn from_cli_name(name: &str) -> Option<Stage> {
        match name {
            "frame-source" | "frame_source" | "ingest" => Some(Stage::FrameSource),
            "segmenter" | "segmentation" => Some(Stage::Segmenter),
            "diagnostician" | "diagnostic" => Some(Stage::Diagnostician),
            "announcer" | "voice-tts" | "tts" => Some(Stage::Announcer),
            _ => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::FrameSource => "frame source",
            Stage::Segmenter => "segmenter",
            Stage::Diagnostician => "diagnostician",
            Stage::Announcer => "announcer",
        };
        f.write_str(name)
    }
}

fn body_kind(body: &RequestBody) -> &'static str {
    match body {
        RequestBody::NextFrame(_) => NEXT_FRAME,
        RequestBody::Segment(_) => SEGMENT,
        RequestBody::Assess(_) => ASSESS,
        RequestBody::Speak(_) => SPEAK,
    }
}

fn wrong_body(expected: &str, body: &RequestBody) -> ServiceError {
    ServiceError::malformed(
        "body",
        format!("expected a '{}' request but received '{}'", expected, body_kind(body)),
    )
}

fn require_text(field: &'static str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::malformed(field, "is required"));
    }
    Ok(())
}

fn require_bytes(field: &'static str, value: &[u8]) -> Result<(), ServiceError> {
    if value.is_empty() {
        return Err(ServiceError::malformed(field, "is required"));
    }
    Ok(())
}

pub fn expect_next_frame(body: RequestBody) -> Result<NextFrameRequest, ServiceError> {
    match body {
        RequestBody::NextFrame(request) => Ok(request),
        other => Err(wrong_body(NEXT_FRAME, &other)),
    }
}

pub fn expect_segment(body: RequestBody) -> Result<SegmentRequest, ServiceError> {
    match body {
        RequestBody::Segment(request) => {
            require_bytes("image", &request.image)?;
            Ok(request)
        }
        other => Err(wrong_body(SEGMENT, &other)),
    }
}

pub fn expect_assess(body: RequestBody) -> Result<AssessRequest, ServiceError> {
    match body {
        RequestBody::Assess(request) => {
            require_bytes("image", &request.image)?;
            require_bytes("mask", &request.mask)?;
            require_text("target_organ", &request.target_organ)?;
            Ok(request)
        }
        other => Err(wrong_body(ASSESS, &other)),
    }
}

pub fn expect_speak(body: RequestBody) -> Result<SpeakRequest, ServiceError> {
    match body {
        RequestBody::Speak(request) => {
            require_text("text", &request.text)?;
            Ok(request)
        }
        other => Err(wrong_body(SPEAK, &other)),
    }
}

fn unit_range(name: &str, value: f64) -> Result<(), String> {
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("{} {} is outside [0, 1]", name, value));
    }
    Ok(())
}

fn unexpected(expected: &str, reply: &Reply) -> String {
    format!("expected a {} reply but received {}", expected, reply.kind())
}

pub fn frame_from_reply(reply: Reply) -> Result<Frame, String> {
    match reply {
        Reply::Frame(frame) => Ok(frame),
        other => Err(unexpected("frame", &other)),
    }
}

pub fn segmentation_from_reply(reply: Reply) -> Result<SegmentationResult, String> {
    match reply {
        Reply::Segmentation(result) => {
            unit_range("score", result.score)?;
            if let Some(bbox) = &result.bbox {
                if bbox.x0 > bbox.x1 || bbox.y0 > bbox.y1 {
                    return Err(format!(
                        "bbox ({}, {}, {}, {}) is inverted",
                        bbox.x0, bbox.y0, bbox.x1, bbox.y1
                    ));
                }
            }
            Ok(result)
        }
        other => Err(unexpected("segmentation", &other)),
    }
}

pub fn diagnostic_from_reply(reply: Reply) -> Result<DiagnosticResult, String> {
    match reply {
        Reply::Diagnostic(result) => {
            unit_range("image_quality", result.image_quality)?;
            Ok(result)
        }
        other => Err(unexpected("diagnostic", &other)),
    }
}

pub fn speech_from_reply(reply: Reply) -> Result<SpeakReply, String> {
    match reply {
        Reply::Speech(speech) if speech.outcome.is_some() => Ok(speech),
        Reply::Speech(_) => Err("speech reply carries neither audio nor error".to_string()),
        other => Err(unexpected("speech", &other)),
    }
}
