// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::stage_v1::stage_response::Outcome;
use super::stage_v1::{DiagnosticResult, Frame, SegmentationResult, SpeakReply};

/// A successful reply from a stage operation.
///
/// This is the success half of [`Outcome`]: failures travel as
/// `Outcome::Error` on the wire and as `Err` values everywhere else, so a
/// `Reply` can never carry one.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Frame(Frame),
    Segmentation(SegmentationResult),
    Diagnostic(DiagnosticResult),
    Speech(SpeakReply),
}

impl Reply {
    /// Short name of the reply variant, used in malformed-reply diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Reply::Frame(_) => "frame",
            Reply::Segmentation(_) => "segmentation",
            Reply::Diagnostic(_) => "diagnostic",
            Reply::Speech(_) => "speech",
        }
    }

    /// Split a wire outcome into a reply, handing back the outcome untouched
    /// when it is an error.
    pub fn from_outcome(outcome: Outcome) -> Result<Reply, Outcome> {
        match outcome {
            Outcome::Frame(frame) => Ok(Reply::Frame(frame)),
            Outcome::Segmentation(result) => Ok(Reply::Segmentation(result)),
            Outcome::Diagnostic(result) => Ok(Reply::Diagnostic(result)),
            Outcome::Speech(reply) => Ok(Reply::Speech(reply)),
            other @ Outcome::Error(_) => Err(other),
        }
    }
}

impl From<Reply> for Outcome {
    fn from(reply: Reply) -> Self {
        match reply {
            Reply::Frame(frame) => Outcome::Frame(frame),
            Reply::Segmentation(result) => Outcome::Segmentation(result),
            Reply::Diagnostic(result) => Outcome::Diagnostic(result),
            Reply::Speech(reply) => Outcome::Speech(reply),
        }
    }
}
