// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

// Protobuf messages exchanged between the coordinator and the stage services.
// Field tags are part of the wire contract and must never be renumbered.

/// A single acquired image together with its acquisition parameters.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Frame {
    #[prost(bytes = "vec", tag = "1")]
    pub image: ::prost::alloc::vec::Vec<u8>,
    #[prost(map = "string, double", tag = "2")]
    pub settings: ::std::collections::HashMap<::prost::alloc::string::String, f64>,
    /// Seconds since the Unix epoch.
    #[prost(int64, tag = "3")]
    pub timestamp: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BoundingBox {
    #[prost(int32, tag = "1")]
    pub x0: i32,
    #[prost(int32, tag = "2")]
    pub y0: i32,
    #[prost(int32, tag = "3")]
    pub x1: i32,
    #[prost(int32, tag = "4")]
    pub y1: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SegmentationResult {
    #[prost(bytes = "vec", tag = "1")]
    pub mask: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub bbox: ::core::option::Option<BoundingBox>,
    /// Confidence in `[0, 1]`.
    #[prost(double, tag = "3")]
    pub score: f64,
    #[prost(bytes = "vec", tag = "4")]
    pub overlay: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DiagnosticResult {
    #[prost(string, tag = "1")]
    pub diagnosis: ::prost::alloc::string::String,
    #[prost(double, tag = "2")]
    pub image_quality: f64,
    #[prost(string, repeated, tag = "3")]
    pub landmarks: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NextFrameRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SegmentRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub image: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AssessRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub image: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub mask: ::prost::alloc::vec::Vec<u8>,
    #[prost(string, tag = "3")]
    pub target_organ: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SpeakRequest {
    #[prost(string, tag = "1")]
    pub text: ::prost::alloc::string::String,
}

/// Announcer reply: either synthesized audio or an in-band synthesis error.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SpeakReply {
    #[prost(oneof = "speak_reply::Outcome", tags = "1, 2")]
    pub outcome: ::core::option::Option<speak_reply::Outcome>,
}

/// Nested message and enum types in `SpeakReply`.
pub mod speak_reply {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Outcome {
        #[prost(bytes, tag = "1")]
        Audio(::prost::alloc::vec::Vec<u8>),
        #[prost(string, tag = "2")]
        Error(::prost::alloc::string::String),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum FailureKind {
    Unspecified = 0,
    ChannelUnreachable = 1,
    UnknownOperation = 2,
    MalformedRequest = 3,
    Internal = 4,
}

impl FailureKind {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            FailureKind::Unspecified => "FAILURE_KIND_UNSPECIFIED",
            FailureKind::ChannelUnreachable => "CHANNEL_UNREACHABLE",
            FailureKind::UnknownOperation => "UNKNOWN_OPERATION",
            FailureKind::MalformedRequest => "MALFORMED_REQUEST",
            FailureKind::Internal => "INTERNAL",
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ErrorDetail {
    #[prost(enumeration = "FailureKind", tag = "1")]
    pub kind: i32,
    #[prost(string, tag = "2")]
    pub message: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StageRequest {
    #[prost(uint64, tag = "1")]
    pub request_id: u64,
    #[prost(string, tag = "2")]
    pub operation: ::prost::alloc::string::String,
    #[prost(oneof = "stage_request::Body", tags = "10, 11, 12, 13")]
    pub body: ::core::option::Option<stage_request::Body>,
}

/// Nested message and enum types in `StageRequest`.
pub mod stage_request {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Body {
        #[prost(message, tag = "10")]
        NextFrame(super::NextFrameRequest),
        #[prost(message, tag = "11")]
        Segment(super::SegmentRequest),
        #[prost(message, tag = "12")]
        Assess(super::AssessRequest),
        #[prost(message, tag = "13")]
        Speak(super::SpeakRequest),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StageResponse {
    #[prost(uint64, tag = "1")]
    pub request_id: u64,
    #[prost(oneof = "stage_response::Outcome", tags = "10, 11, 12, 13, 15")]
    pub outcome: ::core::option::Option<stage_response::Outcome>,
}

/// Nested message and enum types in `StageResponse`.
pub mod stage_response {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Outcome {
        #[prost(message, tag = "10")]
        Frame(super::Frame),
        #[prost(message, tag = "11")]
        Segmentation(super::SegmentationResult),
        #[prost(message, tag = "12")]
        Diagnostic(super::DiagnosticResult),
        #[prost(message, tag = "13")]
        Speech(super::SpeakReply),
        #[prost(message, tag = "15")]
        Error(super::ErrorDetail),
    }
}
