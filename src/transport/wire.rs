// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Framing and envelope conversion for the TCP transport.
//!
//! Each message is one length-delimited frame holding a protobuf
//! [`StageRequest`] or [`StageResponse`]. Byte fields are carried as raw
//! protobuf `bytes`, so they round-trip losslessly.

use bytes::Bytes;
use prost::Message;
use tokio_util::codec::LengthDelimitedCodec;

use crate::errors::{ChannelError, ServiceError};
use crate::proto::stage_response::Outcome;
use crate::proto::{Reply, StageRequest, StageResponse};

/// Frame codec shared by both ends of a connection.
pub fn codec(max_frame_bytes: usize) -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .max_frame_length(max_frame_bytes)
        .new_codec()
}

pub fn encode_request(request: &StageRequest) -> Bytes {
    Bytes::from(request.encode_to_vec())
}

pub fn decode_request(frame: &[u8]) -> Result<StageRequest, prost::DecodeError> {
    StageRequest::decode(frame)
}

pub fn encode_response(response: &StageResponse) -> Bytes {
    Bytes::from(response.encode_to_vec())
}

pub fn decode_response(frame: &[u8]) -> Result<StageResponse, prost::DecodeError> {
    StageResponse::decode(frame)
}

/// Build the response envelope for a dispatch result.
pub fn response_for(request_id: u64, result: Result<Reply, ServiceError>) -> StageResponse {
    let outcome = match result {
        Ok(reply) => Outcome::from(reply),
        Err(error) => Outcome::Error(error.to_error_detail()),
    };

    StageResponse {
        request_id,
        outcome: Some(outcome),
    }
}

/// Unwrap a response envelope into the caller's result.
pub fn reply_from_response(
    service: &str,
    operation: &str,
    response: StageResponse,
) -> Result<Reply, ChannelError> {
    let malformed = |reason: &str| ChannelError::MalformedReply {
        service: service.to_string(),
        operation: operation.to_string(),
        reason: reason.to_string(),
    };

    let outcome = response
        .outcome
        .ok_or_else(|| malformed("response carries no outcome"))?;

    match Reply::from_outcome(outcome) {
        Ok(reply) => Ok(reply),
        Err(Outcome::Error(detail)) => Err(ChannelError::remote(service, operation, detail)),
        Err(_) => Err(malformed("unrecognized outcome")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{stage_request, FailureKind, Frame, NextFrameRequest};
    use std::collections::HashMap;

    fn sample_image() -> Vec<u8> {
        // Every byte value, including the ones that would break text encodings.
        (0..=255u8).cycle().take(4096).collect()
    }

    #[test]
    fn frame_image_round_trips_byte_identical() {
        let frame = Frame {
            image: sample_image(),
            settings: HashMap::from([("depth".to_string(), 70.0), ("gain".to_string(), 35.0)]),
            timestamp: 1_745_100_000,
        };

        let encoded = encode_response(&response_for(7, Ok(Reply::Frame(frame.clone()))));
        let decoded = decode_response(&encoded).unwrap();
        let reply = reply_from_response("ultrasound-ingest", "nextFrame", decoded).unwrap();

        assert_eq!(reply, Reply::Frame(frame));
    }

    #[test]
    fn request_envelope_round_trips() {
        let request = StageRequest {
            request_id: 42,
            operation: "nextFrame".to_string(),
            body: Some(stage_request::Body::NextFrame(NextFrameRequest {})),
        };

        let decoded = decode_request(&encode_request(&request)).unwrap();

        assert_eq!(decoded, request);
    }

    #[test]
    fn service_error_becomes_remote_failure() {
        let response = response_for(
            3,
            Err(ServiceError::UnknownOperation {
                service: "diagnostic".to_string(),
                operation: "diagnose".to_string(),
            }),
        );

        let err = reply_from_response("diagnostic", "diagnose", response).unwrap_err();

        assert_eq!(err.failure_kind(), FailureKind::UnknownOperation);
        assert!(err.to_string().contains("'diagnose' is not registered"));
    }

    #[test]
    fn empty_envelope_is_malformed() {
        let response = StageResponse {
            request_id: 1,
            outcome: None,
        };

        let err = reply_from_response("segmentation", "segment", response).unwrap_err();

        assert!(matches!(err, ChannelError::MalformedReply { .. }));
    }

    #[test]
    fn garbage_frame_fails_to_decode() {
        assert!(decode_response(&[0xff, 0xff, 0xff, 0xff, 0x0f]).is_err());
    }
}
