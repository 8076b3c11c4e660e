// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Typed calls to the four stages.
//!
//! [`StageChannels`] owns one [`ServiceChannel`] per stage and turns each
//! operation into a single bounded round trip whose reply has already been
//! checked against the stage's reply schema. Every failure comes back as an
//! [`IterationError`] naming the stage, so the coordinator never has to
//! inspect a raw reply.

use std::sync::Arc;
use std::time::Duration;

use crate::errors::{ChannelError, IterationError};
use crate::proto::{
    speak_reply, AssessRequest, DiagnosticResult, Frame, NextFrameRequest, Reply, RequestBody,
    SegmentRequest, SegmentationResult, SpeakRequest,
};
use crate::stages::contracts::{
    diagnostic_from_reply, frame_from_reply, segmentation_from_reply, speech_from_reply,
};
use crate::stages::Stage;
use crate::traits::ServiceChannel;

#[derive(Clone)]
pub struct StageChannels {
    pub frame_source: Arc<dyn ServiceChannel>,
    pub segmenter: Arc<dyn ServiceChannel>,
    pub diagnostician: Arc<dyn ServiceChannel>,
    pub announcer: Arc<dyn ServiceChannel>,
    pub call_timeout: Duration,
}

impl StageChannels {
    pub fn channel(&self, stage: Stage) -> &Arc<dyn ServiceChannel> {
        match stage {
            Stage::FrameSource => &self.frame_source,
            Stage::Segmenter => &self.segmenter,
            Stage::Diagnostician => &self.diagnostician,
            Stage::Announcer => &self.announcer,
        }
    }

    async fn call<T>(
        &self,
        stage: Stage,
        body: RequestBody,
        check: fn(Reply) -> Result<T, String>,
    ) -> Result<T, IterationError> {
        let channel = self.channel(stage);
        let operation = stage.operation();

        // Transports enforce their own timeout; this one also covers
        // channels that do not.
        let reply = match tokio::time::timeout(self.call_timeout, channel.send(operation, body)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(error)) => return Err(IterationError::stage_call(stage, error)),
            Err(_) => {
                return Err(IterationError::stage_call(
                    stage,
                    ChannelError::TimedOut {
                        service: channel.service_name().to_string(),
                        operation: operation.to_string(),
                        timeout: self.call_timeout,
                    },
                ))
            }
        };

        check(reply).map_err(|reason| {
            IterationError::stage_call(
                stage,
                ChannelError::MalformedReply {
                    service: channel.service_name().to_string(),
                    operation: operation.to_string(),
                    reason,
                },
            )
        })
    }

    pub async fn next_frame(&self) -> Result<Frame, IterationError> {
        self.call(
            Stage::FrameSource,
            RequestBody::NextFrame(NextFrameRequest {}),
            frame_from_reply,
        )
        .await
    }

    pub async fn segment(&self, image: Vec<u8>) -> Result<SegmentationResult, IterationError> {
        self.call(
            Stage::Segmenter,
            RequestBody::Segment(SegmentRequest { image }),
            segmentation_from_reply,
        )
        .await
    }

    pub async fn assess(
        &self,
        image: Vec<u8>,
        mask: Vec<u8>,
        target_organ: &str,
    ) -> Result<DiagnosticResult, IterationError> {
        let request = AssessRequest {
            image,
            mask,
            target_organ: target_organ.to_string(),
        };
        self.call(
            Stage::Diagnostician,
            RequestBody::Assess(request),
            diagnostic_from_reply,
        )
        .await
    }

    /// Voice `text`, returning the synthesized audio.
    ///
    /// An in-band `{error}` reply is a failed announcement and is reported as
    /// [`IterationError::SpeechUnavailable`].
    pub async fn speak(&self, text: &str) -> Result<Vec<u8>, IterationError> {
        let request = SpeakRequest {
            text: text.to_string(),
        };
        let reply = self
            .call(Stage::Announcer, RequestBody::Speak(request), speech_from_reply)
            .await?;

        match reply.outcome {
            Some(speak_reply::Outcome::Audio(audio)) => Ok(audio),
            Some(speak_reply::Outcome::Error(reason)) => Err(IterationError::SpeechUnavailable {
                stage: Stage::Announcer,
                reason,
            }),
            None => Err(IterationError::SpeechUnavailable {
                stage: Stage::Announcer,
                reason: "empty speech reply".to_string(),
            }),
        }
    }
}
