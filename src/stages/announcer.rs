// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Announcer stage.
//!
//! Empty text is a malformed request. Synthesis failures are not call
//! failures: they come back in-band as `SpeakReply { error }`.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

use crate::errors::ServiceError;
use crate::observability::messages::stage::{SpeechSynthesized, SpeechUnavailable};
use crate::observability::messages::StructuredLog;
use crate::proto::{speak_reply, Reply, RequestBody, SpeakReply};
use crate::stages::contracts::expect_speak;
use crate::traits::OperationHandler;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SynthesisError {
    #[error("speech synthesis unavailable: {0}")]
    Unavailable(String),
    #[error("speech synthesis failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError>;

    fn name(&self) -> &'static str;
}

/// Which built-in synthesizer a service runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesizerMode {
    /// Audio is the UTF-8 transcript; the utterance shows up in the log.
    #[default]
    Transcript,
    /// Every request is answered with an in-band error.
    Disabled,
}

impl SynthesizerMode {
    pub fn build(self) -> Arc<dyn Synthesizer> {
        match self {
            SynthesizerMode::Transcript => Arc::new(TranscriptSynthesizer),
            SynthesizerMode::Disabled => Arc::new(DisabledSynthesizer),
        }
    }
}

pub struct TranscriptSynthesizer;

#[async_trait]
impl Synthesizer for TranscriptSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        Ok(text.as_bytes().to_vec())
    }

    fn name(&self) -> &'static str {
        "transcript"
    }
}

pub struct DisabledSynthesizer;

#[async_trait]
impl Synthesizer for DisabledSynthesizer {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, SynthesisError> {
        Err(SynthesisError::Unavailable("synthesizer disabled".to_string()))
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// `speak` handler.
pub struct AnnouncerHandler {
    synthesizer: Arc<dyn Synthesizer>,
}

impl AnnouncerHandler {
    pub fn new(synthesizer: Arc<dyn Synthesizer>) -> Self {
        Self { synthesizer }
    }

    pub async fn speak(&self, text: &str) -> SpeakReply {
        let outcome = match self.synthesizer.synthesize(text).await {
            Ok(audio) => {
                SpeechSynthesized {
                    text,
                    audio_size: audio.len(),
                }
                .log();
                speak_reply::Outcome::Audio(audio)
            }
            Err(error) => {
                let reason = error.to_string();
                SpeechUnavailable { reason: &reason }.log();
                speak_reply::Outcome::Error(reason)
            }
        };

        SpeakReply {
            outcome: Some(outcome),
        }
    }
}

#[async_trait]
impl OperationHandler for AnnouncerHandler {
    async fn handle(&self, body: RequestBody) -> Result<Reply, ServiceError> {
        let request = expect_speak(body)?;
        Ok(Reply::Speech(self.speak(&request.text).await))
    }

    fn name(&self) -> &'static str {
        "announcer"
    }
}
