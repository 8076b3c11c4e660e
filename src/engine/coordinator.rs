// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The triage coordinator: one pipeline iteration at a time, forever.
//!
//! # Iteration
//!
//! 1. `nextFrame` from the Frame Source.
//! 2. `segment` the frame's image.
//! 3. Quality gate on the segmentation score. Below the threshold the fixed
//!    guidance text is spoken and the iteration ends; the Diagnostician is
//!    not called.
//! 4. Otherwise `assess` image and mask for the configured target organ.
//! 5. Speak the composed announcement.
//!
//! Any stage failure abandons the iteration at the point it occurs. There is
//! no retry: the next iteration starts from a fresh frame after the throttle
//! interval.
//!
//! # Concurrency
//!
//! Iterations are strictly sequential and each makes at most one outstanding
//! channel call. Every call is bounded by the stage call timeout, so an
//! unresponsive stage delays an iteration but never stalls the loop.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use sono_triage::engine::{Coordinator, CoordinatorSettings};
//! use sono_triage::service::{ServiceHost, ServiceRegistry};
//! use sono_triage::stages::announcer::{AnnouncerHandler, TranscriptSynthesizer};
//! use sono_triage::stages::diagnostician::{DiagnosticianHandler, FixedAssessor};
//! use sono_triage::stages::frame_source::{FrameSourceHandler, MemoryStore};
//! use sono_triage::stages::segmenter::FixedConfidenceSegmenter;
//! use sono_triage::stages::StageChannels;
//! use sono_triage::traits::{OperationHandler, ServiceChannel};
//!
//! fn host(service: &str, operation: &str, handler: Arc<dyn OperationHandler>) -> Arc<dyn ServiceChannel> {
//!     let mut registry = ServiceRegistry::new(service);
//!     registry.register(operation, handler).unwrap();
//!     Arc::new(ServiceHost::new(registry).start().local_channel(Duration::from_secs(1)))
//! }
//!
//! # #[tokio::main]
//! # async fn main() {
//! // The only frame is not an image, so segmentation rejects it.
//! let images = MemoryStore::new(vec![("scan.bin".to_string(), b"plain text".to_vec())]);
//! let assessor = FixedAssessor::new("No abnormal findings", 0.72);
//!
//! let stages = StageChannels {
//!     frame_source: host("ultrasound-ingest", "nextFrame",
//!         Arc::new(FrameSourceHandler::new(Arc::new(images), Default::default()))),
//!     segmenter: host("segmentation", "segment", Arc::new(FixedConfidenceSegmenter::new(0.8))),
//!     diagnostician: host("diagnostic", "assess",
//!         Arc::new(DiagnosticianHandler::new(Arc::new(assessor), "Unavailable.", 0.0))),
//!     announcer: host("voice-tts", "speak",
//!         Arc::new(AnnouncerHandler::new(Arc::new(TranscriptSynthesizer)))),
//!     call_timeout: Duration::from_secs(1),
//! };
//!
//! let coordinator = Coordinator::new(stages, CoordinatorSettings::default());
//!
//! // The failure is contained in the iteration's outcome.
//! assert!(coordinator.iterate(1).await.is_failure());
//! assert!(coordinator.iterate(2).await.is_failure());
//! # }
//! ```

use std::future::Future;
use std::time::Duration;
use tracing::Instrument;

use crate::config::consts::{
    DEFAULT_GUIDANCE_TEXT, DEFAULT_QUALITY_THRESHOLD, DEFAULT_TARGET_ORGAN, DEFAULT_THROTTLE_MS,
};
use crate::engine::announcement::compose_announcement;
use crate::engine::outcome::{PipelineOutcome, PipelineState, StateTracker};
use crate::errors::IterationError;
use crate::observability::messages::coordinator::{
    CoordinatorStarted, CoordinatorStopped, DiagnosisSpoken, GateEvaluated, GuidanceIssued,
    IterationFailed, IterationStarted,
};
use crate::observability::messages::StructuredLog;
use crate::stages::StageChannels;

/// Read-only coordinator configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorSettings {
    /// Spoken verbatim when the segmentation score is below the threshold.
    pub guidance_text: String,
    /// Scores at or above this value proceed to diagnosis.
    pub quality_threshold: f64,
    /// Pause between the end of one iteration and the start of the next.
    pub throttle: Duration,
    /// Organ the diagnostician is asked to assess.
    pub target_organ: String,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            guidance_text: DEFAULT_GUIDANCE_TEXT.to_string(),
            quality_threshold: DEFAULT_QUALITY_THRESHOLD,
            throttle: Duration::from_millis(DEFAULT_THROTTLE_MS),
            target_organ: DEFAULT_TARGET_ORGAN.to_string(),
        }
    }
}

pub struct Coordinator {
    stages: StageChannels,
    settings: CoordinatorSettings,
}

impl Coordinator {
    pub fn new(stages: StageChannels, settings: CoordinatorSettings) -> Self {
        Self { stages, settings }
    }

    pub fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    /// Run one iteration, returning how it ended or why it was abandoned.
    pub async fn run_once(&self, iteration: u64) -> Result<PipelineOutcome, IterationError> {
        let mut tracker = StateTracker::new(iteration);
        let result = self.drive(iteration, &mut tracker).await;
        if result.is_err() {
            tracing::debug!(
                iteration,
                state = tracker.state().as_str(),
                transitions = tracker.transitions(),
                "abandoning iteration"
            );
        }
        tracker.reset();
        result
    }

    async fn drive(
        &self,
        iteration: u64,
        tracker: &mut StateTracker,
    ) -> Result<PipelineOutcome, IterationError> {
        tracker.advance(PipelineState::FetchingFrame);
        let frame = self.stages.next_frame().await?;

        tracker.advance(PipelineState::Segmenting);
        let segmentation = self.stages.segment(frame.image.clone()).await?;

        let score = segmentation.score;
        let passed = score >= self.settings.quality_threshold;
        GateEvaluated {
            iteration,
            score,
            threshold: self.settings.quality_threshold,
            passed,
        }
        .log();

        if !passed {
            tracker.advance(PipelineState::AnnouncingGuidance);
            self.stages.speak(&self.settings.guidance_text).await?;
            tracker.advance(PipelineState::Idle);

            GuidanceIssued { iteration, score }.log();
            return Ok(PipelineOutcome::GuidanceIssued { score });
        }

        tracker.advance(PipelineState::Diagnosing);
        let diagnostic = self
            .stages
            .assess(frame.image, segmentation.mask, &self.settings.target_organ)
            .await?;

        let text = compose_announcement(&diagnostic);
        tracker.advance(PipelineState::AnnouncingResult);
        self.stages.speak(&text).await?;
        tracker.advance(PipelineState::Idle);

        DiagnosisSpoken {
            iteration,
            text: &text,
        }
        .log();
        Ok(PipelineOutcome::DiagnosisSpoken { text })
    }

    /// Run one iteration with its failure caught, logged and folded into the
    /// outcome.
    pub async fn iterate(&self, iteration: u64) -> PipelineOutcome {
        let started = IterationStarted { iteration };
        let span = started.span("pipeline");

        async {
            started.log();
            match self.run_once(iteration).await {
                Ok(outcome) => outcome,
                Err(error) => {
                    IterationFailed {
                        iteration,
                        stage: &error.stage().to_string(),
                        operation: error.operation(),
                        error: &error,
                    }
                    .log();
                    PipelineOutcome::IterationFailed(error)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Iterate until `shutdown` resolves, returning the number of iterations
    /// run.
    ///
    /// Shutdown is observed between iterations, including during the
    /// throttle pause; an iteration in flight always runs to completion.
    pub async fn run<F>(&self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        CoordinatorStarted {
            quality_threshold: self.settings.quality_threshold,
            throttle: self.settings.throttle,
            target_organ: &self.settings.target_organ,
        }
        .log();

        tokio::pin!(shutdown);
        let mut iterations = 0u64;

        loop {
            iterations += 1;
            self.iterate(iterations).await;

            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.settings.throttle) => {}
            }
        }

        CoordinatorStopped { iterations }.log();
        iterations
    }
}
