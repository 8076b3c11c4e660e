// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::{Coordinator, CoordinatorSettings, PipelineOutcome};
use crate::errors::{ChannelError, IterationError};
use crate::proto::{
    speak_reply, BoundingBox, DiagnosticResult, FailureKind, Frame, Reply, RequestBody,
    SegmentationResult, SpeakReply,
};
use crate::stages::testing::{HangingChannel, ScriptedChannel};
use crate::stages::{Stage, StageChannels};
use crate::traits::ServiceChannel;

/// Integration tests for the coordinator driven through scripted stage channels
#[cfg(test)]
mod tests {
    use super::*;

    const GUIDANCE: &str = "Please adjust the probe position to improve image quality.";

    fn frame(image: &[u8]) -> Reply {
        Reply::Frame(Frame {
            image: image.to_vec(),
            settings: HashMap::from([("depth".to_string(), 70.0), ("gain".to_string(), 35.0)]),
            timestamp: 1_700_000_000,
        })
    }

    fn segmentation(score: f64) -> Reply {
        Reply::Segmentation(SegmentationResult {
            mask: vec![0, 255, 255, 0],
            bbox: Some(BoundingBox {
                x0: 1,
                y0: 0,
                x1: 2,
                y1: 0,
            }),
            score,
            overlay: Vec::new(),
        })
    }

    fn diagnosis(diagnosis: &str, quality: f64, landmarks: &[&str]) -> Reply {
        Reply::Diagnostic(DiagnosticResult {
            diagnosis: diagnosis.to_string(),
            image_quality: quality,
            landmarks: landmarks.iter().map(|l| l.to_string()).collect(),
        })
    }

    fn audio() -> Reply {
        Reply::Speech(SpeakReply {
            outcome: Some(speak_reply::Outcome::Audio(vec![1, 2, 3])),
        })
    }

    /// Scripted doubles for all four stages, kept for call inspection.
    struct Harness {
        frame_source: Arc<ScriptedChannel>,
        segmenter: Arc<ScriptedChannel>,
        diagnostician: Arc<ScriptedChannel>,
        announcer: Arc<ScriptedChannel>,
    }

    impl Harness {
        /// Every stage answers successfully on every call by default.
        fn healthy(score: f64) -> Self {
            Self {
                frame_source: Arc::new(ScriptedChannel::always("ultrasound-ingest", frame(b"scan"))),
                segmenter: Arc::new(ScriptedChannel::always("segmentation", segmentation(score))),
                diagnostician: Arc::new(ScriptedChannel::always(
                    "diagnostic",
                    diagnosis("No abnormal findings", 0.72, &["liver", "kidney"]),
                )),
                announcer: Arc::new(ScriptedChannel::always("voice-tts", audio())),
            }
        }

        fn stage(&self, stage: Stage) -> &Arc<ScriptedChannel> {
            match stage {
                Stage::FrameSource => &self.frame_source,
                Stage::Segmenter => &self.segmenter,
                Stage::Diagnostician => &self.diagnostician,
                Stage::Announcer => &self.announcer,
            }
        }

        fn coordinator(&self) -> Coordinator {
            let stages = StageChannels {
                frame_source: self.frame_source.clone(),
                segmenter: self.segmenter.clone(),
                diagnostician: self.diagnostician.clone(),
                announcer: self.announcer.clone(),
                call_timeout: Duration::from_millis(200),
            };
            Coordinator::new(stages, settings())
        }
    }

    fn settings() -> CoordinatorSettings {
        CoordinatorSettings {
            guidance_text: GUIDANCE.to_string(),
            quality_threshold: 0.5,
            throttle: Duration::from_millis(1),
            target_organ: "liver".to_string(),
        }
    }

    #[tokio::test]
    async fn low_score_speaks_guidance_and_skips_diagnosis() {
        let harness = Harness::healthy(0.3);
        let coordinator = harness.coordinator();

        let outcome = coordinator.iterate(1).await;

        assert_eq!(outcome, PipelineOutcome::GuidanceIssued { score: 0.3 });
        assert_eq!(harness.diagnostician.call_count(), 0);
        assert_eq!(harness.announcer.spoken(), vec![GUIDANCE.to_string()]);
    }

    #[tokio::test]
    async fn high_score_speaks_composed_diagnosis() {
        let harness = Harness::healthy(0.8);
        let coordinator = harness.coordinator();

        let outcome = coordinator.iterate(1).await;

        let expected = "Image quality is 72%. Identified liver, kidney. No abnormal findings.";
        assert_eq!(
            outcome,
            PipelineOutcome::DiagnosisSpoken {
                text: expected.to_string()
            }
        );
        assert_eq!(harness.announcer.spoken(), vec![expected.to_string()]);
        assert_eq!(harness.diagnostician.call_count(), 1);
    }

    #[tokio::test]
    async fn score_equal_to_threshold_proceeds_to_diagnosis() {
        let harness = Harness::healthy(0.5);
        let coordinator = harness.coordinator();

        let outcome = coordinator.iterate(1).await;

        assert!(matches!(outcome, PipelineOutcome::DiagnosisSpoken { .. }));
    }

    #[tokio::test]
    async fn stages_receive_frame_image_mask_and_target_organ() {
        let harness = Harness::healthy(0.9);
        let coordinator = harness.coordinator();

        coordinator.iterate(1).await;

        assert_eq!(harness.frame_source.operations(), vec!["nextFrame"]);
        match &harness.segmenter.bodies()[..] {
            [RequestBody::Segment(request)] => assert_eq!(request.image, b"scan"),
            other => panic!("unexpected segment calls {:?}", other),
        }
        match &harness.diagnostician.bodies()[..] {
            [RequestBody::Assess(request)] => {
                assert_eq!(request.image, b"scan");
                assert_eq!(request.mask, vec![0, 255, 255, 0]);
                assert_eq!(request.target_organ, "liver");
            }
            other => panic!("unexpected assess calls {:?}", other),
        }
    }

    #[tokio::test]
    async fn failure_at_any_stage_is_contained_to_its_iteration() {
        for stage in Stage::ALL {
            let harness = Harness::healthy(0.8);
            harness
                .stage(stage)
                .push_failure(FailureKind::ChannelUnreachable, "injected");
            let coordinator = harness.coordinator();

            let failed = coordinator.iterate(1).await;
            let next = coordinator.iterate(2).await;

            match failed {
                PipelineOutcome::IterationFailed(error) => assert_eq!(error.stage(), stage),
                other => panic!("{} failure was not reported: {:?}", stage, other),
            }
            assert!(
                matches!(next, PipelineOutcome::DiagnosisSpoken { .. }),
                "iteration after a {} failure did not recover: {:?}",
                stage,
                next
            );
        }
    }

    #[tokio::test]
    async fn failed_frame_fetch_calls_nothing_else() {
        let harness = Harness::healthy(0.8);
        harness
            .frame_source
            .push_failure(FailureKind::ChannelUnreachable, "no images found in sample_images");
        let coordinator = harness.coordinator();

        let err = coordinator.run_once(1).await.unwrap_err();

        assert_eq!(err.stage(), Stage::FrameSource);
        assert_eq!(harness.segmenter.call_count(), 0);
        assert_eq!(harness.diagnostician.call_count(), 0);
        assert_eq!(harness.announcer.call_count(), 0);
    }

    #[tokio::test]
    async fn failed_assessment_speaks_nothing() {
        let harness = Harness::healthy(0.8);
        harness
            .diagnostician
            .push_failure(FailureKind::MalformedRequest, "mask is required");
        let coordinator = harness.coordinator();

        let err = coordinator.run_once(1).await.unwrap_err();

        assert_eq!(err.operation(), "assess");
        assert_eq!(harness.announcer.call_count(), 0);
    }

    #[tokio::test]
    async fn malformed_segmentation_reply_abandons_iteration() {
        let harness = Harness::healthy(0.8);
        harness.segmenter.push_reply(diagnosis("wrong reply", 0.5, &[]));
        let coordinator = harness.coordinator();

        let err = coordinator.run_once(1).await.unwrap_err();

        assert!(matches!(
            err,
            IterationError::StageCall {
                stage: Stage::Segmenter,
                source: ChannelError::MalformedReply { .. },
                ..
            }
        ));
        assert_eq!(harness.diagnostician.call_count(), 0);
    }

    #[tokio::test]
    async fn in_band_speech_error_fails_the_iteration() {
        let harness = Harness::healthy(0.2);
        harness.announcer.push_reply(Reply::Speech(SpeakReply {
            outcome: Some(speak_reply::Outcome::Error("synthesizer disabled".to_string())),
        }));
        let coordinator = harness.coordinator();

        let outcome = coordinator.iterate(1).await;

        assert_eq!(
            outcome,
            PipelineOutcome::IterationFailed(IterationError::SpeechUnavailable {
                stage: Stage::Announcer,
                reason: "synthesizer disabled".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn unresponsive_segmenter_times_out_and_loop_continues() {
        let harness = Harness::healthy(0.8);
        let stages = StageChannels {
            frame_source: harness.frame_source.clone(),
            segmenter: Arc::new(HangingChannel::new("segmentation")) as Arc<dyn ServiceChannel>,
            diagnostician: harness.diagnostician.clone(),
            announcer: harness.announcer.clone(),
            call_timeout: Duration::from_millis(20),
        };
        let coordinator = Coordinator::new(stages, settings());

        for iteration in 1..=2 {
            match coordinator.iterate(iteration).await {
                PipelineOutcome::IterationFailed(IterationError::StageCall {
                    source: ChannelError::TimedOut { .. },
                    ..
                }) => {}
                other => panic!("expected a timeout, got {:?}", other),
            }
        }
        assert_eq!(harness.frame_source.call_count(), 2);
    }

    #[tokio::test]
    async fn run_keeps_iterating_through_failures_until_shutdown() {
        let harness = Harness::healthy(0.8);
        harness
            .segmenter
            .push_failure(FailureKind::Internal, "model crashed");
        let coordinator = harness.coordinator();

        let iterations = coordinator
            .run(tokio::time::sleep(Duration::from_millis(60)))
            .await;

        assert!(iterations >= 2, "only {} iterations ran", iterations);
        assert_eq!(harness.frame_source.call_count() as u64, iterations);
        // Every iteration except the failed one spoke a diagnosis.
        assert_eq!(harness.announcer.call_count() as u64, iterations - 1);
    }

    #[tokio::test]
    async fn run_waits_the_throttle_between_iterations() {
        let harness = Harness::healthy(0.8);
        let stages = StageChannels {
            frame_source: harness.frame_source.clone(),
            segmenter: harness.segmenter.clone(),
            diagnostician: harness.diagnostician.clone(),
            announcer: harness.announcer.clone(),
            call_timeout: Duration::from_millis(200),
        };
        let coordinator = Coordinator::new(
            stages,
            CoordinatorSettings {
                throttle: Duration::from_secs(60),
                ..settings()
            },
        );

        let iterations = coordinator
            .run(tokio::time::sleep(Duration::from_millis(50)))
            .await;

        assert_eq!(iterations, 1);
    }
}

/// End-to-end tests with every stage hosted in-process
#[cfg(test)]
mod hosted {
    use super::*;
    use crate::service::{ServiceHost, ServiceRegistry};
    use crate::stages::announcer::{AnnouncerHandler, SynthesizerMode};
    use crate::stages::diagnostician::{DiagnosticianHandler, FixedAssessor};
    use crate::stages::frame_source::{FrameSourceHandler, MemoryStore};
    use crate::stages::segmenter::fixtures::png_image;
    use crate::stages::segmenter::FixedConfidenceSegmenter;
    use crate::traits::OperationHandler;

    fn host(stage: Stage, handler: Arc<dyn OperationHandler>) -> Arc<dyn ServiceChannel> {
        let mut registry = ServiceRegistry::new(stage.service_name());
        registry.register(stage.operation(), handler).unwrap();
        Arc::new(
            ServiceHost::new(registry)
                .start()
                .local_channel(Duration::from_secs(1)),
        )
    }

    fn hosted_stages(confidence: f64, synthesizer: SynthesizerMode) -> StageChannels {
        let images = MemoryStore::new(vec![
            ("a.png".to_string(), png_image(64, 48)),
            ("b.png".to_string(), png_image(32, 32)),
        ]);
        let frame_source = FrameSourceHandler::new(Arc::new(images), HashMap::new());
        let diagnostician = DiagnosticianHandler::new(
            Arc::new(FixedAssessor::new("No abnormal findings", 0.72)),
            "Unable to complete health assessment at this time.",
            0.72,
        );

        StageChannels {
            frame_source: host(Stage::FrameSource, Arc::new(frame_source)),
            segmenter: host(Stage::Segmenter, Arc::new(FixedConfidenceSegmenter::new(confidence))),
            diagnostician: host(Stage::Diagnostician, Arc::new(diagnostician)),
            announcer: host(
                Stage::Announcer,
                Arc::new(AnnouncerHandler::new(synthesizer.build())),
            ),
            call_timeout: Duration::from_secs(1),
        }
    }

    fn settings(target_organ: &str) -> CoordinatorSettings {
        CoordinatorSettings {
            target_organ: target_organ.to_string(),
            ..CoordinatorSettings::default()
        }
    }

    #[tokio::test]
    async fn confident_segmentation_is_diagnosed_and_announced() {
        let coordinator =
            Coordinator::new(hosted_stages(0.8, SynthesizerMode::Transcript), settings("liver"));

        for iteration in 1..=3 {
            assert_eq!(
                coordinator.iterate(iteration).await,
                PipelineOutcome::DiagnosisSpoken {
                    text: "Image quality is 72%. Identified liver. No abnormal findings."
                        .to_string()
                }
            );
        }
    }

    #[tokio::test]
    async fn weak_segmentation_requests_probe_adjustment() {
        let coordinator =
            Coordinator::new(hosted_stages(0.3, SynthesizerMode::Transcript), settings("liver"));

        assert_eq!(
            coordinator.iterate(1).await,
            PipelineOutcome::GuidanceIssued { score: 0.3 }
        );
    }

    #[tokio::test]
    async fn disabled_speech_fails_each_iteration_without_stopping() {
        let coordinator =
            Coordinator::new(hosted_stages(0.8, SynthesizerMode::Disabled), settings("kidney"));

        for iteration in 1..=2 {
            let outcome = coordinator.iterate(iteration).await;
            match outcome {
                PipelineOutcome::IterationFailed(error) => {
                    assert_eq!(error.stage(), Stage::Announcer)
                }
                other => panic!("expected speech failure, got {:?}", other),
            }
        }
    }
}
