// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod integration_tests {
    use std::time::Duration;
    use tokio::net::TcpListener;

    use crate::config::{load_and_validate_config, parse_config, Config, RuntimeBuilder};
    use crate::engine::PipelineOutcome;
    use crate::errors::RegistrationError;
    use crate::proto::{AssessRequest, Reply, RequestBody};
    use crate::service::DuplicatePolicy;
    use crate::stages::announcer::SynthesizerMode;
    use crate::stages::diagnostician::AssessorMode;
    use crate::stages::segmenter::fixtures::png_image;
    use crate::stages::Stage;
    use crate::traits::OperationHandler;
    use crate::transport::tcp;

    /// Test that the shipped configuration files load and validate
    #[test]
    fn test_triage_yaml_loading() {
        let config = load_and_validate_config("configs/triage.yaml").unwrap();

        assert_eq!(config.coordinator.quality_threshold, 0.5);
        assert_eq!(config.coordinator.target_organ, "liver");
        assert_eq!(config.services.address(Stage::Diagnostician), "127.0.0.1:7403");
        assert_eq!(config.frame_source.settings["depth"], 70.0);
        assert_eq!(config.announcer.synthesizer, SynthesizerMode::Transcript);
        assert_eq!(config.diagnostician.assessor, AssessorMode::Fixed);
        assert_eq!(config.registry.duplicate_policy, DuplicatePolicy::LastWins);
    }

    #[test]
    fn test_low_confidence_yaml_loading() {
        let config = load_and_validate_config("configs/low-confidence.yaml").unwrap();

        assert_eq!(config.segmenter.confidence, 0.3);
        assert_eq!(config.coordinator.target_organ, "kidney");
        let settings = RuntimeBuilder::coordinator_settings(&config);
        assert_eq!(settings.throttle, Duration::from_millis(250));
    }

    #[test]
    fn test_each_stage_registers_its_operation() {
        let config = Config::default();

        for stage in Stage::ALL {
            let registry = RuntimeBuilder::stage_registry(&config, stage).unwrap();
            assert_eq!(registry.service_name(), stage.service_name());
            assert_eq!(registry.operations(), vec![stage.operation()]);
        }
    }

    #[test]
    fn test_reject_policy_refuses_second_registration() {
        let config = parse_config("registry:\n  duplicate_policy: reject\n").unwrap();
        let mut registry = RuntimeBuilder::stage_registry(&config, Stage::Segmenter).unwrap();

        let err = registry
            .register("segment", RuntimeBuilder::stage_handler(&config, Stage::Segmenter))
            .unwrap_err();

        assert!(matches!(err, RegistrationError::DuplicateOperation { .. }));
    }

    #[tokio::test]
    async fn test_offline_assessor_answers_with_fallback() {
        let config = parse_config(
            "diagnostician:\n  assessor: offline\n  fallback_diagnosis: \"Try again later.\"\n",
        )
        .unwrap();
        let handler = RuntimeBuilder::stage_handler(&config, Stage::Diagnostician);

        let reply = handler
            .handle(RequestBody::Assess(AssessRequest {
                image: vec![1],
                mask: vec![255],
                target_organ: "liver".to_string(),
            }))
            .await
            .unwrap();

        match reply {
            Reply::Diagnostic(result) => {
                assert_eq!(result.diagnosis, "Try again later.");
                assert_eq!(result.image_quality, 0.72);
                assert_eq!(result.landmarks, vec!["liver".to_string()]);
            }
            other => panic!("unexpected reply {:?}", other),
        }
    }

    /// Write a config pointing at a temp image directory and the given ports.
    fn tcp_config(image_dir: &std::path::Path, addresses: &[String; 4]) -> Config {
        let yaml = format!(
            r#"
coordinator:
  throttle_ms: 1
  target_organ: liver
transport:
  call_timeout_ms: 2000
services:
  frame_source: "{}"
  segmenter: "{}"
  diagnostician: "{}"
  announcer: "{}"
frame_source:
  directory: "{}"
"#,
            addresses[0],
            addresses[1],
            addresses[2],
            addresses[3],
            image_dir.display()
        );
        parse_config(&yaml).unwrap()
    }

    /// Full pipeline across four TCP services built from configuration
    #[tokio::test]
    async fn test_pipeline_over_tcp_from_config() {
        let images = tempfile::tempdir().unwrap();
        std::fs::write(images.path().join("a.png"), png_image(128, 96)).unwrap();

        let mut listeners = Vec::new();
        for _ in Stage::ALL {
            listeners.push(TcpListener::bind("127.0.0.1:0").await.unwrap());
        }
        let addresses: [String; 4] =
            std::array::from_fn(|i| listeners[i].local_addr().unwrap().to_string());
        let config = tcp_config(images.path(), &addresses);

        for (stage, listener) in Stage::ALL.into_iter().zip(listeners) {
            let handle = RuntimeBuilder::start_service(&config, stage).unwrap();
            tokio::spawn(tcp::serve(handle, listener, config.transport.max_frame_bytes));
        }

        let coordinator = RuntimeBuilder::coordinator(&config, RuntimeBuilder::tcp_stages(&config));

        assert_eq!(
            coordinator.iterate(1).await,
            PipelineOutcome::DiagnosisSpoken {
                text: "Image quality is 72%. Identified liver. No abnormal findings.".to_string()
            }
        );
    }

    /// An empty image directory fails iterations without stopping the loop
    #[tokio::test]
    async fn test_standalone_with_empty_image_directory() {
        let images = tempfile::tempdir().unwrap();
        let config = parse_config(&format!(
            "coordinator:\n  throttle_ms: 1\nframe_source:\n  directory: \"{}\"\n",
            images.path().display()
        ))
        .unwrap();

        let (stages, _services) = RuntimeBuilder::local_stages(&config).unwrap();
        let coordinator = RuntimeBuilder::coordinator(&config, stages);

        match coordinator.iterate(1).await {
            PipelineOutcome::IterationFailed(error) => {
                assert_eq!(error.stage(), Stage::FrameSource);
                assert!(error.to_string().contains("no images found"));
            }
            other => panic!("expected a frame source failure, got {:?}", other),
        }

        std::fs::write(images.path().join("late.png"), png_image(16, 16)).unwrap();
        assert!(matches!(
            coordinator.iterate(2).await,
            PipelineOutcome::DiagnosisSpoken { .. }
        ));
    }
}
