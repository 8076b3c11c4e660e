// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::config::Config;
use crate::engine::{Coordinator, CoordinatorSettings};
use crate::errors::RegistrationError;
use crate::service::{ServiceHandle, ServiceHost, ServiceRegistry};
use crate::stages::announcer::AnnouncerHandler;
use crate::stages::diagnostician::DiagnosticianHandler;
use crate::stages::frame_source::{DirectoryStore, FrameSourceHandler};
use crate::stages::segmenter::FixedConfidenceSegmenter;
use crate::stages::{Stage, StageChannels};
use crate::traits::{OperationHandler, ServiceChannel};
use crate::transport::TcpChannel;

/// Triage runtime builder - turns a configuration into running services and
/// a coordinator wired to them.
///
/// # Examples
///
/// ## Everything in one process
/// ```
/// use sono_triage::config::{Config, RuntimeBuilder};
///
/// # #[tokio::main]
/// # async fn main() {
/// let config = Config::default();
///
/// let (stages, services) = RuntimeBuilder::local_stages(&config).unwrap();
/// let coordinator = RuntimeBuilder::coordinator(&config, stages);
///
/// assert_eq!(services.len(), 4);
/// assert_eq!(coordinator.settings().target_organ, "liver");
/// # }
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build the configured handler for a stage's single operation.
    pub fn stage_handler(cfg: &Config, stage: Stage) -> Arc<dyn OperationHandler> {
        match stage {
            Stage::FrameSource => {
                let store = DirectoryStore::new(&cfg.frame_source.directory);
                Arc::new(FrameSourceHandler::new(
                    Arc::new(store),
                    cfg.frame_source.settings.clone(),
                ))
            }
            Stage::Segmenter => Arc::new(FixedConfidenceSegmenter::new(cfg.segmenter.confidence)),
            Stage::Diagnostician => {
                let diagnostician = &cfg.diagnostician;
                let assessor = diagnostician
                    .assessor
                    .build(&diagnostician.diagnosis, diagnostician.image_quality);
                Arc::new(DiagnosticianHandler::new(
                    assessor,
                    diagnostician.fallback_diagnosis.clone(),
                    diagnostician.image_quality,
                ))
            }
            Stage::Announcer => Arc::new(AnnouncerHandler::new(cfg.announcer.synthesizer.build())),
        }
    }

    /// Registry for a stage's service with its operation registered.
    pub fn stage_registry(cfg: &Config, stage: Stage) -> Result<ServiceRegistry, RegistrationError> {
        let mut registry =
            ServiceRegistry::with_policy(stage.service_name(), cfg.registry.duplicate_policy);
        registry.register(stage.operation(), Self::stage_handler(cfg, stage))?;
        Ok(registry)
    }

    /// Register and start a stage's service.
    pub fn start_service(cfg: &Config, stage: Stage) -> Result<ServiceHandle, RegistrationError> {
        let registry = Self::stage_registry(cfg, stage)?;
        Ok(ServiceHost::new(registry)
            .with_queue_depth(cfg.transport.queue_depth)
            .start())
    }

    /// Host all four services in this process and connect to them in-process.
    pub fn local_stages(
        cfg: &Config,
    ) -> Result<(StageChannels, Vec<ServiceHandle>), RegistrationError> {
        let timeout = cfg.transport.call_timeout();
        let mut handles = Vec::with_capacity(Stage::ALL.len());
        let mut connect = |stage: Stage| -> Result<Arc<dyn ServiceChannel>, RegistrationError> {
            let handle = Self::start_service(cfg, stage)?;
            let channel = Arc::new(handle.local_channel(timeout));
            handles.push(handle);
            Ok(channel)
        };

        let stages = StageChannels {
            frame_source: connect(Stage::FrameSource)?,
            segmenter: connect(Stage::Segmenter)?,
            diagnostician: connect(Stage::Diagnostician)?,
            announcer: connect(Stage::Announcer)?,
            call_timeout: timeout,
        };
        Ok((stages, handles))
    }

    /// TCP channels to the configured service addresses. Nothing is dialed
    /// until the first call.
    pub fn tcp_stages(cfg: &Config) -> StageChannels {
        let timeout = cfg.transport.call_timeout();
        let channel = |stage: Stage| -> Arc<dyn ServiceChannel> {
            Arc::new(TcpChannel::new(
                stage.service_name(),
                cfg.services.address(stage),
                timeout,
                cfg.transport.max_frame_bytes,
            ))
        };

        StageChannels {
            frame_source: channel(Stage::FrameSource),
            segmenter: channel(Stage::Segmenter),
            diagnostician: channel(Stage::Diagnostician),
            announcer: channel(Stage::Announcer),
            call_timeout: timeout,
        }
    }

    pub fn coordinator_settings(cfg: &Config) -> CoordinatorSettings {
        let coordinator = &cfg.coordinator;
        CoordinatorSettings {
            guidance_text: coordinator.guidance_text.clone(),
            quality_threshold: coordinator.quality_threshold,
            throttle: std::time::Duration::from_millis(coordinator.throttle_ms),
            target_organ: coordinator.target_organ.clone(),
        }
    }

    pub fn coordinator(cfg: &Config, stages: StageChannels) -> Coordinator {
        Coordinator::new(stages, Self::coordinator_settings(cfg))
    }
}
