// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::consts::*;
use crate::config::validation::validate_config;
use crate::errors::ConfigError;
use crate::service::DuplicatePolicy;
use crate::stages::announcer::SynthesizerMode;
use crate::stages::diagnostician::AssessorMode;
use crate::stages::Stage;

/// Complete configuration for the coordinator and the four stage services.
///
/// Every section is optional; anything left out takes its value from
/// [`crate::config::consts`]. The same file serves every process: the
/// coordinator reads `coordinator`, `transport` and `services`, each stage
/// service reads its own section plus `services` to find its listen address.
///
/// # Example
/// ```yaml
/// coordinator:
///   quality_threshold: 0.5
///   throttle_ms: 1000
///   target_organ: liver
/// transport:
///   call_timeout_ms: 5000
/// services:
///   segmenter: 127.0.0.1:7402
/// frame_source:
///   directory: sample_images
///   settings:
///     depth: 70
///     gain: 35
/// segmenter:
///   confidence: 0.8
/// announcer:
///   synthesizer: transcript
/// logging:
///   filter: "info,sono_triage=debug"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub coordinator: CoordinatorConfig,
    pub transport: TransportConfig,
    pub services: ServiceAddresses,
    pub frame_source: FrameSourceConfig,
    pub segmenter: SegmenterConfig,
    pub diagnostician: DiagnosticianConfig,
    pub announcer: AnnouncerConfig,
    pub registry: RegistryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    pub guidance_text: String,
    pub quality_threshold: f64,
    pub throttle_ms: u64,
    pub target_organ: String,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            guidance_text: DEFAULT_GUIDANCE_TEXT.to_string(),
            quality_threshold: DEFAULT_QUALITY_THRESHOLD,
            throttle_ms: DEFAULT_THROTTLE_MS,
            target_organ: DEFAULT_TARGET_ORGAN.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub call_timeout_ms: u64,
    pub max_frame_bytes: usize,
    pub queue_depth: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: DEFAULT_CALL_TIMEOUT_MS,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            queue_depth: DEFAULT_QUEUE_DEPTH,
        }
    }
}

impl TransportConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

/// `host:port` of each stage service.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceAddresses {
    pub frame_source: String,
    pub segmenter: String,
    pub diagnostician: String,
    pub announcer: String,
}

impl Default for ServiceAddresses {
    fn default() -> Self {
        Self {
            frame_source: DEFAULT_FRAME_SOURCE_ADDRESS.to_string(),
            segmenter: DEFAULT_SEGMENTER_ADDRESS.to_string(),
            diagnostician: DEFAULT_DIAGNOSTICIAN_ADDRESS.to_string(),
            announcer: DEFAULT_ANNOUNCER_ADDRESS.to_string(),
        }
    }
}

impl ServiceAddresses {
    pub fn address(&self, stage: Stage) -> &str {
        match stage {
            Stage::FrameSource => &self.frame_source,
            Stage::Segmenter => &self.segmenter,
            Stage::Diagnostician => &self.diagnostician,
            Stage::Announcer => &self.announcer,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FrameSourceConfig {
    pub directory: PathBuf,
    /// Acquisition parameters attached to every frame.
    pub settings: HashMap<String, f64>,
}

impl Default for FrameSourceConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_IMAGE_DIRECTORY),
            settings: HashMap::from([
                ("depth".to_string(), DEFAULT_DEPTH),
                ("gain".to_string(), DEFAULT_GAIN),
            ]),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    pub confidence: f64,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            confidence: DEFAULT_SEGMENTATION_CONFIDENCE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiagnosticianConfig {
    pub assessor: AssessorMode,
    pub diagnosis: String,
    pub image_quality: f64,
    pub fallback_diagnosis: String,
}

impl Default for DiagnosticianConfig {
    fn default() -> Self {
        Self {
            assessor: AssessorMode::default(),
            diagnosis: DEFAULT_DIAGNOSIS.to_string(),
            image_quality: DEFAULT_IMAGE_QUALITY,
            fallback_diagnosis: FALLBACK_DIAGNOSIS.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnnouncerConfig {
    pub synthesizer: SynthesizerMode,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub duplicate_policy: DuplicatePolicy,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` overrides it.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

/// Load a config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Parse a config from YAML text. An empty document yields the defaults.
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(content)?)
}

/// Load and validate a config from a YAML file
///
/// Every invalid setting is reported, not just the first.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;
    validate_config(&cfg).map_err(ConfigError::Invalid)?;
    Ok(cfg)
}
