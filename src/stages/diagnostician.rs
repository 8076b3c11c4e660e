// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Diagnostician stage.
//!
//! The actual assessment is delegated to an [`Assessor`]. When the assessor's
//! backend is unavailable the stage still answers, with a fallback diagnosis,
//! so that one flaky dependency does not stall the pipeline.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

use crate::errors::ServiceError;
use crate::observability::messages::stage::AssessmentDegraded;
use crate::observability::messages::StructuredLog;
use crate::proto::{AssessRequest, DiagnosticResult, Reply, RequestBody};
use crate::stages::contracts::expect_assess;
use crate::traits::OperationHandler;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssessorError {
    #[error("assessment backend unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait Assessor: Send + Sync {
    async fn assess(&self, request: &AssessRequest) -> Result<DiagnosticResult, AssessorError>;

    fn name(&self) -> &'static str;
}

/// Which built-in assessor a service runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessorMode {
    /// [`FixedAssessor`] with the configured diagnosis and quality.
    #[default]
    Fixed,
    /// Backend permanently unreachable; every request gets the fallback.
    Offline,
}

impl AssessorMode {
    pub fn build(self, diagnosis: &str, image_quality: f64) -> Arc<dyn Assessor> {
        match self {
            AssessorMode::Fixed => Arc::new(FixedAssessor::new(diagnosis, image_quality)),
            AssessorMode::Offline => Arc::new(OfflineAssessor),
        }
    }
}

/// Answers every request with the same diagnosis and quality figure,
/// naming the requested organ as the only landmark.
pub struct FixedAssessor {
    diagnosis: String,
    image_quality: f64,
}

impl FixedAssessor {
    pub fn new(diagnosis: impl Into<String>, image_quality: f64) -> Self {
        Self {
            diagnosis: diagnosis.into(),
            image_quality,
        }
    }
}

#[async_trait]
impl Assessor for FixedAssessor {
    async fn assess(&self, request: &AssessRequest) -> Result<DiagnosticResult, AssessorError> {
        Ok(DiagnosticResult {
            diagnosis: self.diagnosis.clone(),
            image_quality: self.image_quality,
            landmarks: vec![request.target_organ.clone()],
        })
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

pub struct OfflineAssessor;

#[async_trait]
impl Assessor for OfflineAssessor {
    async fn assess(&self, _request: &AssessRequest) -> Result<DiagnosticResult, AssessorError> {
        Err(AssessorError::Unavailable("assessor offline".to_string()))
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}

/// `assess` handler.
pub struct DiagnosticianHandler {
    assessor: Arc<dyn Assessor>,
    fallback_diagnosis: String,
    fallback_quality: f64,
}

impl DiagnosticianHandler {
    pub fn new(
        assessor: Arc<dyn Assessor>,
        fallback_diagnosis: impl Into<String>,
        fallback_quality: f64,
    ) -> Self {
        Self {
            assessor,
            fallback_diagnosis: fallback_diagnosis.into(),
            fallback_quality,
        }
    }

    pub async fn assess(&self, request: AssessRequest) -> DiagnosticResult {
        match self.assessor.assess(&request).await {
            Ok(result) => result,
            Err(error) => {
                AssessmentDegraded {
                    target_organ: &request.target_organ,
                    reason: &error.to_string(),
                }
                .log();

                DiagnosticResult {
                    diagnosis: self.fallback_diagnosis.clone(),
                    image_quality: self.fallback_quality,
                    landmarks: vec![request.target_organ],
                }
            }
        }
    }
}

#[async_trait]
impl OperationHandler for DiagnosticianHandler {
    async fn handle(&self, body: RequestBody) -> Result<Reply, ServiceError> {
        let request = expect_assess(body)?;
        Ok(Reply::Diagnostic(self.assess(request).await))
    }

    fn name(&self) -> &'static str {
        "diagnostician"
    }
}
