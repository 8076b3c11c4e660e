// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the coordinator's iteration lifecycle.
//!
//! This module contains message types for logging events related to:
//! * Coordinator start and stop
//! * Iteration start and per-iteration state transitions
//! * Quality gate decisions
//! * Announced outcomes and abandoned iterations

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Coordinator loop starting.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use sono_triage::observability::messages::coordinator::CoordinatorStarted;
/// use std::time::Duration;
///
/// let msg = CoordinatorStarted {
///     quality_threshold: 0.5,
///     throttle: Duration::from_secs(1),
///     target_organ: "liver",
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct CoordinatorStarted<'a> {
    pub quality_threshold: f64,
    pub throttle: Duration,
    pub target_organ: &'a str,
}

impl Display for CoordinatorStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Coordinator started: gate threshold={}, throttle={:?}, target organ '{}'",
            self.quality_threshold, self.throttle, self.target_organ
        )
    }
}

impl StructuredLog for CoordinatorStarted<'_> {
    fn log(&self) {
        tracing::info!(
            quality_threshold = self.quality_threshold,
            throttle_ms = self.throttle.as_millis() as u64,
            target_organ = self.target_organ,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "coordinator",
            span_name = name,
            quality_threshold = self.quality_threshold,
            target_organ = self.target_organ,
        )
    }
}

/// Coordinator loop stopped after a shutdown request.
pub struct CoordinatorStopped {
    pub iterations: u64,
}

impl Display for CoordinatorStopped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Coordinator stopped after {} iterations", self.iterations)
    }
}

impl StructuredLog for CoordinatorStopped {
    fn log(&self) {
        tracing::info!(iterations = self.iterations, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("coordinator_stopped", span_name = name, iterations = self.iterations)
    }
}

/// One pipeline iteration starting.
///
/// # Log Level
/// `debug!` - Emitted once per second in steady state
pub struct IterationStarted {
    pub iteration: u64,
}

impl Display for IterationStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Iteration {} started", self.iteration)
    }
}

impl StructuredLog for IterationStarted {
    fn log(&self) {
        tracing::debug!(iteration = self.iteration, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("iteration", span_name = name, iteration = self.iteration)
    }
}

/// The iteration moved between pipeline states.
pub struct StateTransition<'a> {
    pub iteration: u64,
    pub from: &'a str,
    pub to: &'a str,
}

impl Display for StateTransition<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Iteration {}: {} -> {}", self.iteration, self.from, self.to)
    }
}

impl StructuredLog for StateTransition<'_> {
    fn log(&self) {
        tracing::debug!(
            iteration = self.iteration,
            from = self.from,
            to = self.to,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "state_transition",
            span_name = name,
            iteration = self.iteration,
            to = self.to,
        )
    }
}

/// Quality gate evaluated against a segmentation score.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use sono_triage::observability::messages::coordinator::GateEvaluated;
///
/// let msg = GateEvaluated {
///     iteration: 7,
///     score: 0.8,
///     threshold: 0.5,
///     passed: true,
/// };
///
/// assert_eq!(
///     msg.to_string(),
///     "Iteration 7: segmentation score 0.800 passed gate (threshold 0.500)"
/// );
/// ```
pub struct GateEvaluated {
    pub iteration: u64,
    pub score: f64,
    pub threshold: f64,
    pub passed: bool,
}

impl Display for GateEvaluated {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Iteration {}: segmentation score {:.3} {} gate (threshold {:.3})",
            self.iteration,
            self.score,
            if self.passed { "passed" } else { "failed" },
            self.threshold
        )
    }
}

impl StructuredLog for GateEvaluated {
    fn log(&self) {
        tracing::info!(
            iteration = self.iteration,
            score = self.score,
            threshold = self.threshold,
            passed = self.passed,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "gate",
            span_name = name,
            iteration = self.iteration,
            score = self.score,
            passed = self.passed,
        )
    }
}

/// Low score: repositioning guidance was spoken instead of a diagnosis.
pub struct GuidanceIssued {
    pub iteration: u64,
    pub score: f64,
}

impl Display for GuidanceIssued {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Iteration {}: requested probe adjustment (score {:.3})",
            self.iteration, self.score
        )
    }
}

impl StructuredLog for GuidanceIssued {
    fn log(&self) {
        tracing::info!(iteration = self.iteration, score = self.score, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("guidance", span_name = name, iteration = self.iteration)
    }
}

/// Full diagnosis announced.
pub struct DiagnosisSpoken<'a> {
    pub iteration: u64,
    pub text: &'a str,
}

impl Display for DiagnosisSpoken<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Iteration {}: spoke result: {}", self.iteration, self.text)
    }
}

impl StructuredLog for DiagnosisSpoken<'_> {
    fn log(&self) {
        tracing::info!(iteration = self.iteration, text = self.text, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("diagnosis", span_name = name, iteration = self.iteration)
    }
}

/// Iteration abandoned; the loop carries on with the next one.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use sono_triage::observability::messages::coordinator::IterationFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
/// let msg = IterationFailed {
///     iteration: 12,
///     stage: "segmenter",
///     operation: "segment",
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct IterationFailed<'a> {
    pub iteration: u64,
    pub stage: &'a str,
    pub operation: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for IterationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Iteration {} abandoned at {} '{}': {}",
            self.iteration, self.stage, self.operation, self.error
        )
    }
}

impl StructuredLog for IterationFailed<'_> {
    fn log(&self) {
        tracing::error!(
            iteration = self.iteration,
            stage = self.stage,
            operation = self.operation,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "iteration_failed",
            span_name = name,
            iteration = self.iteration,
            stage = self.stage,
            operation = self.operation,
        )
    }
}
