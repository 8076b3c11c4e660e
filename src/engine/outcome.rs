// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Iteration outcomes and the per-iteration state machine.
//!
//! ```text
//! Idle -> FetchingFrame -> Segmenting -+-> (gate low)  AnnouncingGuidance ---------+-> Idle
//!                                      +-> (gate high) Diagnosing -> AnnouncingResult +
//! ```

use std::fmt;

use crate::errors::IterationError;
use crate::observability::messages::coordinator::StateTransition;
use crate::observability::messages::StructuredLog;

/// How an iteration ended. Used for logging and tests only.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// Segmentation score fell below the gate; guidance was spoken.
    GuidanceIssued { score: f64 },
    /// The gate passed and the composed diagnosis was spoken.
    DiagnosisSpoken { text: String },
    IterationFailed(IterationError),
}

impl PipelineOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, PipelineOutcome::IterationFailed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    FetchingFrame,
    Segmenting,
    AnnouncingGuidance,
    Diagnosing,
    AnnouncingResult,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::FetchingFrame => "fetching_frame",
            PipelineState::Segmenting => "segmenting",
            PipelineState::AnnouncingGuidance => "announcing_guidance",
            PipelineState::Diagnosing => "diagnosing",
            PipelineState::AnnouncingResult => "announcing_result",
        }
    }

    /// Whether `next` may follow `self` within one iteration.
    pub fn can_advance_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Idle, FetchingFrame)
                | (FetchingFrame, Segmenting)
                | (Segmenting, AnnouncingGuidance)
                | (Segmenting, Diagnosing)
                | (Diagnosing, AnnouncingResult)
                | (AnnouncingGuidance, Idle)
                | (AnnouncingResult, Idle)
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks one iteration's state and logs each transition.
///
/// A failure may end the iteration from any state, so [`StateTracker::reset`]
/// returns to `Idle` unconditionally.
pub(crate) struct StateTracker {
    iteration: u64,
    state: PipelineState,
    transitions: usize,
}

impl StateTracker {
    pub fn new(iteration: u64) -> Self {
        Self {
            iteration,
            state: PipelineState::Idle,
            transitions: 0,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn advance(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        self.record(next);
    }

    pub fn reset(&mut self) {
        if self.state != PipelineState::Idle {
            self.record(PipelineState::Idle);
        }
    }

    pub fn transitions(&self) -> usize {
        self.transitions
    }

    fn record(&mut self, next: PipelineState) {
        StateTransition {
            iteration: self.iteration,
            from: self.state.as_str(),
            to: next.as_str(),
        }
        .log();
        self.state = next;
        self.transitions += 1;
    }
}
