// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use crate::errors::ChannelError;
use crate::stages::Stage;

/// Reason a coordinator iteration was abandoned.
///
/// Carries the stage and operation so the failure can be reproduced from the
/// log line alone.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IterationError {
    #[error("{stage} call '{operation}' failed: {source}")]
    StageCall {
        stage: Stage,
        operation: &'static str,
        #[source]
        source: ChannelError,
    },

    /// The announcer answered, but with an in-band synthesis error.
    #[error("{stage} could not voice the announcement: {reason}")]
    SpeechUnavailable { stage: Stage, reason: String },
}

impl IterationError {
    pub fn stage_call(stage: Stage, source: ChannelError) -> Self {
        IterationError::StageCall {
            stage,
            operation: stage.operation(),
            source,
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            IterationError::StageCall { stage, .. } => *stage,
            IterationError::SpeechUnavailable { stage, .. } => *stage,
        }
    }

    pub fn operation(&self) -> &'static str {
        self.stage().operation()
    }
}
