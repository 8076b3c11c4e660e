// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Client-side failures of a single service channel call.
//!
//! Every variant is a failure of the call as a whole. The coordinator treats
//! them identically for control flow (abandon the iteration) and only
//! inspects them for logging.

use std::time::Duration;
use thiserror::Error;

use crate::proto::{ErrorDetail, FailureKind};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChannelError {
    /// The remote service could not be reached, or the connection dropped.
    #[error("service '{service}' is unreachable: {reason}")]
    Unreachable { service: String, reason: String },

    /// No reply arrived within the call's bounded wait.
    #[error("call to '{service}' operation '{operation}' timed out after {timeout:?}")]
    TimedOut {
        service: String,
        operation: String,
        timeout: Duration,
    },

    /// A reply arrived but did not match the operation's reply schema.
    #[error("malformed reply from '{service}' operation '{operation}': {reason}")]
    MalformedReply {
        service: String,
        operation: String,
        reason: String,
    },

    /// The remote handler (or its dispatcher) reported a failure.
    #[error("service '{service}' failed operation '{operation}' [{}]: {message}", .kind.as_str_name())]
    Remote {
        service: String,
        operation: String,
        kind: FailureKind,
        message: String,
    },
}

impl ChannelError {
    pub fn remote(service: &str, operation: &str, detail: ErrorDetail) -> Self {
        ChannelError::Remote {
            service: service.to_string(),
            operation: operation.to_string(),
            kind: FailureKind::try_from(detail.kind).unwrap_or(FailureKind::Unspecified),
            message: detail.message,
        }
    }

    /// Failure classification as seen by the caller.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            ChannelError::Unreachable { .. } | ChannelError::TimedOut { .. } => {
                FailureKind::ChannelUnreachable
            }
            ChannelError::MalformedReply { .. } => FailureKind::Internal,
            ChannelError::Remote { kind, .. } => *kind,
        }
    }
}
