// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Service-side failures raised by handlers and the dispatch boundary.

use thiserror::Error;

use crate::proto::{ErrorDetail, FailureKind};

/// Failure of one dispatched operation.
///
/// These never crash a service process: the dispatch boundary converts every
/// variant into an [`ErrorDetail`] reply for the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// No handler is registered under the requested operation name.
    #[error("operation '{operation}' is not registered on service '{service}'")]
    UnknownOperation { service: String, operation: String },

    /// A required request field is missing or invalid.
    #[error("malformed request: field '{field}' {reason}")]
    MalformedRequest { field: &'static str, reason: String },

    /// The stage's own backing dependency is unavailable and no fallback exists.
    #[error("upstream dependency unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The handler panicked; the panic was contained at the dispatch boundary.
    #[error("handler for operation '{operation}' panicked: {message}")]
    HandlerPanicked { operation: String, message: String },

    /// The dispatch loop is no longer accepting requests.
    #[error("service '{service}' is shutting down")]
    ShuttingDown { service: String },
}

impl ServiceError {
    pub fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        ServiceError::MalformedRequest {
            field,
            reason: reason.into(),
        }
    }

    /// Wire classification of this failure.
    ///
    /// An unavailable upstream with no fallback is reported as an unreachable
    /// channel: to the caller the stage simply could not serve the call.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            ServiceError::UnknownOperation { .. } => FailureKind::UnknownOperation,
            ServiceError::MalformedRequest { .. } => FailureKind::MalformedRequest,
            ServiceError::UpstreamUnavailable(_) | ServiceError::ShuttingDown { .. } => {
                FailureKind::ChannelUnreachable
            }
            ServiceError::HandlerPanicked { .. } => FailureKind::Internal,
        }
    }

    pub fn to_error_detail(&self) -> ErrorDetail {
        ErrorDetail {
            kind: self.failure_kind() as i32,
            message: self.to_string(),
        }
    }
}

/// Registration-time failure under the strict duplicate policy.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistrationError {
    #[error("operation '{operation}' is already registered on service '{service}'")]
    DuplicateOperation { service: String, operation: String },
}
