// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the service registry and transports.
//!
//! This module contains message types for logging events related to:
//! * Operation registration (including shadowed registrations)
//! * Service start-up and listener binding
//! * Failed dispatches and closed connections

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Service registered its operations and entered its serving loop.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use sono_triage::observability::messages::service::ServiceStarted;
///
/// let msg = ServiceStarted {
///     service: "voice-tts",
///     operations: &["speak"],
/// };
///
/// assert_eq!(msg.to_string(), "Service 'voice-tts' serving operations [speak]");
/// ```
pub struct ServiceStarted<'a> {
    pub service: &'a str,
    pub operations: &'a [&'a str],
}

impl Display for ServiceStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Service '{}' serving operations [{}]",
            self.service,
            self.operations.join(", ")
        )
    }
}

impl StructuredLog for ServiceStarted<'_> {
    fn log(&self) {
        tracing::info!(
            service = self.service,
            operations = self.operations.join(","),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("service", span_name = name, service = self.service)
    }
}

/// Handler bound to an operation name.
pub struct OperationRegistered<'a> {
    pub service: &'a str,
    pub operation: &'a str,
    pub handler: &'a str,
}

impl Display for OperationRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Service '{}' registered handler '{}' for operation '{}'",
            self.service, self.handler, self.operation
        )
    }
}

impl StructuredLog for OperationRegistered<'_> {
    fn log(&self) {
        tracing::debug!(
            service = self.service,
            operation = self.operation,
            handler = self.handler,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "registration",
            span_name = name,
            service = self.service,
            operation = self.operation,
        )
    }
}

/// A later registration replaced an existing handler.
///
/// # Log Level
/// `warn!` - The earlier handler is silently unreachable from now on
pub struct HandlerReplaced<'a> {
    pub service: &'a str,
    pub operation: &'a str,
    pub previous: &'a str,
    pub replacement: &'a str,
}

impl Display for HandlerReplaced<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Service '{}': handler '{}' for operation '{}' replaced by '{}'",
            self.service, self.previous, self.operation, self.replacement
        )
    }
}

impl StructuredLog for HandlerReplaced<'_> {
    fn log(&self) {
        tracing::warn!(
            service = self.service,
            operation = self.operation,
            previous = self.previous,
            replacement = self.replacement,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "handler_replaced",
            span_name = name,
            service = self.service,
            operation = self.operation,
        )
    }
}

/// A dispatched operation failed and was returned to the caller as a failure reply.
pub struct DispatchFailed<'a> {
    pub service: &'a str,
    pub operation: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for DispatchFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Service '{}' operation '{}' failed: {}",
            self.service, self.operation, self.error
        )
    }
}

impl StructuredLog for DispatchFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            service = self.service,
            operation = self.operation,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "dispatch_failed",
            span_name = name,
            service = self.service,
            operation = self.operation,
        )
    }
}

/// TCP listener bound and accepting connections.
pub struct ListenerStarted<'a> {
    pub service: &'a str,
    pub address: &'a str,
}

impl Display for ListenerStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Service '{}' listening on {}", self.service, self.address)
    }
}

impl StructuredLog for ListenerStarted<'_> {
    fn log(&self) {
        tracing::info!(service = self.service, address = self.address, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "listener",
            span_name = name,
            service = self.service,
            address = self.address,
        )
    }
}

pub struct ConnectionClosed<'a> {
    pub service: &'a str,
    pub peer: &'a str,
    pub reason: &'a str,
}

impl Display for ConnectionClosed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Service '{}' closed connection from {}: {}",
            self.service, self.peer, self.reason
        )
    }
}

impl StructuredLog for ConnectionClosed<'_> {
    fn log(&self) {
        tracing::debug!(
            service = self.service,
            peer = self.peer,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("connection", span_name = name, peer = self.peer)
    }
}

/// Queued request dropped because its caller stopped waiting.
///
/// # Log Level
/// `debug!` - Expected after a caller-side timeout
pub struct AbandonedRequestSkipped<'a> {
    pub service: &'a str,
    pub operation: &'a str,
}

impl Display for AbandonedRequestSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Service '{}' skipped '{}': caller no longer waiting",
            self.service, self.operation
        )
    }
}

impl StructuredLog for AbandonedRequestSkipped<'_> {
    fn log(&self) {
        tracing::debug!(service = self.service, operation = self.operation, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "dispatch",
            span_name = name,
            service = self.service,
            operation = self.operation,
        )
    }
}
