// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for consistent, human-readable
//! output and [`StructuredLog`] for emitting the event with typed fields.
//!
//! # Organization
//!
//! * `coordinator` - pipeline iteration events
//! * `service` - registry and transport events
//! * `stage` - stage service events
//!
//! # Usage Pattern
//!
//! ```rust
//! use sono_triage::observability::messages::service::ServiceStarted;
//! use sono_triage::observability::messages::StructuredLog;
//!
//! let msg = ServiceStarted {
//!     service: "segmentation",
//!     operations: &["segment"],
//! };
//!
//! msg.log();
//! ```

use tracing::Span;

pub mod coordinator;
pub mod service;
pub mod stage;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emit the event at the message's level.
    fn log(&self);

    /// Open a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
