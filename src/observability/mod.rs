// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! All operational log lines in the crate come from message types defined here.
//! Each message is a small struct with a `Display` implementation for the human
//! readable text and a [`StructuredLog`](messages::StructuredLog) implementation
//! that emits the same event with structured fields at the right level.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::coordinator` - iteration lifecycle, gate decisions, failures
//! * `messages::service` - registration, dispatch and listener events
//! * `messages::stage` - events raised inside the four stage services
//!
//! # Usage
//!
//! ```rust
//! use sono_triage::observability::messages::coordinator::GuidanceIssued;
//! use sono_triage::observability::messages::StructuredLog;
//!
//! GuidanceIssued {
//!     iteration: 3,
//!     score: 0.31,
//! }
//! .log();
//! ```
//!
//! Subscriber installation lives in [`init_tracing`]; library code never
//! touches global logging state.

pub mod messages;

use tracing_subscriber::EnvFilter;

/// Install the process-wide `fmt` subscriber.
///
/// `RUST_LOG` wins over `default_filter` when set. Calling this twice is a
/// no-op rather than a panic.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
