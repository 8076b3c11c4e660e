// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The four pipeline stages.
//!
//! Each stage is a service exposing a single operation. This module holds the
//! stage contracts shared by both sides of the channel, the service-side
//! handlers, and the coordinator-side typed clients.

pub mod announcer;
pub mod clients;
pub mod contracts;
pub mod diagnostician;
pub mod frame_source;
pub mod segmenter;

#[cfg(test)]
pub mod testing;

pub use clients::StageChannels;
pub use contracts::Stage;
