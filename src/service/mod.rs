// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Remote-side half of the service protocol: operation registry and the
//! single-dispatcher serving loop.

mod host;
mod registry;

pub use host::{ServiceHandle, ServiceHost};
pub use registry::{DuplicatePolicy, ServiceRegistry};
