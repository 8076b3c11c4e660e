// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod announcement;
pub mod coordinator;
pub mod outcome;
#[cfg(test)]
pub mod integration_tests;

pub use coordinator::{Coordinator, CoordinatorSettings};
pub use outcome::{PipelineOutcome, PipelineState};
