// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Configuration validation.
//!
//! Values that deserialize cleanly can still be unusable: a gate threshold of
//! `1.5`, a zero call timeout, an empty guidance text. Validation walks every
//! section and accumulates all such problems so they can be fixed in one
//! pass rather than one at a time.
//!
//! # Checks
//!
//! | Section         | Rule                                                  |
//! |-----------------|-------------------------------------------------------|
//! | `coordinator`   | threshold in `[0, 1]`, non-empty guidance text and target organ, throttle > 0 |
//! | `transport`     | call timeout, frame limit and queue depth > 0         |
//! | `services`      | every address non-empty                               |
//! | `segmenter`     | confidence in `[0, 1]`                                |
//! | `diagnostician` | image quality in `[0, 1]`, non-empty diagnosis texts  |
//!
//! # Example
//!
//! ```rust
//! use sono_triage::config::{validate_config, Config};
//! use sono_triage::errors::ValidationError;
//!
//! let mut config = Config::default();
//! config.coordinator.quality_threshold = -0.1;
//! config.coordinator.target_organ.clear();
//!
//! let errors = validate_config(&config).unwrap_err();
//! assert_eq!(
//!     errors,
//!     vec![
//!         ValidationError::OutOfUnitRange { field: "coordinator.quality_threshold", value: -0.1 },
//!         ValidationError::EmptyText { field: "coordinator.target_organ" },
//!     ]
//! );
//! ```

use crate::config::Config;
use crate::errors::ValidationError;

/// Validates every section of `config`, returning all problems found.
pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let coordinator = &config.coordinator;
    check_unit_range(&mut errors, "coordinator.quality_threshold", coordinator.quality_threshold);
    check_text(&mut errors, "coordinator.guidance_text", &coordinator.guidance_text);
    check_text(&mut errors, "coordinator.target_organ", &coordinator.target_organ);
    check_positive(&mut errors, "coordinator.throttle_ms", coordinator.throttle_ms);

    let transport = &config.transport;
    check_positive(&mut errors, "transport.call_timeout_ms", transport.call_timeout_ms);
    check_positive(&mut errors, "transport.max_frame_bytes", transport.max_frame_bytes as u64);
    check_positive(&mut errors, "transport.queue_depth", transport.queue_depth as u64);

    let services = &config.services;
    check_text(&mut errors, "services.frame_source", &services.frame_source);
    check_text(&mut errors, "services.segmenter", &services.segmenter);
    check_text(&mut errors, "services.diagnostician", &services.diagnostician);
    check_text(&mut errors, "services.announcer", &services.announcer);

    check_unit_range(&mut errors, "segmenter.confidence", config.segmenter.confidence);

    let diagnostician = &config.diagnostician;
    check_unit_range(&mut errors, "diagnostician.image_quality", diagnostician.image_quality);
    check_text(&mut errors, "diagnostician.diagnosis", &diagnostician.diagnosis);
    check_text(&mut errors, "diagnostician.fallback_diagnosis", &diagnostician.fallback_diagnosis);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// NaN fails the range check as well.
fn check_unit_range(errors: &mut Vec<ValidationError>, field: &'static str, value: f64) {
    if !(0.0..=1.0).contains(&value) {
        errors.push(ValidationError::OutOfUnitRange { field, value });
    }
}

fn check_text(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.push(ValidationError::EmptyText { field });
    }
}

fn check_positive(errors: &mut Vec<ValidationError>, field: &'static str, value: u64) {
    if value == 0 {
        errors.push(ValidationError::NotPositive { field });
    }
}
