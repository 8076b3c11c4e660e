// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A ratio-valued setting lies outside `[0, 1]`
    OutOfUnitRange {
        /// Dotted path of the offending setting
        field: &'static str,
        /// The rejected value
        value: f64,
    },
    /// A text setting that must carry content is empty
    EmptyText {
        /// Dotted path of the offending setting
        field: &'static str,
    },
    /// A duration or limit that must be positive is zero
    NotPositive {
        /// Dotted path of the offending setting
        field: &'static str,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::OutOfUnitRange { field, value } => {
                write!(f, "'{}' must lie within [0, 1] but was {}", field, value)
            }
            ValidationError::EmptyText { field } => {
                write!(f, "'{}' must not be empty", field)
            }
            ValidationError::NotPositive { field } => {
                write!(f, "'{}' must be greater than zero", field)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors raised while loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error(
        "Configuration validation failed:\n{}",
        .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("\n")
    )]
    Invalid(Vec<ValidationError>),
}
