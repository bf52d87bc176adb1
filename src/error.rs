//! Error types for client configuration.
//!
//! This module contains the error type returned while validating
//! configuration values and building a [`NetboxConfig`](crate::NetboxConfig).
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use netbox_api::{ApiToken, ConfigError};
//!
//! let result = ApiToken::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyToken)));
//! ```

use thiserror::Error;

/// Errors that can occur during client configuration.
///
/// Each variant provides a clear, actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// API token cannot be empty.
    #[error("API token cannot be empty. Omit the token for read-only access instead.")]
    EmptyToken,

    /// Base URL is invalid.
    #[error("Invalid base URL '{url}'. Please provide an http(s) URL (e.g., 'https://netbox.example.com').")]
    InvalidBaseUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// Worker count for parallel pagination is invalid.
    #[error("Invalid max_workers value {value}. At least one worker is required.")]
    InvalidMaxWorkers {
        /// The rejected worker count.
        value: usize,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },
}
