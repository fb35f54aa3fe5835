//! Error types for SDK configuration.
//!
//! This module contains the error type used when building a [`RestConfig`]
//! or a [`Session`] and when validating the newtypes they are made of.
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use rest_resource::{ApiKey, ConfigError};
//!
//! let result = ApiKey::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyApiKey)));
//! ```
//!
//! [`RestConfig`]: crate::RestConfig
//! [`Session`]: crate::Session

use thiserror::Error;

/// Errors that can occur during SDK configuration.
///
/// Each variant provides a clear, actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// API key cannot be empty.
    #[error("API key cannot be empty. Please provide the API key or password for the account.")]
    EmptyApiKey,

    /// Username cannot be empty.
    #[error("Username cannot be empty. Please provide the account used to log in.")]
    EmptyUsername,

    /// Base URL is invalid.
    #[error("Invalid base URL '{url}'. Please provide a URL with scheme and host (e.g., 'https://api.example.com:8443').")]
    InvalidBaseUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// API version is invalid.
    #[error("Invalid API version '{version}'. Expected format: '5.0', 'v5_0' or '6'.")]
    InvalidApiVersion {
        /// The invalid version string that was provided.
        version: String,
    },

    /// The request timeout is zero.
    #[error("Request timeout must be greater than zero.")]
    InvalidTimeout,

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },
}
