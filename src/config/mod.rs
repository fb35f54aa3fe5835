//! Configuration types for the REST resource SDK.
//!
//! This module provides the configuration used to reach the remote API:
//! where it lives, which version to address, and how long a connection may
//! take before it is reported as timed out.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`RestConfig`]: The main configuration struct holding all SDK settings
//! - [`RestConfigBuilder`]: A builder for constructing [`RestConfig`] instances
//! - [`BaseUrl`]: A validated API endpoint URL
//! - [`ApiKey`]: A validated API key newtype with masked debug output
//! - [`Username`]: A validated account name
//! - [`ApiVersion`]: The API version segment of the base URL
//!
//! # Example
//!
//! ```rust
//! use rest_resource::{RestConfig, BaseUrl, ApiVersion};
//!
//! let config = RestConfig::builder()
//!     .base_url(BaseUrl::new("https://api.example.com:8443").unwrap())
//!     .api_prefix("nuage/api")
//!     .api_version("5.0".parse().unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.api_base_url(), "https://api.example.com:8443/nuage/api/v5_0");
//! ```

mod newtypes;
mod version;

pub use newtypes::{ApiKey, BaseUrl, Username};
pub use version::ApiVersion;

use std::time::Duration;

use crate::error::ConfigError;

/// Default time a connection may take before it is reported as timed out.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for the REST resource SDK.
///
/// # Thread Safety
///
/// `RestConfig` is `Clone`, `Send`, and `Sync`, making it safe to share
/// across threads and async tasks.
#[derive(Clone, Debug)]
pub struct RestConfig {
    base_url: BaseUrl,
    api_prefix: Option<String>,
    api_version: Option<ApiVersion>,
    timeout: Duration,
    user_agent_prefix: Option<String>,
}

impl RestConfig {
    /// Creates a new builder for constructing a `RestConfig`.
    #[must_use]
    pub fn builder() -> RestConfigBuilder {
        RestConfigBuilder::new()
    }

    /// Returns the endpoint base URL.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the API path prefix, if configured.
    #[must_use]
    pub fn api_prefix(&self) -> Option<&str> {
        self.api_prefix.as_deref()
    }

    /// Returns the API version, if configured.
    #[must_use]
    pub const fn api_version(&self) -> Option<ApiVersion> {
        self.api_version
    }

    /// Returns the connection timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the URL every resource URL is built on.
    ///
    /// This is the base URL followed by the optional prefix and version
    /// segments, without a trailing separator.
    #[must_use]
    pub fn api_base_url(&self) -> String {
        let mut url = self.base_url.as_ref().to_string();
        if let Some(prefix) = &self.api_prefix {
            url.push('/');
            url.push_str(prefix);
        }
        if let Some(version) = self.api_version {
            url.push('/');
            url.push_str(&version.to_string());
        }
        url
    }
}

// Verify RestConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RestConfig>();
};

/// Builder for constructing [`RestConfig`] instances.
///
/// The only required field is `base_url`.
///
/// # Defaults
///
/// - `api_prefix`: `None`
/// - `api_version`: `None`
/// - `timeout`: [`DEFAULT_TIMEOUT`]
/// - `user_agent_prefix`: `None`
#[derive(Debug, Default)]
pub struct RestConfigBuilder {
    base_url: Option<BaseUrl>,
    api_prefix: Option<String>,
    api_version: Option<ApiVersion>,
    timeout: Option<Duration>,
    user_agent_prefix: Option<String>,
}

impl RestConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the endpoint base URL (required).
    #[must_use]
    pub fn base_url(mut self, url: BaseUrl) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the API path prefix (e.g., `nuage/api`).
    ///
    /// Leading and trailing `/` are removed.
    #[must_use]
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let prefix = prefix.trim_matches('/');
        self.api_prefix = (!prefix.is_empty()).then(|| prefix.to_string());
        self
    }

    /// Sets the API version.
    #[must_use]
    pub const fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`RestConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `base_url` is not set,
    /// or [`ConfigError::InvalidTimeout`] if the timeout is zero.
    pub fn build(self) -> Result<RestConfig, ConfigError> {
        let base_url = self
            .base_url
            .ok_or(ConfigError::MissingRequiredField { field: "base_url" })?;

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }

        Ok(RestConfig {
            base_url,
            api_prefix: self.api_prefix,
            api_version: self.api_version,
            timeout,
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}
