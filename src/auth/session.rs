//! Session management for authenticated API calls.
//!
//! This module provides the [`Session`] type: the login state every
//! resource URL and every request header is derived from.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};

use crate::config::{ApiKey, RestConfig, Username};

/// Represents an authenticated session for API calls.
///
/// A session knows where the API lives ([`Session::base_url`]) and how to
/// authenticate against it ([`Session::authorization`]).
///
/// # Thread Safety
///
/// `Session` is `Send + Sync`, making it safe to share across threads.
///
/// # Example
///
/// ```rust
/// use rest_resource::{ApiKey, BaseUrl, RestConfig, Session, Username};
///
/// let config = RestConfig::builder()
///     .base_url(BaseUrl::new("https://api.example.com").unwrap())
///     .api_prefix("api")
///     .build()
///     .unwrap();
///
/// let session = Session::new(
///     Username::new("admin").unwrap(),
///     ApiKey::new("secret").unwrap(),
///     config,
/// )
/// .with_organization("acme");
///
/// assert_eq!(session.base_url(), "https://api.example.com/api");
/// assert!(session.is_active());
/// ```
#[derive(Clone, Debug)]
pub struct Session {
    /// The account the session is opened for.
    pub username: Username,

    /// The API key (or password) used for authentication.
    pub api_key: ApiKey,

    /// The organization the account belongs to, if the server requires one.
    pub organization: Option<String>,

    /// When the API key expires, if applicable.
    pub expires: Option<DateTime<Utc>>,

    config: RestConfig,
}

impl Session {
    /// Creates a new session.
    #[must_use]
    pub const fn new(username: Username, api_key: ApiKey, config: RestConfig) -> Self {
        Self {
            username,
            api_key,
            organization: None,
            expires: None,
            config,
        }
    }

    /// Sets the organization sent with every request.
    #[must_use]
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    /// Sets the API key expiry.
    #[must_use]
    pub const fn with_expiry(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Returns the configuration the session was opened with.
    #[must_use]
    pub const fn config(&self) -> &RestConfig {
        &self.config
    }

    /// Returns the URL every resource URL is built on.
    #[must_use]
    pub fn base_url(&self) -> String {
        self.config.api_base_url()
    }

    /// Returns the `Authorization` header value for this session.
    #[must_use]
    pub fn authorization(&self) -> String {
        let credentials = format!("{}:{}", self.username.as_ref(), self.api_key.as_ref());
        format!("Basic {}", STANDARD.encode(credentials))
    }

    /// Returns `true` if the API key has expired.
    ///
    /// Sessions without an expiration time are considered never expired.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.expires.is_some_and(|expires| Utc::now() > expires)
    }

    /// Returns `true` if this session can still be used.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.expired()
    }
}

// Verify Session is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Session>();
};
