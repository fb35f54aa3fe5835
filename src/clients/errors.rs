//! HTTP-specific error types for the REST resource SDK.
//!
//! # Error Handling
//!
//! The transport layer uses specific error types for different failure scenarios:
//!
//! - [`HttpResponseError`]: Non-2xx HTTP responses from the API
//! - [`InvalidHttpRequestError`]: When a request fails validation before sending
//! - [`TimeoutError`]: When the connection did not complete in time
//! - [`HttpError`]: Unified error type encompassing all HTTP-related errors
//!
//! A [`Transport`](crate::clients::Transport) reports non-2xx statuses as a
//! normal [`HttpResponse`](crate::clients::HttpResponse); [`HttpResponseError`]
//! is produced when a caller turns such a response into an error.
//!
//! # Example
//!
//! ```rust,ignore
//! use rest_resource::clients::{HttpError, Transport};
//!
//! match transport.send(&request).await {
//!     Ok(response) => println!("{} {}", response.code, response.body),
//!     Err(HttpError::Timeout(e)) => println!("gave up after {:?}", e.after),
//!     Err(HttpError::Network(e)) => println!("Network error: {e}"),
//!     Err(e) => println!("{e}"),
//! }
//! ```

use std::time::Duration;

use thiserror::Error;

/// Error returned when an HTTP request receives a non-successful response.
///
/// The message field carries the serialized JSON error body returned by the
/// server, or the raw body when it was not an object.
///
/// # Example
///
/// ```rust
/// use rest_resource::clients::HttpResponseError;
///
/// let error = HttpResponseError {
///     code: 404,
///     message: r#"{"description":"Not found"}"#.to_string(),
///     error_reference: Some("abc-123".to_string()),
/// };
///
/// println!("Status {}: {}", error.code, error.message);
/// ```
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HttpResponseError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// Serialized error message in JSON format.
    pub message: String,
    /// Reference ID for error reporting (from the `X-Request-Id` header).
    pub error_reference: Option<String>,
}

/// Error returned when an HTTP request fails validation.
///
/// This error is raised before a request is sent.
///
/// # Example
///
/// ```rust
/// use rest_resource::clients::InvalidHttpRequestError;
///
/// let error = InvalidHttpRequestError::MissingBody {
///     method: "POST".to_string(),
/// };
///
/// assert_eq!(error.to_string(), "Cannot use POST without specifying data.");
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// The request URL is not absolute.
    #[error("Invalid request URL '{url}'. Requests must target an absolute http(s) URL.")]
    InvalidUrl {
        /// The URL that was provided.
        url: String,
    },

    /// A POST or PUT request was made without a body.
    #[error("Cannot use {method} without specifying data.")]
    MissingBody {
        /// The HTTP method that requires a body.
        method: String,
    },
}

/// Error returned when a connection did not complete within the configured timeout.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Request to {url} timed out after {after:?}")]
pub struct TimeoutError {
    /// The URL of the request that timed out.
    pub url: String,
    /// How long the transport waited.
    pub after: Duration,
}

/// Unified error type for all HTTP-related errors.
///
/// # Example
///
/// ```rust,ignore
/// use rest_resource::HttpError;
///
/// match result {
///     Ok(response) => { /* handle success */ }
///     Err(HttpError::Response(e)) => { /* handle API error */ }
///     Err(HttpError::InvalidRequest(e)) => { /* handle validation error */ }
///     Err(HttpError::Network(e)) => { /* handle network error */ }
///     Err(HttpError::Timeout(e)) => { /* handle timeout */ }
/// }
/// ```
#[derive(Debug, Error)]
pub enum HttpError {
    /// An HTTP response error (non-2xx status code).
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The connection timed out.
    #[error(transparent)]
    Timeout(#[from] TimeoutError),
}

impl HttpError {
    /// Returns `true` if this error is a connection timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_response_error_displays_message() {
        let error = HttpResponseError {
            code: 404,
            message: r#"{"description":"Not Found"}"#.to_string(),
            error_reference: None,
        };
        assert_eq!(error.to_string(), r#"{"description":"Not Found"}"#);
    }

    #[test]
    fn test_invalid_request_error_messages() {
        let error = InvalidHttpRequestError::MissingBody {
            method: "PUT".to_string(),
        };
        assert_eq!(error.to_string(), "Cannot use PUT without specifying data.");

        let error = InvalidHttpRequestError::InvalidUrl {
            url: "groups".to_string(),
        };
        assert!(error.to_string().contains("'groups'"));
    }

    #[test]
    fn test_timeout_error_mentions_url_and_duration() {
        let error = HttpError::from(TimeoutError {
            url: "https://api.example.com/groups".to_string(),
            after: Duration::from_secs(2),
        });

        assert!(error.is_timeout());
        let message = error.to_string();
        assert!(message.contains("https://api.example.com/groups"));
        assert!(message.contains("2s"));
    }

    #[test]
    fn test_error_types_implement_std_error() {
        let http_error: &dyn std::error::Error = &HttpResponseError {
            code: 400,
            message: "test".to_string(),
            error_reference: None,
        };
        let _ = http_error;

        let invalid_error: &dyn std::error::Error = &InvalidHttpRequestError::MissingBody {
            method: "POST".to_string(),
        };
        let _ = invalid_error;
    }
}
