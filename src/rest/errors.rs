//! Resource-specific error types for REST API operations.
//!
//! # Error Handling
//!
//! The SDK maps HTTP status codes to semantic error variants:
//!
//! - **300**: [`ResourceError::ChoiceRequired`] - The server needs a `responseChoice`
//! - **404**: [`ResourceError::NotFound`] - Resource doesn't exist
//! - **409/412/422**: [`ResourceError::ValidationFailed`] - Validation errors from the API
//! - **Other 4xx/5xx**: [`ResourceError::Http`] - Wrapped HTTP error
//!
//! A connection that times out yields [`ResourceError::Timeout`]. Guards that
//! run before anything is sent (missing ids, parent cycles, unknown child
//! collections) have their own variants.
//!
//! # Example
//!
//! ```rust,ignore
//! use rest_resource::rest::{ResourceError, Mode};
//!
//! match group.fetch(&client, Mode::Sync).await {
//!     Ok(outcome) => println!("fetched {:?}", outcome),
//!     Err(ResourceError::NotFound { resource, id }) => {
//!         println!("{} with id {} not found", resource, id);
//!     }
//!     Err(ResourceError::ChoiceRequired { choices, .. }) => {
//!         println!("server offers {} choices", choices.len());
//!     }
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clients::{HttpError, HttpResponseError, InvalidHttpRequestError, TimeoutError};

/// One of the alternatives the server offers with an HTTP 300 response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseChoice {
    /// The value to send back as `responseChoice`.
    pub id: i64,
    /// Human readable description of the choice.
    #[serde(default)]
    pub label: String,
}

/// Error type for REST resource operations.
///
/// # Example
///
/// ```rust
/// use rest_resource::rest::ResourceError;
/// use std::collections::HashMap;
///
/// let error = ResourceError::NotFound {
///     resource: "enterprise",
///     id: "123".to_string(),
/// };
/// assert!(error.to_string().contains("enterprise"));
///
/// let mut errors = HashMap::new();
/// errors.insert("name".to_string(), vec!["is required".to_string()]);
/// let error = ResourceError::ValidationFailed {
///     errors,
///     request_id: None,
/// };
/// assert!(error.to_string().contains("Validation failed"));
/// ```
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The resource was not found (HTTP 404).
    #[error("{resource} with id {id} not found")]
    NotFound {
        /// The remote name of the resource.
        resource: &'static str,
        /// The ID that was requested.
        id: String,
    },

    /// Validation failed, either locally or on the server (HTTP 409, 412, 422).
    #[error("Validation failed: {errors:?}")]
    ValidationFailed {
        /// A map of attribute names to error messages.
        errors: HashMap<String, Vec<String>>,
        /// The request ID for debugging (from X-Request-Id header).
        request_id: Option<String>,
    },

    /// The server needs the caller to pick how to proceed (HTTP 300).
    ///
    /// Retry the operation with one of the choice ids as `response_choice`.
    #[error("{resource} requires a response choice ({} offered)", .choices.len())]
    ChoiceRequired {
        /// The remote name of the resource.
        resource: &'static str,
        /// The choices offered by the server.
        choices: Vec<ResponseChoice>,
        /// The request ID for debugging (from X-Request-Id header).
        request_id: Option<String>,
    },

    /// The connection timed out; no handler ran.
    #[error(transparent)]
    Timeout(#[from] TimeoutError),

    /// The operation needs a server-assigned id and the resource has none.
    #[error("Cannot {operation} {resource}: it has no id")]
    MissingId {
        /// The remote name of the resource.
        resource: &'static str,
        /// The operation being attempted (e.g., "fetch", "save").
        operation: &'static str,
    },

    /// Setting the parent would make the parent chain cycle.
    #[error("Cannot set parent of {resource}: the parent chain would contain a cycle")]
    ParentCycle {
        /// The remote name of the resource.
        resource: &'static str,
    },

    /// The child is not a member of the collection.
    #[error("No matching {resource} in the '{key}' children")]
    ChildNotFound {
        /// The remote name of the child.
        resource: &'static str,
        /// The collection key.
        key: String,
    },

    /// No child collection is registered under the key.
    #[error("{resource} has no child collection '{key}'")]
    UnknownChildCollection {
        /// The remote name of the parent.
        resource: &'static str,
        /// The collection key that was requested.
        key: String,
    },

    /// An ownership check ran before a current user was set on the client.
    #[error("No current user is set on the client")]
    CurrentUserNotSet,

    /// An HTTP-level error occurred.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The request failed validation before being sent.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),
}

impl ResourceError {
    /// Creates a `ResourceError` from a non-success HTTP response.
    ///
    /// Maps HTTP status codes to semantic error variants:
    /// - 300 -> `ChoiceRequired` (parsing choices from body)
    /// - 404 -> `NotFound`
    /// - 409, 412, 422 -> `ValidationFailed` (parsing errors from body)
    /// - Other -> `Http`
    ///
    /// # Example
    ///
    /// ```rust
    /// use rest_resource::rest::ResourceError;
    /// use serde_json::json;
    ///
    /// let error = ResourceError::from_http_response(
    ///     404,
    ///     &json!({"description": "Not found"}),
    ///     "group",
    ///     Some("123"),
    ///     Some("req-123"),
    /// );
    /// assert!(matches!(error, ResourceError::NotFound { .. }));
    /// ```
    #[must_use]
    pub fn from_http_response(
        code: u16,
        body: &serde_json::Value,
        resource: &'static str,
        id: Option<&str>,
        request_id: Option<&str>,
    ) -> Self {
        match code {
            300 => Self::ChoiceRequired {
                resource,
                choices: parse_choices(body),
                request_id: request_id.map(ToString::to_string),
            },
            404 => Self::NotFound {
                resource,
                id: id.unwrap_or("unknown").to_string(),
            },
            409 | 412 | 422 => Self::ValidationFailed {
                errors: parse_validation_errors(body),
                request_id: request_id.map(ToString::to_string),
            },
            _ => {
                let message = match body {
                    serde_json::Value::String(raw) => raw.clone(),
                    other => other.to_string(),
                };
                Self::Http(HttpError::Response(HttpResponseError {
                    code,
                    message,
                    error_reference: request_id.map(ToString::to_string),
                }))
            }
        }
    }

    /// Converts a transport failure, keeping timeouts distinguishable.
    #[must_use]
    pub fn from_transport(error: HttpError) -> Self {
        match error {
            HttpError::Timeout(timeout) => Self::Timeout(timeout),
            HttpError::InvalidRequest(invalid) => Self::InvalidRequest(invalid),
            other => Self::Http(other),
        }
    }

    /// Returns `true` if the operation was abandoned because of a timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Returns the request ID if available.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::ValidationFailed { request_id, .. } | Self::ChoiceRequired { request_id, .. } => {
                request_id.as_deref()
            }
            Self::Http(HttpError::Response(e)) => e.error_reference.as_deref(),
            _ => None,
        }
    }
}

/// Parses the choices offered with an HTTP 300 response.
///
/// ```json
/// {"choices": [{"id": 1, "label": "Delete the group and its users"}]}
/// ```
fn parse_choices(body: &serde_json::Value) -> Vec<ResponseChoice> {
    body.get("choices")
        .and_then(serde_json::Value::as_array)
        .map(|choices| {
            choices
                .iter()
                .filter_map(|choice| serde_json::from_value(choice.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Parses validation errors from an API response body.
///
/// The server reports errors per property:
/// ```json
/// {
///   "errors": [
///     {"property": "name", "descriptions": [{"title": "Invalid", "description": "name is required"}]}
///   ]
/// }
/// ```
///
/// Also accepted are an object of field to messages, a plain array of
/// strings, and a single string; messages that belong to no field are
/// grouped under `base`.
fn parse_validation_errors(body: &serde_json::Value) -> HashMap<String, Vec<String>> {
    let mut result: HashMap<String, Vec<String>> = HashMap::new();

    let Some(errors) = body.get("errors") else {
        if let Some(description) = body.get("description").and_then(serde_json::Value::as_str) {
            result.insert("base".to_string(), vec![description.to_string()]);
        }
        return result;
    };

    match errors {
        serde_json::Value::Object(map) => {
            for (field, messages) in map {
                result.insert(field.clone(), messages_of(messages));
            }
        }
        serde_json::Value::Array(arr) => {
            for entry in arr {
                match entry {
                    serde_json::Value::String(s) => {
                        result.entry("base".to_string()).or_default().push(s.clone());
                    }
                    serde_json::Value::Object(obj) => {
                        let field = obj
                            .get("property")
                            .and_then(serde_json::Value::as_str)
                            .filter(|p| !p.is_empty())
                            .unwrap_or("base");
                        let messages = obj
                            .get("descriptions")
                            .map(messages_of)
                            .unwrap_or_default();
                        result.entry(field.to_string()).or_default().extend(messages);
                    }
                    _ => {}
                }
            }
        }
        serde_json::Value::String(s) => {
            result.insert("base".to_string(), vec![s.clone()]);
        }
        _ => {}
    }

    result
}

fn messages_of(value: &serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Array(arr) => arr.iter().flat_map(messages_of).collect(),
        serde_json::Value::String(s) => vec![s.clone()],
        serde_json::Value::Object(obj) => obj
            .get("description")
            .or_else(|| obj.get("title"))
            .and_then(serde_json::Value::as_str)
            .map(|s| vec![s.to_string()])
            .unwrap_or_default(),
        serde_json::Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

// Verify ResourceError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceError>();
};
