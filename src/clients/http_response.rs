//! HTTP response types for the REST resource SDK.
//!
//! This module provides the [`HttpResponse`] type and the [`WireMap`] alias
//! every resource is serialized to and from.

use std::collections::HashMap;

/// A flat mapping of remote attribute names to wire values.
pub type WireMap = serde_json::Map<String, serde_json::Value>;

/// An HTTP response from the API.
///
/// Non-2xx responses are returned as values, not errors: the operation
/// pipeline decides what a status means for the resource it was acting on.
///
/// # Example
///
/// ```rust
/// use rest_resource::clients::HttpResponse;
/// use serde_json::json;
/// use std::collections::HashMap;
///
/// let response = HttpResponse::new(200, HashMap::new(), json!([{"ID": "42"}]));
///
/// assert!(response.is_ok());
/// assert_eq!(response.data().len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers, lower-cased (headers may have multiple values).
    pub headers: HashMap<String, Vec<String>>,
    /// The parsed response body; `Null` when the body was empty.
    pub body: serde_json::Value,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`.
    #[must_use]
    pub const fn new(
        code: u16,
        headers: HashMap<String, Vec<String>>,
        body: serde_json::Value,
    ) -> Self {
        Self {
            code,
            headers,
            body,
        }
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns the `X-Request-Id` header value, if present.
    ///
    /// This ID is useful for debugging and should be included in error reports.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.headers
            .get("x-request-id")
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the wire mappings carried by the body.
    ///
    /// The server answers with an array of objects; a single object is
    /// accepted as a one-element sequence. Anything else yields no data.
    #[must_use]
    pub fn data(&self) -> Vec<WireMap> {
        match &self.body {
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(|item| item.as_object().cloned())
                .collect(),
            serde_json::Value::Object(map) => vec![map.clone()],
            _ => Vec::new(),
        }
    }
}
