//! HTTP client for REST API communication.
//!
//! This module provides the [`HttpClient`] type: the default
//! [`Transport`] that performs requests with `reqwest` and enforces the
//! configured connection timeout.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, warn};

use crate::auth::Session;
use crate::clients::connection::{Transport, TransportFuture};
use crate::clients::errors::{HttpError, TimeoutError};
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;

/// SDK version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Header carrying the organization of the session.
pub const ORGANIZATION_HEADER: &str = "X-Nuage-Organization";

/// HTTP client for making requests to the API.
///
/// The client handles:
/// - Default headers including User-Agent, `Authorization` and organization
/// - The connection timeout configured on the session
/// - JSON body encoding and decoding
///
/// Responses are returned for every status code; deciding what a non-2xx
/// status means is left to the caller.
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust,ignore
/// use rest_resource::clients::{HttpClient, HttpMethod, HttpRequest};
///
/// let client = HttpClient::new(&session)?;
///
/// let request = HttpRequest::builder(HttpMethod::Get, format!("{}/enterprises", session.base_url()))
///     .build()?;
///
/// let response = client.request(&request).await?;
/// ```
#[derive(Debug)]
pub struct HttpClient {
    /// The internal reqwest HTTP client.
    client: reqwest::Client,
    /// Default headers to include in all requests.
    default_headers: HashMap<String, String>,
    /// How long a request may take before it is reported as timed out.
    timeout: Duration,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new HTTP client for the given session.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the underlying reqwest client cannot
    /// be created (e.g., TLS initialization failure).
    pub fn new(session: &Session) -> Result<Self, HttpError> {
        let config = session.config();

        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent =
            format!("{user_agent_prefix}REST Resource Library v{SDK_VERSION} | Rust {rust_version}");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());
        default_headers.insert("Authorization".to_string(), session.authorization());
        if let Some(organization) = &session.organization {
            default_headers.insert(ORGANIZATION_HEADER.to_string(), organization.clone());
        }

        let client = reqwest::Client::builder().use_rustls_tls().build()?;

        Ok(Self {
            client,
            default_headers,
            timeout: config.timeout(),
        })
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Returns the connection timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends an HTTP request to the API.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if:
    /// - Request validation fails (`InvalidRequest`)
    /// - Network error occurs (`Network`)
    /// - The request does not complete within the timeout (`Timeout`)
    pub async fn request(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        if let Ok(result) = tokio::time::timeout(self.timeout, self.execute(request)).await {
            result
        } else {
            warn!(
                method = %request.http_method,
                url = %request.full_url(),
                "Connection timed out after {:?}",
                self.timeout
            );
            Err(TimeoutError {
                url: request.full_url(),
                after: self.timeout,
            }
            .into())
        }
    }

    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut headers = self.default_headers.clone();
        if request.body.is_some() {
            headers.insert("Content-Type".to_string(), "application/json".to_string());
        }
        if let Some(extra) = &request.extra_headers {
            for (key, value) in extra {
                headers.insert(key.clone(), value.clone());
            }
        }

        let method = match request.http_method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };
        let mut req_builder = self.client.request(method, &request.url);

        for (key, value) in &headers {
            req_builder = req_builder.header(key, value);
        }
        if let Some(query) = &request.query {
            req_builder = req_builder.query(query);
        }
        if let Some(body) = &request.body {
            req_builder = req_builder.body(body.to_string());
        }

        debug!(
            method = %request.http_method,
            url = %request.full_url(),
            body = ?request.body,
            "Sending >>>"
        );

        let res = req_builder.send().await?;

        let code = res.status().as_u16();
        let res_headers = Self::parse_response_headers(res.headers());
        let body_text = res.text().await.unwrap_or_default();

        // Non-JSON bodies are kept as a string so error reporting can show them
        let body = if body_text.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&body_text)
                .unwrap_or_else(|_| serde_json::Value::String(body_text))
        };

        debug!(status = code, url = %request.url, "Received <<<");

        Ok(HttpResponse::new(code, res_headers, body))
    }

    /// Parses response headers into a `HashMap`.
    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }
}

impl Transport for HttpClient {
    fn send<'a>(&'a self, request: &'a HttpRequest) -> TransportFuture<'a> {
        Box::pin(self.request(request))
    }
}
