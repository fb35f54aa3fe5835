//! HTTP client types for REST API communication.
//!
//! This module provides the transport layer resource operations are
//! dispatched through.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`Transport`]: The seam between resource operations and HTTP
//! - [`HttpClient`]: The default, `reqwest`-backed transport
//! - [`Connection`]: The state of one request/response exchange
//! - [`HttpRequest`]: A request to be sent to the API
//! - [`HttpResponse`]: A parsed response from the API
//! - [`HttpMethod`]: Supported HTTP methods (GET, POST, PUT, DELETE)
//! - [`RestClient`]: Session, transport and current user bundled together
//!
//! # Example
//!
//! ```rust,ignore
//! use rest_resource::clients::{HttpClient, HttpMethod, HttpRequest};
//!
//! let client = HttpClient::new(&session)?;
//!
//! let request = HttpRequest::builder(HttpMethod::Get, format!("{}/enterprises", session.base_url()))
//!     .build()?;
//!
//! let response = client.request(&request).await?;
//! ```
//!
//! # Timeouts
//!
//! [`HttpClient`] wraps every exchange in the timeout configured on the
//! session's [`RestConfig`](crate::RestConfig). There is no retry.

mod connection;
mod errors;
mod http_client;
mod http_request;
mod http_response;
pub mod rest;

pub use connection::{Connection, ConnectionMode, Transport, TransportFuture};
pub use errors::{HttpError, HttpResponseError, InvalidHttpRequestError, TimeoutError};
pub use http_client::{HttpClient, ORGANIZATION_HEADER, SDK_VERSION};
pub use http_request::{HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::{HttpResponse, WireMap};

pub use rest::RestClient;
