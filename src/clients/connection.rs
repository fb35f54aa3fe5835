//! Per-operation connection state and the transport seam.
//!
//! A [`Connection`] is created for every resource operation, started
//! immediately, and handed back to the caller together with the entity the
//! operation acted on. The actual HTTP exchange is delegated to a
//! [`Transport`], which the default [`HttpClient`](crate::clients::HttpClient)
//! implements and tests replace with recording doubles.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::clients::errors::HttpError;
use crate::clients::http_request::HttpRequest;
use crate::clients::http_response::HttpResponse;

/// The boxed future returned by [`Transport::send`].
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;

/// Something that can perform an [`HttpRequest`].
///
/// Implementations must resolve every call exactly once, either with a
/// response (any status code) or with an error. Timeouts are reported as
/// [`HttpError::Timeout`].
pub trait Transport: Send + Sync + fmt::Debug {
    /// Sends the request and resolves with the response.
    fn send<'a>(&'a self, request: &'a HttpRequest) -> TransportFuture<'a>;
}

/// How the result of an operation is delivered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionMode {
    /// The caller waits for the result.
    #[default]
    Sync,
    /// The result is delivered to a callback on another task.
    Async,
}

/// The state of one request/response exchange.
#[derive(Debug)]
pub struct Connection {
    request: HttpRequest,
    mode: ConnectionMode,
    response: Option<HttpResponse>,
    error: Option<HttpError>,
    has_local_handler: bool,
    has_remote_callback: bool,
}

impl Connection {
    /// Creates a connection for the request. Nothing is sent until [`Connection::start`].
    #[must_use]
    pub const fn new(request: HttpRequest, mode: ConnectionMode) -> Self {
        Self {
            request,
            mode,
            response: None,
            error: None,
            has_local_handler: false,
            has_remote_callback: false,
        }
    }

    /// Records which completion stages are registered on this connection.
    #[must_use]
    pub const fn with_callbacks(mut self, local: bool, remote: bool) -> Self {
        self.has_local_handler = local;
        self.has_remote_callback = remote;
        self
    }

    /// Performs the exchange through `transport`.
    ///
    /// After this returns, exactly one of [`Connection::response`] and
    /// [`Connection::transport_error`] is set.
    pub async fn start(&mut self, transport: &dyn Transport) {
        match transport.send(&self.request).await {
            Ok(response) => {
                self.response = Some(response);
                self.error = None;
            }
            Err(error) => {
                self.response = None;
                self.error = Some(error);
            }
        }
    }

    /// Returns the request this connection carries.
    #[must_use]
    pub const fn request(&self) -> &HttpRequest {
        &self.request
    }

    /// Returns the delivery mode.
    #[must_use]
    pub const fn mode(&self) -> ConnectionMode {
        self.mode
    }

    /// Returns `true` if the result is delivered through a callback.
    #[must_use]
    pub const fn is_async(&self) -> bool {
        matches!(self.mode, ConnectionMode::Async)
    }

    /// Returns the response, if the exchange produced one.
    #[must_use]
    pub const fn response(&self) -> Option<&HttpResponse> {
        self.response.as_ref()
    }

    /// Returns the transport error, if the exchange failed.
    #[must_use]
    pub const fn transport_error(&self) -> Option<&HttpError> {
        self.error.as_ref()
    }

    /// Takes the transport error out of the connection.
    pub fn take_error(&mut self) -> Option<HttpError> {
        self.error.take()
    }

    /// Returns `true` if the exchange ended in a timeout.
    #[must_use]
    pub fn has_timed_out(&self) -> bool {
        self.error.as_ref().is_some_and(HttpError::is_timeout)
    }

    /// Returns `true` if a 2xx response was received.
    #[must_use]
    pub fn has_response_success(&self) -> bool {
        self.response.as_ref().is_some_and(HttpResponse::is_ok)
    }

    /// Returns `true` if a local handler is registered.
    #[must_use]
    pub const fn has_local_handler(&self) -> bool {
        self.has_local_handler
    }

    /// Returns `true` if a caller-supplied callback is registered.
    #[must_use]
    pub const fn has_remote_callback(&self) -> bool {
        self.has_remote_callback
    }
}

// Verify Connection is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Connection>();
};
