//! The client every resource operation is performed with.

use std::sync::Arc;

use crate::auth::{CurrentUser, Session};
use crate::clients::{HttpClient, HttpError, Transport};
use crate::rest::ResourceError;

/// Bundles the session, the transport and the current user.
///
/// Resource operations take a `&RestClient`: URLs are built from
/// [`RestClient::base_url`], requests go through [`RestClient::transport`],
/// and ownership checks consult [`RestClient::current_user`].
///
/// Cloning is cheap; clones share the same transport.
///
/// # Thread Safety
///
/// `RestClient` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust,ignore
/// use rest_resource::{CurrentUser, RestClient};
///
/// let client = RestClient::new(session)?
///     .with_current_user(CurrentUser::new("u-1", "csproot"));
///
/// assert!(client.current_user().is_ok());
/// ```
#[derive(Clone, Debug)]
pub struct RestClient {
    session: Session,
    transport: Arc<dyn Transport>,
    current_user: Option<CurrentUser>,
}

// Verify RestClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RestClient>();
};

impl RestClient {
    /// Creates a client that talks to the API over HTTP.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the HTTP client cannot be created.
    pub fn new(session: Session) -> Result<Self, HttpError> {
        let http_client = HttpClient::new(&session)?;
        Ok(Self::with_transport(session, Arc::new(http_client)))
    }

    /// Creates a client that sends requests through `transport`.
    #[must_use]
    pub fn with_transport(session: Session, transport: Arc<dyn Transport>) -> Self {
        if session.expired() {
            tracing::warn!(
                user = session.username.as_ref(),
                "Creating a client for a session whose API key has expired"
            );
        }
        Self {
            session,
            transport,
            current_user: None,
        }
    }

    /// Sets the user ownership checks are evaluated against.
    #[must_use]
    pub fn with_current_user(mut self, user: CurrentUser) -> Self {
        self.current_user = Some(user);
        self
    }

    /// Returns the session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the URL every resource URL is built on.
    #[must_use]
    pub fn base_url(&self) -> String {
        self.session.base_url()
    }

    /// Returns the transport requests are sent through.
    #[must_use]
    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Returns the current user.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::CurrentUserNotSet`] if no user was set.
    pub fn current_user(&self) -> Result<&CurrentUser, ResourceError> {
        self.current_user
            .as_ref()
            .ok_or(ResourceError::CurrentUserNotSet)
    }
}
