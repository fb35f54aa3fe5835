//! The operation pipeline.
//!
//! Every resource operation (fetch, save, delete, the child management calls)
//! builds one [`HttpRequest`], starts a [`Connection`] for it and reduces the
//! outcome in two stages:
//!
//! 1. A local handler applies the response to the resource (for example,
//!    merging the fetched attributes into it).
//! 2. The result is delivered to the caller: returned directly in
//!    [`Mode::Sync`], or passed to the callback of [`Mode::Async`].
//!
//! The callback of an asynchronous operation is invoked exactly once, with
//! either a [`Completion`] or a [`ResourceError`]. Timeouts and non-success
//! responses are reported as errors through the same channel.
//!
//! Errors detected before anything is sent (for example a missing id) are
//! returned directly in both modes; the callback is not invoked for them.
//!
//! # Example
//!
//! ```rust,ignore
//! use rest_resource::rest::{Mode, Outcome};
//!
//! // Blocking style: the result is the entity and the connection used.
//! let (group, connection) = group
//!     .save(&client, Mode::Sync)
//!     .await?
//!     .into_completion()
//!     .expect("sync operations complete")
//!     .into_parts();
//!
//! // Callback style: returns immediately.
//! let outcome = group
//!     .fetch(&client, Mode::callback(|result| {
//!         if let Ok(completion) = result {
//!             println!("fetched {:?}", completion.entity.read().base().id);
//!         }
//!     }))
//!     .await?;
//! assert!(outcome.is_pending());
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::clients::{
    Connection, ConnectionMode, HttpMethod, HttpRequest, HttpResponse, RestClient,
};
use crate::rest::graph::ChildKind;
use crate::rest::naming;
use crate::rest::object::{AsObjectRef, Handle, ObjectRef, RestObject};
use crate::rest::registry::MergeReport;
use crate::rest::ResourceError;

/// The callback of an asynchronous operation.
pub type Callback<P> = Box<dyn FnOnce(Result<Completion<P>, ResourceError>) + Send>;

/// How an operation delivers its result.
pub enum Mode<P> {
    /// The operation completes before returning.
    Sync,
    /// The operation returns [`Outcome::Pending`] and the callback receives
    /// the result once the exchange is over.
    Async(Callback<P>),
}

impl<P> Mode<P> {
    /// Creates an asynchronous mode delivering to `callback`.
    pub fn callback(
        callback: impl FnOnce(Result<Completion<P>, ResourceError>) + Send + 'static,
    ) -> Self {
        Self::Async(Box::new(callback))
    }

    /// Returns the matching connection mode.
    #[must_use]
    pub const fn connection_mode(&self) -> ConnectionMode {
        match self {
            Self::Sync => ConnectionMode::Sync,
            Self::Async(_) => ConnectionMode::Async,
        }
    }

    const fn delivery(&self) -> Delivery {
        Delivery {
            mode: self.connection_mode(),
            has_remote_callback: matches!(self, Self::Async(_)),
        }
    }
}

impl<P> fmt::Debug for Mode<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync => f.write_str("Sync"),
            Self::Async(_) => f.write_str("Async(..)"),
        }
    }
}

/// The result of a completed operation.
#[derive(Debug)]
pub struct Completion<P> {
    /// The entity the operation acted on.
    pub entity: P,
    /// The connection that carried the exchange.
    pub connection: Connection,
    /// What the merge did, for operations that merge the response.
    pub merge: Option<MergeReport>,
}

impl<P> Completion<P> {
    /// Splits into the entity and the connection.
    #[must_use]
    pub fn into_parts(self) -> (P, Connection) {
        (self.entity, self.connection)
    }
}

/// What an operation returns to its caller.
#[derive(Debug)]
pub enum Outcome<P> {
    /// The operation ran to completion ([`Mode::Sync`]).
    Completed(Completion<P>),
    /// The result will be delivered to the callback ([`Mode::Async`]).
    Pending,
}

impl<P> Outcome<P> {
    /// Returns the completion, if the operation ran synchronously.
    #[must_use]
    pub fn into_completion(self) -> Option<Completion<P>> {
        match self {
            Self::Completed(completion) => Some(completion),
            Self::Pending => None,
        }
    }

    /// Returns `true` if the result goes to a callback.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// The result of deleting the children of a resource.
///
/// Deletion is best effort: a failure is recorded and the remaining
/// children are still deleted. Nothing is rolled back.
#[derive(Debug, Default)]
pub struct CascadeReport {
    /// Number of children fetched from the server.
    pub fetched: usize,
    /// Number of children deleted.
    pub deleted: usize,
    /// Errors raised while fetching or deleting.
    pub failures: Vec<ResourceError>,
}

impl CascadeReport {
    /// Returns `true` if every fetch and delete succeeded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Clone, Copy, Debug)]
struct Delivery {
    mode: ConnectionMode,
    has_remote_callback: bool,
}

impl Delivery {
    const INTERNAL: Self = Self {
        mode: ConnectionMode::Sync,
        has_remote_callback: false,
    };
}

/// What runs once a successful response arrives.
enum LocalHandler {
    /// Nothing beyond the standard completion.
    Standard,
    /// Merge the first returned mapping into the resource.
    MergeInto(ObjectRef),
}

/// The resource a request is about, for error reporting.
struct Target {
    resource: &'static str,
    id: Option<String>,
}

/// Resolves the remote name, id and item URL of a persisted resource.
fn persisted<O: RestObject + ?Sized>(
    object: &O,
    client: &RestClient,
    operation: &'static str,
) -> Result<(Target, String), ResourceError> {
    let resource = object.remote_name();
    let Some(id) = object.base().id.clone() else {
        return Err(ResourceError::MissingId {
            resource,
            operation,
        });
    };
    let url = object.resource_url(&client.base_url());
    Ok((
        Target {
            resource,
            id: Some(id),
        },
        url,
    ))
}

fn delete_request(url: String, response_choice: Option<i64>) -> Result<HttpRequest, ResourceError> {
    let mut builder = HttpRequest::builder(HttpMethod::Delete, url);
    if let Some(choice) = response_choice {
        builder = builder.query_param("responseChoice", choice.to_string());
    }
    Ok(builder.build()?)
}

/// Starts a connection for `request` and runs the completion protocol.
async fn perform(
    client: &RestClient,
    request: HttpRequest,
    delivery: Delivery,
    target: &Target,
    handler: Option<LocalHandler>,
) -> Result<(Connection, Option<MergeReport>), ResourceError> {
    let body = request.body.as_ref().map_or_else(String::new, Value::to_string);
    debug!(
        method = %request.http_method,
        url = %request.full_url(),
        body = %body,
        "Dispatching request"
    );

    let mut connection = Connection::new(request, delivery.mode)
        .with_callbacks(handler.is_some(), delivery.has_remote_callback);
    connection.start(client.transport()).await;

    complete(connection, target, handler)
}

fn complete(
    mut connection: Connection,
    target: &Target,
    handler: Option<LocalHandler>,
) -> Result<(Connection, Option<MergeReport>), ResourceError> {
    if let Some(error) = connection.take_error() {
        if error.is_timeout() {
            warn!(
                resource = target.resource,
                url = %connection.request().full_url(),
                "Connection timed out; no handler runs"
            );
        }
        return Err(ResourceError::from_transport(error));
    }

    let Some(handler) = handler else {
        debug!(
            url = %connection.request().full_url(),
            success = connection.has_response_success(),
            "Request completed without a local handler"
        );
        return Ok((connection, None));
    };

    if let Some(response) = connection.response().filter(|response| !response.is_ok()) {
        return Err(ResourceError::from_http_response(
            response.code,
            &response.body,
            target.resource,
            target.id.as_deref(),
            response.request_id(),
        ));
    }

    match handler {
        LocalHandler::Standard => Ok((connection, None)),
        LocalHandler::MergeInto(object) => {
            let report = merge_first(&object, connection.response());
            Ok((connection, Some(report)))
        }
    }
}

/// Merges the first mapping of the response into `object`.
///
/// A missing body or rejected values are logged and otherwise ignored.
fn merge_first(object: &ObjectRef, response: Option<&HttpResponse>) -> MergeReport {
    let data = response.map(HttpResponse::data).unwrap_or_default();
    let Some(first) = data.first() else {
        debug!("Response carries no data to merge");
        return MergeReport::default();
    };

    let report = object.write().from_wire(first);
    if !report.is_clean() {
        warn!(
            rejected = ?report.rejected,
            "Response merged with rejected values"
        );
    }
    report
}

/// Runs `work` according to `mode`.
async fn drive<P, F>(mode: Mode<P>, work: F) -> Result<Outcome<P>, ResourceError>
where
    P: Send + 'static,
    F: Future<Output = Result<Completion<P>, ResourceError>> + Send + 'static,
{
    match mode {
        Mode::Sync => work.await.map(Outcome::Completed),
        Mode::Async(callback) => {
            tokio::spawn(async move {
                callback(work.await);
            });
            Ok(Outcome::Pending)
        }
    }
}

async fn dispatch<P: Send + 'static>(
    client: &RestClient,
    request: HttpRequest,
    target: Target,
    handler: LocalHandler,
    mode: Mode<P>,
    entity: P,
) -> Result<Outcome<P>, ResourceError> {
    let client = client.clone();
    let delivery = mode.delivery();
    let work = async move {
        let (connection, merge) = perform(&client, request, delivery, &target, Some(handler)).await?;
        Ok(Completion {
            entity,
            connection,
            merge,
        })
    };
    drive(mode, work).await
}

/// Sends a DELETE for `object` without touching its children.
async fn send_delete(
    object: &ObjectRef,
    client: &RestClient,
    response_choice: Option<i64>,
    delivery: Delivery,
) -> Result<Connection, ResourceError> {
    let (target, url) = persisted(&*object.read(), client, "delete")?;
    let request = delete_request(url, response_choice)?;
    let (connection, _) =
        perform(client, request, delivery, &target, Some(LocalHandler::Standard)).await?;
    Ok(connection)
}

/// Deletes `object`, cascading first if its type asks for it.
async fn delete_object(object: &ObjectRef, client: &RestClient) -> Result<(), ResourceError> {
    let cascades = object.read().cascades_delete();
    if cascades {
        log_cascade(object, &delete_children_of(object, client).await);
    }
    send_delete(object, client, None, Delivery::INTERNAL).await?;
    Ok(())
}

fn log_cascade(owner: &ObjectRef, report: &CascadeReport) {
    if !report.is_complete() {
        warn!(
            resource = owner.read().remote_name(),
            deleted = report.deleted,
            failed = report.failures.len(),
            "Some children could not be deleted"
        );
    }
}

/// Fetches the members of one child collection and registers them on `owner`.
async fn fetch_children_of(
    owner: &ObjectRef,
    client: &RestClient,
    kind: &ChildKind,
) -> Result<Vec<ObjectRef>, ResourceError> {
    let url = {
        let guard = owner.read();
        if guard.base().id.is_none() {
            return Err(ResourceError::MissingId {
                resource: guard.remote_name(),
                operation: "fetch children of",
            });
        }
        guard.resource_url_for_child(&client.base_url(), kind)
    };

    let request = HttpRequest::builder(HttpMethod::Get, url).build()?;
    let target = Target {
        resource: kind.remote_name(),
        id: None,
    };
    let (connection, _) = perform(
        client,
        request,
        Delivery::INTERNAL,
        &target,
        Some(LocalHandler::Standard),
    )
    .await?;

    let data = connection.response().map(HttpResponse::data).unwrap_or_default();
    let children: Vec<ObjectRef> = data
        .iter()
        .map(|map| {
            let child = kind.instantiate();
            {
                let mut guard = child.write();
                let report = guard.from_wire(map);
                if !report.is_clean() {
                    warn!(
                        resource = kind.remote_name(),
                        rejected = ?report.rejected,
                        "Child merged with rejected values"
                    );
                }
                guard.base_mut().parent = Some(owner.downgrade());
            }
            child
        })
        .collect();

    owner
        .write()
        .base_mut()
        .children
        .insert(kind.remote_name().to_string(), children.clone());
    Ok(children)
}

/// Fetches, then deletes, every declared child collection of `owner`.
fn delete_children_of<'a>(
    owner: &'a ObjectRef,
    client: &'a RestClient,
) -> Pin<Box<dyn Future<Output = CascadeReport> + Send + 'a>> {
    Box::pin(async move {
        let mut report = CascadeReport::default();
        let kinds = owner.read().child_kinds();

        for kind in kinds {
            match fetch_children_of(owner, client, kind).await {
                Ok(children) => {
                    report.fetched += children.len();
                    for child in &children {
                        match delete_object(child, client).await {
                            Ok(()) => report.deleted += 1,
                            Err(error) => {
                                warn!(
                                    resource = kind.remote_name(),
                                    id = ?child.read().base().id,
                                    error = %error,
                                    "Failed to delete child"
                                );
                                report.failures.push(error);
                            }
                        }
                    }
                }
                Err(error) => {
                    warn!(
                        resource = kind.remote_name(),
                        error = %error,
                        "Failed to fetch children"
                    );
                    report.failures.push(error);
                }
            }
            owner.write().base_mut().children.clear(kind.remote_name());
        }

        report
    })
}

/// Sends `request` in the background; nothing is reported back.
///
/// The outcome is only logged.
pub fn send_detached(client: &RestClient, request: HttpRequest) -> JoinHandle<()> {
    let client = client.clone();
    tokio::spawn(async move {
        let target = Target {
            resource: "request",
            id: None,
        };
        let delivery = Delivery {
            mode: ConnectionMode::Async,
            has_remote_callback: false,
        };
        if let Err(error) = perform(&client, request, delivery, &target, None).await {
            warn!(error = %error, "Detached request failed");
        }
    })
}

impl<T> Handle<T>
where
    T: RestObject + ?Sized,
    Self: AsObjectRef,
{
    /// Retrieves the resource and merges the response into it.
    ///
    /// The merge is lenient: unknown keys are ignored and mistyped values
    /// are skipped; see [`Completion::merge`].
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingId`] if the resource has no id.
    /// Transport failures and non-success responses are returned (sync) or
    /// passed to the callback (async).
    pub async fn fetch(
        &self,
        client: &RestClient,
        mode: Mode<Self>,
    ) -> Result<Outcome<Self>, ResourceError> {
        let (target, url) = persisted(&*self.read(), client, "fetch")?;
        let request = HttpRequest::builder(HttpMethod::Get, url).build()?;
        let handler = LocalHandler::MergeInto(self.as_object());
        dispatch(client, request, target, handler, mode, self.clone()).await
    }

    /// Sends the exposed attributes of the resource to the server.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingId`] if the resource has no id; create
    /// resources through their parent's [`Handle::add_child_entity`].
    pub async fn save(
        &self,
        client: &RestClient,
        mode: Mode<Self>,
    ) -> Result<Outcome<Self>, ResourceError> {
        let (target, url, body) = {
            let guard = self.read();
            let (target, url) = persisted(&*guard, client, "save")?;
            (target, url, Value::Object(guard.to_wire()))
        };
        let request = HttpRequest::builder(HttpMethod::Put, url).body(body).build()?;
        dispatch(client, request, target, LocalHandler::Standard, mode, self.clone()).await
    }

    /// Deletes the resource.
    ///
    /// If the type cascades deletes, every declared child collection is
    /// fetched and its members deleted first. `response_choice` answers a
    /// previous [`ResourceError::ChoiceRequired`].
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingId`] if the resource has no id.
    pub async fn delete(
        &self,
        client: &RestClient,
        mode: Mode<Self>,
        response_choice: Option<i64>,
    ) -> Result<Outcome<Self>, ResourceError> {
        let this = self.as_object();
        let cascades = {
            let guard = this.read();
            persisted(&*guard, client, "delete")?;
            guard.cascades_delete()
        };

        let client = client.clone();
        let delivery = mode.delivery();
        let entity = self.clone();
        let work = async move {
            if cascades {
                log_cascade(&this, &delete_children_of(&this, &client).await);
            }
            let connection = send_delete(&this, &client, response_choice, delivery).await?;
            Ok(Completion {
                entity,
                connection,
                merge: None,
            })
        };
        drive(mode, work).await
    }

    /// Fetches and deletes the members of every declared child collection.
    pub async fn delete_children(&self, client: &RestClient) -> CascadeReport {
        let this = self.as_object();
        delete_children_of(&this, client).await
    }

    /// Fetches the child collection stored under `key` and registers it.
    ///
    /// Each returned child has its parent set to this resource.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnknownChildCollection`] if the type declares
    /// no such collection, or [`ResourceError::MissingId`] if the resource has
    /// no id.
    pub async fn fetch_children(
        &self,
        client: &RestClient,
        key: &str,
    ) -> Result<Vec<ObjectRef>, ResourceError> {
        let this = self.as_object();
        let kinds = this.read().child_kinds();
        let Some(kind) = kinds.iter().find(|kind| kind.remote_name() == key) else {
            return Err(ResourceError::UnknownChildCollection {
                resource: this.read().remote_name(),
                key: key.to_string(),
            });
        };
        fetch_children_of(&this, client, kind).await
    }

    /// Creates `entity` on the server as a child of this resource.
    ///
    /// The response is merged back into `entity`, which gains its
    /// server-assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingId`] if this resource has no id.
    pub async fn add_child_entity<E: AsObjectRef>(
        &self,
        entity: &E,
        client: &RestClient,
        mode: Mode<E>,
    ) -> Result<Outcome<E>, ResourceError> {
        let child = entity.as_object();
        let (resource, child_name, body) = {
            let guard = child.read();
            (
                guard.remote_name(),
                guard.resource_name(),
                Value::Object(guard.to_wire()),
            )
        };
        let (_, parent_url) = persisted(&*self.read(), client, "add a child to")?;

        let url = naming::collection_url(&parent_url, &child_name);
        let request = HttpRequest::builder(HttpMethod::Post, url).body(body).build()?;
        let target = Target { resource, id: None };
        let handler = LocalHandler::MergeInto(child);
        dispatch(client, request, target, handler, mode, entity.clone()).await
    }

    /// Creates `entity` from `template` as a child of this resource.
    ///
    /// Same as [`Handle::add_child_entity`] after setting the entity's
    /// `template_id` to the template's id.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingId`] if this resource or the template
    /// has no id.
    pub async fn instantiate_child_entity<E: AsObjectRef>(
        &self,
        entity: &E,
        template: &impl AsObjectRef,
        client: &RestClient,
        mode: Mode<E>,
    ) -> Result<Outcome<E>, ResourceError> {
        let template = template.as_object();
        let template_id = template.read().base().id.clone();
        let Some(template_id) = template_id else {
            return Err(ResourceError::MissingId {
                resource: template.read().remote_name(),
                operation: "instantiate from",
            });
        };
        entity.as_object().write().base_mut().template_id = Some(template_id);
        self.add_child_entity(entity, client, mode).await
    }

    /// Deletes `entity`, after deleting its own children.
    ///
    /// The children are deleted whether or not the entity's type cascades.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingId`] if the entity has no id.
    pub async fn remove_child_entity<E: AsObjectRef>(
        &self,
        entity: &E,
        client: &RestClient,
        mode: Mode<E>,
        response_choice: Option<i64>,
    ) -> Result<Outcome<E>, ResourceError> {
        let child = entity.as_object();
        persisted(&*child.read(), client, "remove")?;

        let client = client.clone();
        let delivery = mode.delivery();
        let entity = entity.clone();
        let work = async move {
            log_cascade(&child, &delete_children_of(&child, &client).await);
            let connection = send_delete(&child, &client, response_choice, delivery).await?;
            Ok(Completion {
                entity,
                connection,
                merge: None,
            })
        };
        drive(mode, work).await
    }

    /// Replaces the members of the `kind` association of this resource with
    /// `entities`.
    ///
    /// The ids are sent as one list; the server replaces the whole set.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingId`] if this resource or any of the
    /// entities has no id.
    pub async fn set_entities(
        &self,
        entities: Vec<ObjectRef>,
        kind: &ChildKind,
        client: &RestClient,
        mode: Mode<Vec<ObjectRef>>,
    ) -> Result<Outcome<Vec<ObjectRef>>, ResourceError> {
        let url = {
            let guard = self.read();
            persisted(&*guard, client, "set entities on")?;
            guard.resource_url_for_child(&client.base_url(), kind)
        };

        let ids = entities
            .iter()
            .map(|entity| {
                entity
                    .read()
                    .base()
                    .id
                    .clone()
                    .map(Value::String)
                    .ok_or(ResourceError::MissingId {
                        resource: kind.remote_name(),
                        operation: "associate",
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let request = HttpRequest::builder(HttpMethod::Put, url)
            .body(Value::Array(ids))
            .build()?;
        let target = Target {
            resource: kind.remote_name(),
            id: None,
        };
        dispatch(client, request, target, LocalHandler::Standard, mode, entities).await
    }
}
