//! Shared fixtures for the integration tests.
//!
//! Provides a small resource model (enterprise → domain → zone, enterprise
//! → group/user) and a [`RecordingTransport`] that answers requests through
//! a routing closure and remembers everything it was asked to send.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use rest_resource::clients::{
    HttpError, HttpMethod, HttpRequest, HttpResponse, TimeoutError, Transport, TransportFuture,
};
use rest_resource::rest::{Attribute, AttributeRegistry, ChildKind, Entity, HasObjectBase, ObjectBase};
use rest_resource::{ApiKey, BaseUrl, RestClient, RestConfig, Session, Username};
use serde_json::Value;

pub const HOST: &str = "https://vsd.example.com";
pub const BASE: &str = "https://vsd.example.com/nuage/api/v6_0";

// ============================================================================
// Resource Fixtures
// ============================================================================

macro_rules! has_base {
    ($name:ident) => {
        impl HasObjectBase for $name {
            fn base(&self) -> &ObjectBase {
                &self.base
            }

            fn base_mut(&mut self) -> &mut ObjectBase {
                &mut self.base
            }
        }
    };
}

#[derive(Debug, Default)]
pub struct Enterprise {
    pub base: ObjectBase,
    pub name: Option<String>,
}

has_base!(Enterprise);

impl Entity for Enterprise {
    const REMOTE_NAME: &'static str = "enterprise";
    const CHILDREN: &'static [ChildKind] = &[ChildKind::of::<Group>(), ChildKind::of::<User>()];

    fn registry() -> &'static AttributeRegistry<Self> {
        static REGISTRY: OnceLock<AttributeRegistry<Enterprise>> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            AttributeRegistry::builder()
                .expose(
                    Attribute::new("name", |e: &Enterprise| &e.name, |e| &mut e.name)
                        .required()
                        .max_length(255),
                )
                .build()
        })
    }
}

#[derive(Debug, Default)]
pub struct Group {
    pub base: ObjectBase,
    pub name: Option<String>,
    pub private: Option<bool>,
    pub member_count: Option<i64>,
}

has_base!(Group);

impl Entity for Group {
    const REMOTE_NAME: &'static str = "group";

    fn registry() -> &'static AttributeRegistry<Self> {
        static REGISTRY: OnceLock<AttributeRegistry<Group>> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            AttributeRegistry::builder()
                .expose_template_id()
                .expose(Attribute::new("name", |g: &Group| &g.name, |g| &mut g.name).required())
                .expose(Attribute::new("private", |g: &Group| &g.private, |g| &mut g.private))
                .expose(
                    Attribute::new(
                        "member_count",
                        |g: &Group| &g.member_count,
                        |g| &mut g.member_count,
                    )
                    .remote_name("memberCount"),
                )
                .build()
        })
    }
}

#[derive(Debug, Default)]
pub struct User {
    pub base: ObjectBase,
    pub user_name: Option<String>,
    pub email: Option<String>,
}

has_base!(User);

impl Entity for User {
    const REMOTE_NAME: &'static str = "user";

    fn registry() -> &'static AttributeRegistry<Self> {
        static REGISTRY: OnceLock<AttributeRegistry<User>> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            AttributeRegistry::builder()
                .expose(
                    Attribute::new("user_name", |u: &User| &u.user_name, |u| &mut u.user_name)
                        .remote_name("userName")
                        .required()
                        .login(),
                )
                .expose(Attribute::new("email", |u: &User| &u.email, |u| &mut u.email).email())
                .build()
        })
    }
}

/// Does not cascade deletes.
#[derive(Debug, Default)]
pub struct Domain {
    pub base: ObjectBase,
}

has_base!(Domain);

impl Entity for Domain {
    const REMOTE_NAME: &'static str = "domain";
    const CASCADE_DELETE: bool = false;
    const CHILDREN: &'static [ChildKind] = &[ChildKind::of::<Zone>()];

    fn registry() -> &'static AttributeRegistry<Self> {
        static REGISTRY: OnceLock<AttributeRegistry<Domain>> = OnceLock::new();
        REGISTRY.get_or_init(|| AttributeRegistry::builder().build())
    }
}

#[derive(Debug, Default)]
pub struct Zone {
    pub base: ObjectBase,
}

has_base!(Zone);

impl Entity for Zone {
    const REMOTE_NAME: &'static str = "zone";

    fn registry() -> &'static AttributeRegistry<Self> {
        static REGISTRY: OnceLock<AttributeRegistry<Zone>> = OnceLock::new();
        REGISTRY.get_or_init(|| AttributeRegistry::builder().build())
    }
}

macro_rules! bare_entity {
    ($name:ident, $remote:literal) => {
        #[derive(Debug, Default)]
        pub struct $name {
            pub base: ObjectBase,
        }

        has_base!($name);

        impl Entity for $name {
            const REMOTE_NAME: &'static str = $remote;

            fn registry() -> &'static AttributeRegistry<Self> {
                static REGISTRY: OnceLock<AttributeRegistry<$name>> = OnceLock::new();
                REGISTRY.get_or_init(|| AttributeRegistry::builder().build())
            }
        }
    };
}

bare_entity!(Policy, "policy");
bare_entity!(Gateway, "gateway");
bare_entity!(Bus, "bus");

/// A resource whose collection name is not pluralized.
#[derive(Debug, Default)]
pub struct Metadata {
    pub base: ObjectBase,
}

has_base!(Metadata);

impl Entity for Metadata {
    const REMOTE_NAME: &'static str = "metadata";
    const RESOURCE_NAME_FIXED: bool = true;

    fn registry() -> &'static AttributeRegistry<Self> {
        static REGISTRY: OnceLock<AttributeRegistry<Metadata>> = OnceLock::new();
        REGISTRY.get_or_init(|| AttributeRegistry::builder().expose_external_id().build())
    }
}

// ============================================================================
// Recording Transport
// ============================================================================

type Router = dyn Fn(&HttpRequest) -> Result<HttpResponse, HttpError> + Send + Sync;

/// A transport that answers through a closure and records every request.
pub struct RecordingTransport {
    router: Box<Router>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingTransport {
    pub fn new(
        router: impl Fn(&HttpRequest) -> Result<HttpResponse, HttpError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            router: Box::new(router),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Answers every request with `200 []`.
    pub fn ok() -> Arc<Self> {
        Self::new(|_| json(200, Value::Array(Vec::new())))
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Returns `"METHOD url?query"` for every recorded request, in order.
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|request| format!("{} {}", request.http_method, request.full_url()))
            .collect()
    }
}

impl fmt::Debug for RecordingTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingTransport")
            .field("requests", &self.requests.lock().unwrap().len())
            .finish_non_exhaustive()
    }
}

impl Transport for RecordingTransport {
    fn send<'a>(&'a self, request: &'a HttpRequest) -> TransportFuture<'a> {
        Box::pin(async move {
            self.requests.lock().unwrap().push(request.clone());
            (self.router)(request)
        })
    }
}

pub fn json(code: u16, body: Value) -> Result<HttpResponse, HttpError> {
    Ok(HttpResponse::new(code, HashMap::new(), body))
}

pub fn no_content() -> Result<HttpResponse, HttpError> {
    Ok(HttpResponse::new(204, HashMap::new(), Value::Null))
}

pub fn timed_out(request: &HttpRequest) -> Result<HttpResponse, HttpError> {
    Err(HttpError::Timeout(TimeoutError {
        url: request.full_url(),
        after: Duration::from_secs(60),
    }))
}

/// Returns the path of `request` relative to [`BASE`], prefixed with the method.
pub fn route(request: &HttpRequest) -> (HttpMethod, String) {
    let path = request.url.strip_prefix(BASE).unwrap_or(&request.url);
    (request.http_method, path.to_string())
}

// ============================================================================
// Client Fixtures
// ============================================================================

pub fn session_for(host: &str) -> Session {
    let config = RestConfig::builder()
        .base_url(BaseUrl::new(host).unwrap())
        .api_prefix("nuage/api")
        .api_version("6.0".parse().unwrap())
        .build()
        .unwrap();
    Session::new(
        Username::new("csproot").unwrap(),
        ApiKey::new("csproot").unwrap(),
        config,
    )
    .with_organization("csp")
}

pub fn client(transport: &Arc<RecordingTransport>) -> RestClient {
    RestClient::with_transport(session_for(HOST), transport.clone())
}
