//! # REST Resource SDK
//!
//! A Rust SDK core for REST APIs that model their data as typed resources
//! linked by parent/child relationships.
//!
//! ## Overview
//!
//! This SDK provides:
//! - Type-safe configuration via [`RestConfig`] and [`RestConfigBuilder`]
//! - Validated newtypes for credentials and endpoint values
//! - Session management with Basic authentication
//! - An async HTTP transport built on `reqwest`, replaceable through
//!   [`clients::Transport`]
//! - Declarative attribute exposure with static per-type registries
//! - Wire serialization that tolerates unknown keys and reports mistyped values
//! - A parent/child resource graph with weak parent links
//! - CRUD and child management operations usable in blocking or callback style
//!
//! ## Quick Start
//!
//! ```rust
//! use rest_resource::{ApiKey, BaseUrl, RestConfig, Session, Username};
//!
//! let config = RestConfig::builder()
//!     .base_url(BaseUrl::new("https://vsd.example.com:8443").unwrap())
//!     .api_prefix("nuage/api")
//!     .api_version("6.0".parse().unwrap())
//!     .build()
//!     .unwrap();
//!
//! let session = Session::new(
//!     Username::new("csproot").unwrap(),
//!     ApiKey::new("csproot").unwrap(),
//!     config,
//! )
//! .with_organization("csp");
//!
//! assert_eq!(session.base_url(), "https://vsd.example.com:8443/nuage/api/v6_0");
//! ```
//!
//! ## Working with Resources
//!
//! ```rust,ignore
//! use rest_resource::{CurrentUser, RestClient};
//! use rest_resource::rest::{Handle, Mode};
//!
//! let client = RestClient::new(session)?
//!     .with_current_user(CurrentUser::new("u-1", "csproot"));
//!
//! let enterprise = Handle::new(Enterprise::default());
//! enterprise.write().base_mut().id = Some("e-1".to_string());
//!
//! // Blocking style
//! let completion = enterprise.fetch(&client, Mode::Sync).await?.into_completion();
//!
//! // Callback style
//! enterprise
//!     .save(&client, Mode::callback(|result| match result {
//!         Ok(completion) => println!("saved with {}", completion.connection.request().url),
//!         Err(error) => eprintln!("save failed: {error}"),
//!     }))
//!     .await?;
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration and the current user are passed explicitly
//! - **Fail-fast validation**: All newtypes validate on construction
//! - **Thread-safe**: All types are `Send + Sync`
//! - **Async-first**: Designed for use with Tokio async runtime
//! - **Typed failures**: Timeouts and error responses surface as [`rest::ResourceError`]

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod rest;

// Re-export public types at crate root for convenience
pub use auth::{CurrentUser, Session};
pub use config::{ApiKey, ApiVersion, BaseUrl, RestConfig, RestConfigBuilder, Username};
pub use error::ConfigError;

// Re-export HTTP client types
pub use clients::{
    Connection, ConnectionMode, HttpClient, HttpError, HttpMethod, HttpRequest,
    HttpRequestBuilder, HttpResponse, HttpResponseError, InvalidHttpRequestError, RestClient,
    TimeoutError, WireMap,
};

// Re-export resource types
pub use rest::{
    Entity, Handle, HasObjectBase, Mode, ObjectBase, ObjectRef, Outcome, ResourceError,
    RestObject,
};
