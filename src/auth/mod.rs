//! Authentication types for the REST resource SDK.
//!
//! # Overview
//!
//! - [`Session`]: The login state every resource URL and request header is derived from
//! - [`CurrentUser`]: The user ownership checks are evaluated against
//!
//! Neither type is global. A [`RestClient`](crate::RestClient) is built from a
//! session and optionally given a current user; every operation receives the
//! client explicitly.

pub mod session;
mod user;

pub use session::Session;
pub use user::CurrentUser;
