//! The REST client resource operations run against.
//!
//! See [`RestClient`].

mod client;

pub use client::RestClient;
