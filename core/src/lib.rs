//! Data layer for the BloodLink administrative dashboard.
//!
//! # Overview
//! Talks to the BloodLink HTTP API and turns its loosely shaped responses
//! into typed domain values or a single `ApiError`. On top of the client sit
//! two reactive primitives the dashboard screens are built from:
//! `ResourceFetcher` for automatically refreshed reads and
//! `MutationExecutor` for explicitly triggered writes.
//!
//! # Design
//! - `ApiClient` splits each call into a pure `build_request`, a
//!   `Transport::execute` and a pure `parse_response`, so all request and
//!   response rules are testable without a network.
//! - The bearer token comes from an injected `SessionStore`; only
//!   `auth().login` and `auth().logout` write it.
//! - Endpoint catalogs (`client.inventory()`, `client.hospitals()`, ...) are
//!   declarative: method, path template and one body type per operation.
//! - Fetcher and mutation state is published on `tokio::sync::watch`
//!   channels; stale fetch results are discarded by generation number.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod mutation;
pub mod normalize;
pub mod session;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ApiError, SessionError};
pub use fetcher::{QueryState, ResourceFetcher};
pub use http::{HttpMethod, HttpRequest, HttpResponse, RequestDescriptor};
pub use mutation::{MutationExecutor, MutationState};
pub use normalize::ResponseEnvelope;
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
pub use transport::{Transport, TransportError, UreqTransport};
