//! Synchronous client core for the multi-domain public API.
//!
//! # Overview
//! Builds `HttpRequest` values and classifies transport outcomes without
//! touching the network (host-does-IO pattern). Success bodies are hydrated
//! into immutable `Entity` records wrapped in a `ResultEnvelope`; failures
//! become a `TypedError` that is returned as a value or raised, per call.
//!
//! # Design
//! - Record layouts are declarative `const Schema` values consumed by one
//!   generic hydration routine; optional fields keep an absent / empty /
//!   present distinction so `to_json` reproduces the wire shape.
//! - `classify` never raises; `Outcome::deliver` applies the caller's
//!   `ErrorMode` at the boundary.
//! - Pagination metadata is read into a `PaginationState`; cursors are opaque.
//! - `PublicApiClient` is stateless apart from its configuration. Resource
//!   clients only choose paths and schemas.

pub mod classify;
pub mod client;
pub mod config;
pub mod entity;
pub mod envelope;
pub mod error;
pub mod http;
pub mod pagination;
pub mod resources;
pub mod schema;

pub use classify::{classify, ErrorMode, Outcome, Reply};
pub use client::PublicApiClient;
pub use config::ClientConfig;
pub use entity::{Entity, Field, FieldValue};
pub use envelope::{hydrate, Data, Payload, PayloadShape, ResultEnvelope};
pub use error::{ApiError, Error, MalformedReason, MalformedRecordError, TransportError, TypedError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, RequestExecutor, TransportOutcome};
pub use pagination::{extract_paging, resolve_page, Metadata, PaginationState, Paging};
pub use schema::{FieldKind, FieldSpec, Presence, Schema};
