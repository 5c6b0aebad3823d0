//! Stateless HTTP request builder and response parser for the public API.
//!
//! # Design
//! `PublicApiClient` holds only its configuration and carries no mutable
//! state between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes the
//! `TransportOutcome`. The caller executes the HTTP round-trip (or hands a
//! `RequestExecutor` to `send`), keeping the core deterministic and free of
//! I/O dependencies. Resource clients in `resources` are thin wrappers that
//! pick paths and schemas.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::classify::{classify, ErrorMode, Outcome};
use crate::config::ClientConfig;
use crate::entity::Entity;
use crate::envelope::{hydrate, Data, PayloadShape, ResultEnvelope};
use crate::error::{Error, MalformedRecordError};
use crate::http::{HttpMethod, HttpRequest, RequestExecutor, TransportOutcome};
use crate::pagination::{resolve_page, Paging};
use crate::schema::Schema;

/// Upper bound on pages walked by `fetch_all`.
pub const MAX_PAGES: usize = 1_000;

/// Synchronous, stateless client for the public API.
#[derive(Debug, Clone)]
pub struct PublicApiClient {
    base_url: String,
    config: ClientConfig,
}

impl PublicApiClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_config(ClientConfig::new(base_url))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            config,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn error_mode(&self) -> ErrorMode {
        self.config.error_mode
    }

    /// A copy of this client that delivers failures with `mode`; use it for a
    /// single call to override the configured default.
    pub fn with_error_mode(&self, mode: ErrorMode) -> Self {
        let mut client = self.clone();
        client.config.error_mode = mode;
        client
    }

    pub fn build_get(&self, path: &str, paging: &Paging) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.url(path),
            query: resolve_page(paging),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<HttpRequest, Error> {
        self.build_with_body(HttpMethod::Post, path, body)
    }

    pub fn build_patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<HttpRequest, Error> {
        self.build_with_body(HttpMethod::Patch, path, body)
    }

    pub fn build_delete(&self, path: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.url(path),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_single(
        &self,
        request: &HttpRequest,
        outcome: &TransportOutcome,
        schema: &'static Schema,
    ) -> Result<Outcome<ResultEnvelope<Entity>>, Error> {
        self.parse(request, outcome, |body| ResultEnvelope::single(body, schema))
    }

    pub fn parse_list(
        &self,
        request: &HttpRequest,
        outcome: &TransportOutcome,
        schema: &'static Schema,
    ) -> Result<Outcome<ResultEnvelope<Vec<Entity>>>, Error> {
        self.parse(request, outcome, |body| ResultEnvelope::list(body, schema))
    }

    pub fn parse_raw(
        &self,
        request: &HttpRequest,
        outcome: &TransportOutcome,
    ) -> Result<Outcome<ResultEnvelope<Value>>, Error> {
        self.parse(request, outcome, ResultEnvelope::raw)
    }

    pub fn parse_shape(
        &self,
        request: &HttpRequest,
        outcome: &TransportOutcome,
        shape: PayloadShape,
    ) -> Result<Outcome<ResultEnvelope<Data>>, Error> {
        self.parse(request, outcome, |body| hydrate(body, shape))
    }

    /// For endpoints answering 202/204. An unexpected body is kept verbatim.
    pub fn parse_empty(&self, request: &HttpRequest, outcome: &TransportOutcome) -> Result<Outcome<Value>, Error> {
        self.parse(request, outcome, |body| Ok(body.clone()))
    }

    /// Run one request through the host's transport.
    pub fn send<E: RequestExecutor + ?Sized>(&self, executor: &E, request: &HttpRequest) -> TransportOutcome {
        debug!(method = request.method.as_str(), url = %request.url(), "sending request");
        executor.execute(request)
    }

    /// Walk every page of a list endpoint and collect its records.
    ///
    /// Failures are always raised here, whatever the configured mode, since a
    /// partial collection cannot be returned as a value. A page or cursor
    /// announced twice, or more than `MAX_PAGES` pages, is an
    /// `Error::Pagination`.
    pub fn fetch_all<E: RequestExecutor + ?Sized>(
        &self,
        executor: &E,
        path: &str,
        schema: &'static Schema,
    ) -> Result<Vec<Entity>, Error> {
        let mut paging = match self.config.default_per_page {
            Some(per_page) => Paging::page(1, per_page)?,
            None => Paging::Default,
        };
        let mut requested = HashSet::new();
        let mut records = Vec::new();

        for _ in 0..MAX_PAGES {
            if !requested.insert(paging.clone()) {
                warn!(path, ?paging, "server announced a page that was already fetched");
                return Err(Error::Pagination(format!("{path} announced {paging:?} twice")));
            }

            let request = self.build_get(path, &paging);
            let outcome = self.send(executor, &request);
            let reply = classify(&outcome, &request.path, |body| ResultEnvelope::list(body, schema))?
                .into_result()?;
            let Some(envelope) = reply.into_content() else {
                return Ok(records);
            };

            let state = envelope.paging(&paging);
            records.extend(envelope.into_data());
            match state.next {
                Some(next) => paging = next,
                None => return Ok(records),
            }
        }

        warn!(path, pages = MAX_PAGES, "stopped walking pages at the limit");
        Err(Error::Pagination(format!("{path} still had pages after {MAX_PAGES} requests")))
    }

    fn parse<T, F>(&self, request: &HttpRequest, outcome: &TransportOutcome, hydrate: F) -> Result<Outcome<T>, Error>
    where
        F: FnOnce(&Value) -> Result<T, MalformedRecordError>,
    {
        classify(outcome, &request.path, hydrate)?.deliver(self.config.error_mode)
    }

    fn build_with_body<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> Result<HttpRequest, Error> {
        let body = serde_json::to_string(body).map_err(|e| Error::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path: self.url(path),
            query: Vec::new(),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
