//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The core
//! crate builds `HttpRequest` values and classifies `TransportOutcome`
//! values without ever touching the network; connection handling, auth
//! headers and retries belong to whoever implements `RequestExecutor`.
//!
//! All fields use owned types (`String`, `Vec`) so values can be moved across
//! threads and into any HTTP library without lifetime concerns.

use url::form_urlencoded;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by `PublicApiClient::build_*` methods. The caller executes it and
/// hands the `TransportOutcome` back to a `parse_*` method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL without the query string.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Full URL with the query string percent-encoded.
    pub fn url(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        format!("{}?{query}", self.path)
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}

/// What the transport produced for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportOutcome {
    Received(HttpResponse),
    /// No response reached us (connection refused, DNS, timeout...).
    Failed { reason: String },
}

impl From<HttpResponse> for TransportOutcome {
    fn from(response: HttpResponse) -> Self {
        TransportOutcome::Received(response)
    }
}

/// The injected transport capability.
///
/// Implementations own connections, authentication and retries. They must
/// report "no response" as `TransportOutcome::Failed` and every status code,
/// success or not, as `TransportOutcome::Received`.
pub trait RequestExecutor {
    fn execute(&self, request: &HttpRequest) -> TransportOutcome;
}

impl<F> RequestExecutor for F
where
    F: Fn(&HttpRequest) -> TransportOutcome,
{
    fn execute(&self, request: &HttpRequest) -> TransportOutcome {
        self(request)
    }
}
