//! Error types for the public API client core.
//!
//! # Design
//! Three failure families reach callers:
//! - `MalformedRecordError`: a response body did not match its schema. Local,
//!   never retried, always returned as `Err`.
//! - `ApiError`: the service answered with a non-success status.
//! - `TransportError`: no response was obtained at all.
//!
//! The classifier produces the last two as a `TypedError` value; whether they
//! are handed back as data or raised through `Error` is decided per call (see
//! `classify::ErrorMode`).

use std::fmt;

use serde_json::{json, Value};

/// Why a record failed hydration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MalformedReason {
    #[error("missing required field")]
    MissingField,

    #[error("expected {expected}, found {found}")]
    WrongType {
        expected: &'static str,
        found: &'static str,
    },

    #[error("expected a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("invalid pagination metadata: {0}")]
    InvalidMetadata(String),
}

/// A response record is missing a required field or has a mistyped one.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub struct MalformedRecordError {
    /// Schema name of the top-level record being hydrated.
    pub record: &'static str,
    /// Dotted path to the offending field, empty for the record itself.
    pub path: String,
    /// Element index when the record was one item of a list payload.
    pub index: Option<usize>,
    pub reason: MalformedReason,
}

impl MalformedRecordError {
    pub fn new(record: &'static str, path: impl Into<String>, reason: MalformedReason) -> Self {
        Self {
            record,
            path: path.into(),
            index: None,
            reason,
        }
    }

    /// Prefix the path with the field that contained the failing value.
    pub(crate) fn within(mut self, segment: &str) -> Self {
        self.path = if self.path.is_empty() {
            segment.to_string()
        } else if self.path.starts_with('[') {
            format!("{segment}{}", self.path)
        } else {
            format!("{segment}.{}", self.path)
        };
        self
    }

    pub(crate) fn at_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

impl fmt::Display for MalformedRecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed `{}` record", self.record)?;
        if let Some(index) = self.index {
            write!(f, " at index {index}")?;
        }
        if !self.path.is_empty() {
            write!(f, ", field `{}`", self.path)?;
        }
        write!(f, ": {}", self.reason)
    }
}

/// The service returned a non-success status.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub struct ApiError {
    pub status: u16,
    /// Human-readable message reported by the service.
    pub message: String,
    /// Target URL of the failed request, when known.
    pub url: Option<String>,
    /// Structured detail attached by the service (validation field, etc.).
    pub cause: Option<Value>,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            url: None,
            cause: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_cause(mut self, cause: Value) -> Self {
        self.cause = Some(cause);
        self
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// The `{status, error}` wire shape the service uses for failures.
    pub fn to_json(&self) -> Value {
        json!({ "status": self.status, "error": self.message })
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: status code: {}.", self.status)?;
        if let Some(url) = &self.url {
            write!(f, " URL: {url}")?;
        }
        Ok(())
    }
}

/// No response was obtained from the service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Error: {reason}. URL: {url}")]
pub struct TransportError {
    pub reason: String,
    pub url: String,
}

impl TransportError {
    pub fn to_json(&self) -> Value {
        json!({ "error": self.to_string() })
    }
}

/// A failure reported by the classifier.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypedError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl TypedError {
    /// HTTP status, absent for transport failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            TypedError::Api(e) => Some(e.status),
            TypedError::Transport(_) => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            TypedError::Api(e) => e.message.clone(),
            TypedError::Transport(e) => e.to_string(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            TypedError::Api(e) => e.to_json(),
            TypedError::Transport(e) => e.to_json(),
        }
    }
}

/// Errors returned by the client core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Malformed(#[from] MalformedRecordError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A success response body was not valid JSON.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error("invalid paging: {0}")]
    InvalidPaging(String),

    /// A page walk revisited a page or never reached the last one.
    #[error("pagination did not terminate: {0}")]
    Pagination(String),
}

impl From<TypedError> for Error {
    fn from(e: TypedError) -> Self {
        match e {
            TypedError::Api(e) => Error::Api(e),
            TypedError::Transport(e) => Error::Transport(e),
        }
    }
}
