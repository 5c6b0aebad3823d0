//! Turning a transport outcome into a success reply or a typed error.
//!
//! # Design
//! `classify` is mode-agnostic: it always yields an `Outcome` value, with API
//! and transport failures carried as `Outcome::Failure`. Whether a failure is
//! then handed to the caller as data or raised as `Err` is decided per call by
//! `Outcome::deliver` with an `ErrorMode`. Malformed success bodies are local
//! faults and are always `Err`, whatever the mode.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::envelope::Payload;
use crate::error::{ApiError, Error, MalformedRecordError, TransportError, TypedError};
use crate::http::TransportOutcome;

/// How API and transport failures reach the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// Failures come back as `Err(Error::Api | Error::Transport)`.
    #[default]
    Raise,
    /// Failures come back as `Ok(Outcome::Failure(..))`.
    Value,
}

impl ErrorMode {
    /// Map a "return errors as values" flag to a mode.
    pub fn from_flag(return_errors: bool) -> Self {
        if return_errors {
            ErrorMode::Value
        } else {
            ErrorMode::Raise
        }
    }
}

/// A successful reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    Content(T),
    /// 202/204: the service accepted the call and sent no body.
    Empty,
}

impl<T> Reply<T> {
    pub fn content(&self) -> Option<&T> {
        match self {
            Reply::Content(content) => Some(content),
            Reply::Empty => None,
        }
    }

    pub fn into_content(self) -> Option<T> {
        match self {
            Reply::Content(content) => Some(content),
            Reply::Empty => None,
        }
    }
}

impl<T: Payload> Reply<T> {
    /// The empty reply serializes to `""`, never `null`.
    pub fn to_json(&self) -> Value {
        match self {
            Reply::Content(content) => content.to_json(),
            Reply::Empty => Value::String(String::new()),
        }
    }
}

/// Discriminated result of one call.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(Reply<T>),
    Failure(TypedError),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn failure(&self) -> Option<&TypedError> {
        match self {
            Outcome::Failure(e) => Some(e),
            Outcome::Success(_) => None,
        }
    }

    pub fn reply(&self) -> Option<&Reply<T>> {
        match self {
            Outcome::Success(reply) => Some(reply),
            Outcome::Failure(_) => None,
        }
    }

    /// Raise failures as `Err`.
    pub fn into_result(self) -> Result<Reply<T>, Error> {
        match self {
            Outcome::Success(reply) => Ok(reply),
            Outcome::Failure(e) => Err(e.into()),
        }
    }

    /// Apply the caller's error mode: `Value` passes the outcome through,
    /// `Raise` turns a failure into `Err`.
    pub fn deliver(self, mode: ErrorMode) -> Result<Self, Error> {
        match mode {
            ErrorMode::Value => Ok(self),
            ErrorMode::Raise => self.into_result().map(Outcome::Success),
        }
    }
}

impl<T: Payload> Outcome<T> {
    pub fn to_json(&self) -> Value {
        match self {
            Outcome::Success(reply) => reply.to_json(),
            Outcome::Failure(e) => e.to_json(),
        }
    }
}

/// Classify one transport outcome for the request sent to `url`.
///
/// - no response: `Outcome::Failure(TypedError::Transport)`
/// - 202 and 204: `Reply::Empty`
/// - other 2xx: the JSON body is handed to `hydrate`
/// - anything else: `Outcome::Failure(TypedError::Api)`
pub fn classify<T, F>(outcome: &TransportOutcome, url: &str, hydrate: F) -> Result<Outcome<T>, Error>
where
    F: FnOnce(&Value) -> Result<T, MalformedRecordError>,
{
    let response = match outcome {
        TransportOutcome::Received(response) => response,
        TransportOutcome::Failed { reason } => {
            warn!(url, reason = reason.as_str(), "no response from the API");
            return Ok(Outcome::Failure(TypedError::Transport(TransportError {
                reason: reason.clone(),
                url: url.to_string(),
            })));
        }
    };

    debug!(status = response.status, url, "classifying response");
    match response.status {
        202 | 204 => Ok(Outcome::Success(Reply::Empty)),
        200..=299 => {
            if response.body.trim().is_empty() {
                return Err(Error::Deserialization(format!(
                    "empty body with status {}",
                    response.status
                )));
            }
            let body: Value =
                serde_json::from_str(&response.body).map_err(|e| Error::Deserialization(e.to_string()))?;
            let content = hydrate(&body).inspect_err(|e| warn!(url, error = %e, "malformed response record"))?;
            Ok(Outcome::Success(Reply::Content(content)))
        }
        status => {
            let error = api_error(status, &response.body, url);
            warn!(status, url, message = error.message.as_str(), "API reported a failure");
            Ok(Outcome::Failure(TypedError::Api(error)))
        }
    }
}

/// Build an `ApiError` from a failure body shaped like `{status, error}`.
fn api_error(status: u16, body: &str, url: &str) -> ApiError {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let object = parsed.as_ref().and_then(Value::as_object);

    let message = object
        .and_then(|o| o.get("error").or_else(|| o.get("message")))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| match body.trim() {
            "" => "no response body".to_string(),
            text => text.to_string(),
        });

    let error = ApiError::new(status, message).with_url(url);
    match object.and_then(|o| o.get("details")) {
        Some(details) if !details.is_null() => error.with_cause(details.clone()),
        _ => error,
    }
}
