//! Client configuration.
//!
//! Hosts load this from whatever format they use; every key has a default so
//! a partial document is enough.

use serde::{Deserialize, Serialize};

use crate::classify::ErrorMode;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    /// Service root; a trailing slash is ignored.
    pub base_url: String,
    /// Error propagation for calls that do not pick one explicitly.
    pub error_mode: ErrorMode,
    /// Page size used when walking every page of a list.
    pub default_per_page: Option<u32>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            error_mode: ErrorMode::default(),
            default_per_page: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }
}
