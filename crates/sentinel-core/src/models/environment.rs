//! Environment model and its configuration bag.

use std::collections::BTreeMap;

use jiff::Timestamp;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Browser used when an environment does not name one.
pub const DEFAULT_BROWSER: &str = "chromium";

/// Per-action timeout used when an environment does not set one.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Configuration consumed by artifact generation and the execution engine.
///
/// Keys serialize in the upper-case form the execution engine reads
/// (`BASE_URL`, `BROWSER`, ...); unknown keys are kept in `variables`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct EnvironmentConfig {
    #[serde(rename = "BASE_URL", default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(rename = "BROWSER", default = "default_browser")]
    pub browser: String,

    /// Timeout in milliseconds
    #[serde(rename = "TIMEOUT", default = "default_timeout")]
    pub timeout_ms: u64,

    #[serde(rename = "RETRIES", default)]
    pub retries: u32,

    #[serde(rename = "HEADLESS", default = "default_headless")]
    pub headless: bool,

    /// Any further variables passed through to the engine
    #[serde(flatten)]
    pub variables: BTreeMap<String, String>,
}

fn default_browser() -> String {
    DEFAULT_BROWSER.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_headless() -> bool {
    true
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            browser: default_browser(),
            timeout_ms: default_timeout(),
            retries: 0,
            headless: default_headless(),
            variables: BTreeMap::new(),
        }
    }
}

impl EnvironmentConfig {
    /// Default configuration targeting the given base URL.
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Default::default()
        }
    }

    /// Base URL if set and non-blank.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref().filter(|u| !u.trim().is_empty())
    }
}

/// A named, stored environment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Environment {
    /// Unique identifier for the environment
    pub id: u64,

    /// Unique name (e.g. "staging")
    pub name: String,

    /// Configuration bag
    pub config: EnvironmentConfig,

    /// Timestamp when the environment was created (UTC)
    pub created_at: Timestamp,
}
