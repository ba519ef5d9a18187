//! Configuration data structures for wikipath.
//!
//! Defines the YAML config format: API endpoint settings, storage location,
//! and search limits. Every field has a default so a partial file (or no
//! file at all) is valid.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for wikipath.
///
/// Loaded from YAML, environment variables, and CLI flags, merged with
/// increasing priority in that order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WikiPathConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

// ---------------------------------------------------------------------------
// ApiConfig
// ---------------------------------------------------------------------------

/// Remote MediaWiki endpoint and HTTP client behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Full URL of the wiki's `api.php`.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Contact string the API asks clients to identify themselves with.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries for transient failures (network errors and 5xx).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

// ---------------------------------------------------------------------------
// StorageConfig
// ---------------------------------------------------------------------------

/// Where the link cache lives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite file path. `None` means the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// SearchConfig
// ---------------------------------------------------------------------------

/// Limits and parallelism for the bidirectional search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Give up after this many expansion rounds. `null` searches until a
    /// frontier is exhausted.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: Option<u32>,

    /// Give up once this many nodes have been fetched from the API.
    #[serde(default)]
    pub max_fetches: Option<u64>,

    /// Worker threads for per-node expansion; 0 uses the rayon default.
    #[serde(default)]
    pub threads: usize,

    /// Wall-clock budget, checked between rounds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
            max_fetches: None,
            threads: 0,
            timeout_secs: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_endpoint() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

fn default_user_agent() -> String {
    concat!("wikipath/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

fn default_max_rounds() -> Option<u32> {
    Some(8)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
