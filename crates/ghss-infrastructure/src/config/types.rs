//! Configuration data types: one struct per cross-cutting concern,
//! aggregated into a single root struct.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use ghss_domain::constants::{
    DEFAULT_EMBEDDING_DIMENSIONS, EMBEDDING_FIRST_USE_TIMEOUT_SECS, EMBEDDING_TIMEOUT_SECS,
};

/// The root resolved configuration, produced by [`super::ConfigLoader`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Store (DuckDB file) configuration.
    pub store: StoreConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
    /// Search defaults.
    pub search: SearchConfig,
    /// Embedding/summarizer provider configuration.
    pub embedding: EmbeddingConfig,
    /// Sync pipeline defaults and staleness windows.
    pub sync: SyncConfig,
    /// Enables verbose/debug behavior (e.g. the `config` command's JSON
    /// body, per §6).
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            logging: LoggingConfig::default(),
            search: SearchConfig::default(),
            embedding: EmbeddingConfig::default(),
            sync: SyncConfig::default(),
            debug: false,
        }
    }
}

/// Database file and cache directory configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the DuckDB database file.
    pub database_path: PathBuf,
    /// Directory used for extracted subprocess scripts and other cache
    /// artifacts.
    pub cache_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: base.join("gh-star-search").join("repos.duckdb"),
            cache_dir: dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("gh-star-search"),
        }
    }
}

/// Logging level, format and output destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// JSON-formatted output when `true`, human text otherwise.
    pub json_format: bool,
    /// Optional file path for a daily-rotating file appender, in addition
    /// to stdout.
    pub file_output: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            file_output: None,
        }
    }
}

/// Search-command defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Default result limit when `--limit` is not passed.
    pub default_limit: usize,
    /// Default minimum score for vector-mode searches.
    pub default_min_score: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            default_min_score: 0.0,
        }
    }
}

/// Embedding/summarizer provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Provider runner: `uvx`, `python3`, or an arbitrary command.
    pub provider: String,
    /// Sentence-transformers model name passed to the subprocess.
    pub model: String,
    /// Summarization model name passed to the subprocess.
    pub summary_model: String,
    /// Output embedding dimension.
    pub dimensions: usize,
    /// Wall-clock timeout for a single embed/summarize call.
    pub timeout_secs: u64,
    /// Extended timeout allowed for a first-use model download.
    pub first_use_timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "uvx".to_string(),
            model: "all-MiniLM-L6-v2".to_string(),
            summary_model: "all-MiniLM-L6-v2".to_string(),
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
            timeout_secs: EMBEDDING_TIMEOUT_SECS,
            first_use_timeout_secs: EMBEDDING_FIRST_USE_TIMEOUT_SECS,
        }
    }
}

/// Sync pipeline defaults and refresh staleness windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Default `--batch-size`.
    pub batch_size: usize,
    /// Remote HTTP call timeout, in seconds.
    pub request_timeout_secs: u64,
    /// Metrics older than this many days are considered stale by
    /// `GetRepositoriesNeedingMetricsUpdate`.
    pub metrics_stale_days: i64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            request_timeout_secs: 30,
            metrics_stale_days: 7,
        }
    }
}
