//! Layered configuration (§6 "Environment variables").
//!
//! Defaults are compiled in, then merged with a JSON config file at
//! `$HOME/.config/gh-star-search/config.json` (path overridable via
//! `GHSS_CONFIG`), then environment variables prefixed `GHSS_`, then CLI
//! flag overrides applied last by the caller. A figment-based
//! `ConfigLoader`, deliberately not built on the `config` crate.

mod types;

pub use types::{AppConfig, EmbeddingConfig, LoggingConfig, SearchConfig, StoreConfig, SyncConfig};

use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized};
use std::env;
use std::path::{Path, PathBuf};

use ghss_domain::error::{Error, Result};

const DEFAULT_CONFIG_DIR: &str = "gh-star-search";
const DEFAULT_CONFIG_FILENAME: &str = "config.json";
const CONFIG_ENV_PREFIX: &str = "GHSS";

/// Loads an [`AppConfig`] from defaults, an optional config file, and
/// environment variables, in that precedence order.
#[derive(Clone, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// A loader that resolves the config path from `GHSS_CONFIG` or the
    /// default XDG location.
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Force a specific config file path (e.g. from a CLI `--config` flag).
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load configuration from all sources, in increasing precedence:
    /// defaults → config file → `GHSS_`-prefixed environment variables.
    /// CLI flag overrides are applied by the caller on top of the result.
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        if let Some(path) = self.resolve_config_path() {
            if path.exists() {
                figment = figment.merge(Json::file(&path));
            }
        }

        figment = figment.merge(Env::prefixed(&format!("{CONFIG_ENV_PREFIX}_")).split("_"));

        figment
            .extract()
            .map_err(|err| Error::config(format!("failed to load configuration: {err}")))
    }

    /// Resolve the config file path: explicit path, then `GHSS_CONFIG`,
    /// then the default `$HOME/.config/gh-star-search/config.json`.
    fn resolve_config_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_path {
            return Some(path.clone());
        }
        if let Ok(path) = env::var(format!("{CONFIG_ENV_PREFIX}_CONFIG")) {
            return Some(PathBuf::from(path));
        }
        dirs::home_dir().map(|home| {
            home.join(".config")
                .join(DEFAULT_CONFIG_DIR)
                .join(DEFAULT_CONFIG_FILENAME)
        })
    }
}
