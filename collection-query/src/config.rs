//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: COLLECTION_QUERY_, nested keys split on `__`)
//! 2. Current working directory: ./config.toml
//! 3. XDG config directory: ~/.config/collection-query/{service_name}/config.toml
//! 4. System directory: /etc/collection-query/{service_name}/config.toml
//! 5. Default values
//!
//! # Example
//!
//! ```toml
//! [service]
//! name = "task-api"
//! log_level = "debug"
//!
//! [query]
//! default_page_size = 25
//! max_page_size = 200
//! ```
//!
//! The same page limit from the environment:
//! `COLLECTION_QUERY_QUERY__MAX_PAGE_SIZE=200`.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::query::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Prefix shared by every environment variable override
pub const ENV_PREFIX: &str = "COLLECTION_QUERY_";

const APP_DIR: &str = "collection-query";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    #[serde(default)]
    pub service: ServiceConfig,

    /// Query engine limits
    #[serde(default)]
    pub query: QueryConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name, used in log output and config paths
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Log level or `EnvFilter` directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

/// Paging limits applied by the query engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Page size used when a request does not name one
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Largest page size a request may ask for
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl QueryConfig {
    /// Apply the default and bounds to a requested page size
    ///
    /// # Example
    ///
    /// ```rust
    /// use collection_query::config::QueryConfig;
    ///
    /// let config = QueryConfig { default_page_size: 10, max_page_size: 50 };
    /// assert_eq!(config.clamp_page_size(None), 10);
    /// assert_eq!(config.clamp_page_size(Some(0)), 1);
    /// assert_eq!(config.clamp_page_size(Some(75)), 50);
    /// ```
    #[must_use]
    pub fn clamp_page_size(&self, requested: Option<u32>) -> u32 {
        let max = self.max_page_size.max(1);
        requested.unwrap_or(self.default_page_size).clamp(1, max)
    }
}

// Default value functions
fn default_service_name() -> String {
    APP_DIR.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_max_page_size() -> u32 {
    MAX_PAGE_SIZE
}

impl Config {
    /// Load configuration from all sources
    ///
    /// The service name is taken from the running binary's file name.
    pub fn load() -> Result<Self> {
        let service_name = std::env::current_exe()
            .ok()
            .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(default_service_name);

        Self::load_for_service(&service_name)
    }

    /// Load configuration for a specific service name
    pub fn load_for_service(service_name: &str) -> Result<Self> {
        let config_paths = Self::find_config_paths(service_name);

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut defaults = Config::default();
        defaults.service.name = service_name.to_string();
        let mut figment = Figment::new().merge(Serialized::defaults(defaults));

        // Lowest priority first so later files override earlier ones
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        let config = figment.merge(Self::env()).extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// This bypasses the search path. Environment variables still apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Self::env())
            .extract()?;

        Ok(config)
    }

    fn env() -> Env {
        Env::prefixed(ENV_PREFIX).split("__")
    }

    /// Config file paths for a service, highest priority first
    fn find_config_paths(service_name: &str) -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix(APP_DIR);
        let config_file_path = Path::new(service_name).join("config.toml");
        if let Some(path) = xdg_dirs.find_config_file(&config_file_path) {
            paths.push(path);
        }

        paths.push(
            PathBuf::from("/etc")
                .join(APP_DIR)
                .join(service_name)
                .join("config.toml"),
        );

        paths
    }
}
