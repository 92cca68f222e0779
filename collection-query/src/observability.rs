//! Structured logging setup
//!
//! The engine emits `tracing` events: dropped filters and sort keys at
//! `debug`, one summary per executed query at `debug`. Services that do not
//! install their own subscriber can call [`init_tracing`].

use tracing_subscriber::EnvFilter;

use crate::{config::Config, error::Result};

/// Install a JSON `tracing` subscriber filtered by the configured log level
///
/// `log_level` accepts any `EnvFilter` directive (for example
/// `info,collection_query=debug`); an invalid directive falls back to `info`.
///
/// # Errors
///
/// Returns [`Error::Internal`](crate::error::Error::Internal) when a global
/// subscriber is already installed.
pub fn init_tracing(config: &Config) -> Result<()> {
    let log_level = config.service.log_level.as_str();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(build_filter(log_level))
        .try_init()
        .map_err(|e| crate::error::Error::Internal(format!("Failed to install tracing subscriber: {}", e)))?;

    tracing::info!("Tracing initialized for service: {}", config.service.name);

    Ok(())
}

fn build_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"))
}
