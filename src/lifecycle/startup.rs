//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve the effective configuration (file, then CLI overrides)
//! - Bind the listener
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener binds last, after config is validated

use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{load_config, ConfigError, ListenerConfig, TesterConfig};

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid bind address '{0}'")]
    Address(String),

    #[error("Failed to bind: {0}")]
    Bind(#[from] std::io::Error),
}

/// Load the config file if given, then apply a bind address override.
pub fn resolve_config(
    path: Option<&Path>,
    bind_override: Option<&str>,
) -> Result<TesterConfig, StartupError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => TesterConfig::default(),
    };

    if let Some(bind) = bind_override {
        config.listener.bind_address = bind.to_string();
    }
    Ok(config)
}

/// Bind the configured listener address.
pub async fn bind_listener(config: &ListenerConfig) -> Result<TcpListener, StartupError> {
    let addr: SocketAddr = config
        .bind_address
        .parse()
        .map_err(|_| StartupError::Address(config.bind_address.clone()))?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(address = %listener.local_addr()?, "Listener bound");
    Ok(listener)
}
