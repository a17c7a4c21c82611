//! Configuration check command.
//!
//! Loads the portal configuration exactly the way the server does at boot, so
//! a bad deploy can be caught from a shell before restarting the portal.
//!
//! # Usage
//!
//! ```bash
//! pn-cli check-config
//! ```

use thiserror::Error;

use pharmanet_portal::config::{ConfigError, PortalConfig};

/// Errors that can occur during the config check.
#[derive(Debug, Error)]
pub enum CheckError {
    /// Configuration loading or validation failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Load and validate portal configuration, logging a redacted summary.
///
/// # Errors
///
/// Returns an error if a required variable is missing or malformed, or if a
/// secret fails placeholder and entropy validation.
pub fn check() -> Result<(), CheckError> {
    // `PortalConfig::from_env` loads .env itself
    let config = PortalConfig::from_env()?;

    let sentry = if config.sentry_dsn.is_some() {
        "enabled"
    } else {
        "disabled"
    };

    tracing::info!("Configuration OK");
    tracing::info!("  Bind address: {}", config.socket_addr());
    tracing::info!("  Base URL: {}", config.base_url);
    tracing::info!("  Callback URL: {}", config.callback_url());
    tracing::info!("  Platform API: {}", config.platform.api_url);
    tracing::info!("  Hosted login: {}", config.platform.auth_url);
    tracing::info!("  OAuth client: {}", config.platform.client_id);
    tracing::info!("  Sentry: {sentry}");

    Ok(())
}
