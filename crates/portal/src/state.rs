//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::PortalConfig;
use crate::platform::PlatformClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PortalConfig,
    pool: PgPool,
    platform: PlatformClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Portal configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: PortalConfig, pool: PgPool) -> Self {
        let platform = PlatformClient::new(&config.platform);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                platform,
            }),
        }
    }

    /// Get a reference to the portal configuration.
    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the platform API client.
    #[must_use]
    pub fn platform(&self) -> &PlatformClient {
        &self.inner.platform
    }
}
