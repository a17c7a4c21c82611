//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! # Run portal migrations
//! pn-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `PORTAL_DATABASE_URL` - `PostgreSQL` connection string for the portal
//!   (falls back to `DATABASE_URL`, set by Fly.io postgres attach)
//!
//! The portal owns no application tables. The platform is the source of truth
//! for accounts and staffing data, so the only schema on this side is the
//! tower-sessions store, whose migrations ship with the store itself.

use secrecy::SecretString;
use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;

use pharmanet_portal::db;

/// Errors that can occur during migrations.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Run portal database migrations.
///
/// # Errors
///
/// Returns an error if no database URL is configured or the database is
/// unreachable.
pub async fn portal() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = database_url()?;

    tracing::info!("Connecting to portal database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running session store migrations...");
    let store = PostgresStore::new(pool);
    store.migrate().await?;

    tracing::info!("Portal migrations complete!");
    Ok(())
}

fn database_url() -> Result<SecretString, MigrationError> {
    if let Ok(value) = std::env::var("PORTAL_DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    // Fly.io postgres attach exports the generic name
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(MigrationError::MissingEnvVar("PORTAL_DATABASE_URL"))
}
