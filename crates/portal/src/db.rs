//! Database operations for the portal `PostgreSQL`.
//!
//! # Database: `pn_portal`
//!
//! The platform is the source of truth for accounts, pharmacies, and shifts;
//! the portal database stores session state only:
//!
//! ## Tables
//!
//! - `tower_sessions.session` - Tower-sessions storage
//!
//! # Migrations
//!
//! The session schema is owned by tower-sessions and applied via:
//! ```bash
//! cargo run -p pharmanet-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Create a `PostgreSQL` connection pool.
///
/// Sessions are the only tenant of this database, so the pool stays small;
/// each request touches it at most twice (session load, session save).
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url.expose_secret())
        .await
}

/// Round-trip a trivial query to verify the database is reachable.
///
/// Used by the readiness probe.
///
/// # Errors
///
/// Returns `sqlx::Error` if the database does not answer.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").fetch_one(pool).await?;
    Ok(())
}
