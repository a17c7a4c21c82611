//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. The session
//! carries the OAuth state nonce across the hosted-login round trip and the
//! platform tokens after sign-in, so the cookie settings here are load-bearing
//! for the whole auth flow.

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer, cookie};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::PortalConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "pn_session";

/// Sessions idle longer than this are evicted (sliding window).
const SESSION_EXPIRY_DAYS: i64 = 7;

/// Create the session layer with `PostgreSQL` store.
///
/// The schema used by the store is created by `pn-cli migrate`.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &PortalConfig,
) -> SessionManagerLayer<PostgresStore> {
    let store = PostgresStore::new(pool.clone());

    // SameSite must stay Lax: the OAuth callback arrives as a top-level
    // redirect from the platform's origin, and Strict would withhold the
    // cookie holding the state nonce on exactly that request.
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(cookie::time::Duration::days(
            SESSION_EXPIRY_DAYS,
        )))
        .with_secure(secure_cookies(&config.base_url))
        .with_same_site(cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Whether session cookies should carry the `Secure` attribute.
///
/// Derived from the public base URL rather than a separate flag so local
/// `http://localhost` development keeps working without extra configuration.
fn secure_cookies(base_url: &str) -> bool {
    base_url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_cookies_in_production() {
        assert!(secure_cookies("https://portal.pharmanet.example"));
    }

    #[test]
    fn test_plain_http_skips_secure_flag() {
        assert!(!secure_cookies("http://localhost:3000"));
    }
}
