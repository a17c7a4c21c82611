//! Integration tests for the Pharmanet portal.
//!
//! # Running Tests
//!
//! ```bash
//! # Apply the session schema and start the portal
//! cargo run -p pharmanet-cli -- migrate
//! cargo run -p pharmanet-portal
//!
//! # Run integration tests (ignored by default)
//! cargo test -p pharmanet-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `access_gate` - Gate outcomes over HTTP (sign-in walls, redirects)
//! - `auth_flow` - Hosted-login edges reachable without platform credentials
//! - `session_store` - Session schema in `PostgreSQL`
//!
//! Flows that need a signed-in platform account (denials, role
//! reconciliation) are covered by unit tests against a mock identity
//! provider instead.

/// Base URL for the portal (configurable via environment).
#[must_use]
pub fn portal_base_url() -> String {
    std::env::var("PORTAL_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// HTTP client that keeps cookies and leaves redirects unfollowed, so tests
/// can assert on statuses and `Location` headers directly.
#[must_use]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}
