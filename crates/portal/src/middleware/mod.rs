//! HTTP middleware stack for the portal.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//! 5. Security headers (CSP, frame options, etc.)
//!
//! The access gate is not a layer: protected routes opt in per handler via
//! the [`Protected`] extractor, which is where identity resolution and the
//! allow/redirect/deny decision happen.

pub mod guard;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use guard::{
    GateRejection, Protected, clear_access_token, current_access_token, set_access_token,
};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
