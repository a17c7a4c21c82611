//! Session key constants.
//!
//! The portal stores no identity in the session; identity is resolved fresh
//! from the platform on every gate evaluation. The session carries only the
//! platform token and the transient login-flow state.

/// Session keys for authentication data.
pub mod keys {
    /// Key for the platform access token ([`crate::platform::AccessToken`]).
    pub const ACCESS_TOKEN: &str = "platform_access_token";

    /// Key for the hosted-login state parameter (CSRF protection).
    pub const LOGIN_STATE: &str = "login_state";

    /// Key for the destination to return to after sign-in.
    pub const LOGIN_NEXT: &str = "login_next";
}
