//! Authentication route handlers.
//!
//! The portal holds no credentials of its own; sign-in happens on the
//! platform's hosted login page:
//! - Sign-in page: explains the flow and links to hosted login
//! - Signin: stores CSRF state, redirects to the authorization URL
//! - Callback: verifies state, exchanges the code, stores the token,
//!   routes the caller by their role
//! - Logout: clears the session and signs out of the platform

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rand::Rng;
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::guard::RedirectTarget;
use crate::middleware::{clear_access_token, set_access_token};
use crate::models::session_keys;
use crate::platform::AccessToken;
use crate::state::AppState;

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for the sign-in page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
    pub next: Option<String>,
}

/// Query parameters for beginning hosted login.
#[derive(Debug, Deserialize)]
pub struct SigninQuery {
    pub next: Option<String>,
}

/// Query parameters from the hosted-login callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for tokens.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if authorization failed.
    pub error: Option<String>,
    /// Error description.
    pub error_description: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Sign-in page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub signin_url: String,
}

// =============================================================================
// Helpers
// =============================================================================

/// Generate a cryptographically secure random string.
fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            // SAFETY: idx is always within bounds since random_range returns 0..CHARSET.len()
            char::from(*CHARSET.get(idx).expect("idx within bounds"))
        })
        .collect()
}

/// Whether a post-login destination is safe to redirect to.
///
/// Only same-origin relative paths qualify; anything that could leave the
/// portal (absolute URLs, protocol-relative `//host` forms) is rejected.
fn is_safe_next(next: &str) -> bool {
    next.starts_with('/') && !next.starts_with("//")
}

/// User-facing message for a sign-in error code.
fn error_message(code: &str) -> String {
    match code {
        "denied" => "Sign-in was cancelled.",
        "exchange" => "We could not complete sign-in with the platform. Please try again.",
        "state" | "missing_code" | "missing_state" => {
            "The sign-in link expired. Please try again."
        }
        "session" => "We could not start a session. Check that cookies are enabled.",
        _ => "Sign-in failed. Please try again.",
    }
    .to_string()
}

// =============================================================================
// Routes
// =============================================================================

/// Display the sign-in page.
///
/// # Route
///
/// `GET /auth/login`
pub async fn login_page(Query(query): Query<LoginQuery>) -> impl IntoResponse {
    let signin_url = query
        .next
        .as_deref()
        .filter(|next| is_safe_next(next))
        .map_or_else(
            || "/auth/signin".to_string(),
            |next| format!("/auth/signin?next={}", urlencoding::encode(next)),
        );

    LoginTemplate {
        error: query.error.as_deref().map(error_message),
        signin_url,
    }
}

/// Begin hosted login.
///
/// Generates the CSRF state parameter, stores it in the session together
/// with the post-login destination, and redirects to the platform's
/// authorization page.
///
/// # Route
///
/// `GET /auth/signin`
pub async fn signin(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<SigninQuery>,
) -> Response {
    let login_state = generate_random_string(32);

    // Store in session for validation on callback
    if let Err(e) = session
        .insert(session_keys::LOGIN_STATE, &login_state)
        .await
    {
        tracing::error!("Failed to store login state in session: {}", e);
        return Redirect::to("/auth/login?error=session").into_response();
    }

    // Remember where to return after sign-in (relative paths only)
    if let Some(next) = query.next.as_deref().filter(|next| is_safe_next(next)) {
        if let Err(e) = session.insert(session_keys::LOGIN_NEXT, next).await {
            tracing::warn!("Failed to store post-login destination: {}", e);
        }
    }

    let redirect_uri = state.config().callback_url();
    let auth_url = state
        .platform()
        .authorization_url(&redirect_uri, &login_state);

    Redirect::to(&auth_url).into_response()
}

/// Handle the hosted-login callback.
///
/// Validates the state parameter, exchanges the authorization code for
/// tokens, stores the token in the session, and routes the caller onward:
/// their stored destination if one was set, otherwise their dashboard, or
/// role selection when no role is set yet.
///
/// # Route
///
/// `GET /auth/callback`
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    // Check for errors from the hosted login page
    if let Some(error) = query.error {
        let description = query.error_description.unwrap_or_default();
        tracing::warn!("Hosted login error: {} - {}", error, description);
        return Redirect::to("/auth/login?error=denied").into_response();
    }

    // Verify we have an authorization code
    let Some(code) = query.code else {
        tracing::warn!("Hosted login callback missing code");
        return Redirect::to("/auth/login?error=missing_code").into_response();
    };

    // Verify state parameter (CSRF protection)
    let Some(returned_state) = query.state else {
        tracing::warn!("Hosted login callback missing state");
        return Redirect::to("/auth/login?error=missing_state").into_response();
    };

    let stored_state: Option<String> = session
        .get(session_keys::LOGIN_STATE)
        .await
        .ok()
        .flatten();

    if stored_state.as_ref() != Some(&returned_state) {
        tracing::warn!("Hosted login state mismatch");
        return Redirect::to("/auth/login?error=state").into_response();
    }

    // Clear the stored state (one-time use)
    let _ = session.remove::<String>(session_keys::LOGIN_STATE).await;

    // Exchange code for tokens (redirect URI must match the original request)
    let redirect_uri = state.config().callback_url();
    let token = match state.platform().exchange_code(&code, &redirect_uri).await {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Failed to exchange login code: {}", e);
            return Redirect::to("/auth/login?error=exchange").into_response();
        }
    };

    if let Err(e) = set_access_token(&session, &token).await {
        tracing::error!("Failed to store platform token: {}", e);
        return Redirect::to("/auth/login?error=session").into_response();
    }

    // Pop the stored post-login destination, if any
    let next: Option<String> = session
        .get(session_keys::LOGIN_NEXT)
        .await
        .ok()
        .flatten();
    let _ = session.remove::<String>(session_keys::LOGIN_NEXT).await;

    // Route by the fresh profile: stored destination first, then the
    // caller's own dashboard, then role selection
    match state.platform().me(&token.access_token).await {
        Ok(identity) => {
            set_sentry_user(&identity.id, Some(identity.email.as_ref()));
            tracing::info!(user = %identity.id, "Signed in via hosted login");

            if let Some(next) = next {
                return Redirect::to(&next).into_response();
            }

            let target = if identity.has_admin_access() {
                RedirectTarget::AdminDashboard
            } else {
                identity
                    .user_type
                    .and_then(RedirectTarget::dashboard_for)
                    .unwrap_or(RedirectTarget::RoleSelection)
            };
            Redirect::to(target.path()).into_response()
        }
        Err(e) => {
            // Signed in but the profile read failed; role selection is the
            // unblocking destination, same as the gate's fallback
            tracing::warn!("Profile fetch after sign-in failed: {}", e);
            Redirect::to(RedirectTarget::RoleSelection.path()).into_response()
        }
    }
}

/// Log out of the portal and the platform.
///
/// Clears the platform token from the session; when an ID token is present,
/// redirects through the platform's logout endpoint so the hosted session
/// ends too.
///
/// # Route
///
/// `POST /auth/logout`
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    // Get the current token to extract id_token for platform logout
    let token: Option<AccessToken> = session
        .get(session_keys::ACCESS_TOKEN)
        .await
        .ok()
        .flatten();

    if let Err(e) = clear_access_token(&session).await {
        tracing::warn!("Failed to clear session token: {}", e);
    }
    clear_sentry_user();

    // If we have an id_token, redirect through the platform logout
    if let Some(token) = token
        && let Some(id_token) = token.id_token
    {
        let post_logout_uri = format!("{}/", state.config().base_url.trim_end_matches('/'));
        let logout_url = state.platform().logout_url(&id_token, &post_logout_uri);
        return Redirect::to(&logout_url).into_response();
    }

    // Otherwise just redirect to home
    Redirect::to("/").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_random_string() {
        let s = generate_random_string(32);
        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_alphanumeric()));

        // Two draws should differ
        assert_ne!(generate_random_string(32), generate_random_string(32));
    }

    #[test]
    fn test_is_safe_next() {
        assert!(is_safe_next("/employer"));
        assert!(is_safe_next("/onboarding/role"));
        assert!(is_safe_next("/"));

        assert!(!is_safe_next("https://evil.example/phish"));
        assert!(!is_safe_next("//evil.example"));
        assert!(!is_safe_next("employer"));
        assert!(!is_safe_next(""));
    }

    #[test]
    fn test_error_message_has_fallback() {
        assert!(!error_message("denied").is_empty());
        assert!(!error_message("unheard_of_code").is_empty());
    }
}
