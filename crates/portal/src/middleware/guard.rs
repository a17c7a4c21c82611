//! Access-gate middleware and extractors.
//!
//! [`Protected`] is the HTTP face of the gate: a route handler that takes
//! `Protected<EmployerOnly>` (or any other preset) only runs when the gate
//! allows the caller, and receives the resolved identity. Every other gate
//! outcome becomes the rejection response here:
//!
//! - `Redirect` - 303 to the gate's target.
//! - `Denied` - rendered 403 page naming the failing rule; bare 403 for
//!   `/api/` paths.
//! - `AuthRequired` - rendered 401 page with a sign-in action that returns
//!   to the original destination; bare 401 for `/api/` paths.
//!
//! Expired platform tokens are refreshed here before the gate runs, so a
//! stale session looks like a valid one to the gate whenever the platform
//! still honors the refresh token.

use std::marker::PhantomData;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use pharmanet_core::Identity;

use crate::error::{add_breadcrumb, set_sentry_user};
use crate::guard::{
    AccessGate, DenialReason, GateOutcome, GuardPreset, PlatformIdentityProvider, RedirectTarget,
};
use crate::models::session_keys;
use crate::platform::AccessToken;
use crate::state::AppState;

/// Extractor that runs the access gate for the preset `G`.
///
/// # Example
///
/// ```rust,ignore
/// async fn employer_dashboard(
///     guard: Protected<EmployerOnly>,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", guard.identity.display_name())
/// }
/// ```
pub struct Protected<G: GuardPreset> {
    /// The identity the gate resolved and allowed.
    pub identity: Identity,
    preset: PhantomData<G>,
}

/// Rejection produced when the gate does not allow the caller.
pub enum GateRejection {
    /// Send the caller to a gate-chosen destination.
    Redirect(RedirectTarget),
    /// Access denied; render the reason (HTML) or a bare 403 (API).
    Denied {
        reason: DenialReason,
        is_api: bool,
    },
    /// No credentials; prompt sign-in (HTML) or a bare 401 (API).
    AuthRequired {
        next: String,
        is_api: bool,
    },
}

/// 403 page naming the rule that failed.
#[derive(Template, WebTemplate)]
#[template(path = "access/denied.html")]
struct DeniedTemplate {
    message: &'static str,
}

/// 401 page offering a sign-in action.
#[derive(Template, WebTemplate)]
#[template(path = "access/signin_required.html")]
struct SigninRequiredTemplate {
    signin_url: String,
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Redirect(target) => Redirect::to(target.path()).into_response(),
            Self::Denied {
                reason,
                is_api: true,
            } => (StatusCode::FORBIDDEN, reason.message()).into_response(),
            Self::Denied {
                reason,
                is_api: false,
            } => (
                StatusCode::FORBIDDEN,
                DeniedTemplate {
                    message: reason.message(),
                },
            )
                .into_response(),
            Self::AuthRequired { is_api: true, .. } => StatusCode::UNAUTHORIZED.into_response(),
            Self::AuthRequired {
                next,
                is_api: false,
            } => (
                StatusCode::UNAUTHORIZED,
                SigninRequiredTemplate {
                    signin_url: format!("/auth/signin?next={}", urlencoding::encode(&next)),
                },
            )
                .into_response(),
        }
    }
}

impl<G: GuardPreset> FromRequestParts<AppState> for Protected<G> {
    type Rejection = GateRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let path = parts.uri.path().to_string();
        let is_api = path.starts_with("/api/");

        // Session comes from SessionManagerLayer; absent means no credentials.
        let token = match parts.extensions.get::<Session>() {
            Some(session) => current_access_token(session, state).await,
            None => None,
        };

        let provider = PlatformIdentityProvider::new(
            state.platform().clone(),
            token.map(|t| t.access_token),
        );
        let gate = AccessGate::new(&provider, G::CONFIG);

        match gate.evaluate().await {
            GateOutcome::Allowed(identity) => {
                set_sentry_user(&identity.id, Some(identity.email.as_ref()));
                Ok(Self {
                    identity,
                    preset: PhantomData,
                })
            }
            GateOutcome::Redirect(target) => {
                add_breadcrumb(
                    "access",
                    "Gate redirected caller",
                    Some(&[("from", path.as_str()), ("to", target.path())]),
                );
                Err(GateRejection::Redirect(target))
            }
            GateOutcome::Denied(reason) => {
                add_breadcrumb(
                    "access",
                    "Gate denied caller",
                    Some(&[("path", path.as_str()), ("reason", reason.message())]),
                );
                Err(GateRejection::Denied { reason, is_api })
            }
            GateOutcome::AuthRequired => Err(GateRejection::AuthRequired { next: path, is_api }),
        }
    }
}

/// Get the session's platform token, refreshing it first if it has expired.
///
/// Returns `None` when the session holds no token or the token is expired
/// and cannot be refreshed; a dead token is removed from the session so
/// later requests skip the refresh attempt.
pub async fn current_access_token(session: &Session, state: &AppState) -> Option<AccessToken> {
    let token: AccessToken = session
        .get(session_keys::ACCESS_TOKEN)
        .await
        .ok()
        .flatten()?;

    if !token.is_expired() {
        return Some(token);
    }

    let Some(refresh) = token.refresh_token.clone() else {
        let _ = session
            .remove::<AccessToken>(session_keys::ACCESS_TOKEN)
            .await;
        return None;
    };

    match state.platform().refresh_token(&refresh).await {
        Ok(renewed) => {
            if let Err(e) = session.insert(session_keys::ACCESS_TOKEN, &renewed).await {
                tracing::warn!("Failed to store refreshed platform token: {e}");
            }
            Some(renewed)
        }
        Err(e) => {
            tracing::warn!("Platform token refresh failed: {e}");
            let _ = session
                .remove::<AccessToken>(session_keys::ACCESS_TOKEN)
                .await;
            None
        }
    }
}

/// Helper to store the platform token in the session after sign-in.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_access_token(
    session: &Session,
    token: &AccessToken,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::ACCESS_TOKEN, token).await
}

/// Helper to clear the platform token from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_access_token(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<AccessToken>(session_keys::ACCESS_TOKEN)
        .await?;
    Ok(())
}
