//! Role-selection (onboarding) route handlers.
//!
//! The access gate redirects signed-in callers without a role here, and
//! here is also where a fetch-failed caller lands, so this page must never
//! itself run the gate. It requires only a session token; callers who
//! already have a home are forwarded to it.
//!
//! Admin is never offered as a choice: the admin role is granted on the
//! platform and the gate's reconciliation materializes it in the profile.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use pharmanet_core::UserType;

use crate::guard::RedirectTarget;
use crate::middleware::current_access_token;
use crate::state::AppState;

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    pub error: Option<String>,
}

/// Form body for the role choice.
#[derive(Debug, Deserialize)]
pub struct RoleForm {
    pub user_type: String,
}

/// Role selection page template.
#[derive(Template, WebTemplate)]
#[template(path = "onboarding/role.html")]
pub struct RolePageTemplate {
    pub error: Option<String>,
    pub display_name: String,
}

/// User-facing message for a role-selection error code.
fn error_message(code: &str) -> String {
    match code {
        "invalid_choice" => "Pick one of the two roles to continue.",
        "save_failed" => "We could not save your choice. Please try again.",
        _ => "Something went wrong. Please try again.",
    }
    .to_string()
}

/// The login URL that returns to role selection after sign-in.
fn login_redirect() -> Redirect {
    Redirect::to(&format!(
        "/auth/login?next={}",
        urlencoding::encode(RedirectTarget::RoleSelection.path())
    ))
}

/// Display the role selection page.
///
/// Callers with a home already (admins, or anyone whose role maps to a
/// dashboard) are forwarded there; callers with no role, or a role the
/// portal does not recognize, get the form.
///
/// # Route
///
/// `GET /onboarding/role`
pub async fn role_page(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<RoleQuery>,
) -> Response {
    let Some(token) = current_access_token(&session, &state).await else {
        return login_redirect().into_response();
    };

    let error = query.error.as_deref().map(error_message);

    match state.platform().me(&token.access_token).await {
        Ok(identity) => {
            if identity.has_admin_access() {
                return Redirect::to(RedirectTarget::AdminDashboard.path()).into_response();
            }
            if let Some(target) = identity.user_type.and_then(RedirectTarget::dashboard_for) {
                return Redirect::to(target.path()).into_response();
            }

            RolePageTemplate {
                error,
                display_name: identity.display_name().to_owned(),
            }
            .into_response()
        }
        Err(e) => {
            // This page is the gate's fail-open destination; render the form
            // even when the profile read fails so the caller is never stuck
            tracing::warn!("Profile fetch on role page failed: {}", e);
            RolePageTemplate {
                error,
                display_name: String::new(),
            }
            .into_response()
        }
    }
}

/// Persist the role choice and enter the matching dashboard.
///
/// # Route
///
/// `POST /onboarding/role`
pub async fn choose_role(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RoleForm>,
) -> Response {
    let Some(token) = current_access_token(&session, &state).await else {
        return login_redirect().into_response();
    };

    // Only the two self-service roles are selectable
    let user_type = match form.user_type.parse::<UserType>() {
        Ok(user_type) if user_type.is_selectable() => user_type,
        _ => {
            tracing::warn!(choice = %form.user_type, "Rejected role choice");
            return Redirect::to(&format!(
                "{}?error=invalid_choice",
                RedirectTarget::RoleSelection.path()
            ))
            .into_response();
        }
    };

    match state
        .platform()
        .update_user_type(&token.access_token, user_type)
        .await
    {
        Ok(identity) => {
            tracing::info!(user = %identity.id, role = %user_type, "Role selected");
            let target = RedirectTarget::dashboard_for(user_type)
                .unwrap_or(RedirectTarget::RoleSelection);
            Redirect::to(target.path()).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to persist role choice: {}", e);
            Redirect::to(&format!(
                "{}?error=save_failed",
                RedirectTarget::RoleSelection.path()
            ))
            .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_has_fallback() {
        assert!(!error_message("invalid_choice").is_empty());
        assert!(!error_message("save_failed").is_empty());
        assert!(!error_message("unheard_of_code").is_empty());
    }
}
