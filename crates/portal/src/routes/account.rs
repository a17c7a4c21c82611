//! Account route handlers.
//!
//! Open to any signed-in caller with a role, whichever role that is.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::guard::SignedIn;
use crate::middleware::Protected;

/// Profile display data for templates.
#[derive(Clone)]
pub struct ProfileView {
    pub name: String,
    pub email: String,
    pub role: &'static str,
    pub user_type: &'static str,
    pub is_admin: bool,
}

/// Account profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountTemplate {
    pub profile: ProfileView,
}

/// Display the signed-in caller's profile.
pub async fn show(guard: Protected<SignedIn>) -> impl IntoResponse {
    let identity = guard.identity;

    AccountTemplate {
        profile: ProfileView {
            name: identity.display_name().to_owned(),
            email: identity.email.to_string(),
            role: identity.role.as_str(),
            user_type: identity
                .user_type
                .map_or("not selected", |user_type| user_type.as_str()),
            is_admin: identity.has_admin_access(),
        },
    }
}
