//! Admin dashboard route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::guard::AdminOnly;
use crate::middleware::Protected;

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/admin.html")]
pub struct AdminDashboardTemplate {
    pub name: String,
    pub email: String,
}

/// Display the admin dashboard.
pub async fn dashboard(guard: Protected<AdminOnly>) -> impl IntoResponse {
    AdminDashboardTemplate {
        name: guard.identity.display_name().to_owned(),
        email: guard.identity.email.to_string(),
    }
}
