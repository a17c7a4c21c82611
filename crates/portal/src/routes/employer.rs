//! Employer dashboard route handlers.
//!
//! Shell only: shift posting and applicant views are platform features the
//! portal links out to.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::guard::EmployerOnly;
use crate::middleware::Protected;

/// Employer dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/employer.html")]
pub struct EmployerDashboardTemplate {
    pub name: String,
    pub is_admin: bool,
}

/// Display the employer dashboard.
pub async fn dashboard(guard: Protected<EmployerOnly>) -> impl IntoResponse {
    EmployerDashboardTemplate {
        name: guard.identity.display_name().to_owned(),
        is_admin: guard.identity.has_admin_access(),
    }
}
