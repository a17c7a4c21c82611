//! Pharmacist dashboard route handlers.
//!
//! Shell only: shift search and application views are platform features the
//! portal links out to.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::guard::PharmacistOnly;
use crate::middleware::Protected;

/// Pharmacist dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/pharmacist.html")]
pub struct PharmacistDashboardTemplate {
    pub name: String,
    pub is_admin: bool,
}

/// Display the pharmacist dashboard.
pub async fn dashboard(guard: Protected<PharmacistOnly>) -> impl IntoResponse {
    PharmacistDashboardTemplate {
        name: guard.identity.display_name().to_owned(),
        is_admin: guard.identity.has_admin_access(),
    }
}
