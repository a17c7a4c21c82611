//! HTTP route handlers for the portal.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                    - Landing page
//! GET  /health              - Liveness check
//! GET  /health/ready        - Readiness check (DB ping)
//!
//! # Auth (hosted login)
//! GET  /auth/login          - Sign-in page
//! GET  /auth/signin         - Redirect to the platform's hosted login
//! GET  /auth/callback       - OAuth callback (code exchange)
//! POST /auth/logout         - Clear session, platform logout
//!
//! # Onboarding
//! GET  /onboarding/role     - Role selection page
//! POST /onboarding/role     - Persist the role choice
//!
//! # Protected screens (one gate preset each)
//! GET  /employer            - Employer dashboard (EmployerOnly)
//! GET  /pharmacist          - Pharmacist dashboard (PharmacistOnly)
//! GET  /admin               - Admin dashboard (AdminOnly)
//! GET  /account             - Profile page (SignedIn)
//! ```
//!
//! The onboarding and dashboard routes are mounted on the
//! [`RedirectTarget`](crate::guard::RedirectTarget) constants the gate
//! redirects to, so a handler and its redirect target cannot drift apart.

pub mod account;
pub mod admin;
pub mod auth;
pub mod employer;
pub mod home;
pub mod onboarding;
pub mod pharmacist;

use axum::{
    Router,
    routing::{get, post},
};

use crate::guard::RedirectTarget;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page))
        .route("/signin", get(auth::signin))
        .route("/callback", get(auth::callback))
        .route("/logout", post(auth::logout))
}

/// Create all routes for the portal.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Landing page
        .route("/", get(home::home))
        // Auth routes
        .nest("/auth", auth_routes())
        // Onboarding (the gate's redirect target for callers without a role)
        .route(
            RedirectTarget::RoleSelection.path(),
            get(onboarding::role_page).post(onboarding::choose_role),
        )
        // Dashboards, one gate preset each
        .route(
            RedirectTarget::EmployerDashboard.path(),
            get(employer::dashboard),
        )
        .route(
            RedirectTarget::PharmacistDashboard.path(),
            get(pharmacist::dashboard),
        )
        .route(RedirectTarget::AdminDashboard.path(), get(admin::dashboard))
        // Profile
        .route("/account", get(account::show))
}
