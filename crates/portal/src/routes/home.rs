//! Landing page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use tower_sessions::Session;

use crate::models::session_keys;
use crate::platform::AccessToken;

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    /// Whether the session holds a platform token (presence only; the
    /// token is not validated here).
    pub signed_in: bool,
}

/// Display the landing page.
pub async fn home(session: Session) -> impl IntoResponse {
    let signed_in = session
        .get::<AccessToken>(session_keys::ACCESS_TOKEN)
        .await
        .ok()
        .flatten()
        .is_some();

    HomeTemplate { signed_in }
}
