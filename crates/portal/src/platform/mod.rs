//! Platform API client.
//!
//! The platform owns accounts, pharmacies, and shifts; the portal talks to it
//! over a small REST surface plus the hosted-login OAuth endpoints.
//!
//! # Hosted Login Flow
//!
//! 1. Generate authorization URL with `authorization_url()`
//! 2. Redirect the user to the platform's hosted login page
//! 3. The platform redirects back with an authorization code
//! 4. Exchange the code for tokens with `exchange_code()`
//! 5. Use the access token for account-scoped API calls
//!
//! # Example
//!
//! ```rust,ignore
//! use pharmanet_portal::platform::PlatformClient;
//!
//! // Create client
//! let client = PlatformClient::new(&config.platform);
//!
//! // Generate login URL
//! let state = generate_random_state();
//! let auth_url = client.authorization_url("https://example.com/auth/callback", &state);
//!
//! // After the OAuth callback, exchange the code for a token
//! let token = client.exchange_code(&code, "https://example.com/auth/callback").await?;
//!
//! // Use the token for API calls
//! let identity = client.me(&token.access_token).await?;
//! ```

mod types;

pub use types::*;

use std::sync::Arc;

use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::PlatformConfig;
use pharmanet_core::{Identity, UserType};

const USER_AGENT: &str = "Pharmanet/1.0";

/// Errors from the platform API.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The HTTP request itself failed (connect, timeout, body decode).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform returned a non-success status.
    #[error("Platform API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The platform returned a body we could not make sense of.
    #[error("Invalid platform response: {0}")]
    Invalid(String),

    /// The platform rejected the access token.
    #[error("Platform rejected credentials")]
    AuthRejected,

    /// The OAuth token endpoint rejected the request.
    #[error("OAuth error: {0}")]
    OAuth(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Platform Client
// ─────────────────────────────────────────────────────────────────────────────

/// Client for the platform REST API and hosted-login endpoints.
#[derive(Clone)]
pub struct PlatformClient {
    inner: Arc<PlatformClientInner>,
}

struct PlatformClientInner {
    client: reqwest::Client,
    api_url: String,
    auth_url: String,
    client_id: String,
    client_secret: String,
}

impl PlatformClient {
    /// Create a new platform API client.
    #[must_use]
    pub fn new(config: &PlatformConfig) -> Self {
        Self {
            inner: Arc::new(PlatformClientInner {
                client: reqwest::Client::new(),
                api_url: config.api_url.trim_end_matches('/').to_string(),
                auth_url: config.auth_url.trim_end_matches('/').to_string(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.expose_secret().to_string(),
            }),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // OAuth Flow
    // ─────────────────────────────────────────────────────────────────────────

    /// Generate the authorization URL for hosted login.
    ///
    /// Redirect users to this URL to begin the OAuth flow.
    ///
    /// # Arguments
    ///
    /// * `redirect_uri` - The callback URL to redirect to after authentication
    /// * `state` - A random string stored in the session to prevent CSRF attacks
    #[must_use]
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "{}/oauth/authorize?\
            client_id={}&\
            response_type=code&\
            redirect_uri={}&\
            scope=openid%20email%20account-api:full&\
            state={}",
            self.inner.auth_url,
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state)
        )
    }

    /// Generate the hosted-logout URL.
    ///
    /// # Arguments
    ///
    /// * `id_token` - The ID token from the current session
    /// * `post_logout_redirect_uri` - Where to redirect after logout
    #[must_use]
    pub fn logout_url(&self, id_token: &str, post_logout_redirect_uri: &str) -> String {
        format!(
            "{}/oauth/logout?\
            id_token_hint={}&\
            post_logout_redirect_uri={}",
            self.inner.auth_url,
            urlencoding::encode(id_token),
            urlencoding::encode(post_logout_redirect_uri)
        )
    }

    /// Exchange an authorization code for access tokens.
    ///
    /// # Arguments
    ///
    /// * `code` - The authorization code from the OAuth callback
    /// * `redirect_uri` - The same redirect URI used in the authorization request
    ///
    /// # Errors
    ///
    /// Returns an error if the token exchange fails.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<AccessToken, PlatformError> {
        let url = format!("{}/oauth/token", self.inner.auth_url);

        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", &self.inner.client_id),
            ("client_secret", &self.inner.client_secret),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        let response = self.inner.client.post(&url).form(&params).send().await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PlatformError::OAuth(format!(
                "Token exchange failed: {text}"
            )));
        }

        let token_response: TokenResponse = response.json().await?;

        Ok(AccessToken {
            access_token: token_response.access_token,
            id_token: token_response.id_token,
            refresh_token: token_response.refresh_token,
            expires_in: token_response.expires_in,
            obtained_at: chrono::Utc::now().timestamp(),
        })
    }

    /// Refresh an access token using a refresh token.
    ///
    /// # Arguments
    ///
    /// * `refresh_token` - The refresh token from a previous authentication
    ///
    /// # Errors
    ///
    /// Returns an error if the token refresh fails.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<AccessToken, PlatformError> {
        let url = format!("{}/oauth/token", self.inner.auth_url);

        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", &self.inner.client_id),
            ("client_secret", &self.inner.client_secret),
            ("refresh_token", refresh_token),
        ];

        let response = self.inner.client.post(&url).form(&params).send().await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PlatformError::OAuth(format!("Token refresh failed: {text}")));
        }

        let token_response: TokenResponse = response.json().await?;

        Ok(AccessToken {
            access_token: token_response.access_token,
            id_token: token_response.id_token,
            refresh_token: token_response.refresh_token,
            expires_in: token_response.expires_in,
            obtained_at: chrono::Utc::now().timestamp(),
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Account Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetch the identity of the account the access token belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::AuthRejected`] if the platform no longer
    /// accepts the token, and other variants for transport or response
    /// failures.
    pub async fn me(&self, access_token: &str) -> Result<Identity, PlatformError> {
        let url = format!("{}/v1/me", self.inner.api_url);

        let response = self
            .inner
            .client
            .get(&url)
            .bearer_auth(access_token)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        let me: MeResponse = parse_api_response(response).await?;
        me.into_identity()
            .map_err(|e| PlatformError::Invalid(e.to_string()))
    }

    /// Update the account's user type and return the refreshed identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the response is invalid.
    pub async fn update_user_type(
        &self,
        access_token: &str,
        user_type: UserType,
    ) -> Result<Identity, PlatformError> {
        let url = format!("{}/v1/me", self.inner.api_url);

        let response = self
            .inner
            .client
            .patch(&url)
            .bearer_auth(access_token)
            .header("User-Agent", USER_AGENT)
            .json(&UserTypeUpdate { user_type })
            .send()
            .await?;

        let me: MeResponse = parse_api_response(response).await?;
        me.into_identity()
            .map_err(|e| PlatformError::Invalid(e.to_string()))
    }
}

/// Map a platform API response to a typed result.
///
/// 401/403 become [`PlatformError::AuthRejected`]; other non-success statuses
/// carry the platform's error message when the body has one.
async fn parse_api_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, PlatformError> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(PlatformError::AuthRejected);
    }

    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&text).map_or(text, |body| body.message);
        return Err(PlatformError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.json::<T>().await?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn client() -> PlatformClient {
        PlatformClient::new(&PlatformConfig {
            api_url: "https://api.pharmanet.test/".to_string(),
            auth_url: "https://auth.pharmanet.test".to_string(),
            client_id: "portal client".to_string(),
            client_secret: SecretString::from("kJ8#mN2$pQ5&rT9*"),
        })
    }

    #[test]
    fn test_authorization_url_encodes_params() {
        let url = client().authorization_url("https://portal.test/auth/callback", "st&ate");

        assert!(url.starts_with("https://auth.pharmanet.test/oauth/authorize?"));
        assert!(url.contains("client_id=portal%20client"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fportal.test%2Fauth%2Fcallback"));
        assert!(url.contains("state=st%26ate"));
        assert!(url.contains("response_type=code"));
    }

    #[test]
    fn test_logout_url_encodes_params() {
        let url = client().logout_url("id.tok.en", "https://portal.test/");

        assert!(url.starts_with("https://auth.pharmanet.test/oauth/logout?"));
        assert!(url.contains("id_token_hint=id.tok.en"));
        assert!(url.contains("post_logout_redirect_uri=https%3A%2F%2Fportal.test%2F"));
    }
}
