//! Types for platform OAuth and REST responses.

use chrono::Utc;
use pharmanet_core::{Email, EmailError, Identity, PlatformRole, UserId, UserType};
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// OAuth Types
// ─────────────────────────────────────────────────────────────────────────────

/// Access token obtained from the platform via OAuth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    /// The access token for API requests.
    pub access_token: String,
    /// The ID token (`OpenID` Connect).
    pub id_token: Option<String>,
    /// The refresh token for obtaining new access tokens.
    pub refresh_token: Option<String>,
    /// Token lifetime in seconds.
    pub expires_in: Option<i64>,
    /// Unix timestamp when the token was obtained.
    pub obtained_at: i64,
}

impl AccessToken {
    /// Check if the access token is expired (with 60s buffer).
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_in.is_some_and(|expires_in| {
            let now = Utc::now().timestamp();
            let expires_at = self.obtained_at + expires_in;
            now >= (expires_at - 60)
        })
    }
}

/// Raw token response from the platform OAuth endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    pub access_token: String,
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    #[allow(dead_code)]
    pub token_type: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Account Types
// ─────────────────────────────────────────────────────────────────────────────

/// Raw account profile as returned by `GET /v1/me`.
///
/// Wire values stay loose here (plain strings, absent fields); the typed
/// [`Identity`] comes out of [`Self::into_identity`].
#[derive(Debug, Clone, Deserialize)]
pub struct MeResponse {
    /// The account's unique ID.
    pub id: String,
    /// The account's email address.
    pub email: String,
    /// The account's display name.
    pub full_name: Option<String>,
    /// Privilege tier wire string (`standard` or `admin`).
    pub role: Option<String>,
    /// Persona wire string; null or empty for accounts that have not
    /// completed onboarding.
    pub user_type: Option<String>,
}

impl MeResponse {
    /// Convert the wire profile into a typed [`Identity`].
    ///
    /// A missing role degrades to [`PlatformRole::Standard`], and an empty
    /// `user_type` string is treated the same as an absent one. Unrecognized
    /// persona strings become [`UserType::Unknown`] rather than failing.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError`] if the profile email is not a valid address.
    pub fn into_identity(self) -> Result<Identity, EmailError> {
        let email = Email::parse(&self.email)?;
        let role = self
            .role
            .as_deref()
            .map_or(PlatformRole::Standard, PlatformRole::from_wire);
        let user_type = self
            .user_type
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(UserType::from_wire);

        Ok(Identity {
            id: UserId::new(self.id),
            email,
            full_name: self.full_name,
            role,
            user_type,
        })
    }
}

/// Request body for `PATCH /v1/me`.
#[derive(Debug, Serialize)]
pub(super) struct UserTypeUpdate {
    pub user_type: UserType,
}

/// Error body the platform API returns for non-2xx responses.
#[derive(Debug, Deserialize)]
pub(super) struct ApiErrorBody {
    pub message: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn token(expires_in: Option<i64>, obtained_at: i64) -> AccessToken {
        AccessToken {
            access_token: "at_123".to_string(),
            id_token: None,
            refresh_token: None,
            expires_in,
            obtained_at,
        }
    }

    #[test]
    fn test_token_without_expiry_never_expires() {
        assert!(!token(None, 0).is_expired());
    }

    #[test]
    fn test_fresh_token_not_expired() {
        let now = Utc::now().timestamp();
        assert!(!token(Some(3600), now).is_expired());
    }

    #[test]
    fn test_old_token_expired() {
        let now = Utc::now().timestamp();
        assert!(token(Some(3600), now - 7200).is_expired());
    }

    #[test]
    fn test_expiry_buffer() {
        // Expires in 30s, inside the 60s buffer
        let now = Utc::now().timestamp();
        assert!(token(Some(30), now).is_expired());
    }

    #[test]
    fn test_me_response_into_identity() {
        let me: MeResponse = serde_json::from_str(
            r#"{
                "id": "usr_01j8",
                "email": "casey@rxbridge.example",
                "full_name": "Casey Nguyen",
                "role": "admin",
                "user_type": "pharmacist"
            }"#,
        )
        .unwrap();

        let identity = me.into_identity().unwrap();
        assert_eq!(identity.id, UserId::new("usr_01j8"));
        assert_eq!(identity.role, PlatformRole::Admin);
        assert_eq!(identity.user_type, Some(UserType::Pharmacist));
    }

    #[test]
    fn test_me_response_missing_role_and_type() {
        let me: MeResponse = serde_json::from_str(
            r#"{"id": "usr_new", "email": "new@rxbridge.example"}"#,
        )
        .unwrap();

        let identity = me.into_identity().unwrap();
        assert_eq!(identity.role, PlatformRole::Standard);
        assert_eq!(identity.user_type, None);
        assert!(identity.needs_onboarding());
    }

    #[test]
    fn test_me_response_empty_user_type_is_unset() {
        let me: MeResponse = serde_json::from_str(
            r#"{"id": "usr_new", "email": "new@rxbridge.example", "user_type": ""}"#,
        )
        .unwrap();

        let identity = me.into_identity().unwrap();
        assert_eq!(identity.user_type, None);
    }

    #[test]
    fn test_me_response_unrecognized_persona() {
        let me: MeResponse = serde_json::from_str(
            r#"{"id": "usr_x", "email": "x@rxbridge.example", "user_type": "locum"}"#,
        )
        .unwrap();

        let identity = me.into_identity().unwrap();
        assert_eq!(identity.user_type, Some(UserType::Unknown));
    }

    #[test]
    fn test_me_response_bad_email_fails() {
        let me: MeResponse =
            serde_json::from_str(r#"{"id": "usr_x", "email": "not-an-email"}"#).unwrap();

        assert!(me.into_identity().is_err());
    }
}
