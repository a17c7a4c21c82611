//! The resolved identity of a signed-in account.

use serde::{Deserialize, Serialize};

use crate::types::email::Email;
use crate::types::id::UserId;
use crate::types::role::{PlatformRole, UserType};

/// A platform account as the portal sees it, resolved fresh from the
/// platform on every guarded request.
///
/// `user_type` is `None` for accounts that have not completed onboarding
/// yet; nothing else in the profile distinguishes a new account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub email: Email,
    pub full_name: Option<String>,
    pub role: PlatformRole,
    pub user_type: Option<UserType>,
}

impl Identity {
    /// Whether this account holds the elevated platform role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == PlatformRole::Admin
    }

    /// Whether this account passes admin checks: either the platform role
    /// or the persona is admin.
    #[must_use]
    pub fn has_admin_access(&self) -> bool {
        self.is_admin() || self.user_type == Some(UserType::Admin)
    }

    /// Whether this account still has to pick a persona during onboarding.
    #[must_use]
    pub const fn needs_onboarding(&self) -> bool {
        self.user_type.is_none()
    }

    /// Name to greet the account with: the full name when the profile has
    /// one, otherwise the local part of the email address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => self.email.local_part(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn identity(role: PlatformRole, user_type: Option<UserType>) -> Identity {
        Identity {
            id: UserId::new("usr_01j8"),
            email: Email::parse("casey@rxbridge.example").unwrap(),
            full_name: Some("Casey Nguyen".to_owned()),
            role,
            user_type,
        }
    }

    #[test]
    fn test_is_admin() {
        assert!(identity(PlatformRole::Admin, None).is_admin());
        assert!(!identity(PlatformRole::Standard, Some(UserType::Employer)).is_admin());
    }

    #[test]
    fn test_has_admin_access() {
        // Either field grants it
        assert!(identity(PlatformRole::Admin, None).has_admin_access());
        assert!(identity(PlatformRole::Standard, Some(UserType::Admin)).has_admin_access());
        assert!(!identity(PlatformRole::Standard, Some(UserType::Pharmacist)).has_admin_access());
        assert!(!identity(PlatformRole::Standard, None).has_admin_access());
    }

    #[test]
    fn test_needs_onboarding() {
        assert!(identity(PlatformRole::Standard, None).needs_onboarding());
        assert!(!identity(PlatformRole::Standard, Some(UserType::Pharmacist)).needs_onboarding());
    }

    #[test]
    fn test_display_name_prefers_full_name() {
        let id = identity(PlatformRole::Standard, None);
        assert_eq!(id.display_name(), "Casey Nguyen");
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let mut id = identity(PlatformRole::Standard, None);
        id.full_name = None;
        assert_eq!(id.display_name(), "casey");

        id.full_name = Some(String::new());
        assert_eq!(id.display_name(), "casey");
    }
}
