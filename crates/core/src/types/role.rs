//! Role and user-type vocabulary.
//!
//! Access rules across the portal are written in terms of two fields on every
//! platform account:
//!
//! - [`PlatformRole`] - the privilege tier (`standard` or `admin`), assigned
//!   platform-side and never editable through the portal.
//! - [`UserType`] - the persona an account acts as (`employer`, `pharmacist`,
//!   or `admin`). New accounts start with no user type and pick one during
//!   onboarding; admin accounts have theirs reconciled automatically.
//!
//! Both parse totally from wire strings: an unrecognized role degrades to
//! [`PlatformRole::Standard`] (a typo must never grant privilege), and an
//! unrecognized user type maps to [`UserType::Unknown`] so callers decide
//! explicitly what to do with personas they have never heard of. The serde
//! `Deserialize` impls go through [`PlatformRole::from_wire`] and
//! [`UserType::from_wire`] and are therefore total as well.

use serde::{Deserialize, Serialize};

/// Privilege tier of a platform account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum PlatformRole {
    /// Regular account with persona-scoped access.
    #[default]
    Standard,
    /// Elevated account with access to every screen.
    Admin,
}

impl PlatformRole {
    /// Parse a role from its wire string. Wire values are lowercase;
    /// anything unrecognized degrades to [`Self::Standard`].
    #[must_use]
    pub fn from_wire(s: &str) -> Self {
        match s {
            "admin" => Self::Admin,
            _ => Self::Standard,
        }
    }

    /// The wire string for this role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Admin => "admin",
        }
    }
}

impl From<String> for PlatformRole {
    fn from(s: String) -> Self {
        Self::from_wire(&s)
    }
}

impl std::fmt::Display for PlatformRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when strictly parsing a [`UserType`] from user input.
#[derive(thiserror::Error, Debug, Clone)]
#[error("invalid user type: {0}")]
pub struct UserTypeParseError(pub String);

/// The persona a platform account acts as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum UserType {
    /// Pharmacy owner or manager posting shifts.
    Employer,
    /// Licensed pharmacist picking up shifts.
    Pharmacist,
    /// Platform operator.
    Admin,
    /// A persona this build does not recognize. Restricted screens treat it
    /// as not permitted rather than guessing.
    Unknown,
}

impl UserType {
    /// Parse a user type from its wire string. Wire values are lowercase;
    /// anything unrecognized maps to [`Self::Unknown`].
    #[must_use]
    pub fn from_wire(s: &str) -> Self {
        match s {
            "employer" => Self::Employer,
            "pharmacist" => Self::Pharmacist,
            "admin" => Self::Admin,
            _ => Self::Unknown,
        }
    }

    /// The wire string for this user type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Employer => "employer",
            Self::Pharmacist => "pharmacist",
            Self::Admin => "admin",
            Self::Unknown => "unknown",
        }
    }

    /// Whether this user type can be chosen on the onboarding form.
    ///
    /// Admin is granted platform-side and materializes through
    /// reconciliation, never through self-selection.
    #[must_use]
    pub const fn is_selectable(self) -> bool {
        matches!(self, Self::Employer | Self::Pharmacist)
    }
}

impl From<String> for UserType {
    fn from(s: String) -> Self {
        Self::from_wire(&s)
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for UserType {
    type Err = UserTypeParseError;

    /// Strict parse for user input. Unlike [`UserType::from_wire`] this
    /// rejects unrecognized strings instead of producing [`UserType::Unknown`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "employer" => Ok(Self::Employer),
            "pharmacist" => Ok(Self::Pharmacist),
            "admin" => Ok(Self::Admin),
            _ => Err(UserTypeParseError(s.to_owned())),
        }
    }
}
