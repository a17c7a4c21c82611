//! The access gate deciding who may view a protected screen.
//!
//! Every protected screen names a [`GuardPreset`]; evaluating the gate against
//! the caller's freshly fetched identity yields exactly one [`GateOutcome`]:
//!
//! - **Allowed** - render the screen for the resolved identity.
//! - **Redirect** - the caller belongs elsewhere: accounts without a persona
//!   go to role selection, accounts with the wrong persona go to their own
//!   dashboard.
//! - **Denied** - render an access-denied page with a reason.
//! - **`AuthRequired`** - no credentials; offer a sign-in action.
//!
//! Admin accounts pass every check. When an account has `role = admin` but a
//! stale persona, the gate syncs the persona to admin on the platform before
//! deciding, so downstream screens never see the mismatch. The sync is awaited
//! but optimistic: if the write fails the gate logs and proceeds with the
//! admin persona in memory.
//!
//! Identity comes from an injected [`IdentityProvider`] rather than ambient
//! state, so tests substitute fixed identities without a live platform.
//!
//! # Example
//!
//! ```rust,ignore
//! let provider = PlatformIdentityProvider::new(client, token);
//! let gate = AccessGate::new(&provider, EmployerOnly::CONFIG);
//!
//! match gate.evaluate().await {
//!     GateOutcome::Allowed(identity) => render(identity),
//!     outcome => respond_with(outcome),
//! }
//! ```

use std::future::Future;

use pharmanet_core::{Identity, PlatformRole, UserType};
use thiserror::Error;

use crate::platform::{PlatformClient, PlatformError};

// ─────────────────────────────────────────────────────────────────────────────
// Guard Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// What a screen requires of its caller.
///
/// An empty `allowed` slice means any signed-in account; `require_admin`
/// restricts the screen to admin accounts regardless of `allowed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardConfig {
    /// Personas permitted to view the screen; empty means all.
    pub allowed: &'static [UserType],
    /// When true, only admin accounts pass.
    pub require_admin: bool,
}

impl GuardConfig {
    /// Any signed-in account.
    pub const AUTHENTICATED: Self = Self {
        allowed: &[],
        require_admin: false,
    };

    /// Only admin accounts.
    pub const ADMIN_ONLY: Self = Self {
        allowed: &[],
        require_admin: true,
    };

    /// Only the listed personas (plus admins, who bypass every check).
    #[must_use]
    pub const fn allowing(allowed: &'static [UserType]) -> Self {
        Self {
            allowed,
            require_admin: false,
        }
    }

    /// Whether the persona restriction admits `user_type`.
    #[must_use]
    pub fn permits(&self, user_type: UserType) -> bool {
        self.allowed.is_empty() || self.allowed.contains(&user_type)
    }
}

/// A named guard configuration, used as a type parameter on
/// [`Protected`](crate::middleware::Protected) so each route states its
/// requirement in its handler signature.
pub trait GuardPreset: Send + Sync + 'static {
    /// The configuration this preset stands for.
    const CONFIG: GuardConfig;
}

/// Any signed-in account.
pub struct SignedIn;

impl GuardPreset for SignedIn {
    const CONFIG: GuardConfig = GuardConfig::AUTHENTICATED;
}

/// Employer accounts only.
pub struct EmployerOnly;

impl GuardPreset for EmployerOnly {
    const CONFIG: GuardConfig = GuardConfig::allowing(&[UserType::Employer]);
}

/// Pharmacist accounts only.
pub struct PharmacistOnly;

impl GuardPreset for PharmacistOnly {
    const CONFIG: GuardConfig = GuardConfig::allowing(&[UserType::Pharmacist]);
}

/// Admin accounts only.
pub struct AdminOnly;

impl GuardPreset for AdminOnly {
    const CONFIG: GuardConfig = GuardConfig::ADMIN_ONLY;
}

// ─────────────────────────────────────────────────────────────────────────────
// Outcomes
// ─────────────────────────────────────────────────────────────────────────────

/// Where the gate sends a caller who should not stay on this screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    /// Onboarding persona picker.
    RoleSelection,
    /// The employer home screen.
    EmployerDashboard,
    /// The pharmacist home screen.
    PharmacistDashboard,
    /// The admin home screen.
    AdminDashboard,
}

impl RedirectTarget {
    /// The route this target lives at.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::RoleSelection => "/onboarding/role",
            Self::EmployerDashboard => "/employer",
            Self::PharmacistDashboard => "/pharmacist",
            Self::AdminDashboard => "/admin",
        }
    }

    /// The dashboard a persona calls home, if it has one.
    ///
    /// [`UserType::Unknown`] has no dashboard; callers decide what to do
    /// with it (the gate denies).
    #[must_use]
    pub const fn dashboard_for(user_type: UserType) -> Option<Self> {
        match user_type {
            UserType::Employer => Some(Self::EmployerDashboard),
            UserType::Pharmacist => Some(Self::PharmacistDashboard),
            UserType::Admin => Some(Self::AdminDashboard),
            UserType::Unknown => None,
        }
    }
}

/// Why a caller was denied outright instead of redirected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// The screen requires an admin account.
    AdminRequired,
    /// The caller's persona is not permitted and has no dashboard to
    /// redirect to.
    NotPermitted,
}

impl DenialReason {
    /// User-facing message for the denial page.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::AdminRequired => "This area is restricted to Pharmanet administrators.",
            Self::NotPermitted => "Your account does not have access to this page.",
        }
    }
}

/// The gate's decision for one request. Exactly one of these is produced
/// per evaluation; the gate itself never errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Render the screen for this identity.
    Allowed(Identity),
    /// Send the caller elsewhere.
    Redirect(RedirectTarget),
    /// Show an access-denied page.
    Denied(DenialReason),
    /// No credentials; show a sign-in prompt.
    AuthRequired,
}

// ─────────────────────────────────────────────────────────────────────────────
// Identity Provider
// ─────────────────────────────────────────────────────────────────────────────

/// Why an identity could not be resolved.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The caller presented no credentials; no fetch was attempted.
    #[error("no credentials are present")]
    Unauthenticated,
    /// A fetch was attempted and failed (network, platform error, bad body).
    #[error(transparent)]
    Unavailable(#[from] PlatformError),
}

/// Source of the caller's identity, injected into the gate.
pub trait IdentityProvider {
    /// Resolve the caller's identity.
    fn fetch_identity(&self) -> impl Future<Output = Result<Identity, IdentityError>> + Send;

    /// Persist a new persona for the caller and return the updated identity.
    fn update_user_type(
        &self,
        user_type: UserType,
    ) -> impl Future<Output = Result<Identity, IdentityError>> + Send;
}

/// [`IdentityProvider`] backed by the platform API with an optional bearer
/// token from the caller's session.
pub struct PlatformIdentityProvider {
    client: PlatformClient,
    access_token: Option<String>,
}

impl PlatformIdentityProvider {
    /// Create a provider for one request's credentials.
    #[must_use]
    pub const fn new(client: PlatformClient, access_token: Option<String>) -> Self {
        Self {
            client,
            access_token,
        }
    }

    fn token(&self) -> Result<&str, IdentityError> {
        self.access_token
            .as_deref()
            .ok_or(IdentityError::Unauthenticated)
    }
}

impl IdentityProvider for PlatformIdentityProvider {
    async fn fetch_identity(&self) -> Result<Identity, IdentityError> {
        let token = self.token()?;
        Ok(self.client.me(token).await?)
    }

    async fn update_user_type(&self, user_type: UserType) -> Result<Identity, IdentityError> {
        let token = self.token()?;
        Ok(self.client.update_user_type(token, user_type).await?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Access Gate
// ─────────────────────────────────────────────────────────────────────────────

/// Evaluates one screen's [`GuardConfig`] against the caller's identity.
pub struct AccessGate<'a, P> {
    provider: &'a P,
    config: GuardConfig,
}

impl<'a, P> AccessGate<'a, P>
where
    P: IdentityProvider + Sync,
{
    /// Create a gate for one request.
    pub const fn new(provider: &'a P, config: GuardConfig) -> Self {
        Self { provider, config }
    }

    /// Decide the outcome for this request.
    ///
    /// Performs one identity fetch and at most one persona sync write; never
    /// errors. A failed fetch resolves to the role-selection redirect so a
    /// flaky platform funnels callers into onboarding instead of an error
    /// page, and an absent session resolves to a sign-in prompt.
    pub async fn evaluate(&self) -> GateOutcome {
        let mut identity = match self.provider.fetch_identity().await {
            Ok(identity) => identity,
            Err(IdentityError::Unauthenticated) => return GateOutcome::AuthRequired,
            Err(IdentityError::Unavailable(err)) => {
                tracing::warn!(error = %err, "identity fetch failed, sending caller to role selection");
                return GateOutcome::Redirect(RedirectTarget::RoleSelection);
            }
        };

        // Sync a stale persona for elevated accounts before deciding, so no
        // screen ever observes role = admin with a non-admin persona. Awaited
        // here; optimistic if the write fails.
        if identity.role == PlatformRole::Admin && identity.user_type != Some(UserType::Admin) {
            match self.provider.update_user_type(UserType::Admin).await {
                Ok(updated) => identity = updated,
                Err(err) => {
                    tracing::warn!(error = %err, "admin persona sync failed, proceeding in memory");
                }
            }
            identity.user_type = Some(UserType::Admin);
        }

        // No persona yet: onboarding, regardless of what the screen wanted.
        let Some(user_type) = identity.user_type else {
            return GateOutcome::Redirect(RedirectTarget::RoleSelection);
        };

        // Admins pass every remaining check.
        if identity.has_admin_access() {
            return GateOutcome::Allowed(identity);
        }

        if self.config.require_admin {
            return GateOutcome::Denied(DenialReason::AdminRequired);
        }

        if !self.config.permits(user_type) {
            // Wrong persona for this screen: send the caller home. Personas
            // without a home are denied rather than silently admitted.
            return match RedirectTarget::dashboard_for(user_type) {
                Some(target) => GateOutcome::Redirect(target),
                None => GateOutcome::Denied(DenialReason::NotPermitted),
            };
        }

        GateOutcome::Allowed(identity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pharmanet_core::{Email, UserId};

    use super::*;

    /// Scripted identity source counting calls, standing in for the platform.
    #[derive(Default)]
    struct MockProvider {
        identity: Mutex<Option<Identity>>,
        unavailable: bool,
        fail_update: bool,
        fetch_calls: AtomicUsize,
        update_calls: AtomicUsize,
    }

    impl MockProvider {
        fn with_identity(identity: Identity) -> Self {
            Self {
                identity: Mutex::new(Some(identity)),
                ..Self::default()
            }
        }

        fn unavailable() -> Self {
            Self {
                unavailable: true,
                ..Self::default()
            }
        }

        fn fetches(&self) -> usize {
            self.fetch_calls.load(Ordering::SeqCst)
        }

        fn updates(&self) -> usize {
            self.update_calls.load(Ordering::SeqCst)
        }
    }

    impl IdentityProvider for MockProvider {
        async fn fetch_identity(&self) -> Result<Identity, IdentityError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            if self.unavailable {
                return Err(IdentityError::Unavailable(PlatformError::Api {
                    status: 500,
                    message: "platform down".to_string(),
                }));
            }
            self.identity
                .lock()
                .unwrap()
                .clone()
                .ok_or(IdentityError::Unauthenticated)
        }

        async fn update_user_type(&self, user_type: UserType) -> Result<Identity, IdentityError> {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_update {
                return Err(IdentityError::Unavailable(PlatformError::Api {
                    status: 503,
                    message: "write rejected".to_string(),
                }));
            }
            let mut guard = self.identity.lock().unwrap();
            let identity = guard.as_mut().ok_or(IdentityError::Unauthenticated)?;
            identity.user_type = Some(user_type);
            Ok(identity.clone())
        }
    }

    fn identity(role: PlatformRole, user_type: Option<UserType>) -> Identity {
        Identity {
            id: UserId::new("usr_01j8"),
            email: Email::parse("casey@rxbridge.example").unwrap(),
            full_name: None,
            role,
            user_type,
        }
    }

    async fn outcome(provider: &MockProvider, config: GuardConfig) -> GateOutcome {
        AccessGate::new(provider, config).evaluate().await
    }

    const ALL_CONFIGS: [GuardConfig; 4] = [
        SignedIn::CONFIG,
        EmployerOnly::CONFIG,
        PharmacistOnly::CONFIG,
        AdminOnly::CONFIG,
    ];

    #[test]
    fn test_permits_empty_allows_all() {
        assert!(GuardConfig::AUTHENTICATED.permits(UserType::Employer));
        assert!(GuardConfig::AUTHENTICATED.permits(UserType::Unknown));
    }

    #[test]
    fn test_permits_listed_only() {
        let config = GuardConfig::allowing(&[UserType::Employer]);
        assert!(config.permits(UserType::Employer));
        assert!(!config.permits(UserType::Pharmacist));
        assert!(!config.permits(UserType::Unknown));
    }

    #[test]
    fn test_dashboard_for() {
        assert_eq!(
            RedirectTarget::dashboard_for(UserType::Employer),
            Some(RedirectTarget::EmployerDashboard)
        );
        assert_eq!(
            RedirectTarget::dashboard_for(UserType::Pharmacist),
            Some(RedirectTarget::PharmacistDashboard)
        );
        assert_eq!(
            RedirectTarget::dashboard_for(UserType::Admin),
            Some(RedirectTarget::AdminDashboard)
        );
        assert_eq!(RedirectTarget::dashboard_for(UserType::Unknown), None);
    }

    #[test]
    fn test_redirect_paths() {
        assert_eq!(RedirectTarget::RoleSelection.path(), "/onboarding/role");
        assert_eq!(RedirectTarget::EmployerDashboard.path(), "/employer");
        assert_eq!(RedirectTarget::PharmacistDashboard.path(), "/pharmacist");
        assert_eq!(RedirectTarget::AdminDashboard.path(), "/admin");
    }

    #[tokio::test]
    async fn test_admin_role_passes_every_config() {
        for config in ALL_CONFIGS {
            let provider = MockProvider::with_identity(identity(
                PlatformRole::Admin,
                Some(UserType::Admin),
            ));
            let result = outcome(&provider, config).await;
            assert!(
                matches!(result, GateOutcome::Allowed(_)),
                "admin was not allowed for {config:?}: {result:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_admin_persona_passes_admin_screens() {
        // role = standard but persona = admin still counts as admin
        let provider = MockProvider::with_identity(identity(
            PlatformRole::Standard,
            Some(UserType::Admin),
        ));
        let result = outcome(&provider, AdminOnly::CONFIG).await;
        assert!(matches!(result, GateOutcome::Allowed(_)));
        // No sync: the role is not admin
        assert_eq!(provider.updates(), 0);
    }

    #[tokio::test]
    async fn test_admin_with_stale_persona_is_synced_once() {
        let provider = MockProvider::with_identity(identity(
            PlatformRole::Admin,
            Some(UserType::Employer),
        ));

        let result = outcome(&provider, SignedIn::CONFIG).await;
        let GateOutcome::Allowed(resolved) = result else {
            panic!("expected allowed, got {result:?}");
        };
        assert_eq!(resolved.user_type, Some(UserType::Admin));
        assert_eq!(provider.updates(), 1);

        // The provider now serves the synced persona; a second evaluation
        // needs no further write.
        let result = outcome(&provider, SignedIn::CONFIG).await;
        assert!(matches!(result, GateOutcome::Allowed(_)));
        assert_eq!(provider.updates(), 1);
        assert_eq!(provider.fetches(), 2);
    }

    #[tokio::test]
    async fn test_admin_without_persona_is_synced() {
        let provider = MockProvider::with_identity(identity(PlatformRole::Admin, None));

        let result = outcome(&provider, EmployerOnly::CONFIG).await;
        let GateOutcome::Allowed(resolved) = result else {
            panic!("expected allowed, got {result:?}");
        };
        assert_eq!(resolved.user_type, Some(UserType::Admin));
        assert_eq!(provider.updates(), 1);
    }

    #[tokio::test]
    async fn test_failed_sync_proceeds_as_admin() {
        let provider = MockProvider {
            identity: Mutex::new(Some(identity(PlatformRole::Admin, Some(UserType::Employer)))),
            fail_update: true,
            ..MockProvider::default()
        };

        let result = outcome(&provider, AdminOnly::CONFIG).await;
        let GateOutcome::Allowed(resolved) = result else {
            panic!("expected allowed, got {result:?}");
        };
        // In-memory persona is admin even though the write failed
        assert_eq!(resolved.user_type, Some(UserType::Admin));
        assert_eq!(provider.updates(), 1);
    }

    #[tokio::test]
    async fn test_unset_persona_redirects_to_role_selection() {
        for config in ALL_CONFIGS {
            let provider = MockProvider::with_identity(identity(PlatformRole::Standard, None));
            let result = outcome(&provider, config).await;
            assert_eq!(
                result,
                GateOutcome::Redirect(RedirectTarget::RoleSelection),
                "unset persona should always onboard, config {config:?}"
            );
            assert_eq!(provider.updates(), 0);
        }
    }

    #[tokio::test]
    async fn test_require_admin_denies_permitted_persona() {
        // Even a config that lists the persona denies when admin is required
        let config = GuardConfig {
            allowed: &[UserType::Pharmacist],
            require_admin: true,
        };
        let provider = MockProvider::with_identity(identity(
            PlatformRole::Standard,
            Some(UserType::Pharmacist),
        ));

        assert_eq!(
            outcome(&provider, config).await,
            GateOutcome::Denied(DenialReason::AdminRequired)
        );
    }

    #[tokio::test]
    async fn test_wrong_persona_redirects_to_own_dashboard() {
        let provider = MockProvider::with_identity(identity(
            PlatformRole::Standard,
            Some(UserType::Pharmacist),
        ));

        assert_eq!(
            outcome(&provider, EmployerOnly::CONFIG).await,
            GateOutcome::Redirect(RedirectTarget::PharmacistDashboard)
        );
        assert_eq!(provider.updates(), 0);

        let provider = MockProvider::with_identity(identity(
            PlatformRole::Standard,
            Some(UserType::Employer),
        ));

        assert_eq!(
            outcome(&provider, PharmacistOnly::CONFIG).await,
            GateOutcome::Redirect(RedirectTarget::EmployerDashboard)
        );
    }

    #[tokio::test]
    async fn test_unknown_persona_is_denied_on_restricted_screens() {
        let provider = MockProvider::with_identity(identity(
            PlatformRole::Standard,
            Some(UserType::Unknown),
        ));

        assert_eq!(
            outcome(&provider, EmployerOnly::CONFIG).await,
            GateOutcome::Denied(DenialReason::NotPermitted)
        );
    }

    #[tokio::test]
    async fn test_unknown_persona_passes_unrestricted_screens() {
        let provider = MockProvider::with_identity(identity(
            PlatformRole::Standard,
            Some(UserType::Unknown),
        ));

        assert!(matches!(
            outcome(&provider, SignedIn::CONFIG).await,
            GateOutcome::Allowed(_)
        ));
    }

    #[tokio::test]
    async fn test_matching_persona_is_allowed() {
        let provider = MockProvider::with_identity(identity(
            PlatformRole::Standard,
            Some(UserType::Employer),
        ));

        assert!(matches!(
            outcome(&provider, EmployerOnly::CONFIG).await,
            GateOutcome::Allowed(_)
        ));
        assert!(matches!(
            outcome(&provider, SignedIn::CONFIG).await,
            GateOutcome::Allowed(_)
        ));
    }

    #[tokio::test]
    async fn test_fetch_failure_redirects_to_role_selection() {
        // A flaky platform funnels callers into onboarding, never an error
        for config in ALL_CONFIGS {
            let provider = MockProvider::unavailable();
            assert_eq!(
                outcome(&provider, config).await,
                GateOutcome::Redirect(RedirectTarget::RoleSelection),
                "fetch failure should onboard, config {config:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_no_credentials_prompts_sign_in() {
        let provider = MockProvider::default();
        assert_eq!(
            outcome(&provider, SignedIn::CONFIG).await,
            GateOutcome::AuthRequired
        );
        assert_eq!(
            outcome(&provider, AdminOnly::CONFIG).await,
            GateOutcome::AuthRequired
        );
    }

    #[tokio::test]
    async fn test_admin_employer_on_admin_screen_scenario() {
        // role admin + persona employer on an admin-only screen: one sync
        // write, then allowed
        let provider = MockProvider::with_identity(identity(
            PlatformRole::Admin,
            Some(UserType::Employer),
        ));

        let result = outcome(&provider, AdminOnly::CONFIG).await;
        assert!(matches!(result, GateOutcome::Allowed(_)));
        assert_eq!(provider.updates(), 1);
        assert_eq!(provider.fetches(), 1);
    }

    #[tokio::test]
    async fn test_pharmacist_on_employer_screen_scenario() {
        // standard pharmacist on an employer-only screen: sent home, no writes
        let provider = MockProvider::with_identity(identity(
            PlatformRole::Standard,
            Some(UserType::Pharmacist),
        ));

        assert_eq!(
            outcome(&provider, EmployerOnly::CONFIG).await,
            GateOutcome::Redirect(RedirectTarget::PharmacistDashboard)
        );
        assert_eq!(provider.updates(), 0);
    }
}
