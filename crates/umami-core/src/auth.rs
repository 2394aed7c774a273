// ── Auth flow controller ──
//
// Drives the session state machine:
//   anonymous --login--> resolving --success--> authenticated
//   resolving --failure--> anonymous
//   authenticated --logout--> anonymous
// The flow is the sole writer of the credential; everything funnels
// through the session store's write operations.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::{debug, warn};

use umami_api::ApiClient;
use umami_api::models::RegistrationRequest;

use crate::error::CoreError;
use crate::model::Identity;
use crate::session::{SessionStatus, SessionStore};

/// Hook into a third-party identity provider's client-side SDK.
///
/// Only the local session-clear hook is needed here; the provider's
/// token acquisition happens in the rendering layer.
pub trait FederatedProvider: Send + Sync {
    /// Clear the provider's own local session. Best-effort: failures
    /// are swallowed by the caller.
    fn clear_session(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Registration form fields, matching the backend's expectations.
#[derive(Debug, Clone)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password1: String,
    pub password2: String,
}

impl From<&RegistrationForm> for RegistrationRequest {
    fn from(form: &RegistrationForm) -> Self {
        Self {
            username: form.username.clone(),
            email: form.email.clone(),
            password1: form.password1.clone(),
            password2: form.password2.clone(),
        }
    }
}

/// What a successful registration left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// The backend issued a credential inline; the user is signed in.
    SignedIn(Arc<Identity>),
    /// Account created, but the user must log in separately.
    LoginRequired,
}

/// Login, registration, federated login, and logout.
pub struct AuthFlow {
    api: Arc<ApiClient>,
    session: SessionStore,
    provider: Option<Arc<dyn FederatedProvider>>,
}

impl AuthFlow {
    pub fn new(api: Arc<ApiClient>, session: SessionStore) -> Self {
        Self {
            api,
            session,
            provider: None,
        }
    }

    /// Attach a federated provider whose local session is cleared on
    /// logout.
    pub fn with_provider(mut self, provider: Arc<dyn FederatedProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    // ── Startup restore ──────────────────────────────────────────────

    /// Settle the session at process start.
    ///
    /// A stored credential moves the session to `Resolving` and kicks
    /// off the identity fetch; a rejected credential is cleared and the
    /// session degrades to `Anonymous` without surfacing an error --
    /// the user simply sees the logged-out UI.
    pub async fn resolve(&self) -> SessionStatus {
        if !self.session.restore_from_storage() {
            return SessionStatus::Anonymous;
        }

        match self.api.current_user().await {
            Ok(profile) => {
                let identity = Identity::from(profile);
                debug!(user = %identity.username, "session restored");
                self.session.set_authenticated(identity);
                SessionStatus::Authenticated
            }
            Err(e) => {
                warn!(error = %e, "stored credential rejected -- degrading to logged out");
                self.session.invalidate();
                SessionStatus::Anonymous
            }
        }
    }

    // ── Login ────────────────────────────────────────────────────────

    /// Email/password login.
    ///
    /// Two round trips: credential issuance, then the identity fetch.
    /// Login is only successful once the identity resolves -- a
    /// credential with no resolvable identity is an invalid session and
    /// is cleared again. Failures before the credential is issued leave
    /// the session untouched.
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<Arc<Identity>, CoreError> {
        let issued = self.api.login(email, password).await?;

        let Some(key) = issued.key.filter(|k| !k.is_empty()) else {
            return Err(CoreError::AuthenticationFailed {
                message: "No authentication token received".into(),
            });
        };

        self.session.set_credential(Some(SecretString::from(key)));
        self.fetch_identity_or_invalidate().await
    }

    /// Register a new account.
    ///
    /// Backends differ: some issue a credential inline (then this
    /// behaves like login's post-credential identity fetch), others
    /// require a separate login afterwards. Field-level validation
    /// failures pass through verbatim.
    pub async fn register(
        &self,
        form: &RegistrationForm,
    ) -> Result<RegistrationOutcome, CoreError> {
        let resp = self.api.register(&form.into()).await?;

        let Some(token) = resp.access.filter(|t| !t.is_empty()) else {
            debug!("registration succeeded without an inline credential");
            return Ok(RegistrationOutcome::LoginRequired);
        };

        self.session
            .set_credential(Some(SecretString::from(token)));
        match self.fetch_identity_or_invalidate().await {
            Ok(identity) => Ok(RegistrationOutcome::SignedIn(identity)),
            Err(_) => {
                // Account exists but the inline credential didn't
                // resolve; the user logs in normally.
                Ok(RegistrationOutcome::LoginRequired)
            }
        }
    }

    /// Exchange a federated provider token for our credential.
    ///
    /// One round trip: the response carries both the credential and the
    /// identity, so no second fetch is needed. A response without a
    /// credential is a failure and leaves the session untouched.
    pub async fn login_with_provider(
        &self,
        provider_token: &str,
    ) -> Result<Arc<Identity>, CoreError> {
        let resp = self.api.federated_login(provider_token).await?;

        let (Some(access), Some(user)) = (resp.access.filter(|t| !t.is_empty()), resp.user) else {
            return Err(CoreError::AuthenticationFailed {
                message: "No authentication token received".into(),
            });
        };

        self.session
            .set_credential(Some(SecretString::from(access)));
        let identity = Identity::from(user);
        self.session.set_authenticated(identity.clone());
        debug!(user = %identity.username, "federated login complete");
        Ok(Arc::new(identity))
    }

    // ── Logout ───────────────────────────────────────────────────────

    /// End the session. Always succeeds locally: the server call and
    /// the provider hook are best-effort, but credential and identity
    /// are cleared regardless.
    pub async fn logout(&self) {
        if let Err(e) = self.api.logout().await {
            warn!(error = %e, "server logout failed (non-fatal)");
        }

        if let Some(ref provider) = self.provider {
            if let Err(e) = provider.clear_session() {
                warn!(error = %e, "federated provider logout failed (non-fatal)");
            }
        }

        self.session.invalidate();
        debug!("logged out");
    }

    // ── Helpers ──────────────────────────────────────────────────────

    /// Second leg of every credential-first flow: fetch the identity or
    /// tear the just-stored credential back down.
    async fn fetch_identity_or_invalidate(&self) -> Result<Arc<Identity>, CoreError> {
        match self.api.current_user().await {
            Ok(profile) => {
                let identity = Identity::from(profile);
                self.session.set_authenticated(identity.clone());
                debug!(user = %identity.username, "identity resolved");
                Ok(Arc::new(identity))
            }
            Err(e) => {
                warn!(error = %e, "identity fetch failed after credential issuance");
                self.session.invalidate();
                Err(CoreError::SessionInvalid)
            }
        }
    }
}
