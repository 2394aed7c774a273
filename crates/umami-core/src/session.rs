// ── Session store ──
//
// The single owner of the credential and the resolved identity. Every
// credential write in the process goes through this store, so
// subscribers observe a consistent sequence of whole-session
// transitions, never a partially-applied one.

use std::sync::{Arc, Mutex};

use secrecy::{ExposeSecret, SecretString};
use strum::Display;
use tokio::sync::watch;
use tracing::{debug, warn};

use umami_api::CredentialCell;

use crate::model::Identity;

// ── Session ─────────────────────────────────────────────────────────

/// Where the session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SessionStatus {
    /// Process start; the stored credential has not been checked yet.
    Unresolved,
    /// A credential exists and the identity lookup is in flight.
    Resolving,
    /// Credential valid, identity known.
    Authenticated,
    /// No usable credential.
    Anonymous,
}

/// The observable session state.
///
/// Invariant: `identity` is `Some` exactly when `status` is
/// [`Authenticated`](SessionStatus::Authenticated). Construction goes
/// through the helpers below so the invariant holds by shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub status: SessionStatus,
    pub identity: Option<Arc<Identity>>,
}

impl Session {
    pub fn unresolved() -> Self {
        Self {
            status: SessionStatus::Unresolved,
            identity: None,
        }
    }

    pub fn resolving() -> Self {
        Self {
            status: SessionStatus::Resolving,
            identity: None,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            status: SessionStatus::Anonymous,
            identity: None,
        }
    }

    pub fn authenticated(identity: Arc<Identity>) -> Self {
        Self {
            status: SessionStatus::Authenticated,
            identity: Some(identity),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    /// The identity/status invariant, checked at the single write point.
    pub fn is_consistent(&self) -> bool {
        self.identity.is_some() == (self.status == SessionStatus::Authenticated)
    }
}

// ── Durable credential storage ──────────────────────────────────────

/// Durable client-side storage for the credential (and nothing else).
///
/// Implementations are best-effort: a failed read is treated as "no
/// stored credential" by callers, never as an error.
pub trait CredentialStorage: Send + Sync {
    fn load(&self) -> Option<String>;
    fn store(&self, value: &str);
    fn clear(&self);
}

/// In-memory storage for tests and embedded use.
#[derive(Default)]
pub struct MemoryStorage {
    value: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a stored credential (simulates a prior run).
    pub fn with_value(value: &str) -> Self {
        Self {
            value: Mutex::new(Some(value.to_owned())),
        }
    }
}

impl CredentialStorage for MemoryStorage {
    fn load(&self) -> Option<String> {
        self.value.lock().ok()?.clone()
    }

    fn store(&self, value: &str) {
        if let Ok(mut guard) = self.value.lock() {
            *guard = Some(value.to_owned());
        }
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.value.lock() {
            *guard = None;
        }
    }
}

// ── SessionStore ────────────────────────────────────────────────────

/// Owner of the credential and session state.
///
/// Cheaply cloneable; all clones share one state channel and one
/// credential cell. Reads are synchronous; changes are broadcast via a
/// `watch` channel.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    state: watch::Sender<Session>,
    credential: Arc<CredentialCell>,
    storage: Arc<dyn CredentialStorage>,
}

impl SessionStore {
    /// Create a store starting in `Unresolved`; call
    /// [`AuthFlow::resolve`](crate::auth::AuthFlow::resolve) to settle it.
    pub fn new(credential: Arc<CredentialCell>, storage: Arc<dyn CredentialStorage>) -> Self {
        let (state, _) = watch::channel(Session::unresolved());
        Self {
            inner: Arc::new(SessionInner {
                state,
                credential,
                storage,
            }),
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Synchronous snapshot of the current session.
    pub fn session(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.inner.state.borrow().status
    }

    pub fn identity(&self) -> Option<Arc<Identity>> {
        self.inner.state.borrow().identity.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    /// Subscribe to session changes. The receiver sees every status or
    /// identity transition, each as a whole session.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    /// The credential cell shared with the request gateway.
    pub fn credential(&self) -> &Arc<CredentialCell> {
        &self.inner.credential
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Replace or clear the credential.
    ///
    /// `Some` persists the token and moves the session to `Resolving`
    /// (the identity is unknown until fetched). `None` clears storage
    /// and moves to `Anonymous`.
    pub fn set_credential(&self, credential: Option<SecretString>) {
        match credential {
            Some(token) => {
                self.inner.storage.store(token.expose_secret());
                self.inner.credential.set(token);
                self.apply(Session::resolving());
            }
            None => {
                self.inner.storage.clear();
                self.inner.credential.clear();
                self.apply(Session::anonymous());
            }
        }
    }

    /// Load a previously stored credential without re-persisting it.
    ///
    /// Returns `true` (and transitions to `Resolving`) when one exists;
    /// otherwise transitions to `Anonymous`.
    pub(crate) fn restore_from_storage(&self) -> bool {
        match self.inner.storage.load() {
            Some(token) => {
                debug!("stored credential found -- resolving identity");
                self.inner.credential.set(SecretString::from(token));
                self.apply(Session::resolving());
                true
            }
            None => {
                debug!("no stored credential -- starting anonymous");
                self.apply(Session::anonymous());
                false
            }
        }
    }

    /// Declare the session authenticated with a resolved identity.
    pub(crate) fn set_authenticated(&self, identity: Identity) {
        self.apply(Session::authenticated(Arc::new(identity)));
    }

    /// Tear the session down: clear credential, storage, and identity.
    ///
    /// Used for logout and for the invalid-session condition (identity
    /// fetch failed with a stored credential).
    pub(crate) fn invalidate(&self) {
        self.inner.storage.clear();
        self.inner.credential.clear();
        self.apply(Session::anonymous());
    }

    /// The single apply point. Everything that mutates session state
    /// funnels through here so the invariant is checked in one place.
    fn apply(&self, session: Session) {
        if !session.is_consistent() {
            // Unreachable via the constructors above; bail loudly in
            // debug builds, refuse the write in release.
            debug_assert!(session.is_consistent(), "inconsistent session write");
            warn!(status = %session.status, "refusing inconsistent session write");
            return;
        }
        debug!(status = %session.status, "session transition");
        self.inner.state.send_replace(session);
    }
}
