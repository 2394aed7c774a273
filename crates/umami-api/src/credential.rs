// The shared credential slot read by every outgoing request.
//
// Writes go through the session layer only; the gateway reads the
// current value lock-free when building each request.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use secrecy::SecretString;

/// Lock-free holder for the current authorization token.
///
/// `None` means anonymous: the gateway omits the `Authorization` header
/// entirely. Readers never block writers and vice versa, so subscribers
/// always observe either the old or the new credential, never a torn
/// intermediate.
#[derive(Default)]
pub struct CredentialCell {
    token: ArcSwapOption<SecretString>,
}

impl CredentialCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current credential, if any (cheap `Arc` clone).
    pub fn current(&self) -> Option<Arc<SecretString>> {
        self.token.load_full()
    }

    /// Replace the credential.
    pub fn set(&self, token: SecretString) {
        self.token.store(Some(Arc::new(token)));
    }

    /// Drop the credential; subsequent requests go out anonymous.
    pub fn clear(&self) {
        self.token.store(None);
    }

    pub fn is_present(&self) -> bool {
        self.token.load().is_some()
    }
}

impl std::fmt::Debug for CredentialCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the token itself.
        f.debug_struct("CredentialCell")
            .field("present", &self.is_present())
            .finish()
    }
}
