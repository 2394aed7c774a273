// Unread-notification badge.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::warn;

use umami_api::ApiClient;

use crate::error::CoreError;
use crate::session::SessionStore;

/// Poll-on-mount unread count. Not optimistic -- there is no local
/// guess to make; the server value is taken directly.
pub struct NotificationBadge {
    api: Arc<ApiClient>,
    session: SessionStore,
    count: watch::Sender<u64>,
}

impl NotificationBadge {
    pub fn new(api: Arc<ApiClient>, session: SessionStore) -> Self {
        let (count, _) = watch::channel(0);
        Self {
            api,
            session,
            count,
        }
    }

    pub fn count(&self) -> u64 {
        *self.count.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.count.subscribe()
    }

    /// Fetch the unread count.
    ///
    /// Anonymous callers are blocked client-side (the badge isn't
    /// rendered for them anyway). Transport failures degrade to 0 --
    /// the badge is best-effort and never crashes a view.
    pub async fn poll(&self) -> Result<u64, CoreError> {
        if !self.session.is_authenticated() {
            return Err(CoreError::AuthRequired);
        }

        let count = match self.api.notification_count().await {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, "notification count fetch failed");
                0
            }
        };

        self.count.send_replace(count);
        Ok(count)
    }
}
