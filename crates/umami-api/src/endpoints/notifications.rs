// Notification endpoints.

use serde_json::Value;

use crate::client::ApiClient;
use crate::error::Error;
use crate::normalize;

impl ApiClient {
    /// Fetch the unread notification count. `GET notifications/count/`.
    ///
    /// Returns the `count` field of the payload, or 0 when the shape is
    /// unexpected -- the badge is best-effort.
    pub async fn notification_count(&self) -> Result<u64, Error> {
        let payload: Value = self.get("notifications/count/").await?;
        Ok(normalize::count(&payload))
    }
}
