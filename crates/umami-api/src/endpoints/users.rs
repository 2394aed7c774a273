// User and follow endpoints.

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{FollowToggleResponse, UserProfile};

impl ApiClient {
    /// Fetch a user's profile with follow stats. `GET users/{id}/`.
    pub async fn user_profile(&self, user_id: i64) -> Result<UserProfile, Error> {
        self.get(&format!("users/{user_id}/")).await
    }

    /// Start following a user. `POST users/{id}/follow/`.
    ///
    /// The server reports the resulting flag even when the relation
    /// already existed, so a repeated follow is not an error.
    pub async fn follow(&self, user_id: i64) -> Result<FollowToggleResponse, Error> {
        self.post_empty(&format!("users/{user_id}/follow/")).await
    }

    /// Stop following a user. `DELETE users/{id}/unfollow/`.
    pub async fn unfollow(&self, user_id: i64) -> Result<FollowToggleResponse, Error> {
        self.delete(&format!("users/{user_id}/unfollow/")).await
    }
}
