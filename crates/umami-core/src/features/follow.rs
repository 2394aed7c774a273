// Follow/unfollow toggle for a displayed user.

use std::sync::Arc;

use tokio::sync::watch;

use umami_api::ApiClient;
use umami_api::models::FollowToggleResponse;

use crate::error::CoreError;
use crate::model::UserId;
use crate::mutation::{Feature, MutationExecutor};

/// Follow state for one target user.
///
/// Construction is the presentation boundary for the self-follow rule:
/// [`for_target`](Self::for_target) returns `None` when the target is
/// the signed-in user, and the control simply isn't rendered.
pub struct FollowController {
    api: Arc<ApiClient>,
    executor: Arc<MutationExecutor>,
    target: UserId,
    following: watch::Sender<bool>,
}

impl FollowController {
    /// Create a controller for `target`, or `None` when the target is
    /// the current user (self-follow is suppressed, not rejected).
    pub fn for_target(
        api: Arc<ApiClient>,
        executor: Arc<MutationExecutor>,
        target: UserId,
        initially_following: bool,
    ) -> Option<Self> {
        if executor
            .session()
            .identity()
            .is_some_and(|me| me.id == target)
        {
            return None;
        }

        let (following, _) = watch::channel(initially_following);
        Some(Self {
            api,
            executor,
            target,
            following,
        })
    }

    pub fn target(&self) -> UserId {
        self.target
    }

    pub fn is_following(&self) -> bool {
        *self.following.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.following.subscribe()
    }

    /// Rehydrate from freshly fetched server data.
    pub fn set_following(&self, following: bool) {
        self.following.send_replace(following);
    }

    /// Toggle the follow state optimistically.
    ///
    /// POST follow / DELETE unfollow is chosen by the value before the
    /// toggle. The server's `is_following` flag wins when present;
    /// otherwise the optimistic value stands until the next refetch.
    pub async fn toggle(&self) -> Result<bool, CoreError> {
        let previously_following = self.is_following();
        let api = Arc::clone(&self.api);
        let target = self.target.0;

        self.executor
            .run(
                Feature::Follow,
                target,
                &self.following,
                !previously_following,
                move || async move {
                    if previously_following {
                        api.unfollow(target).await
                    } else {
                        api.follow(target).await
                    }
                },
                |resp: &FollowToggleResponse| resp.is_following,
            )
            .await
    }
}
