// Favorite toggle for a displayed recipe.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::warn;

use umami_api::ApiClient;
use umami_api::models::FavoriteResponse;

use crate::error::CoreError;
use crate::model::{RecipeId, RecipeStats};
use crate::mutation::{Feature, MutationExecutor};

/// Favorite flag for one recipe.
///
/// The toggle endpoint is idempotent server-side and reports no
/// authoritative flag we rely on, so the optimistic value is kept and
/// the favorite count is refreshed by refetching the entity.
pub struct FavoriteController {
    api: Arc<ApiClient>,
    executor: Arc<MutationExecutor>,
    recipe: RecipeId,
    favorite: watch::Sender<bool>,
}

impl FavoriteController {
    pub fn new(
        api: Arc<ApiClient>,
        executor: Arc<MutationExecutor>,
        recipe: RecipeId,
        initially_favorite: bool,
    ) -> Self {
        let (favorite, _) = watch::channel(initially_favorite);
        Self {
            api,
            executor,
            recipe,
            favorite,
        }
    }

    pub fn recipe(&self) -> RecipeId {
        self.recipe
    }

    pub fn is_favorite(&self) -> bool {
        *self.favorite.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.favorite.subscribe()
    }

    /// Rehydrate from freshly fetched server data.
    pub fn set_favorite(&self, favorite: bool) {
        self.favorite.send_replace(favorite);
    }

    /// Toggle the favorite flag optimistically.
    pub async fn toggle(&self) -> Result<bool, CoreError> {
        let api = Arc::clone(&self.api);
        let recipe = self.recipe.0;

        self.executor
            .run(
                Feature::Favorite,
                recipe,
                &self.favorite,
                !self.is_favorite(),
                move || async move { api.favorite(recipe).await },
                |_resp: &FavoriteResponse| None,
            )
            .await
    }

    /// Refetch the recipe for the authoritative favorite count.
    ///
    /// Also rehydrates the flag from the response. Read-path: a failure
    /// degrades to `None` with a warning and never disturbs the flag.
    pub async fn refresh_stats(&self) -> Option<RecipeStats> {
        match self.api.recipe(self.recipe.0).await {
            Ok(detail) => {
                let stats = RecipeStats::from(detail);
                self.favorite.send_replace(stats.is_favorite);
                Some(stats)
            }
            Err(e) => {
                warn!(recipe = %self.recipe, error = %e, "favorite count refresh failed");
                None
            }
        }
    }
}
