// Star rating for a displayed recipe.

use std::sync::Arc;

use indexmap::IndexMap;
use tokio::sync::watch;
use tracing::warn;

use umami_api::ApiClient;
use umami_api::models::RatingResponse;

use crate::error::CoreError;
use crate::model::{RecipeId, RecipeStats};
use crate::mutation::{Feature, MutationExecutor};

/// The user's own rating (0 = unrated) plus the recipe's aggregates.
///
/// Only the user's own star value is updated optimistically; the
/// average and count are never guessed locally -- a full entity refetch
/// after the commit brings them in.
pub struct RatingController {
    api: Arc<ApiClient>,
    executor: Arc<MutationExecutor>,
    recipe: RecipeId,
    user_rating: watch::Sender<u8>,
    stats: watch::Sender<RecipeStats>,
}

impl RatingController {
    pub fn new(
        api: Arc<ApiClient>,
        executor: Arc<MutationExecutor>,
        recipe: RecipeId,
        initial: RecipeStats,
    ) -> Self {
        let (user_rating, _) = watch::channel(initial.user_rating.unwrap_or(0));
        let (stats, _) = watch::channel(initial);
        Self {
            api,
            executor,
            recipe,
            user_rating,
            stats,
        }
    }

    pub fn recipe(&self) -> RecipeId {
        self.recipe
    }

    /// The user's own star value; 0 while unrated.
    pub fn user_rating(&self) -> u8 {
        *self.user_rating.borrow()
    }

    pub fn stats(&self) -> RecipeStats {
        self.stats.borrow().clone()
    }

    pub fn subscribe_rating(&self) -> watch::Receiver<u8> {
        self.user_rating.subscribe()
    }

    pub fn subscribe_stats(&self) -> watch::Receiver<RecipeStats> {
        self.stats.subscribe()
    }

    /// Rehydrate from freshly fetched server data.
    pub fn set_stats(&self, stats: RecipeStats) {
        self.user_rating.send_replace(stats.user_rating.unwrap_or(0));
        self.stats.send_replace(stats);
    }

    /// Submit a star rating (1-5).
    ///
    /// Out-of-range values are rejected locally with the server's own
    /// wording, before any state change. After the commit the recipe is
    /// refetched for the authoritative average and count; a refetch
    /// failure degrades with a warning and does not undo the rating.
    pub async fn rate(&self, stars: u8) -> Result<u8, CoreError> {
        if !(1..=5).contains(&stars) {
            let message = "Please provide a valid rating between 1 and 5.".to_owned();
            let mut fields = IndexMap::new();
            fields.insert("rating".to_owned(), vec![message.clone()]);
            return Err(CoreError::Validation { fields, message });
        }

        let api = Arc::clone(&self.api);
        let recipe = self.recipe.0;
        let stats = &self.stats;

        let accepted = self
            .executor
            .run(
                Feature::Rating,
                recipe,
                &self.user_rating,
                stars,
                move || async move { api.rate(recipe, stars).await },
                |resp: &RatingResponse| {
                    // The rate response carries fresh aggregates inline;
                    // apply them ahead of the full refetch.
                    if let (Some(average), Some(count)) = (resp.average_rating, resp.rating_count) {
                        stats.send_modify(|s| {
                            s.average_rating = average;
                            s.rating_count = count;
                        });
                    }
                    resp.rating
                },
            )
            .await?;

        self.refetch_stats().await;
        Ok(accepted)
    }

    /// Pull the authoritative aggregates after a rating commit.
    async fn refetch_stats(&self) {
        match self.api.recipe(self.recipe.0).await {
            Ok(detail) => self.set_stats(RecipeStats::from(detail)),
            Err(e) => {
                warn!(recipe = %self.recipe, error = %e, "aggregate refetch failed after rating");
            }
        }
    }
}
