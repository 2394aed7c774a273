// Recipe interaction endpoints: detail refetch, favorite toggle,
// rating submission, and the comment list/create pair.

use serde_json::Value;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{
    CommentPayload, CommentRequest, FavoriteResponse, RatingRequest, RatingResponse, RecipeDetail,
};
use crate::normalize;

impl ApiClient {
    /// Fetch a recipe's detail (including rating/favorite aggregates).
    ///
    /// `GET recipes/{id}/`. Used to rehydrate interaction state and to
    /// refetch authoritative counts after a rating or favorite change.
    pub async fn recipe(&self, recipe_id: i64) -> Result<RecipeDetail, Error> {
        self.get(&format!("recipes/{recipe_id}/")).await
    }

    /// Toggle the favorite flag. `POST recipes/{id}/favorite/`.
    ///
    /// Server-side toggle semantics: the same call favorites and
    /// unfavorites depending on current state.
    pub async fn favorite(&self, recipe_id: i64) -> Result<FavoriteResponse, Error> {
        self.post_empty(&format!("recipes/{recipe_id}/favorite/"))
            .await
    }

    /// Submit a star rating (1-5). `POST recipes/{id}/rate/`.
    pub async fn rate(&self, recipe_id: i64, rating: u8) -> Result<RatingResponse, Error> {
        self.post(&format!("recipes/{recipe_id}/rate/"), &RatingRequest { rating })
            .await
    }

    /// List a recipe's comments, newest first.
    ///
    /// `GET recipes/{id}/comments/`. The endpoint has returned both a
    /// bare array and a paginated envelope; the normalizer absorbs the
    /// difference and malformed elements are dropped, not propagated.
    pub async fn comments(&self, recipe_id: i64) -> Result<Vec<CommentPayload>, Error> {
        let payload: Value = self.get(&format!("recipes/{recipe_id}/comments/")).await?;
        Ok(normalize::parse_list(&payload, &["comments"]))
    }

    /// Create a comment. `POST recipes/{id}/comments/` with `{text}`.
    pub async fn post_comment(
        &self,
        recipe_id: i64,
        text: &str,
    ) -> Result<CommentPayload, Error> {
        let body = CommentRequest {
            text: text.to_owned(),
        };
        self.post(&format!("recipes/{recipe_id}/comments/"), &body)
            .await
    }
}
