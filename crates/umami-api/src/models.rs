// Wire types for the Umami REST API.
//
// These mirror the server's JSON as-is, with `Option` and serde aliases
// wherever the backend has drifted between field names for the same
// concept. Domain types live in umami-core; these structs never leave
// the api/core boundary unconverted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Auth ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token issuance response. The token arrives under `key`.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegistrationRequest {
    pub username: String,
    pub email: String,
    pub password1: String,
    pub password2: String,
}

/// Registration response. Some deployments issue a token inline
/// (`access` or `access_token`); others require a separate login.
#[derive(Debug, Deserialize)]
pub struct RegistrationResponse {
    #[serde(alias = "access_token")]
    pub access: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FederatedLoginRequest {
    pub token: String,
}

/// Federated token exchange: credential and identity in one round trip.
#[derive(Debug, Deserialize)]
pub struct FederatedLoginResponse {
    #[serde(alias = "key", alias = "access_token")]
    pub access: Option<String>,
    pub user: Option<UserProfile>,
}

// ── Users ───────────────────────────────────────────────────────────

/// A user record as returned by `auth/user/` and `users/{id}/`.
///
/// The profile endpoint additionally carries follow stats; the identity
/// endpoint does not, hence the defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub followers_count: Option<u64>,
    #[serde(default)]
    pub following_count: Option<u64>,
    #[serde(default)]
    pub is_following: Option<bool>,
}

/// Follow/unfollow response. The authoritative flag is usually present
/// but not guaranteed; callers fall back to their proposed value.
#[derive(Debug, Deserialize)]
pub struct FollowToggleResponse {
    pub is_following: Option<bool>,
    #[serde(default)]
    pub detail: Option<String>,
}

// ── Recipes ─────────────────────────────────────────────────────────

/// The rating/favorite aggregate slice of a recipe detail payload.
///
/// Full recipe bodies carry much more (ingredients, instructions, image);
/// the interaction layer only reads the aggregates, so unknown fields
/// are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeDetail {
    pub id: i64,
    pub title: Option<String>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub rating_count: Option<u64>,
    #[serde(default, alias = "likes_count", alias = "favorites_count")]
    pub favorite_count: Option<u64>,
    #[serde(default)]
    pub user_rating: Option<u8>,
    #[serde(default, alias = "is_favorited")]
    pub is_favorite: Option<bool>,
    #[serde(default)]
    pub comment_count: Option<u64>,
}

/// Favorite toggle response: `{"status": "favorited" | "unfavorited"}`.
#[derive(Debug, Deserialize)]
pub struct FavoriteResponse {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RatingRequest {
    pub rating: u8,
}

/// Rate response. Carries the accepted rating plus refreshed aggregates.
#[derive(Debug, Deserialize)]
pub struct RatingResponse {
    pub rating: Option<u8>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub rating_count: Option<u64>,
}

// ── Comments ────────────────────────────────────────────────────────

/// A comment as the server returns it. The author record has appeared
/// under both `user` and `author` across backend revisions.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentPayload {
    pub id: i64,
    #[serde(default, alias = "author")]
    pub user: Option<CommentAuthor>,
    pub text: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentAuthor {
    #[serde(default)]
    pub id: Option<i64>,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct CommentRequest {
    pub text: String,
}
