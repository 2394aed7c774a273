// Domain model for the interaction layer.
//
// Canonical in-memory shapes, converted once from the wire types in
// umami-api. Feature controllers and consumers only ever see these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use umami_api::models::{CommentPayload, RecipeDetail, UserProfile};

// ── Ids ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecipeId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::fmt::Display for RecipeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// ── Identity ────────────────────────────────────────────────────────

/// The resolved user record behind a valid credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: UserId,
    pub username: String,
    pub email: Option<String>,
}

impl From<UserProfile> for Identity {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: UserId(profile.id),
            username: profile.username,
            email: profile.email,
        }
    }
}

// ── Comments ────────────────────────────────────────────────────────

/// Comment identity. `Local` ids belong to optimistic placeholders that
/// have not been confirmed by the server yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentId {
    Local(u64),
    Server(i64),
}

impl CommentId {
    /// `true` while the comment is an unconfirmed placeholder.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Local(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    pub author_name: String,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<CommentPayload> for Comment {
    fn from(payload: CommentPayload) -> Self {
        Self {
            id: CommentId::Server(payload.id),
            author_name: payload
                .user
                .map_or_else(|| "Anonymous".to_owned(), |author| author.username),
            text: payload.text,
            created_at: payload.created_at,
        }
    }
}

// ── Recipe aggregates ───────────────────────────────────────────────

/// Server-authoritative rating/favorite aggregates for one recipe.
///
/// Rehydrated on every entity (re)fetch; the rating flow refetches this
/// rather than guessing at averages locally.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecipeStats {
    pub average_rating: f64,
    pub rating_count: u64,
    pub favorite_count: Option<u64>,
    pub user_rating: Option<u8>,
    pub is_favorite: bool,
}

impl From<RecipeDetail> for RecipeStats {
    fn from(detail: RecipeDetail) -> Self {
        Self {
            average_rating: detail.average_rating.unwrap_or(0.0),
            rating_count: detail.rating_count.unwrap_or(0),
            favorite_count: detail.favorite_count,
            user_rating: detail.user_rating,
            is_favorite: detail.is_favorite.unwrap_or(false),
        }
    }
}
