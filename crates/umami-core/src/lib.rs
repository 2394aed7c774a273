// umami-core: session state and interaction synchronization between
// umami-api and rendering consumers.

pub mod auth;
pub mod error;
pub mod features;
pub mod model;
pub mod mutation;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use auth::{AuthFlow, FederatedProvider, RegistrationForm, RegistrationOutcome};
pub use error::CoreError;
pub use mutation::{Feature, MutationExecutor, MutationStatus};
pub use session::{CredentialStorage, MemoryStorage, Session, SessionStatus, SessionStore};

// Re-export model types at the crate root for ergonomics.
pub use model::{Comment, CommentId, Identity, RecipeId, RecipeStats, UserId};

pub use features::{
    CommentThread, FavoriteController, FollowController, NotificationBadge, RatingController,
};
