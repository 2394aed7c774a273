// Comment list and submission for a displayed recipe.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tokio::sync::watch;
use tracing::warn;

use umami_api::ApiClient;
use umami_api::models::CommentPayload;

use crate::error::CoreError;
use crate::model::{Comment, CommentId, RecipeId};
use crate::mutation::{Feature, MutationExecutor};

/// The in-memory comment sequence for one recipe, newest first.
///
/// Append-only from the client's perspective: a successful post
/// prepends the created comment without a full refetch. While the post
/// is in flight the list carries a locally-synthesized placeholder
/// (recognizable via [`CommentId::is_pending`]).
pub struct CommentThread {
    api: Arc<ApiClient>,
    executor: Arc<MutationExecutor>,
    recipe: RecipeId,
    comments: watch::Sender<Arc<Vec<Comment>>>,
    placeholder_seq: AtomicU64,
}

impl CommentThread {
    pub fn new(api: Arc<ApiClient>, executor: Arc<MutationExecutor>, recipe: RecipeId) -> Self {
        let (comments, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            api,
            executor,
            recipe,
            comments,
            placeholder_seq: AtomicU64::new(0),
        }
    }

    pub fn recipe(&self) -> RecipeId {
        self.recipe
    }

    /// Current snapshot (cheap `Arc` clone).
    pub fn comments(&self) -> Arc<Vec<Comment>> {
        self.comments.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Comment>>> {
        self.comments.subscribe()
    }

    /// (Re)load the list from the server.
    ///
    /// Read-path: any failure degrades to an empty list with a warning;
    /// a comment section never crashes the view.
    pub async fn refresh(&self) -> Arc<Vec<Comment>> {
        let list: Vec<Comment> = match self.api.comments(self.recipe.0).await {
            Ok(payloads) => payloads.into_iter().map(Comment::from).collect(),
            Err(e) => {
                warn!(recipe = %self.recipe, error = %e, "comment fetch failed");
                Vec::new()
            }
        };
        let list = Arc::new(list);
        self.comments.send_replace(Arc::clone(&list));
        list
    }

    /// Post a comment optimistically.
    ///
    /// A placeholder authored by the current identity is prepended
    /// immediately; the server's created comment replaces it on
    /// success, and on failure the placeholder is removed and the
    /// server's detail (or the generic fallback) is surfaced.
    pub async fn post(&self, text: &str) -> Result<Comment, CoreError> {
        let Some(identity) = self.executor.session().identity() else {
            return Err(CoreError::AuthRequired);
        };

        let placeholder = Comment {
            id: CommentId::Local(self.placeholder_seq.fetch_add(1, Ordering::Relaxed)),
            author_name: identity.username.clone(),
            text: text.to_owned(),
            created_at: Some(Utc::now()),
        };

        let previous = self.comments();
        let proposed: Arc<Vec<Comment>> = Arc::new(
            std::iter::once(placeholder)
                .chain(previous.iter().cloned())
                .collect(),
        );

        let api = Arc::clone(&self.api);
        let recipe = self.recipe.0;
        let text_owned = text.to_owned();
        let base = Arc::clone(&previous);

        let settled = self
            .executor
            .run(
                Feature::Comment,
                recipe,
                &self.comments,
                proposed,
                move || async move { api.post_comment(recipe, &text_owned).await },
                move |created: &CommentPayload| {
                    // Swap the placeholder for the server's comment.
                    let confirmed = Comment::from(created.clone());
                    Some(Arc::new(
                        std::iter::once(confirmed)
                            .chain(base.iter().cloned())
                            .collect(),
                    ))
                },
            )
            .await?;

        settled
            .first()
            .cloned()
            .ok_or_else(|| CoreError::Internal("comment list empty after commit".into()))
    }
}
