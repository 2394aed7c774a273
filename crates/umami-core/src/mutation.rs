// ── Optimistic mutation executor ──
//
// The one algorithm behind every user-initiated toggle: apply the
// proposed value to visible state before the network resolves, then
// reconcile with the server's answer or roll back. Three outcomes:
// committed, rolled back, or rejected on a precondition (anonymous
// caller / duplicate in-flight mutation).

use std::future::Future;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use strum::Display;
use tokio::sync::watch;
use tracing::debug;

use crate::error::CoreError;
use crate::session::SessionStore;

/// Mutation namespace, one per interactive feature. Pending-guard keys
/// are scoped per feature so e.g. a follow and a favorite on the same
/// numeric id never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Feature {
    Follow,
    Favorite,
    Rating,
    Comment,
}

/// Resolution state of one optimistic mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum MutationStatus {
    Pending,
    Committed,
    RolledBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct MutationKey {
    feature: Feature,
    target: i64,
}

/// Shared executor for optimistic mutations.
///
/// Holds the authorization gate (via the session store) and the
/// pending-mutation table. Feature controllers supply the proposed
/// value, the apply call, and an optional reconciliation.
pub struct MutationExecutor {
    session: SessionStore,
    pending: DashMap<MutationKey, ()>,
}

impl MutationExecutor {
    pub fn new(session: SessionStore) -> Self {
        Self {
            session,
            pending: DashMap::new(),
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// `true` while a mutation for this (feature, target) is in flight.
    pub fn is_pending(&self, feature: Feature, target: i64) -> bool {
        self.pending.contains_key(&MutationKey { feature, target })
    }

    /// Run one optimistic mutation against `state`.
    ///
    /// 1. Rejects with [`CoreError::AuthRequired`] while anonymous --
    ///    no network call, no state change.
    /// 2. Rejects with [`CoreError::MutationPending`] when a mutation
    ///    for the same (feature, target) is in flight; duplicates are
    ///    dropped, never queued.
    /// 3. Publishes `proposed` synchronously, then awaits `apply`.
    /// 4. On success, `reconcile` may replace the proposal with the
    ///    server-authoritative value; otherwise the proposal stands.
    /// 5. On failure, the previous value is restored unconditionally
    ///    before the error is returned.
    ///
    /// Dropping the future (e.g. the owning controller is torn down
    /// mid-flight) abandons the request; the guard entry is released
    /// and no state write happens afterwards.
    pub async fn run<T, R, F, Fut>(
        &self,
        feature: Feature,
        target: i64,
        state: &watch::Sender<T>,
        proposed: T,
        apply: F,
        reconcile: impl FnOnce(&R) -> Option<T> + Send,
    ) -> Result<T, CoreError>
    where
        T: Clone + Send + Sync,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<R, umami_api::Error>> + Send,
        R: Send,
    {
        if !self.session.is_authenticated() {
            return Err(CoreError::AuthRequired);
        }

        let key = MutationKey { feature, target };
        let Some(_guard) = PendingGuard::acquire(&self.pending, key) else {
            debug!(%feature, target, "mutation already pending -- rejected");
            return Err(CoreError::MutationPending { feature, target });
        };

        let previous = state.borrow().clone();
        state.send_replace(proposed.clone());
        debug!(%feature, target, status = %MutationStatus::Pending, "optimistic value applied");

        match apply().await {
            Ok(response) => {
                let value = reconcile(&response).unwrap_or(proposed);
                state.send_replace(value.clone());
                debug!(%feature, target, status = %MutationStatus::Committed, "mutation settled");
                Ok(value)
            }
            Err(e) => {
                state.send_replace(previous);
                debug!(%feature, target, status = %MutationStatus::RolledBack, "mutation rolled back");
                Err(e.into())
            }
        }
    }
}

/// Removes the pending-table entry on every exit path, including drops
/// of an abandoned in-flight future.
struct PendingGuard<'a> {
    pending: &'a DashMap<MutationKey, ()>,
    key: MutationKey,
}

impl<'a> PendingGuard<'a> {
    fn acquire(pending: &'a DashMap<MutationKey, ()>, key: MutationKey) -> Option<Self> {
        match pending.entry(key) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(());
                Some(Self { pending, key })
            }
        }
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.remove(&self.key);
    }
}
