// End-to-end interaction tests: optimistic toggles, reconciliation,
// rollback, and conflict handling against a wiremock server.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use umami_api::{ApiClient, CredentialCell};
use umami_core::{
    AuthFlow, CommentId, CommentThread, CoreError, FavoriteController, FollowController,
    MemoryStorage, MutationExecutor, NotificationBadge, RatingController, RecipeId, RecipeStats,
    SessionStore, UserId,
};

// ── Helpers ─────────────────────────────────────────────────────────

struct Ctx {
    server: MockServer,
    api: Arc<ApiClient>,
    store: SessionStore,
    executor: Arc<MutationExecutor>,
}

async fn setup() -> Ctx {
    let server = MockServer::start().await;
    let credential = Arc::new(CredentialCell::new());
    let base = Url::parse(&format!("{}/api/", server.uri())).expect("base url");
    let api = Arc::new(ApiClient::with_client(
        reqwest::Client::new(),
        base,
        Arc::clone(&credential),
    ));
    let store = SessionStore::new(credential, Arc::new(MemoryStorage::new()));
    let executor = Arc::new(MutationExecutor::new(store.clone()));
    Ctx {
        server,
        api,
        store,
        executor,
    }
}

/// Sign in as user 7 ("chef") through the real auth flow.
async fn sign_in(ctx: &Ctx) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"key": "abc"})))
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/user/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": 7, "username": "chef"})),
        )
        .mount(&ctx.server)
        .await;

    let flow = AuthFlow::new(Arc::clone(&ctx.api), ctx.store.clone());
    flow.login("chef@umami.app", &SecretString::from("s3cret"))
        .await
        .expect("sign in");
}

fn stats() -> RecipeStats {
    RecipeStats {
        average_rating: 0.0,
        rating_count: 0,
        favorite_count: None,
        user_rating: None,
        is_favorite: false,
    }
}

// ── Follow ──────────────────────────────────────────────────────────

#[tokio::test]
async fn follow_takes_the_server_flag_over_the_optimistic_guess() {
    let ctx = setup().await;
    sign_in(&ctx).await;

    Mock::given(method("POST"))
        .and(path("/api/users/42/follow/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"is_following": false})),
        )
        .mount(&ctx.server)
        .await;

    let follow = FollowController::for_target(
        Arc::clone(&ctx.api),
        Arc::clone(&ctx.executor),
        UserId(42),
        false,
    )
    .expect("not self");

    let settled = follow.toggle().await.expect("committed");

    assert!(!settled, "server said the follow did not stick");
    assert!(!follow.is_following());
}

#[tokio::test]
async fn unfollow_is_chosen_by_the_pre_toggle_state() {
    let ctx = setup().await;
    sign_in(&ctx).await;

    Mock::given(method("DELETE"))
        .and(path("/api/users/42/unfollow/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"is_following": false})),
        )
        .mount(&ctx.server)
        .await;

    let follow = FollowController::for_target(
        Arc::clone(&ctx.api),
        Arc::clone(&ctx.executor),
        UserId(42),
        true,
    )
    .expect("not self");

    let settled = follow.toggle().await.expect("committed");
    assert!(!settled);
}

#[tokio::test]
async fn follow_rolls_back_on_server_failure() {
    let ctx = setup().await;
    sign_in(&ctx).await;

    Mock::given(method("POST"))
        .and(path("/api/users/42/follow/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&ctx.server)
        .await;

    let follow = FollowController::for_target(
        Arc::clone(&ctx.api),
        Arc::clone(&ctx.executor),
        UserId(42),
        false,
    )
    .expect("not self");

    let mut rx = follow.subscribe();
    let err = follow.toggle().await.expect_err("must fail");

    assert!(matches!(err, CoreError::Transport { .. }));
    assert!(!follow.is_following(), "rolled back");
    // The subscriber saw the optimistic flip and the rollback.
    assert!(rx.has_changed().expect("sender alive"));
}

#[tokio::test]
async fn self_follow_control_is_never_constructed() {
    let ctx = setup().await;
    sign_in(&ctx).await;

    let follow = FollowController::for_target(
        Arc::clone(&ctx.api),
        Arc::clone(&ctx.executor),
        UserId(7), // the signed-in user
        false,
    );

    assert!(follow.is_none());
}

#[tokio::test]
async fn anonymous_follow_is_blocked_without_network_traffic() {
    let ctx = setup().await;
    ctx.store.set_credential(None); // settle to anonymous

    let follow = FollowController::for_target(
        Arc::clone(&ctx.api),
        Arc::clone(&ctx.executor),
        UserId(42),
        false,
    )
    .expect("no identity, so not self");

    let err = follow.toggle().await.expect_err("must be blocked");

    assert!(matches!(err, CoreError::AuthRequired));
    assert_eq!(
        ctx.server.received_requests().await.map(|r| r.len()),
        Some(0)
    );
}

// ── Favorite ────────────────────────────────────────────────────────

#[tokio::test]
async fn favorite_keeps_the_optimistic_value_on_success() {
    let ctx = setup().await;
    sign_in(&ctx).await;

    Mock::given(method("POST"))
        .and(path("/api/recipes/11/favorite/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "favorited"})),
        )
        .mount(&ctx.server)
        .await;

    let favorite = FavoriteController::new(
        Arc::clone(&ctx.api),
        Arc::clone(&ctx.executor),
        RecipeId(11),
        false,
    );

    assert!(favorite.toggle().await.expect("committed"));
    assert!(favorite.is_favorite());
}

#[tokio::test]
async fn favorite_rolls_back_and_surfaces_the_failure() {
    let ctx = setup().await;
    sign_in(&ctx).await;

    Mock::given(method("POST"))
        .and(path("/api/recipes/11/favorite/"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&ctx.server)
        .await;

    let favorite = FavoriteController::new(
        Arc::clone(&ctx.api),
        Arc::clone(&ctx.executor),
        RecipeId(11),
        true,
    );

    let err = favorite.toggle().await.expect_err("must fail");

    assert!(matches!(err, CoreError::Transport { .. }));
    assert!(favorite.is_favorite(), "rolled back to favorited");
}

#[tokio::test]
async fn rapid_double_toggle_sends_exactly_one_request() {
    let ctx = setup().await;
    sign_in(&ctx).await;

    Mock::given(method("POST"))
        .and(path("/api/recipes/11/favorite/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "favorited"}))
                .set_delay(Duration::from_millis(150)),
        )
        .mount(&ctx.server)
        .await;

    let favorite = Arc::new(FavoriteController::new(
        Arc::clone(&ctx.api),
        Arc::clone(&ctx.executor),
        RecipeId(11),
        false,
    ));

    let first = {
        let favorite = Arc::clone(&favorite);
        tokio::spawn(async move { favorite.toggle().await })
    };
    while !ctx.executor.is_pending(umami_core::Feature::Favorite, 11) {
        tokio::task::yield_now().await;
    }

    let err = favorite.toggle().await.expect_err("second click rejected");
    assert!(matches!(err, CoreError::MutationPending { .. }));

    assert!(first.await.expect("join").expect("first commits"));

    let favorite_requests = ctx
        .server
        .received_requests()
        .await
        .expect("recording")
        .iter()
        .filter(|r| r.url.path() == "/api/recipes/11/favorite/")
        .count();
    assert_eq!(favorite_requests, 1);
}

#[tokio::test]
async fn favorite_count_refresh_rehydrates_the_flag() {
    let ctx = setup().await;
    sign_in(&ctx).await;

    Mock::given(method("GET"))
        .and(path("/api/recipes/11/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 11,
            "title": "Shakshuka",
            "favorite_count": 9,
            "is_favorite": true,
        })))
        .mount(&ctx.server)
        .await;

    let favorite = FavoriteController::new(
        Arc::clone(&ctx.api),
        Arc::clone(&ctx.executor),
        RecipeId(11),
        false,
    );

    let stats = favorite.refresh_stats().await.expect("fetched");

    assert_eq!(stats.favorite_count, Some(9));
    assert!(favorite.is_favorite());
}

// ── Rating ──────────────────────────────────────────────────────────

#[tokio::test]
async fn rating_commits_and_refetches_aggregates() {
    let ctx = setup().await;
    sign_in(&ctx).await;

    Mock::given(method("POST"))
        .and(path("/api/recipes/11/rate/"))
        .and(body_json(json!({"rating": 4})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rating": 4,
            "average_rating": 4.2,
            "rating_count": 5,
        })))
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/recipes/11/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 11,
            "title": "Shakshuka",
            "average_rating": 4.2,
            "rating_count": 5,
            "user_rating": 4,
        })))
        .mount(&ctx.server)
        .await;

    let rating = RatingController::new(
        Arc::clone(&ctx.api),
        Arc::clone(&ctx.executor),
        RecipeId(11),
        stats(),
    );

    let accepted = rating.rate(4).await.expect("committed");

    assert_eq!(accepted, 4);
    assert_eq!(rating.user_rating(), 4);
    let aggregates = rating.stats();
    assert!((aggregates.average_rating - 4.2).abs() < f64::EPSILON);
    assert_eq!(aggregates.rating_count, 5);
}

#[tokio::test]
async fn out_of_range_rating_is_rejected_before_any_request() {
    let ctx = setup().await;
    sign_in(&ctx).await;

    let rating = RatingController::new(
        Arc::clone(&ctx.api),
        Arc::clone(&ctx.executor),
        RecipeId(11),
        stats(),
    );

    let err = rating.rate(6).await.expect_err("must be rejected");

    let CoreError::Validation { message, .. } = err else {
        panic!("expected Validation");
    };
    assert_eq!(message, "Please provide a valid rating between 1 and 5.");
    assert_eq!(rating.user_rating(), 0, "no state change");

    let rate_requests = ctx
        .server
        .received_requests()
        .await
        .expect("recording")
        .iter()
        .filter(|r| r.url.path().contains("rate"))
        .count();
    assert_eq!(rate_requests, 0);
}

#[tokio::test]
async fn aggregate_refetch_failure_does_not_undo_the_rating() {
    let ctx = setup().await;
    sign_in(&ctx).await;

    Mock::given(method("POST"))
        .and(path("/api/recipes/11/rate/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rating": 5})))
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/recipes/11/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&ctx.server)
        .await;

    let rating = RatingController::new(
        Arc::clone(&ctx.api),
        Arc::clone(&ctx.executor),
        RecipeId(11),
        stats(),
    );

    let accepted = rating.rate(5).await.expect("rating itself committed");

    assert_eq!(accepted, 5);
    assert_eq!(rating.user_rating(), 5, "committed rating survives");
}

// ── Comments ────────────────────────────────────────────────────────

#[tokio::test]
async fn posted_comment_replaces_its_placeholder_with_the_server_copy() {
    let ctx = setup().await;
    sign_in(&ctx).await;

    Mock::given(method("GET"))
        .and(path("/api/recipes/11/comments/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "user": {"username": "earlier"}, "text": "Looks great"},
        ])))
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/recipes/11/comments/"))
        .and(body_json(json!({"text": "Tried it, loved it"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 2,
            "user": {"username": "chef"},
            "text": "Tried it, loved it",
        })))
        .mount(&ctx.server)
        .await;

    let thread = CommentThread::new(
        Arc::clone(&ctx.api),
        Arc::clone(&ctx.executor),
        RecipeId(11),
    );
    thread.refresh().await;

    let posted = thread.post("Tried it, loved it").await.expect("posted");

    assert_eq!(posted.id, CommentId::Server(2));
    assert!(!posted.id.is_pending());
    let list = thread.comments();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].id, CommentId::Server(2), "newest first");
    assert_eq!(list[1].text, "Looks great");
}

#[tokio::test]
async fn failed_post_removes_the_placeholder_and_surfaces_the_detail() {
    let ctx = setup().await;
    sign_in(&ctx).await;

    Mock::given(method("GET"))
        .and(path("/api/recipes/11/comments/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "user": {"username": "earlier"}, "text": "Looks great"},
        ])))
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/recipes/11/comments/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "Please provide comment text.",
        })))
        .mount(&ctx.server)
        .await;

    let thread = CommentThread::new(
        Arc::clone(&ctx.api),
        Arc::clone(&ctx.executor),
        RecipeId(11),
    );
    thread.refresh().await;

    let err = thread.post("").await.expect_err("must fail");

    assert_eq!(err.user_message(), "Please provide comment text.");
    let list = thread.comments();
    assert_eq!(list.len(), 1, "placeholder removed");
    assert!(list.iter().all(|c| !c.id.is_pending()));
}

#[tokio::test]
async fn comment_fetch_failure_degrades_to_an_empty_list() {
    let ctx = setup().await;
    sign_in(&ctx).await;

    Mock::given(method("GET"))
        .and(path("/api/recipes/11/comments/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&ctx.server)
        .await;

    let thread = CommentThread::new(
        Arc::clone(&ctx.api),
        Arc::clone(&ctx.executor),
        RecipeId(11),
    );

    let list = thread.refresh().await;
    assert!(list.is_empty());
}

#[tokio::test]
async fn anonymous_comment_post_is_blocked() {
    let ctx = setup().await;
    ctx.store.set_credential(None);

    let thread = CommentThread::new(
        Arc::clone(&ctx.api),
        Arc::clone(&ctx.executor),
        RecipeId(11),
    );

    let err = thread.post("hi").await.expect_err("must be blocked");
    assert!(matches!(err, CoreError::AuthRequired));
    assert!(thread.comments().is_empty(), "no placeholder left behind");
}

// ── Notification badge ──────────────────────────────────────────────

#[tokio::test]
async fn badge_reports_the_server_count() {
    let ctx = setup().await;
    sign_in(&ctx).await;

    Mock::given(method("GET"))
        .and(path("/api/notifications/count/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 3})))
        .mount(&ctx.server)
        .await;

    let badge = NotificationBadge::new(Arc::clone(&ctx.api), ctx.store.clone());
    assert_eq!(badge.poll().await.expect("polled"), 3);
    assert_eq!(badge.count(), 3);
}

#[tokio::test]
async fn badge_degrades_to_zero_on_fetch_failure() {
    let ctx = setup().await;
    sign_in(&ctx).await;

    Mock::given(method("GET"))
        .and(path("/api/notifications/count/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&ctx.server)
        .await;

    let badge = NotificationBadge::new(Arc::clone(&ctx.api), ctx.store.clone());
    assert_eq!(badge.poll().await.expect("degrades, not errors"), 0);
}

#[tokio::test]
async fn badge_is_not_polled_while_anonymous() {
    let ctx = setup().await;
    ctx.store.set_credential(None);

    let badge = NotificationBadge::new(Arc::clone(&ctx.api), ctx.store.clone());
    let err = badge.poll().await.expect_err("must be blocked");

    assert!(matches!(err, CoreError::AuthRequired));
    assert_eq!(
        ctx.server.received_requests().await.map(|r| r.len()),
        Some(0)
    );
}
