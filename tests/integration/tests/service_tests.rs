//! Service-level tests against the in-memory stores
//!
//! Run with: cargo test -p integration-tests --test service_tests

use engage_common::ReconcileConfig;
use engage_core::{Actor, ActorRole, ReactionAggregate, ReactionKind, RiskAssessment, Snowflake};
use engage_service::dto::{CommentListQuery, MyReactionsQuery, SummaryQuery};
use engage_service::{
    AggregateReconciler, AggregateService, CommentService, ReactionService, ServiceError,
};
use integration_tests::*;
use uuid::Uuid;

fn guest() -> Actor {
    Actor::guest(Uuid::new_v4())
}

fn reason(err: &ServiceError) -> String {
    err.reason()
}

// ============================================================================
// Reactions
// ============================================================================

#[tokio::test]
async fn test_toggle_twice_returns_to_pre_state() {
    let h = Harness::new(&[]);
    let target = h.target().await;
    let actor = guest();
    let service = ReactionService::new(&h.context);

    let first = service.toggle(&actor, &toggle(target, "LIKE", None)).await.unwrap();
    assert!(first.on);
    assert!(first.created);
    assert_eq!(first.aggregate.like, 1);

    let second = service.toggle(&actor, &toggle(target, "like", None)).await.unwrap();
    assert!(!second.on);
    assert_eq!(second.aggregate.like, 0);

    assert!(h.reactions.rows_for(target).is_empty());
    assert_eq!(h.targets.get(target).unwrap().aggregate, ReactionAggregate::default());
}

#[tokio::test]
async fn test_set_is_idempotent() {
    let h = Harness::new(&[]);
    let target = h.target().await;
    let actor = guest();
    let service = ReactionService::new(&h.context);

    let first = service.set(&actor, &set(target, "FAVORITE", true)).await.unwrap();
    let second = service.set(&actor, &set(target, "FAVORITE", true)).await.unwrap();
    assert!(first.created);
    assert!(second.on);
    assert!(!second.created);
    assert_eq!(h.reactions.rows_for(target).len(), 1);

    let other = h.target().await;
    let off = service.set(&actor, &set(other, "BOOKMARK", false)).await.unwrap();
    assert!(!off.on);
    assert!(!off.created);
    assert!(h.reactions.rows_for(other).is_empty());
}

#[tokio::test]
async fn test_racing_sets_create_one_row() {
    let h = Harness::new(&[]);
    let target = h.target().await;
    let actor = guest();
    let service = ReactionService::new(&h.context);
    let request = set(target, "LIKE", true);

    let (a, b) = tokio::join!(service.set(&actor, &request), service.set(&actor, &request));
    let (a, b) = (a.unwrap(), b.unwrap());
    assert!(a.on && b.on);
    // the loser hits the unique key and reads as already on
    assert_eq!([a.created, b.created].iter().filter(|c| **c).count(), 1);
    assert_eq!(h.reactions.rows_for(target).len(), 1);
    assert_eq!(h.targets.get(target).unwrap().aggregate.like, 1);
}

#[tokio::test]
async fn test_racing_toggles_keep_one_row() {
    let h = Harness::new(&[]);
    let target = h.target().await;
    let actor = guest();
    let service = ReactionService::new(&h.context);
    let request = toggle(target, "BOOKMARK", None);

    let (a, b) = tokio::join!(
        service.toggle(&actor, &request),
        service.toggle(&actor, &request)
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert!(a.on && b.on);
    assert_eq!([a.created, b.created].iter().filter(|c| **c).count(), 1);
    assert_eq!(h.reactions.rows_for(target).len(), 1);

    let third = service.toggle(&actor, &request).await.unwrap();
    assert!(!third.on);
    assert!(h.reactions.rows_for(target).is_empty());
}

#[tokio::test]
async fn test_rating_is_clamped_and_upserted() {
    let h = Harness::new(&[]);
    let target = h.target().await;
    let actor = guest();
    let service = ReactionService::new(&h.context);

    let low = service.rate(&actor, &rate(target, 0)).await.unwrap();
    assert_eq!(low.value.get(), 1);

    let high = service.rate(&actor, &rate(target, 9)).await.unwrap();
    assert_eq!(high.value.get(), 5);

    let rows = h.reactions.rows_for(target);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].stance.value().map(|v| v.get()), Some(5));
    assert_eq!(high.aggregate.rating_count, 1);
    assert!((high.aggregate.rating_avg - 5.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_rating_is_not_toggleable() {
    let h = Harness::new(&[]);
    let target = h.target().await;
    let service = ReactionService::new(&h.context);

    let err = service
        .toggle(&guest(), &toggle(target, "RATING", None))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert_eq!(reason(&err), "use_rate_endpoint");
}

#[tokio::test]
async fn test_emoji_requires_payload() {
    let h = Harness::new(&[]);
    let target = h.target().await;
    let service = ReactionService::new(&h.context);

    let err = service
        .toggle(&guest(), &toggle(target, "EMOJI", None))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_aggregate_matches_rows_after_mixed_writes() {
    let h = Harness::new(&[]);
    let target = h.target().await;
    let service = ReactionService::new(&h.context);
    let actors: Vec<Actor> = (0..4).map(|_| guest()).collect();

    for actor in &actors {
        service.toggle(actor, &toggle(target, "LIKE", None)).await.unwrap();
    }
    // one like withdrawn, one set on twice
    service.toggle(&actors[0], &toggle(target, "LIKE", None)).await.unwrap();
    service.set(&actors[1], &set(target, "LIKE", true)).await.unwrap();

    service.rate(&actors[0], &rate(target, 5)).await.unwrap();
    service.rate(&actors[1], &rate(target, 4)).await.unwrap();
    service.rate(&actors[2], &rate(target, 2)).await.unwrap();
    service.rate(&actors[2], &rate(target, 4)).await.unwrap();

    service
        .toggle(&actors[3], &toggle(target, "EMOJI", Some("😋")))
        .await
        .unwrap();
    service
        .toggle(&actors[3], &toggle(target, "EMOJI", Some("🦄")))
        .await
        .unwrap();

    let stored = h.targets.get(target).unwrap().aggregate;
    let like_rows = h
        .reactions
        .rows_for(target)
        .iter()
        .filter(|r| r.kind() == ReactionKind::Like)
        .count() as i64;

    assert_eq!(stored.like, like_rows);
    assert_eq!(stored.like, 3);
    assert_eq!(stored.yum, 1);
    assert_eq!(stored.love + stored.wow, 0);
    assert_eq!(stored.rating_count, 3);
    // (5 + 4 + 4) / 3 = 4.333..
    assert!((stored.rating_avg - 4.33).abs() < 1e-9);
}

#[tokio::test]
async fn test_emoji_toggle_moves_love_bucket() {
    let h = Harness::new(&[]);
    let target = h.target().await;
    let actor = guest();
    let service = ReactionService::new(&h.context);

    let on = service
        .toggle(&actor, &toggle(target, "EMOJI", Some("❤️")))
        .await
        .unwrap();
    assert_eq!(on.aggregate.love, 1);

    let off = service
        .toggle(&actor, &toggle(target, "EMOJI", Some("❤️")))
        .await
        .unwrap();
    assert_eq!(off.aggregate.love, 0);
}

#[tokio::test]
async fn test_reaction_on_missing_target_is_not_found() {
    let h = Harness::new(&[]);
    let service = ReactionService::new(&h.context);

    let err = service
        .toggle(&guest(), &toggle(Snowflake::new(42), "LIKE", None))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_recompute_failure_fails_the_mutation() {
    let h = Harness::new(&[]);
    let target = h.target().await;
    let service = ReactionService::new(&h.context);

    h.targets.fail_aggregate_writes(true);
    let err = service
        .toggle(&guest(), &toggle(target, "LIKE", None))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 500);

    // the row landed; only the snapshot is stale
    assert_eq!(h.reactions.rows_for(target).len(), 1);
    assert_eq!(h.targets.get(target).unwrap().aggregate.like, 0);
}

#[tokio::test]
async fn test_summary_breakdowns() {
    let h = Harness::new(&[]);
    let target = h.target().await;
    let empty = h.target().await;
    let service = ReactionService::new(&h.context);

    service.toggle(&guest(), &toggle(target, "LIKE", None)).await.unwrap();
    service.toggle(&guest(), &toggle(target, "LIKE", None)).await.unwrap();
    service
        .toggle(&guest(), &toggle(target, "EMOJI", Some("🔥")))
        .await
        .unwrap();

    let query = SummaryQuery {
        target_id: None,
        target_ids: Some(format!("{target},{empty}")),
        breakdown: Some("kind+emoji".to_string()),
    };
    let summary = service.summary(&query).await.unwrap();

    let full = &summary[&target];
    assert_eq!(full.total, 3);
    assert_eq!(full.by_kind.as_ref().unwrap()[&ReactionKind::Like], 2);
    assert_eq!(full.by_emoji.as_ref().unwrap()["🔥"], 1);

    let none = &summary[&empty];
    assert_eq!(none.total, 0);
    assert!(none.by_kind.as_ref().unwrap().is_empty());

    let plain = service
        .summary(&SummaryQuery {
            target_id: Some(target.to_string()),
            target_ids: None,
            breakdown: None,
        })
        .await
        .unwrap();
    assert_eq!(plain[&target].total, 3);
    assert!(plain[&target].by_kind.is_none());
}

#[tokio::test]
async fn test_summary_requires_ids() {
    let h = Harness::new(&[]);
    let service = ReactionService::new(&h.context);

    let err = service.summary(&SummaryQuery::default()).await.unwrap_err();
    assert_eq!(reason(&err), "target_ids_required");

    let too_many = (1..=101).map(|i| i.to_string()).collect::<Vec<_>>().join(",");
    let err = service
        .summary(&SummaryQuery {
            target_ids: Some(too_many),
            ..SummaryQuery::default()
        })
        .await
        .unwrap_err();
    assert_eq!(reason(&err), "too_many_target_ids");
}

#[tokio::test]
async fn test_my_reactions_filter() {
    let h = Harness::new(&[]);
    let first = h.target().await;
    let second = h.target().await;
    let actor = guest();
    let service = ReactionService::new(&h.context);

    service.toggle(&actor, &toggle(first, "LIKE", None)).await.unwrap();
    service.rate(&actor, &rate(second, 3)).await.unwrap();
    service.toggle(&guest(), &toggle(first, "BOOKMARK", None)).await.unwrap();

    let all = service
        .my_reactions(&actor, &MyReactionsQuery::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let only_second = service
        .my_reactions(
            &actor,
            &MyReactionsQuery {
                target_ids: Some(second.to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(only_second.len(), 1);
    assert_eq!(only_second[0].kind, ReactionKind::Rating);
    assert_eq!(only_second[0].value, Some(3));
}

#[tokio::test]
async fn test_same_user_across_roles_shares_rows() {
    let h = Harness::new(&[]);
    let target = h.target().await;
    let service = ReactionService::new(&h.context);

    let member = Actor::authenticated(Snowflake::new(77), ActorRole::Member);
    let editor = Actor::authenticated(Snowflake::new(77), ActorRole::Editor);

    service.toggle(&member, &toggle(target, "LIKE", None)).await.unwrap();
    let again = service.toggle(&editor, &toggle(target, "LIKE", None)).await.unwrap();
    assert!(!again.on);
}

// ============================================================================
// Aggregate reconciliation
// ============================================================================

#[tokio::test]
async fn test_reconcile_repairs_drifted_aggregates() {
    let h = Harness::new(&[]);
    let targets = [h.target().await, h.target().await, h.target().await];
    let service = ReactionService::new(&h.context);
    for target in targets {
        service.toggle(&guest(), &toggle(target, "LIKE", None)).await.unwrap();
    }

    let drifted = ReactionAggregate {
        like: 40,
        ..ReactionAggregate::default()
    };
    for target in targets {
        h.targets.corrupt_aggregate(target, drifted);
    }

    let config = ReconcileConfig {
        interval_seconds: 60,
        batch_size: 2,
    };
    let report = AggregateReconciler::new(h.context.clone(), &config)
        .run_pass()
        .await
        .unwrap();

    assert!(report.scanned >= targets.len());
    assert_eq!(report.failed, 0);
    for target in targets {
        assert_eq!(h.targets.get(target).unwrap().aggregate.like, 1);
    }
}

#[tokio::test]
async fn test_compute_does_not_write() {
    let h = Harness::new(&[]);
    let target = h.target().await;
    ReactionService::new(&h.context)
        .toggle(&guest(), &toggle(target, "LIKE", None))
        .await
        .unwrap();
    h.targets.corrupt_aggregate(target, ReactionAggregate::default());

    let computed = AggregateService::new(&h.context).compute(target).await.unwrap();
    assert_eq!(computed.like, 1);
    assert_eq!(h.targets.get(target).unwrap().aggregate.like, 0);
}

// ============================================================================
// Comments and the abuse gates
// ============================================================================

#[tokio::test]
async fn test_comment_happy_path_increments_counter() {
    let h = Harness::new(&[]);
    let target = h.target().await;
    let service = CommentService::new(&h.context);

    let created = service
        .create(&guest(), true, &client("203.0.113.1"), target, &guest_comment("Loved it, 10/10"))
        .await
        .unwrap();

    assert_eq!(created.comment.name, "Ana");
    assert_eq!(created.quota.remaining, h.config.comments.rate_limit_max - 1);
    assert_eq!(h.targets.get(target).unwrap().comment_count, 1);

    let stored = &h.comments.all_for(target)[0];
    assert_ne!(stored.ip_hash.as_deref(), Some("203.0.113.1"));
    assert!(stored.ip_hash.is_some());
    assert_eq!(stored.email.as_deref(), Some("a@b.com"));
}

#[tokio::test]
async fn test_duplicate_comment_rejected() {
    let h = Harness::new(&[]);
    let target = h.target().await;
    let actor = guest();
    let service = CommentService::new(&h.context);
    let ip = client("203.0.113.2");

    service
        .create(&actor, false, &ip, target, &guest_comment("Great recipe!"))
        .await
        .unwrap();

    // past the cooldown, inside the duplicate window
    h.clock.advance_secs(30);
    let err = service
        .create(&actor, false, &ip, target, &guest_comment("great   recipe!!"))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 409);
    assert_eq!(reason(&err), "duplicate_comment");
}

#[tokio::test]
async fn test_duplicate_window_expires() {
    let h = Harness::new(&[]);
    let target = h.target().await;
    let actor = guest();
    let service = CommentService::new(&h.context);
    let ip = client("203.0.113.3");

    service
        .create(&actor, false, &ip, target, &guest_comment("Great recipe!"))
        .await
        .unwrap();
    h.clock.advance_secs(121);
    service
        .create(&actor, false, &ip, target, &guest_comment("Great recipe!"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_cooldown_reports_remaining_wait() {
    let h = Harness::new(&[("COMMENT_COOLDOWN_SECONDS", "20")]);
    let target = h.target().await;
    let actor = guest();
    let service = CommentService::new(&h.context);
    let ip = client("203.0.113.4");

    service
        .create(&actor, false, &ip, target, &guest_comment("First thoughts"))
        .await
        .unwrap();

    h.clock.advance_secs(5);
    let err = service
        .create(&actor, false, &ip, target, &guest_comment("Second thoughts"))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 429);
    assert_eq!(reason(&err), "cooldown_active_15s");
    assert_eq!(err.rate_limit().unwrap().retry_after_secs, 15);
}

#[tokio::test]
async fn test_rejected_content_still_consumes_cooldown() {
    let h = Harness::new(&[("COMMENT_MIN_LENGTH", "3")]);
    let target = h.target().await;
    let actor = guest();
    let service = CommentService::new(&h.context);
    let ip = client("203.0.113.5");

    let err = service
        .create(&actor, false, &ip, target, &guest_comment("hi"))
        .await
        .unwrap_err();
    assert_eq!(reason(&err), "text_too_short");

    let err = service
        .create(&actor, false, &ip, target, &guest_comment("A proper comment"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 429);
    assert!(reason(&err).starts_with("cooldown_active_"));
    assert!(h.comments.is_empty());
}

#[tokio::test]
async fn test_link_limit() {
    let h = Harness::new(&[("COMMENT_MAX_LINKS", "1")]);
    let target = h.target().await;
    let service = CommentService::new(&h.context);

    let err = service
        .create(
            &guest(),
            false,
            &client("203.0.113.6"),
            target,
            &guest_comment("see http://a.example and http://b.example"),
        )
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 400);
    assert_eq!(reason(&err), "too_many_links");
}

#[tokio::test]
async fn test_guest_needs_name_and_email() {
    let h = Harness::new(&[("COMMENT_COOLDOWN_SECONDS", "0")]);
    let target = h.target().await;
    let actor = guest();
    let service = CommentService::new(&h.context);
    let ip = client("203.0.113.7");

    let mut body = guest_comment("Nice and easy");
    body.name = None;
    let err = service.create(&actor, false, &ip, target, &body).await.unwrap_err();
    assert_eq!(reason(&err), "name_required");

    let mut body = guest_comment("Nice and easy");
    body.email = Some("not-an-email".to_string());
    let err = service.create(&actor, false, &ip, target, &body).await.unwrap_err();
    assert_eq!(reason(&err), "invalid_email");

    // an authenticated author may stay anonymous
    let user = Actor::authenticated(Snowflake::new(5), ActorRole::Member);
    let mut body = guest_comment("Nice and easy");
    body.name = None;
    body.email = None;
    let created = service.create(&user, false, &ip, target, &body).await.unwrap();
    assert_eq!(h.comments.all_for(target)[0].author_id, Some(Snowflake::new(5)));
    assert!(!created.comment.name.is_empty());
}

#[tokio::test]
async fn test_sliding_window_limit() {
    let h = Harness::new(&[
        ("COMMENT_COOLDOWN_SECONDS", "0"),
        ("COMMENT_RATE_LIMIT_MAX", "2"),
        ("COMMENT_RATE_LIMIT_WINDOW_SECONDS", "600"),
    ]);
    let target = h.target().await;
    let actor = guest();
    let service = CommentService::new(&h.context);
    let ip = client("203.0.113.8");

    for text in ["first comment", "second comment"] {
        service
            .create(&actor, false, &ip, target, &guest_comment(text))
            .await
            .unwrap();
        h.clock.advance_secs(1);
    }

    let err = service
        .create(&actor, false, &ip, target, &guest_comment("third comment"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 429);
    let rejection = err.rate_limit().unwrap();
    assert_eq!(rejection.quota.unwrap().remaining, 0);
    assert!(rejection.reason.starts_with("rate_limited_"));

    h.clock.advance_secs(600);
    service
        .create(&actor, false, &ip, target, &guest_comment("fourth comment"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_fresh_guests_share_their_address_budget() {
    let h = Harness::new(&[("COMMENT_COOLDOWN_SECONDS", "20")]);
    let target = h.target().await;
    let service = CommentService::new(&h.context);
    let ip = client("198.51.100.20");

    service
        .create(&guest(), true, &ip, target, &guest_comment("cookie-less one"))
        .await
        .unwrap();

    let err = service
        .create(&guest(), true, &ip, target, &guest_comment("cookie-less two"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 429);
}

#[tokio::test]
async fn test_minted_guest_inherits_first_post_gates() {
    let h = Harness::new(&[
        ("COMMENT_COOLDOWN_SECONDS", "20"),
        ("COMMENT_RATE_LIMIT_MAX", "2"),
    ]);
    let target = h.target().await;
    let actor = guest();
    let service = CommentService::new(&h.context);

    service
        .create(&actor, true, &client("203.0.113.30"), target, &guest_comment("cookie-less first"))
        .await
        .unwrap();

    // the follow-up carries the minted cookie, so it is no longer fresh
    h.clock.advance_secs(5);
    let err = service
        .create(&actor, false, &client("198.51.100.31"), target, &guest_comment("with the cookie now"))
        .await
        .unwrap_err();
    assert_eq!(reason(&err), "cooldown_active_15s");

    // the limiter counted the first post and the held attempt for the minted id too
    h.clock.advance_secs(20);
    let err = service
        .create(&actor, false, &client("198.51.100.31"), target, &guest_comment("third try"))
        .await
        .unwrap_err();
    assert!(reason(&err).starts_with("rate_limited_"));
}

#[tokio::test]
async fn test_missing_target_checked_after_gates() {
    let h = Harness::new(&[("COMMENT_COOLDOWN_SECONDS", "20")]);
    let real = h.target().await;
    let actor = guest();
    let service = CommentService::new(&h.context);
    let ip = client("203.0.113.9");

    let err = service
        .create(&actor, false, &ip, Snowflake::new(9), &guest_comment("Into the void"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);

    // the attempt on a missing target still spent the cooldown
    let err = service
        .create(&actor, false, &ip, real, &guest_comment("Now for real"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 429);
}

#[tokio::test]
async fn test_list_hides_unpublished_and_paginates() {
    let h = Harness::new(&[("COMMENT_COOLDOWN_SECONDS", "0"), ("COMMENT_AUTO_PUBLISH", "false")]);
    let target = h.target().await;
    let service = CommentService::new(&h.context);

    service
        .create(&guest(), false, &client("203.0.113.10"), target, &guest_comment("held for review"))
        .await
        .unwrap();
    let page = service.list(target, &CommentListQuery::default()).await.unwrap();
    assert!(page.data.is_empty());
    assert_eq!(page.pagination.total, 0);
    assert_eq!(h.comments.len(), 1);

    let h = Harness::new(&[("COMMENT_COOLDOWN_SECONDS", "0"), ("COMMENT_RATE_LIMIT_MAX", "10")]);
    let target = h.target().await;
    let service = CommentService::new(&h.context);
    let actor = guest();
    for i in 0..5 {
        service
            .create(&actor, false, &client("203.0.113.11"), target, &guest_comment(&format!("comment number {i}")))
            .await
            .unwrap();
        h.clock.advance_secs(1);
    }

    let query = CommentListQuery {
        page: Some(2),
        limit: Some(2),
    };
    let page = service.list(target, &query).await.unwrap();
    assert_eq!(page.pagination.total, 5);
    assert_eq!(page.pagination.pages, 3);
    assert_eq!(page.data.len(), 2);
    // newest first: page 2 holds comments 2 and 1
    assert_eq!(page.data[0].text, "comment number 2");
    assert_eq!(page.data[1].text, "comment number 1");
}

// ============================================================================
// Risk verification
// ============================================================================

fn with_token(text: &str, token: Option<&str>) -> engage_service::dto::CreateCommentRequest {
    let mut body = guest_comment(text);
    body.risk_token = token.map(str::to_string);
    body
}

#[tokio::test]
async fn test_risk_disabled_skips_provider() {
    let h = Harness::new(&[]);
    let target = h.target().await;

    CommentService::new(&h.context)
        .create(&guest(), false, &client("192.0.2.1"), target, &guest_comment("no token needed"))
        .await
        .unwrap();
    assert_eq!(h.risk.calls(), 0);
}

#[tokio::test]
async fn test_risk_token_shape() {
    let overrides = risk_overrides();
    let h = Harness::new(&overrides);
    let target = h.target().await;
    let service = CommentService::new(&h.context);
    let ip = client("192.0.2.2");

    let err = service
        .create(&guest(), false, &ip, target, &with_token("hello there", None))
        .await
        .unwrap_err();
    assert_eq!((err.status_code(), reason(&err).as_str()), (400, "risk_token_missing"));

    let err = service
        .create(&guest(), false, &ip, target, &with_token("hello there", Some("bad token!")))
        .await
        .unwrap_err();
    assert_eq!((err.status_code(), reason(&err).as_str()), (400, "risk_token_malformed"));
    assert_eq!(h.risk.calls(), 0);
}

#[tokio::test]
async fn test_risk_verdicts() {
    let overrides = risk_overrides();
    let h = Harness::new(&overrides);
    let target = h.target().await;
    let service = CommentService::new(&h.context);
    let ip = client("192.0.2.3");

    let cases = [
        (
            Ok(RiskAssessment {
                valid: false,
                invalid_reason: Some("EXPIRED".into()),
                action: Some(RISK_ACTION.into()),
                score: None,
            }),
            401,
            "risk_token_invalid",
        ),
        (
            Ok(RiskAssessment {
                valid: true,
                invalid_reason: None,
                action: Some("login".into()),
                score: Some(0.9),
            }),
            401,
            "risk_action_mismatch",
        ),
        (
            Ok(RiskAssessment {
                valid: true,
                invalid_reason: None,
                action: Some(RISK_ACTION.into()),
                score: Some(0.1),
            }),
            401,
            "risk_score_too_low",
        ),
        (Err("timeout".to_string()), 500, "risk_check_failed"),
    ];

    for (verdict, status, expected) in cases {
        h.risk.set_verdict(verdict);
        let err = service
            .create(&guest(), false, &ip, target, &with_token("hello there", Some("tok-123")))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), status, "{expected}");
        assert_eq!(reason(&err), expected);
    }

    let request = h.risk.last_request().unwrap();
    assert_eq!(request.token, "tok-123");
    assert_eq!(request.user_ip.as_deref(), Some("192.0.2.3"));
    assert_eq!(request.expected_action.as_deref(), Some(RISK_ACTION));
    assert!(h.comments.is_empty());
}

#[tokio::test]
async fn test_risk_pass_records_score() {
    let overrides = risk_overrides();
    let h = Harness::new(&overrides);
    let target = h.target().await;

    CommentService::new(&h.context)
        .create(&guest(), false, &client("192.0.2.4"), target, &with_token("verified human", Some("tok-ok")))
        .await
        .unwrap();

    let stored = &h.comments.all_for(target)[0];
    assert_eq!(stored.risk_score, Some(0.9));
}
