//! Integration tests for the report ledger, scoring, and vote tally
//!
//! Exercises the library operations directly against an in-memory database;
//! the HTTP layer has its own suite.

use skf_common::db::models::{Category, VoteDirection};
use skf_common::Error;
use skf_re::db::{organizations, reports, votes};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use uuid::Uuid;

async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    skf_common::db::create_all_tables(&pool)
        .await
        .expect("Schema initialization failed");

    pool
}

async fn seed_user(pool: &SqlitePool, email: &str, name: Option<&str>) -> Uuid {
    skf_re::db::users::create_user(
        pool,
        skf_re::db::users::NewUser {
            email: email.to_string(),
            name: name.map(|n| n.to_string()),
            password_hash: "hash".to_string(),
            password_salt: "salt".to_string(),
        },
    )
    .await
    .expect("Failed to seed user")
    .id
}

fn report(organization_id: Uuid, user_id: Uuid, severity: i64) -> reports::NewReport {
    reports::NewReport {
        organization_id,
        user_id,
        category: "pay".to_string(),
        title: "Late paychecks".to_string(),
        body: "Payroll ran two weeks late, twice.".to_string(),
        severity,
        is_anonymous: true,
    }
}

#[tokio::test]
async fn acme_scenario_scores_and_tallies() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "worker@example.com", None).await;

    // Registration: slug derived, score and count start at zero
    let org = organizations::register(
        &pool,
        organizations::NewOrganization { name: "Acme Corp".to_string(), ..Default::default() },
    )
    .await
    .unwrap();
    assert_eq!(org.slug, "acme-corp");
    assert_eq!(org.sketch_score, 0);
    assert_eq!(org.total_reports, 0);

    // First report, severity 5: score 100, count 1
    let first = reports::submit(&pool, report(org.id, user, 5)).await.unwrap();
    let org = organizations::get_by_id(&pool, org.id).await.unwrap();
    assert_eq!(org.sketch_score, 100);
    assert_eq!(org.total_reports, 1);

    // Second report, severity 1: mean 3 -> score 60, count 2
    reports::submit(&pool, report(org.id, user, 1)).await.unwrap();
    let org = organizations::get_by_id(&pool, org.id).await.unwrap();
    assert_eq!(org.sketch_score, 60);
    assert_eq!(org.total_reports, 2);

    // Up then down by the same voter: exactly one counted vote, latest wins
    votes::cast_vote(&pool, first.id, user, VoteDirection::Up).await.unwrap();
    let tally = votes::cast_vote(&pool, first.id, user, VoteDirection::Down).await.unwrap();
    assert_eq!(tally.upvotes, 0);
    assert_eq!(tally.downvotes, 1);
}

#[tokio::test]
async fn score_always_reflects_current_report_set() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "worker@example.com", None).await;

    let org = organizations::register(
        &pool,
        organizations::NewOrganization { name: "Grindset Corp".to_string(), ..Default::default() },
    )
    .await
    .unwrap();

    for severity in [4, 4, 5] {
        reports::submit(&pool, report(org.id, user, severity)).await.unwrap();
    }

    let org = organizations::get_by_id(&pool, org.id).await.unwrap();
    // mean(4, 4, 5) = 4.333... -> 87
    assert_eq!(org.sketch_score, 87);
    assert_eq!(org.total_reports, 3);

    let actual: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports WHERE organization_id = ?")
        .bind(org.id.to_string())
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(org.total_reports, actual);
}

#[tokio::test]
async fn invalid_submissions_leave_no_trace() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "worker@example.com", None).await;

    let org = organizations::register(
        &pool,
        organizations::NewOrganization { name: "Acme Corp".to_string(), ..Default::default() },
    )
    .await
    .unwrap();
    reports::submit(&pool, report(org.id, user, 3)).await.unwrap();

    // Severity out of range
    let err = reports::submit(&pool, report(org.id, user, 6)).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    let err = reports::submit(&pool, report(org.id, user, 0)).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    // Category outside the closed set
    let mut bad = report(org.id, user, 3);
    bad.category = "vibes".to_string();
    let err = reports::submit(&pool, bad).await.unwrap_err();
    assert!(matches!(err, Error::InvalidCategory(_)));

    // Empty title and body
    let mut bad = report(org.id, user, 3);
    bad.title = "   ".to_string();
    assert!(matches!(reports::submit(&pool, bad).await.unwrap_err(), Error::InvalidInput(_)));

    let mut bad = report(org.id, user, 3);
    bad.body = String::new();
    assert!(matches!(reports::submit(&pool, bad).await.unwrap_err(), Error::InvalidInput(_)));

    // Unknown organization
    let err = reports::submit(&pool, report(Uuid::new_v4(), user, 3)).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    // Organization state is untouched by any of the failures
    let org = organizations::get_by_id(&pool, org.id).await.unwrap();
    assert_eq!(org.sketch_score, 60);
    assert_eq!(org.total_reports, 1);
}

#[tokio::test]
async fn organizations_score_independently() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "worker@example.com", None).await;

    let acme = organizations::register(
        &pool,
        organizations::NewOrganization { name: "Acme Corp".to_string(), ..Default::default() },
    )
    .await
    .unwrap();
    let grindset = organizations::register(
        &pool,
        organizations::NewOrganization { name: "Grindset Corp".to_string(), ..Default::default() },
    )
    .await
    .unwrap();

    reports::submit(&pool, report(acme.id, user, 5)).await.unwrap();
    reports::submit(&pool, report(grindset.id, user, 1)).await.unwrap();

    let acme = organizations::get_by_id(&pool, acme.id).await.unwrap();
    let grindset = organizations::get_by_id(&pool, grindset.id).await.unwrap();
    assert_eq!((acme.sketch_score, acme.total_reports), (100, 1));
    assert_eq!((grindset.sketch_score, grindset.total_reports), (20, 1));
}

#[tokio::test]
async fn report_list_is_newest_first_with_author_substitution() {
    let pool = test_pool().await;
    let named = seed_user(&pool, "taylor@example.com", Some("Taylor")).await;
    let unnamed = seed_user(&pool, "blank@example.com", None).await;

    let org = organizations::register(
        &pool,
        organizations::NewOrganization { name: "Acme Corp".to_string(), ..Default::default() },
    )
    .await
    .unwrap();

    let mut open_report = report(org.id, named, 2);
    open_report.title = "First".to_string();
    open_report.is_anonymous = false;
    reports::submit(&pool, open_report).await.unwrap();

    let mut anon_report = report(org.id, named, 3);
    anon_report.title = "Second".to_string();
    reports::submit(&pool, anon_report).await.unwrap();

    let mut nameless_report = report(org.id, unnamed, 4);
    nameless_report.title = "Third".to_string();
    nameless_report.is_anonymous = false;
    reports::submit(&pool, nameless_report).await.unwrap();

    let listed = reports::list_by_organization(&pool, org.id, None).await.unwrap();
    assert_eq!(listed.len(), 3);

    // Newest first
    assert_eq!(listed[0].title, "Third");
    assert_eq!(listed[1].title, "Second");
    assert_eq!(listed[2].title, "First");

    // Anonymous reports never show the stored name; accounts without a
    // display name fall back to Anonymous too
    assert_eq!(listed[0].author_name, "Anonymous");
    assert_eq!(listed[1].author_name, "Anonymous");
    assert_eq!(listed[2].author_name, "Taylor");
}

#[tokio::test]
async fn report_list_filters_by_category() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "worker@example.com", None).await;

    let org = organizations::register(
        &pool,
        organizations::NewOrganization { name: "Acme Corp".to_string(), ..Default::default() },
    )
    .await
    .unwrap();

    for category in ["pay", "pay", "culture"] {
        let mut new = report(org.id, user, 3);
        new.category = category.to_string();
        reports::submit(&pool, new).await.unwrap();
    }

    let pay = reports::list_by_organization(&pool, org.id, Some(Category::Pay)).await.unwrap();
    assert_eq!(pay.len(), 2);
    assert!(pay.iter().all(|r| r.category == Category::Pay));

    let benefits =
        reports::list_by_organization(&pool, org.id, Some(Category::Benefits)).await.unwrap();
    assert!(benefits.is_empty());
}

#[tokio::test]
async fn category_breakdown_counts_present_categories() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "worker@example.com", None).await;

    let org = organizations::register(
        &pool,
        organizations::NewOrganization { name: "Acme Corp".to_string(), ..Default::default() },
    )
    .await
    .unwrap();

    for category in ["culture", "pay", "culture", "culture", "exit"] {
        let mut new = report(org.id, user, 3);
        new.category = category.to_string();
        reports::submit(&pool, new).await.unwrap();
    }

    let breakdown = reports::category_breakdown(&pool, org.id).await.unwrap();
    assert_eq!(breakdown.len(), 3);
    assert_eq!(breakdown[0].category, Category::Culture);
    assert_eq!(breakdown[0].count, 3);
    // Tie between exit and pay resolves by category name
    assert_eq!(breakdown[1].category, Category::Exit);
    assert_eq!(breakdown[1].count, 1);
    assert_eq!(breakdown[2].category, Category::Pay);
    assert_eq!(breakdown[2].count, 1);
}

#[tokio::test]
async fn votes_are_idempotent_per_voter() {
    let pool = test_pool().await;
    let alice = seed_user(&pool, "alice@example.com", None).await;
    let bob = seed_user(&pool, "bob@example.com", None).await;

    let org = organizations::register(
        &pool,
        organizations::NewOrganization { name: "Acme Corp".to_string(), ..Default::default() },
    )
    .await
    .unwrap();
    let submitted = reports::submit(&pool, report(org.id, alice, 3)).await.unwrap();

    // Re-casting the same direction changes nothing
    votes::cast_vote(&pool, submitted.id, alice, VoteDirection::Up).await.unwrap();
    let tally = votes::cast_vote(&pool, submitted.id, alice, VoteDirection::Up).await.unwrap();
    assert_eq!((tally.upvotes, tally.downvotes), (1, 0));

    // A second voter is counted separately
    let tally = votes::cast_vote(&pool, submitted.id, bob, VoteDirection::Up).await.unwrap();
    assert_eq!((tally.upvotes, tally.downvotes), (2, 0));

    // Flipping moves the vote between buckets atomically
    let tally = votes::cast_vote(&pool, submitted.id, alice, VoteDirection::Down).await.unwrap();
    assert_eq!((tally.upvotes, tally.downvotes), (1, 1));

    // The mirrored counter on the report row tracks the up-count
    let stored = reports::get_by_id(&pool, submitted.id).await.unwrap();
    assert_eq!(stored.upvotes, 1);

    // Exactly one row per voter in storage
    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM report_votes WHERE report_id = ?")
        .bind(submitted.id.to_string())
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 2);
}

#[tokio::test]
async fn vote_on_missing_report_fails() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "worker@example.com", None).await;

    let err = votes::cast_vote(&pool, Uuid::new_v4(), user, VoteDirection::Up).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn votes_never_change_the_sketch_score() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "worker@example.com", None).await;

    let org = organizations::register(
        &pool,
        organizations::NewOrganization { name: "Acme Corp".to_string(), ..Default::default() },
    )
    .await
    .unwrap();
    let submitted = reports::submit(&pool, report(org.id, user, 4)).await.unwrap();

    votes::cast_vote(&pool, submitted.id, user, VoteDirection::Down).await.unwrap();

    let org = organizations::get_by_id(&pool, org.id).await.unwrap();
    assert_eq!(org.sketch_score, 80);
    assert_eq!(org.total_reports, 1);
}

#[tokio::test]
async fn listing_orders_by_score_then_count() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "worker@example.com", None).await;

    let quiet = organizations::register(
        &pool,
        organizations::NewOrganization { name: "Quiet Co".to_string(), ..Default::default() },
    )
    .await
    .unwrap();
    let loud = organizations::register(
        &pool,
        organizations::NewOrganization { name: "Loud Co".to_string(), ..Default::default() },
    )
    .await
    .unwrap();
    let busy = organizations::register(
        &pool,
        organizations::NewOrganization { name: "Busy Co".to_string(), ..Default::default() },
    )
    .await
    .unwrap();

    // loud: one severity-5 report -> 100
    reports::submit(&pool, report(loud.id, user, 5)).await.unwrap();
    // busy: two severity-5 reports -> 100, more reports than loud
    reports::submit(&pool, report(busy.id, user, 5)).await.unwrap();
    reports::submit(&pool, report(busy.id, user, 5)).await.unwrap();
    // quiet: no reports -> 0

    let listed = organizations::list_all(&pool).await.unwrap();
    let slugs: Vec<&str> = listed.iter().map(|o| o.slug.as_str()).collect();
    assert_eq!(slugs, vec!["busy-co", "loud-co", "quiet-co"]);
}
