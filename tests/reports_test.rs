//! Integration tests for reports and automatic hiding

mod common;

use common::{database::*, fixtures::*};
use sea_orm::{EntityTrait, PaginatorTrait};
use unsaid::constants::AUTO_HIDE_REPORTS_THRESHOLD;
use unsaid::error::Error;
use unsaid::moderation::ModerationRules;
use unsaid::orm::reports::{self, ReportReason, ReportStatus};
use unsaid::post_lifecycle;
use unsaid::report_gate::{file_report, pending_reports, resolve_report, set_hidden};

async fn report_n(db: &sea_orm::DatabaseConnection, post_id: i32, n: usize) {
    for _ in 0..n {
        file_report(
            db,
            post_id,
            None,
            ReportReason::Harassment,
            None,
            AUTO_HIDE_REPORTS_THRESHOLD,
            t0() + minutes(4),
        )
        .await
        .expect("Failed to file report");
    }
}

#[actix_rt::test]
async fn test_report_is_recorded_pending() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let (_company, _author, post) = seed_post(&db).await;
    let reporter = create_test_user(&db, "reporter-uid").await;

    let receipt = file_report(
        &db,
        post.id,
        Some(reporter.id),
        ReportReason::Fake,
        Some("  numbers do not add up  ".to_string()),
        AUTO_HIDE_REPORTS_THRESHOLD,
        t0() + minutes(4),
    )
    .await
    .unwrap();

    assert_eq!(receipt.report.status, ReportStatus::Pending);
    assert_eq!(receipt.report.user_id, Some(reporter.id));
    assert_eq!(receipt.report.details.as_deref(), Some("numbers do not add up"));
    assert_eq!(receipt.reports_count, 1);
    assert!(!receipt.is_hidden);
    assert!(!receipt.auto_hidden);
}

#[actix_rt::test]
async fn test_fourth_report_keeps_post_visible() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let (company, _author, post) = seed_post(&db).await;

    report_n(&db, post.id, 4).await;

    let listed = post_lifecycle::list_for_company(&db, company.id, t0() + minutes(5), 50)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].reports_count, 4);
    assert!(!listed[0].is_hidden);
}

#[actix_rt::test]
async fn test_fifth_report_hides_post() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let (company, _author, post) = seed_post(&db).await;

    report_n(&db, post.id, 4).await;
    let receipt = file_report(
        &db,
        post.id,
        None,
        ReportReason::Spam,
        None,
        AUTO_HIDE_REPORTS_THRESHOLD,
        t0() + minutes(4),
    )
    .await
    .unwrap();

    assert!(receipt.auto_hidden);
    assert!(receipt.is_hidden);
    assert_eq!(receipt.reports_count, 5);

    let listed = post_lifecycle::list_for_company(&db, company.id, t0() + minutes(5), 50)
        .await
        .unwrap();
    assert!(listed.is_empty());

    let view = post_lifecycle::get(&db, &ModerationRules::default(), post.id, t0() + minutes(5))
        .await
        .unwrap();
    assert!(view.post.is_hidden);
    assert!(!view.is_visible);
}

#[actix_rt::test]
async fn test_reports_on_hidden_post_are_still_recorded() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let (_company, _author, post) = seed_post(&db).await;

    report_n(&db, post.id, 6).await;

    assert_eq!(reports::Entity::find().count(&db).await.unwrap(), 6);
    let post = post_lifecycle::get(&db, &ModerationRules::default(), post.id, t0())
        .await
        .unwrap()
        .post;
    assert_eq!(post.reports_count, 6);
    assert!(post.is_hidden);
}

#[actix_rt::test]
async fn test_only_manual_unhide_restores_post() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let (company, _author, post) = seed_post(&db).await;

    report_n(&db, post.id, 5).await;

    let unhidden = set_hidden(&db, post.id, false).await.unwrap();
    assert!(!unhidden.is_hidden);
    assert_eq!(unhidden.reports_count, 5);

    let listed = post_lifecycle::list_for_company(&db, company.id, t0() + minutes(5), 50)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);

    // Still at or over the threshold, so the next report hides it again.
    let receipt = file_report(
        &db,
        post.id,
        None,
        ReportReason::Other,
        None,
        AUTO_HIDE_REPORTS_THRESHOLD,
        t0() + minutes(6),
    )
    .await
    .unwrap();
    assert_eq!(receipt.reports_count, 6);
    assert!(receipt.auto_hidden);
    assert!(receipt.is_hidden);
}

#[actix_rt::test]
async fn test_report_missing_post() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let result = file_report(
        &db,
        77,
        None,
        ReportReason::Spam,
        None,
        AUTO_HIDE_REPORTS_THRESHOLD,
        t0(),
    )
    .await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[actix_rt::test]
async fn test_resolve_report() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let (_company, _author, post) = seed_post(&db).await;
    report_n(&db, post.id, 2).await;

    let pending = pending_reports(&db, 20).await.unwrap();
    assert_eq!(pending.len(), 2);

    let resolved = resolve_report(&db, pending[0].id, t0() + minutes(30))
        .await
        .unwrap();
    assert_eq!(resolved.status, ReportStatus::Resolved);
    assert_eq!(resolved.resolved_at, Some(t0() + minutes(30)));

    let again = resolve_report(&db, pending[0].id, t0() + minutes(31)).await;
    assert!(matches!(again, Err(Error::Conflict { .. })));

    assert_eq!(pending_reports(&db, 20).await.unwrap().len(), 1);
}
