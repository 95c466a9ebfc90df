//! Integration tests for identity sync

mod common;

use common::{database::*, fixtures::*};
use unsaid::constants::TRUST_LOGGED_IN_USER;
use unsaid::error::Error;
use unsaid::identity::{find_by_uid, find_or_create, hash_email, sync_user};

#[actix_rt::test]
async fn test_sync_creates_verified_user() {
    let db = setup_test_database().await.expect("Failed to set up database");

    let outcome = sync_user(&db, "uid-1", "Someone@Example.com", t0())
        .await
        .unwrap();

    assert!(outcome.created);
    assert!(outcome.user.is_verified);
    assert_eq!(outcome.user.trust_score, TRUST_LOGGED_IN_USER);
    assert_eq!(
        outcome.user.email_hash.as_deref(),
        Some(hash_email("someone@example.com").as_str())
    );
}

#[actix_rt::test]
async fn test_sync_returns_existing_user() {
    let db = setup_test_database().await.expect("Failed to set up database");

    let first = sync_user(&db, "uid-1", "a@example.com", t0()).await.unwrap();
    let second = sync_user(&db, "uid-1", "a@example.com", t0()).await.unwrap();

    assert!(!second.created);
    assert_eq!(first.user.id, second.user.id);
}

#[actix_rt::test]
async fn test_sync_requires_fields() {
    let db = setup_test_database().await.expect("Failed to set up database");

    assert!(matches!(
        sync_user(&db, "", "a@example.com", t0()).await,
        Err(Error::InvalidInput(_))
    ));
    assert!(matches!(
        sync_user(&db, "uid-1", "  ", t0()).await,
        Err(Error::InvalidInput(_))
    ));
}

#[actix_rt::test]
async fn test_sync_duplicate_email_conflicts() {
    let db = setup_test_database().await.expect("Failed to set up database");

    sync_user(&db, "uid-1", "a@example.com", t0()).await.unwrap();
    let result = sync_user(&db, "uid-2", "A@example.com", t0()).await;

    assert!(matches!(result, Err(Error::Conflict { .. })));
}

#[actix_rt::test]
async fn test_find_or_create_is_idempotent() {
    let db = setup_test_database().await.expect("Failed to set up database");

    assert!(find_by_uid(&db, "uid-9").await.unwrap().is_none());

    let created = find_or_create(&db, "uid-9", t0()).await.unwrap();
    let again = find_or_create(&db, "uid-9", t0()).await.unwrap();

    assert_eq!(created.id, again.id);
    assert!(!created.is_verified);
    assert_eq!(created.email_hash, None);
}
