//! Test fixtures for creating test data
#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use sea_orm::DatabaseConnection;
use unsaid::error::Result;
use unsaid::moderation::ModerationRules;
use unsaid::orm::posts::{EmploymentStatus, Sentiment};
use unsaid::orm::{companies, posts, users};
use unsaid::post_lifecycle::{self, NewPost};

/// Passes every moderation rule with the default configuration.
pub const VALID_CONTENT: &str = "The team lead schedules calls late at night almost every week and \
    expects instant replies on chat. nobody pushes back because appraisals depend on it. weekends \
    are rarely free and leave requests sit unanswered for days.";

/// Fixed reference time so tests never race the wall clock.
pub fn t0() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

pub fn minutes(n: i64) -> Duration {
    Duration::minutes(n)
}

pub async fn create_test_company(db: &DatabaseConnection, name: &str) -> companies::Model {
    unsaid::company::create(db, name, Some("IT Services".to_string()), None, None, t0())
        .await
        .expect("Failed to create company")
}

pub async fn create_test_user(db: &DatabaseConnection, uid: &str) -> users::Model {
    unsaid::identity::find_or_create(db, uid, t0())
        .await
        .expect("Failed to create user")
}

pub fn new_post(company_id: i32) -> NewPost {
    NewPost {
        company_id,
        primary_category: "wlb".to_string(),
        sub_category: Some("night_calls".to_string()),
        employment_status: EmploymentStatus::Current,
        team_function: Some("Engineering".to_string()),
        location: None,
        sentiment: Sentiment::Negative,
        content: VALID_CONTENT.to_string(),
    }
}

/// Creates a post at `created_at` through the normal lifecycle.
pub async fn create_test_post_at(
    db: &DatabaseConnection,
    company_id: i32,
    author_id: i32,
    created_at: NaiveDateTime,
) -> Result<posts::Model> {
    post_lifecycle::create(
        db,
        &ModerationRules::default(),
        Some(author_id),
        new_post(company_id),
        created_at,
    )
    .await
}

/// Creates a post at `t0()`, visible from `t0() + 3 minutes`.
pub async fn create_test_post(
    db: &DatabaseConnection,
    company_id: i32,
    author_id: i32,
) -> posts::Model {
    create_test_post_at(db, company_id, author_id, t0())
        .await
        .expect("Failed to create post")
}

/// A company, an author and one post, in one call.
pub async fn seed_post(db: &DatabaseConnection) -> (companies::Model, users::Model, posts::Model) {
    let company = create_test_company(db, "Acme Corp").await;
    let author = create_test_user(db, "author-uid").await;
    let post = create_test_post(db, company.id, author.id).await;
    (company, author, post)
}
