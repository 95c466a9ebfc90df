//! Test database setup
#![allow(dead_code)]

use sea_orm::{DatabaseConnection, DbErr};

/// Every test gets its own in-memory SQLite database with the full schema.
pub async fn setup_test_database() -> Result<DatabaseConnection, DbErr> {
    let db = unsaid::db::connect("sqlite::memory:").await?;
    unsaid::db::create_schema(&db).await?;
    Ok(db)
}
