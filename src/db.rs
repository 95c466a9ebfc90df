//! Database connection and schema bootstrap.

use crate::orm::{companies, posts, reports, users, votes};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
    Statement,
};

/// One unique index per voter identity channel. A NULL channel never
/// collides, so each vote is constrained only by the channel it populates.
const VOTE_UNIQUE_INDEXES: &[&str] = &[
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_votes_post_user ON votes (post_id, user_id)",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_votes_post_device ON votes (post_id, device_id)",
];

const SECONDARY_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_posts_company_listing ON posts (company_id, is_hidden, visibility_score, created_at)",
    "CREATE INDEX IF NOT EXISTS idx_reports_post ON reports (post_id)",
];

/// Opens a connection pool. In-memory SQLite is pinned to one connection,
/// since every extra connection would open a separate empty database.
pub async fn connect(url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(url.to_owned());
    if url.starts_with("sqlite::memory:") {
        opt.max_connections(1).min_connections(1);
    }

    let db = Database::connect(opt).await?;
    log::info!("Connected to {:?} database", db.get_database_backend());
    Ok(db)
}

async fn create_table<E: EntityTrait>(
    db: &DatabaseConnection,
    schema: &Schema,
    entity: E,
) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(backend.build(&stmt)).await?;
    Ok(())
}

/// Creates every table and index the service needs, skipping existing ones.
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    // Parents before children for foreign keys.
    create_table(db, &schema, companies::Entity).await?;
    create_table(db, &schema, users::Entity).await?;
    create_table(db, &schema, posts::Entity).await?;
    create_table(db, &schema, votes::Entity).await?;
    create_table(db, &schema, reports::Entity).await?;

    for sql in VOTE_UNIQUE_INDEXES.iter().chain(SECONDARY_INDEXES) {
        db.execute(Statement::from_string(backend, sql.to_string()))
            .await?;
    }

    Ok(())
}
