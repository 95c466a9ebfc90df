pub mod admin;
pub mod auth;
pub mod companies;
pub mod posts;
pub mod reports;
pub mod trending;
pub mod votes;

use crate::error::{Error, Result};
use crate::identity;
use crate::middleware::ClientCtx;
use crate::orm::users;
use chrono::{NaiveDateTime, Utc};
use sea_orm::DatabaseConnection;
use validator::Validate;

/// Configures the web app by adding services from each web file.
///
/// @see https://docs.rs/actix-web/4.0.1/actix_web/struct.App.html#method.configure
pub fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // Route resolution stops at the first match, so literal paths
    // (e.g. /api/companies/search) register before their {slug} siblings.
    admin::configure(conf);
    auth::configure(conf);
    companies::configure(conf);
    posts::configure(conf);
    reports::configure(conf);
    trending::configure(conf);
    votes::configure(conf);
}

/// Request time in UTC. Every handler reads the clock once and passes it down.
pub(crate) fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Resolves the caller to a user row, creating it on first sight.
pub(crate) async fn current_user(
    db: &DatabaseConnection,
    client: &ClientCtx,
    now: NaiveDateTime,
) -> Result<Option<users::Model>> {
    match client.uid() {
        Some(uid) => Ok(Some(identity::find_or_create(db, uid, now).await?)),
        None => Ok(None),
    }
}

/// Runs field-level checks declared with `#[validate(...)]` on a request body.
pub(crate) fn validate_form<T: Validate>(form: &T) -> Result<()> {
    form.validate().map_err(|e| {
        log::debug!("Request validation failed: {}", e);
        Error::InvalidInput(e.to_string())
    })
}
