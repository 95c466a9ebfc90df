//! Identity-provider sync

use super::{now, validate_form};
use crate::error::Result;
use crate::identity;
use actix_web::{post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(sync_user);
}

#[derive(Deserialize, Validate)]
struct SyncForm {
    #[serde(default)]
    uid: String,
    #[serde(default)]
    #[validate(email)]
    email: String,
}

/// Called by the client after sign-in. The email is hashed and never stored.
#[post("/api/auth/sync")]
async fn sync_user(
    db: web::Data<DatabaseConnection>,
    form: web::Json<SyncForm>,
) -> Result<HttpResponse> {
    if !form.email.trim().is_empty() {
        validate_form(&*form)?;
    }
    let outcome = identity::sync_user(&db, &form.uid, &form.email, now()).await?;

    let body = serde_json::json!({
        "user": {
            "id": outcome.user.id,
            "is_verified": outcome.user.is_verified,
            "trust_score": outcome.user.trust_score,
        },
        "created": outcome.created,
    });

    Ok(if outcome.created {
        HttpResponse::Created().json(body)
    } else {
        HttpResponse::Ok().json(body)
    })
}
