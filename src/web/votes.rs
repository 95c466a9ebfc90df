use super::{current_user, now};
use crate::error::Result;
use crate::identity::VoterIdentity;
use crate::middleware::ClientCtx;
use crate::orm::votes::VoteType;
use crate::vote_ledger;
use actix_web::{post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(cast_vote);
}

#[derive(Deserialize)]
struct VoteForm {
    post_id: i32,
    vote_type: String,
}

/// Signed-in callers vote as themselves; everyone else votes as their device.
#[post("/api/votes")]
async fn cast_vote(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    form: web::Json<VoteForm>,
) -> Result<HttpResponse> {
    let now = now();
    let vote_type: VoteType = form.vote_type.parse()?;

    let voter = match current_user(&db, &client, now).await? {
        Some(user) => VoterIdentity::User(user.id),
        None => VoterIdentity::Device(client.fingerprint().to_string()),
    };

    let receipt = vote_ledger::cast_vote(&db, form.post_id, &voter, vote_type, now).await?;
    let post = receipt.post;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "vote": receipt.vote,
        "counts": {
            "matches_count": post.matches_count,
            "not_matches_count": post.not_matches_count,
            "common_issue": post.common_issue,
            "recent": post.recent,
            "still_happening": post.still_happening,
            "management_driven": post.management_driven,
        },
        "visibility_score": post.visibility_score,
    })))
}
