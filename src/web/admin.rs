//! Administrator moderation endpoints.
//!
//! Every handler asks the injected [`AuthorizationPolicy`] before touching state.

use super::now;
use crate::analytics;
use crate::error::Result;
use crate::middleware::ClientCtx;
use crate::permission::AuthorizationPolicy;
use crate::post_lifecycle;
use crate::report_gate;
use actix_web::{delete, get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::sync::Arc;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(hide_post)
        .service(delete_post)
        .service(resolve_report)
        .service(view_analytics);
}

type Policy = web::Data<Arc<dyn AuthorizationPolicy>>;

#[derive(Deserialize)]
struct HideForm {
    hidden: bool,
}

/// Manual hide or unhide. The only way back from an automatic hide.
#[post("/api/admin/posts/{id}/hide")]
async fn hide_post(
    client: ClientCtx,
    policy: Policy,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: web::Json<HideForm>,
) -> Result<HttpResponse> {
    policy.require_admin(client.uid())?;
    let post = report_gate::set_hidden(&db, path.into_inner(), form.hidden).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "post": post })))
}

#[delete("/api/admin/posts/{id}")]
async fn delete_post(
    client: ClientCtx,
    policy: Policy,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    policy.require_admin(client.uid())?;
    post_lifecycle::delete(&db, path.into_inner(), None, true).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

#[post("/api/admin/reports/{id}/resolve")]
async fn resolve_report(
    client: ClientCtx,
    policy: Policy,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    policy.require_admin(client.uid())?;
    let report = report_gate::resolve_report(&db, path.into_inner(), now()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "report": report })))
}

#[get("/api/admin/analytics")]
async fn view_analytics(
    client: ClientCtx,
    policy: Policy,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse> {
    policy.require_admin(client.uid())?;
    Ok(HttpResponse::Ok().json(analytics::analytics(&db, now()).await?))
}
