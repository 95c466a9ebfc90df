//! Post submission, reading and author self-service

use super::{now, validate_form};
use crate::app_config::AppConfig;
use crate::company;
use crate::error::{Error, Result};
use crate::identity;
use crate::middleware::ClientCtx;
use crate::moderation::ModerationRules;
use crate::post_lifecycle::{self, NewPost};
use actix_web::{delete, get, patch, post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(list_posts)
        .service(create_post)
        .service(view_post)
        .service(my_posts)
        .service(edit_my_post)
        .service(delete_my_post);
}

#[derive(Deserialize, Validate)]
struct ListQuery {
    company_slug: Option<String>,
    #[validate(range(min = 1, max = 200))]
    limit: Option<u64>,
}

/// Visible posts of one company
#[get("/api/posts")]
async fn list_posts(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    validate_form(&*query)?;
    let slug = query
        .company_slug
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| Error::InvalidInput("Company slug is required".to_string()))?;

    let company = company::find_by_slug(&db, slug).await?;
    let limit = query.limit.unwrap_or(config.server.default_post_limit);
    let posts = post_lifecycle::list_for_company(&db, company.id, now(), limit).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "company": company,
        "posts": posts,
    })))
}

#[post("/api/posts")]
async fn create_post(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    rules: web::Data<ModerationRules>,
    form: web::Json<NewPost>,
) -> Result<HttpResponse> {
    let now = now();
    let post =
        post_lifecycle::create_for_uid(&db, &rules, client.uid(), form.into_inner(), now).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "post": post,
        "message": format!(
            "Post submitted. It will be visible in {} minutes.",
            rules.publish.publish_delay.num_minutes()
        ),
    })))
}

/// A single post. Posts not yet visible are only shown to their author.
#[get("/api/posts/{id}")]
async fn view_post(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    rules: web::Data<ModerationRules>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let now = now();
    let view = post_lifecycle::get(&db, &rules, path.into_inner(), now).await?;

    if !view.is_visible {
        let author = match client.uid() {
            Some(uid) => identity::find_by_uid(&db, uid).await?,
            None => None,
        };
        if author.map(|u| u.id) != view.post.user_id || view.post.user_id.is_none() {
            return Err(Error::NotFound("Post"));
        }
    }

    Ok(HttpResponse::Ok().json(view))
}

#[get("/api/my-posts")]
async fn my_posts(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    rules: web::Data<ModerationRules>,
) -> Result<HttpResponse> {
    let uid = client.require_uid()?;
    let posts = match identity::find_by_uid(&db, uid).await? {
        Some(user) => post_lifecycle::list_for_author(&db, &rules, user.id, now()).await?,
        None => Vec::new(),
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({ "posts": posts })))
}

#[derive(Deserialize)]
struct EditForm {
    content: String,
}

#[patch("/api/my-posts/{id}")]
async fn edit_my_post(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    rules: web::Data<ModerationRules>,
    path: web::Path<i32>,
    form: web::Json<EditForm>,
) -> Result<HttpResponse> {
    let uid = client.require_uid()?;
    let user = identity::find_by_uid(&db, uid)
        .await?
        .ok_or(Error::Forbidden)?;
    let post = post_lifecycle::edit(
        &db,
        &rules,
        path.into_inner(),
        user.id,
        form.into_inner().content,
        now(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "post": post })))
}

#[delete("/api/my-posts/{id}")]
async fn delete_my_post(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let uid = client.require_uid()?;
    let user = identity::find_by_uid(&db, uid).await?;
    post_lifecycle::delete(&db, path.into_inner(), user.map(|u| u.id), false).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}
