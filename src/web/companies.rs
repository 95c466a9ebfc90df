//! Company directory endpoints

use super::{now, validate_form};
use crate::app_config::AppConfig;
use crate::company;
use crate::constants::DEFAULT_COMPANY_LIMIT;
use crate::error::Result;
use crate::post_lifecycle;
use actix_web::{get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // search before {slug}
    conf.service(search_companies)
        .service(list_companies)
        .service(create_company)
        .service(compare_companies)
        .service(company_stats)
        .service(view_company);
}

#[derive(Deserialize, Validate)]
struct ListQuery {
    #[validate(range(min = 1, max = 100))]
    limit: Option<u64>,
}

#[get("/api/companies")]
async fn list_companies(
    db: web::Data<DatabaseConnection>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    validate_form(&*query)?;
    let companies = company::list(&db, query.limit.unwrap_or(DEFAULT_COMPANY_LIMIT)).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "companies": companies })))
}

#[derive(Deserialize, Validate)]
struct CompanyForm {
    #[validate(length(min = 1, max = 200))]
    name: String,
    #[validate(length(max = 100))]
    industry: Option<String>,
    #[validate(length(max = 100))]
    location: Option<String>,
    #[validate(length(max = 2000))]
    description: Option<String>,
}

#[post("/api/companies")]
async fn create_company(
    db: web::Data<DatabaseConnection>,
    form: web::Json<CompanyForm>,
) -> Result<HttpResponse> {
    validate_form(&*form)?;
    let form = form.into_inner();
    let company = company::create(
        &db,
        &form.name,
        form.industry,
        form.location,
        form.description,
        now(),
    )
    .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({ "company": company })))
}

#[derive(Deserialize)]
struct SearchQuery {
    q: Option<String>,
}

#[get("/api/companies/search")]
async fn search_companies(
    db: web::Data<DatabaseConnection>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse> {
    let companies = company::search(&db, query.q.as_deref().unwrap_or_default()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "companies": companies })))
}

/// Company profile with its visible posts
#[get("/api/companies/{slug}")]
async fn view_company(
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let company = company::find_by_slug(&db, &path).await?;
    let posts = post_lifecycle::list_for_company(
        &db,
        company.id,
        now(),
        config.server.default_post_limit,
    )
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "company": company,
        "posts": posts,
    })))
}

#[get("/api/companies/{slug}/stats")]
async fn company_stats(
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let stats = company::stats(&db, &path, now()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "stats": stats })))
}

#[derive(Deserialize)]
struct CompareQuery {
    companies: Option<String>,
}

/// `?companies=slug-a,slug-b`
#[get("/api/compare")]
async fn compare_companies(
    db: web::Data<DatabaseConnection>,
    query: web::Query<CompareQuery>,
) -> Result<HttpResponse> {
    let slugs: Vec<String> = query
        .companies
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::to_string)
        .collect();
    let companies = company::compare(&db, &slugs, now()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "companies": companies })))
}
