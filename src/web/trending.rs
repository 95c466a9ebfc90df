use super::now;
use crate::analytics;
use crate::error::Result;
use actix_web::{get, web, HttpResponse};
use sea_orm::DatabaseConnection;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_trending);
}

#[get("/api/trending")]
async fn view_trending(db: web::Data<DatabaseConnection>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(analytics::trending(&db, now()).await?))
}
