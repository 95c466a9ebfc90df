//! Report submission

use super::{current_user, now};
use crate::error::Result;
use crate::middleware::ClientCtx;
use crate::moderation::ModerationRules;
use crate::orm::reports::ReportReason;
use crate::report_gate;
use actix_web::{post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(submit_report);
}

#[derive(Deserialize, Validate)]
struct ReportForm {
    post_id: i32,
    reason: ReportReason,
    #[validate(length(max = 2000))]
    details: Option<String>,
}

/// Anyone may report. Signed-in reporters are recorded against the report.
#[post("/api/reports")]
async fn submit_report(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    rules: web::Data<ModerationRules>,
    form: web::Json<ReportForm>,
) -> Result<HttpResponse> {
    super::validate_form(&*form)?;
    let now = now();
    let reporter = current_user(&db, &client, now).await?;
    let form = form.into_inner();

    let receipt = report_gate::file_report(
        &db,
        form.post_id,
        reporter.map(|u| u.id),
        form.reason,
        form.details,
        rules.auto_hide_reports_threshold,
        now,
    )
    .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "report": receipt.report,
        "message": "Report submitted. Thank you for helping keep the platform safe.",
    })))
}
