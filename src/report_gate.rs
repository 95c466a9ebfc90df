//! Reports against posts and the automatic hide threshold.
//!
//! Every report is recorded, whatever the post's state. Once a post collects
//! enough reports it is hidden in the same transaction; only an administrator
//! can unhide it again. Reporters are not deduplicated.

use crate::error::{Error, Result};
use crate::orm::reports::{self, ReportReason, ReportStatus};
use crate::orm::posts;
use chrono::NaiveDateTime;
use sea_orm::{
    entity::*, query::*, sea_query::Expr, ActiveValue::Set, DatabaseConnection, TransactionTrait,
};

/// Outcome of a filed report
#[derive(Debug, Clone)]
pub struct ReportReceipt {
    pub report: reports::Model,
    pub reports_count: i32,
    pub is_hidden: bool,
    /// True if this report is the one that tripped the threshold
    pub auto_hidden: bool,
}

pub async fn file_report(
    db: &DatabaseConnection,
    post_id: i32,
    reporter_id: Option<i32>,
    reason: ReportReason,
    details: Option<String>,
    auto_hide_threshold: i32,
    now: NaiveDateTime,
) -> Result<ReportReceipt> {
    let txn = db.begin().await?;

    if posts::Entity::find_by_id(post_id).one(&txn).await?.is_none() {
        return Err(Error::NotFound("Post"));
    }

    let details = details
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    let report = reports::ActiveModel {
        post_id: Set(post_id),
        user_id: Set(reporter_id),
        reason: Set(reason),
        details: Set(details),
        status: Set(ReportStatus::Pending),
        created_at: Set(now),
        resolved_at: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    posts::Entity::update_many()
        .col_expr(
            posts::Column::ReportsCount,
            Expr::col(posts::Column::ReportsCount).add(1),
        )
        .filter(posts::Column::Id.eq(post_id))
        .exec(&txn)
        .await?;

    let post = posts::Entity::find_by_id(post_id)
        .one(&txn)
        .await?
        .ok_or(Error::NotFound("Post"))?;

    let auto_hidden = !post.is_hidden && post.reports_count >= auto_hide_threshold;
    if auto_hidden {
        posts::Entity::update_many()
            .col_expr(posts::Column::IsHidden, Expr::value(true))
            .filter(posts::Column::Id.eq(post_id))
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;

    if auto_hidden {
        log::info!(
            "Post {} hidden automatically after {} reports",
            post_id,
            post.reports_count
        );
    }

    Ok(ReportReceipt {
        report,
        reports_count: post.reports_count,
        is_hidden: post.is_hidden || auto_hidden,
        auto_hidden,
    })
}

/// Manually hides or unhides a post. Administrator action.
pub async fn set_hidden(db: &DatabaseConnection, post_id: i32, hidden: bool) -> Result<posts::Model> {
    let post = posts::Entity::find_by_id(post_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound("Post"))?;

    let mut post: posts::ActiveModel = post.into();
    post.is_hidden = Set(hidden);
    let post = post.update(db).await?;

    log::info!(
        "Post {} {} by administrator",
        post_id,
        if hidden { "hidden" } else { "unhidden" }
    );

    Ok(post)
}

/// Moves a pending report to resolved. Resolved reports stay resolved.
pub async fn resolve_report(
    db: &DatabaseConnection,
    report_id: i32,
    now: NaiveDateTime,
) -> Result<reports::Model> {
    let report = reports::Entity::find_by_id(report_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound("Report"))?;

    if report.status != ReportStatus::Pending {
        return Err(Error::conflict("Report already resolved", Some(report.id)));
    }

    let mut report: reports::ActiveModel = report.into();
    report.status = Set(ReportStatus::Resolved);
    report.resolved_at = Set(Some(now));
    Ok(report.update(db).await?)
}

/// Most recent pending reports, newest first.
pub async fn pending_reports(db: &DatabaseConnection, limit: u64) -> Result<Vec<reports::Model>> {
    Ok(reports::Entity::find()
        .filter(reports::Column::Status.eq(ReportStatus::Pending))
        .order_by_desc(reports::Column::CreatedAt)
        .order_by_desc(reports::Column::Id)
        .limit(limit)
        .all(db)
        .await?)
}
