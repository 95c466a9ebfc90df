//! Read-only aggregates: the administrator dashboard and the public trending page.

use crate::company::SentimentCounts;
use crate::constants::category_label;
use crate::error::Result;
use crate::orm::{companies, posts, reports, users, votes};
use crate::publish::visible_condition;
use crate::report_gate;
use chrono::{Duration, NaiveDateTime};
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, Condition, DatabaseConnection, PaginatorTrait};
use serde::Serialize;
use std::collections::HashMap;

pub const TOP_COMPANIES: u64 = 10;
pub const RECENT_POSTS: u64 = 20;
pub const RECENT_REPORTS: u64 = 20;
pub const TRENDING_POSTS: u64 = 10;
pub const ACTIVE_COMPANIES: u64 = 10;

#[derive(Debug, Clone, Serialize)]
pub struct CompanyPostCount {
    pub company: companies::Model,
    pub post_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostWithCompany {
    #[serde(flatten)]
    pub post: posts::Model,
    pub company: Option<companies::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Analytics {
    pub total_companies: u64,
    pub total_posts: u64,
    pub total_users: u64,
    pub total_votes: u64,
    pub total_reports: u64,
    pub pending_reports: u64,
    pub sentiments: SentimentCounts,
    pub top_companies: Vec<CompanyPostCount>,
    pub recent_posts: Vec<PostWithCompany>,
    pub recent_reports: Vec<reports::Model>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryStat {
    pub category: String,
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActiveCompany {
    pub company: companies::Model,
    pub post_count: i64,
    pub total_validations: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Trending {
    pub trending_posts: Vec<PostWithCompany>,
    pub category_stats: Vec<CategoryStat>,
    pub active_companies: Vec<ActiveCompany>,
    pub sentiments: SentimentCounts,
    pub total_posts: u64,
    pub posts_this_week: u64,
}

fn tally_sentiments(rows: Vec<(String, i64)>) -> SentimentCounts {
    let mut counts = SentimentCounts::default();
    for (sentiment, count) in rows {
        match sentiment.as_str() {
            "positive" => counts.positive = count,
            "neutral" => counts.neutral = count,
            "negative" => counts.negative = count,
            _ => {}
        }
    }
    counts
}

async fn sentiment_counts(db: &DatabaseConnection, filter: Condition) -> Result<SentimentCounts> {
    let rows = posts::Entity::find()
        .select_only()
        .column(posts::Column::Sentiment)
        .column_as(Expr::col(posts::Column::Id).count(), "count")
        .filter(filter)
        .group_by(posts::Column::Sentiment)
        .into_tuple::<(String, i64)>()
        .all(db)
        .await?;
    Ok(tally_sentiments(rows))
}

async fn companies_by_id(
    db: &DatabaseConnection,
    ids: Vec<i32>,
) -> Result<HashMap<i32, companies::Model>> {
    Ok(companies::Entity::find()
        .filter(companies::Column::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect())
}

/// Platform-wide figures for the administrator dashboard.
pub async fn analytics(db: &DatabaseConnection, now: NaiveDateTime) -> Result<Analytics> {
    let total_companies = companies::Entity::find().count(db).await?;
    let total_posts = posts::Entity::find()
        .filter(visible_condition(now))
        .count(db)
        .await?;
    let total_users = users::Entity::find().count(db).await?;
    let total_votes = votes::Entity::find().count(db).await?;
    let total_reports = reports::Entity::find().count(db).await?;
    let pending_reports = reports::Entity::find()
        .filter(reports::Column::Status.eq(reports::ReportStatus::Pending))
        .count(db)
        .await?;

    let sentiments = sentiment_counts(db, visible_condition(now)).await?;

    let ranked: Vec<(i32, i64)> = posts::Entity::find()
        .select_only()
        .column(posts::Column::CompanyId)
        .column_as(Expr::col(posts::Column::Id).count(), "post_count")
        .group_by(posts::Column::CompanyId)
        .order_by_desc(Expr::col(posts::Column::Id).count())
        .order_by_asc(posts::Column::CompanyId)
        .limit(TOP_COMPANIES)
        .into_tuple()
        .all(db)
        .await?;
    let mut lookup = companies_by_id(db, ranked.iter().map(|(id, _)| *id).collect()).await?;
    let top_companies = ranked
        .into_iter()
        .filter_map(|(id, post_count)| {
            lookup
                .remove(&id)
                .map(|company| CompanyPostCount { company, post_count })
        })
        .collect();

    let recent_posts = posts::Entity::find()
        .order_by_desc(posts::Column::CreatedAt)
        .order_by_desc(posts::Column::Id)
        .limit(RECENT_POSTS)
        .find_also_related(companies::Entity)
        .all(db)
        .await?
        .into_iter()
        .map(|(post, company)| PostWithCompany { post, company })
        .collect();

    Ok(Analytics {
        total_companies,
        total_posts,
        total_users,
        total_votes,
        total_reports,
        pending_reports,
        sentiments,
        top_companies,
        recent_posts,
        recent_reports: report_gate::pending_reports(db, RECENT_REPORTS).await?,
    })
}

/// What readers are validating right now and where the week's posts went.
pub async fn trending(db: &DatabaseConnection, now: NaiveDateTime) -> Result<Trending> {
    let day_ago = now - Duration::hours(24);
    let week_ago = now - Duration::days(7);
    let this_week = || visible_condition(now).add(posts::Column::CreatedAt.gte(week_ago));

    let trending_posts = posts::Entity::find()
        .filter(visible_condition(now))
        .filter(posts::Column::CreatedAt.gte(day_ago))
        .order_by_desc(posts::Column::MatchesCount)
        .order_by_desc(posts::Column::CommonIssue)
        .order_by_desc(posts::Column::Id)
        .limit(TRENDING_POSTS)
        .find_also_related(companies::Entity)
        .all(db)
        .await?
        .into_iter()
        .map(|(post, company)| PostWithCompany { post, company })
        .collect();

    let category_stats = posts::Entity::find()
        .select_only()
        .column(posts::Column::PrimaryCategory)
        .column_as(Expr::col(posts::Column::Id).count(), "count")
        .filter(this_week())
        .group_by(posts::Column::PrimaryCategory)
        .order_by_desc(Expr::col(posts::Column::Id).count())
        .order_by_asc(posts::Column::PrimaryCategory)
        .into_tuple::<(String, i64)>()
        .all(db)
        .await?
        .into_iter()
        .map(|(category, count)| CategoryStat {
            label: category_label(&category)
                .map(str::to_string)
                .unwrap_or_else(|| category.clone()),
            category,
            count,
        })
        .collect();

    let active: Vec<(i32, i64, Option<i64>)> = posts::Entity::find()
        .select_only()
        .column(posts::Column::CompanyId)
        .column_as(Expr::col(posts::Column::Id).count(), "post_count")
        .column_as(Expr::col(posts::Column::MatchesCount).sum(), "total_validations")
        .filter(this_week())
        .group_by(posts::Column::CompanyId)
        .order_by_desc(Expr::col(posts::Column::Id).count())
        .order_by_asc(posts::Column::CompanyId)
        .limit(ACTIVE_COMPANIES)
        .into_tuple()
        .all(db)
        .await?;
    let mut lookup = companies_by_id(db, active.iter().map(|(id, _, _)| *id).collect()).await?;
    let active_companies = active
        .into_iter()
        .filter_map(|(id, post_count, validations)| {
            lookup.remove(&id).map(|company| ActiveCompany {
                company,
                post_count,
                total_validations: validations.unwrap_or(0),
            })
        })
        .collect();

    Ok(Trending {
        trending_posts,
        category_stats,
        active_companies,
        sentiments: sentiment_counts(db, this_week()).await?,
        total_posts: posts::Entity::find()
            .filter(visible_condition(now))
            .count(db)
            .await?,
        posts_this_week: posts::Entity::find().filter(this_week()).count(db).await?,
    })
}
