//! Company directory: creation, lookup, search and aggregate statistics.

use crate::error::{Error, Result};
use crate::orm::companies;
use crate::orm::posts::{self, Sentiment};
use crate::publish::visible_condition;
use chrono::{Duration, NaiveDateTime};
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{entity::*, query::*, ActiveValue::Set, Condition, DatabaseConnection, SqlErr};
use serde::Serialize;
use std::collections::HashMap;

/// Queries shorter than this return nothing
pub const MIN_SEARCH_CHARS: usize = 2;
pub const SEARCH_LIMIT: u64 = 10;
pub const TOP_CATEGORIES: usize = 3;
pub const RECENT_ACTIVITY_DAYS: i64 = 30;
pub const MIN_COMPARE: usize = 2;
pub const MAX_COMPARE: usize = 4;

#[derive(Debug, Clone, Serialize)]
pub struct CompanyWithCount {
    #[serde(flatten)]
    pub company: companies::Model,
    pub post_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SentimentCounts {
    pub positive: i64,
    pub neutral: i64,
    pub negative: i64,
}

impl SentimentCounts {
    pub fn tally<'a>(sentiments: impl IntoIterator<Item = &'a Sentiment>) -> Self {
        let mut counts = Self::default();
        for sentiment in sentiments {
            match sentiment {
                Sentiment::Positive => counts.positive += 1,
                Sentiment::Neutral => counts.neutral += 1,
                Sentiment::Negative => counts.negative += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> i64 {
        self.positive + self.neutral + self.negative
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyStats {
    pub total_posts: i64,
    pub positive_percent: i64,
    pub neutral_percent: i64,
    pub negative_percent: i64,
    pub top_categories: Vec<CategoryCount>,
    pub recent_activity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonStats {
    pub total_posts: i64,
    pub total_validations: i64,
    pub sentiment_counts: SentimentCounts,
    pub culture_score: i64,
    pub top_categories: Vec<CategoryCount>,
    pub positive_percentage: i64,
    pub negative_percentage: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyComparison {
    pub company: companies::Model,
    pub stats: ComparisonStats,
}

/// Lowercases and collapses every run of non-alphanumerics into a single `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

fn percent(part: i64, total: i64) -> i64 {
    if total == 0 {
        0
    } else {
        (part as f64 / total as f64 * 100.0).round() as i64
    }
}

/// Most frequent categories first; ties broken alphabetically.
fn top_categories<'a>(categories: impl IntoIterator<Item = &'a str>, n: usize) -> Vec<CategoryCount> {
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for category in categories {
        *counts.entry(category).or_default() += 1;
    }

    let mut counts: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.to_string(),
            count,
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
    counts.truncate(n);
    counts
}

/// Positive share plus half the non-negative share, as a 0-100 score.
/// Companies without posts sit at 50.
pub fn culture_score(counts: &SentimentCounts) -> i64 {
    let total = counts.total();
    if total == 0 {
        return 50;
    }
    let positive = counts.positive as f64 / total as f64;
    let negative = counts.negative as f64 / total as f64;
    let score = (positive * 100.0 + (1.0 - negative) * 100.0 / 2.0).round() as i64;
    score.clamp(0, 100)
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

async fn find_duplicate(
    db: &DatabaseConnection,
    name: &str,
    slug: &str,
) -> Result<Option<companies::Model>> {
    Ok(companies::Entity::find()
        .filter(
            Condition::any()
                .add(companies::Column::Slug.eq(slug))
                .add(Expr::expr(Func::lower(Expr::col(companies::Column::Name))).eq(name.to_lowercase())),
        )
        .one(db)
        .await?)
}

/// Adds a company. Names that slugify or lowercase to an existing company are
/// rejected with a conflict referencing the existing row.
pub async fn create(
    db: &DatabaseConnection,
    name: &str,
    industry: Option<String>,
    location: Option<String>,
    description: Option<String>,
    now: NaiveDateTime,
) -> Result<companies::Model> {
    let name = name.trim();
    let slug = slugify(name);
    if name.is_empty() || slug.is_empty() {
        return Err(Error::InvalidInput("Company name is required".to_string()));
    }

    if let Some(existing) = find_duplicate(db, name, &slug).await? {
        return Err(Error::conflict("Company already exists", Some(existing.id)));
    }

    let company = companies::ActiveModel {
        name: Set(name.to_string()),
        slug: Set(slug.clone()),
        industry: Set(trimmed(industry)),
        location: Set(trimmed(location)),
        description: Set(trimmed(description)),
        created_at: Set(now),
        ..Default::default()
    };

    match company.insert(db).await {
        Ok(company) => {
            log::info!("Company {} created as {}", company.id, company.slug);
            Ok(company)
        }
        Err(err) => match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                let existing = find_duplicate(db, name, &slug).await?;
                Err(Error::conflict(
                    "Company already exists",
                    existing.map(|c| c.id),
                ))
            }
            _ => Err(err.into()),
        },
    }
}

pub async fn find_by_slug(db: &DatabaseConnection, slug: &str) -> Result<companies::Model> {
    companies::Entity::find()
        .filter(companies::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or(Error::CompanyNotFound)
}

const LIKE_ESCAPE: char = '\\';

/// Escapes `LIKE` wildcards so the query matches literally.
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// Case-insensitive substring search on the company name, newest first.
pub async fn search(db: &DatabaseConnection, query: &str) -> Result<Vec<companies::Model>> {
    let query = query.trim();
    if query.chars().count() < MIN_SEARCH_CHARS {
        return Ok(Vec::new());
    }

    Ok(companies::Entity::find()
        .filter(
            Expr::expr(Func::lower(Expr::col(companies::Column::Name)))
                .like(
                    LikeExpr::new(format!("%{}%", escape_like(&query.to_lowercase())))
                        .escape(LIKE_ESCAPE),
                ),
        )
        .order_by_desc(companies::Column::CreatedAt)
        .order_by_desc(companies::Column::Id)
        .limit(SEARCH_LIMIT)
        .all(db)
        .await?)
}

/// Newest companies first with the number of posts filed against each.
pub async fn list(db: &DatabaseConnection, limit: u64) -> Result<Vec<CompanyWithCount>> {
    let companies = companies::Entity::find()
        .order_by_desc(companies::Column::CreatedAt)
        .order_by_desc(companies::Column::Id)
        .limit(limit)
        .all(db)
        .await?;

    let ids: Vec<i32> = companies.iter().map(|c| c.id).collect();
    let counts: HashMap<i32, i64> = posts::Entity::find()
        .select_only()
        .column(posts::Column::CompanyId)
        .column_as(Expr::col(posts::Column::Id).count(), "post_count")
        .filter(posts::Column::CompanyId.is_in(ids))
        .group_by(posts::Column::CompanyId)
        .into_tuple::<(i32, i64)>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    Ok(companies
        .into_iter()
        .map(|company| CompanyWithCount {
            post_count: counts.get(&company.id).copied().unwrap_or(0),
            company,
        })
        .collect())
}

async fn visible_posts(
    db: &DatabaseConnection,
    company_id: i32,
    now: NaiveDateTime,
) -> Result<Vec<posts::Model>> {
    Ok(posts::Entity::find()
        .filter(posts::Column::CompanyId.eq(company_id))
        .filter(visible_condition(now))
        .all(db)
        .await?)
}

/// Summarizes a company's posts into the figures shown on its page.
pub fn summarize(posts: &[posts::Model], now: NaiveDateTime) -> CompanyStats {
    let total = posts.len() as i64;
    let sentiment = SentimentCounts::tally(posts.iter().map(|p| &p.sentiment));
    let since = now - Duration::days(RECENT_ACTIVITY_DAYS);

    CompanyStats {
        total_posts: total,
        positive_percent: percent(sentiment.positive, total),
        neutral_percent: percent(sentiment.neutral, total),
        negative_percent: percent(sentiment.negative, total),
        top_categories: top_categories(
            posts.iter().map(|p| p.primary_category.as_str()),
            TOP_CATEGORIES,
        ),
        recent_activity: posts.iter().filter(|p| p.created_at >= since).count() as i64,
    }
}

pub async fn stats(db: &DatabaseConnection, slug: &str, now: NaiveDateTime) -> Result<CompanyStats> {
    let company = find_by_slug(db, slug).await?;
    let posts = visible_posts(db, company.id, now).await?;
    Ok(summarize(&posts, now))
}

fn comparison_stats(posts: &[posts::Model]) -> ComparisonStats {
    let total = posts.len() as i64;
    let sentiment_counts = SentimentCounts::tally(posts.iter().map(|p| &p.sentiment));

    ComparisonStats {
        total_posts: total,
        total_validations: posts.iter().map(|p| p.matches_count as i64).sum(),
        culture_score: culture_score(&sentiment_counts),
        top_categories: top_categories(
            posts.iter().map(|p| p.primary_category.as_str()),
            TOP_CATEGORIES,
        ),
        positive_percentage: percent(sentiment_counts.positive, total),
        negative_percentage: percent(sentiment_counts.negative, total),
        sentiment_counts,
    }
}

/// Side-by-side statistics for two to four companies. Unknown slugs are
/// skipped as long as at least two companies remain.
pub async fn compare(
    db: &DatabaseConnection,
    slugs: &[String],
    now: NaiveDateTime,
) -> Result<Vec<CompanyComparison>> {
    let slugs: Vec<&str> = slugs
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    if slugs.len() < MIN_COMPARE {
        return Err(Error::InvalidInput(
            "At least 2 companies are required for comparison".to_string(),
        ));
    }
    if slugs.len() > MAX_COMPARE {
        return Err(Error::InvalidInput(
            "Maximum 4 companies can be compared at once".to_string(),
        ));
    }

    let companies = companies::Entity::find()
        .filter(companies::Column::Slug.is_in(slugs.iter().copied()))
        .all(db)
        .await?;

    if companies.len() < MIN_COMPARE {
        return Err(Error::NotFound("Companies"));
    }

    let mut out = Vec::with_capacity(companies.len());
    for slug in slugs {
        if let Some(company) = companies.iter().find(|c| c.slug == slug) {
            if out.iter().any(|c: &CompanyComparison| c.company.id == company.id) {
                continue;
            }
            let posts = visible_posts(db, company.id, now).await?;
            out.push(CompanyComparison {
                company: company.clone(),
                stats: comparison_stats(&posts),
            });
        }
    }

    Ok(out)
}
