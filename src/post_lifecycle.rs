//! Post creation, editing, deletion and listing.
//!
//! A post moves from submission through moderation to a pending-publish row,
//! becomes readable once its publish delay passes, and may afterwards be
//! edited (briefly), hidden or deleted.

use crate::constants;
use crate::error::{Error, Result};
use crate::identity;
use crate::moderation::ModerationRules;
use crate::orm::posts::{self, EmploymentStatus, Sentiment};
use crate::orm::{companies, reports, votes};
use crate::publish::{self, visible_condition};
use chrono::NaiveDateTime;
use sea_orm::{entity::*, query::*, ActiveValue::Set, DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};

/// Fields gathered by the submission flow
#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    pub company_id: i32,
    pub primary_category: String,
    pub sub_category: Option<String>,
    pub employment_status: EmploymentStatus,
    pub team_function: Option<String>,
    pub location: Option<String>,
    pub sentiment: Sentiment,
    pub content: String,
}

/// A post with its read-time derived state
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: posts::Model,
    pub is_visible: bool,
    pub is_editable: bool,
}

/// A post as its author sees it
#[derive(Debug, Clone, Serialize)]
pub struct AuthorPostView {
    #[serde(flatten)]
    pub post: posts::Model,
    pub company: Option<companies::Model>,
    pub is_editable: bool,
    pub is_published: bool,
    pub edit_time_remaining: i64,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Rejects categories the submission flow does not offer.
fn check_categories(primary: &str, sub: Option<&str>) -> Result<()> {
    let subs = constants::sub_categories(primary)
        .ok_or_else(|| Error::InvalidInput(format!("Unknown category: {}", primary)))?;

    if let Some(sub) = sub {
        if !subs.contains(&sub) {
            return Err(Error::InvalidInput(format!(
                "Sub-category {} does not belong to {}",
                sub, primary
            )));
        }
    }

    Ok(())
}

/// A submission that passed moderation and every field check.
struct CheckedPost {
    new: NewPost,
    sub_category: Option<String>,
    team_function: Option<String>,
}

async fn check_submission(
    db: &DatabaseConnection,
    rules: &ModerationRules,
    new: NewPost,
) -> Result<CheckedPost> {
    if let Err(err) = rules.content.validate(&new.content).into_result() {
        log::debug!("Rejected post submission for company {}", new.company_id);
        return Err(err);
    }

    let sub_category = blank_to_none(new.sub_category.clone());
    check_categories(&new.primary_category, sub_category.as_deref())?;

    let team_function = blank_to_none(new.team_function.clone());
    if let Some(team) = team_function.as_deref() {
        if !constants::TEAM_FUNCTIONS.contains(&team) {
            return Err(Error::InvalidInput(format!("Unknown team function: {}", team)));
        }
    }

    if companies::Entity::find_by_id(new.company_id)
        .one(db)
        .await?
        .is_none()
    {
        return Err(Error::CompanyNotFound);
    }

    Ok(CheckedPost {
        new,
        sub_category,
        team_function,
    })
}

/// Creates a post after moderation. The post starts unpublished with a zero
/// score and becomes visible once `publish_at` passes.
pub async fn create(
    db: &DatabaseConnection,
    rules: &ModerationRules,
    author_id: Option<i32>,
    new: NewPost,
    now: NaiveDateTime,
) -> Result<posts::Model> {
    let author_id = author_id.ok_or(Error::AuthenticationRequired)?;
    let checked = check_submission(db, rules, new).await?;
    insert(db, rules, author_id, checked, now).await
}

/// Like [`create`], but takes the caller's external uid. The user row is only
/// resolved or created once the submission has passed every check, so a
/// rejected post leaves nothing behind.
pub async fn create_for_uid(
    db: &DatabaseConnection,
    rules: &ModerationRules,
    uid: Option<&str>,
    new: NewPost,
    now: NaiveDateTime,
) -> Result<posts::Model> {
    let uid = uid.ok_or(Error::AuthenticationRequired)?;
    let checked = check_submission(db, rules, new).await?;
    let author = identity::find_or_create(db, uid, now).await?;
    insert(db, rules, author.id, checked, now).await
}

async fn insert(
    db: &DatabaseConnection,
    rules: &ModerationRules,
    author_id: i32,
    checked: CheckedPost,
    now: NaiveDateTime,
) -> Result<posts::Model> {
    let CheckedPost {
        new,
        sub_category,
        team_function,
    } = checked;

    let post = posts::ActiveModel {
        company_id: Set(new.company_id),
        user_id: Set(Some(author_id)),
        primary_category: Set(new.primary_category),
        sub_category: Set(sub_category),
        employment_status: Set(new.employment_status),
        team_function: Set(team_function),
        location: Set(blank_to_none(new.location)),
        sentiment: Set(new.sentiment),
        content: Set(new.content),
        matches_count: Set(0),
        not_matches_count: Set(0),
        common_issue: Set(0),
        recent: Set(0),
        still_happening: Set(0),
        management_driven: Set(0),
        reports_count: Set(0),
        is_hidden: Set(false),
        is_published: Set(false),
        publish_at: Set(rules.publish.compute_publish_at(now)),
        visibility_score: Set(0.0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(post.insert(db).await?)
}

/// Replaces the content of a post. Author only, within the edit window.
pub async fn edit(
    db: &DatabaseConnection,
    rules: &ModerationRules,
    post_id: i32,
    author_id: i32,
    new_content: String,
    now: NaiveDateTime,
) -> Result<posts::Model> {
    let post = posts::Entity::find_by_id(post_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound("Post"))?;

    if post.user_id != Some(author_id) {
        return Err(Error::Forbidden);
    }

    if !rules.publish.is_editable(&post, now) {
        return Err(Error::EditWindowExpired);
    }

    rules.content.validate(&new_content).into_result()?;

    let mut post: posts::ActiveModel = post.into();
    post.content = Set(new_content);
    post.updated_at = Set(now);
    Ok(post.update(db).await?)
}

/// Deletes a post with its votes and reports. Authors may delete their own
/// posts at any time; administrators may delete any post.
pub async fn delete(
    db: &DatabaseConnection,
    post_id: i32,
    requester_id: Option<i32>,
    is_admin: bool,
) -> Result<()> {
    let post = posts::Entity::find_by_id(post_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound("Post"))?;

    if !is_admin && (requester_id.is_none() || post.user_id != requester_id) {
        return Err(Error::Forbidden);
    }

    let txn = db.begin().await?;
    votes::Entity::delete_many()
        .filter(votes::Column::PostId.eq(post_id))
        .exec(&txn)
        .await?;
    reports::Entity::delete_many()
        .filter(reports::Column::PostId.eq(post_id))
        .exec(&txn)
        .await?;
    posts::Entity::delete_by_id(post_id).exec(&txn).await?;
    txn.commit().await?;

    if is_admin {
        log::info!("Post {} deleted by administrator", post_id);
    }

    Ok(())
}

/// Fetches a post by id regardless of visibility.
pub async fn get(
    db: &DatabaseConnection,
    rules: &ModerationRules,
    post_id: i32,
    now: NaiveDateTime,
) -> Result<PostView> {
    let post = posts::Entity::find_by_id(post_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound("Post"))?;

    Ok(PostView {
        is_visible: publish::is_visible(&post, now),
        is_editable: rules.publish.is_editable(&post, now),
        post,
    })
}

/// Visible posts of a company, best score first, newest first among equals.
pub async fn list_for_company(
    db: &DatabaseConnection,
    company_id: i32,
    now: NaiveDateTime,
    limit: u64,
) -> Result<Vec<posts::Model>> {
    Ok(posts::Entity::find()
        .filter(posts::Column::CompanyId.eq(company_id))
        .filter(visible_condition(now))
        .order_by_desc(posts::Column::VisibilityScore)
        .order_by_desc(posts::Column::CreatedAt)
        .order_by_desc(posts::Column::Id)
        .limit(limit)
        .all(db)
        .await?)
}

/// All posts written by a user, newest first, with edit state.
pub async fn list_for_author(
    db: &DatabaseConnection,
    rules: &ModerationRules,
    author_id: i32,
    now: NaiveDateTime,
) -> Result<Vec<AuthorPostView>> {
    let rows = posts::Entity::find()
        .filter(posts::Column::UserId.eq(author_id))
        .order_by_desc(posts::Column::CreatedAt)
        .order_by_desc(posts::Column::Id)
        .find_also_related(companies::Entity)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(post, company)| AuthorPostView {
            is_editable: rules.publish.is_editable(&post, now),
            is_published: publish::is_published(&post, now),
            edit_time_remaining: rules.publish.edit_time_remaining(&post, now),
            company,
            post,
        })
        .collect())
}
