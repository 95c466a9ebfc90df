//! Vote recording and rescoring.
//!
//! A voter gets one vote per post across all six kinds. The unique indexes on
//! `votes` are the only arbiter of duplicates: there is no existence check
//! before the insert, so two racing votes from the same identity resolve to
//! exactly one accepted row.

use crate::error::{Error, Result};
use crate::identity::VoterIdentity;
use crate::orm::{posts, votes, votes::VoteType};
use crate::scoring::visibility_score;
use chrono::NaiveDateTime;
use sea_orm::{
    entity::*, query::*, sea_query::Expr, ActiveValue::Set, DatabaseConnection,
    DatabaseTransaction, PaginatorTrait, SqlErr, TransactionTrait,
};

/// Outcome of an accepted vote
#[derive(Debug, Clone)]
pub struct VoteReceipt {
    pub vote: votes::Model,
    /// Post counters after the vote was applied
    pub post: posts::Model,
}

/// Records a vote, bumps the matching counter and, for validation votes,
/// recomputes the visibility score.
///
/// Insert, increment and rescore share one transaction. If the insert
/// violates uniqueness the transaction is dropped and nothing is counted.
pub async fn cast_vote(
    db: &DatabaseConnection,
    post_id: i32,
    voter: &VoterIdentity,
    vote_type: VoteType,
    now: NaiveDateTime,
) -> Result<VoteReceipt> {
    let txn = db.begin().await?;

    if posts::Entity::find_by_id(post_id).one(&txn).await?.is_none() {
        return Err(Error::NotFound("Post"));
    }

    let vote = votes::ActiveModel {
        post_id: Set(post_id),
        user_id: Set(voter.user_id()),
        device_id: Set(voter.device_id()),
        vote_type: Set(vote_type),
        created_at: Set(now),
        ..Default::default()
    };

    let vote = match vote.insert(&txn).await {
        Ok(vote) => vote,
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            log::debug!("Rejected duplicate vote on post {}", post_id);
            return Err(Error::DuplicateVote);
        }
        Err(err) => return Err(err.into()),
    };

    increment_counter(&txn, post_id, vote_type).await?;

    let post = if vote_type.is_validation() {
        rescore(&txn, post_id).await?
    } else {
        reload(&txn, post_id).await?
    };

    txn.commit().await?;

    Ok(VoteReceipt { vote, post })
}

/// Increments in SQL so concurrent votes on one post are never lost.
async fn increment_counter(
    txn: &DatabaseTransaction,
    post_id: i32,
    vote_type: VoteType,
) -> Result<()> {
    let column = vote_type.counter_column();
    posts::Entity::update_many()
        .col_expr(column, Expr::col(column).add(1))
        .filter(posts::Column::Id.eq(post_id))
        .exec(txn)
        .await?;
    Ok(())
}

async fn reload(txn: &DatabaseTransaction, post_id: i32) -> Result<posts::Model> {
    posts::Entity::find_by_id(post_id)
        .one(txn)
        .await?
        .ok_or(Error::NotFound("Post"))
}

/// Recomputes the score from the counters as they stand inside the transaction.
async fn rescore(txn: &DatabaseTransaction, post_id: i32) -> Result<posts::Model> {
    let post = reload(txn, post_id).await?;
    let score = visibility_score(post.matches_count, post.not_matches_count);

    posts::Entity::update_many()
        .col_expr(posts::Column::VisibilityScore, Expr::value(score))
        .filter(posts::Column::Id.eq(post_id))
        .exec(txn)
        .await?;

    Ok(posts::Model {
        visibility_score: score,
        ..post
    })
}

/// Number of votes recorded against a post, across all kinds.
pub async fn count_votes(db: &DatabaseConnection, post_id: i32) -> Result<u64> {
    Ok(votes::Entity::find()
        .filter(votes::Column::PostId.eq(post_id))
        .count(db)
        .await?)
}
