//! SeaORM Entity for votes table
//!
//! At most one row exists per (post, voter). The store enforces this with two
//! unique indexes, one per identity channel; see [`crate::db::create_schema`].

use super::posts;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The six reactions a reader can cast on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum VoteType {
    #[sea_orm(string_value = "matches")]
    Matches,
    #[sea_orm(string_value = "not_matches")]
    NotMatches,
    #[sea_orm(string_value = "common_issue")]
    CommonIssue,
    #[sea_orm(string_value = "recent")]
    Recent,
    #[sea_orm(string_value = "still_happening")]
    StillHappening,
    #[sea_orm(string_value = "management_driven")]
    ManagementDriven,
}

impl VoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteType::Matches => "matches",
            VoteType::NotMatches => "not_matches",
            VoteType::CommonIssue => "common_issue",
            VoteType::Recent => "recent",
            VoteType::StillHappening => "still_happening",
            VoteType::ManagementDriven => "management_driven",
        }
    }

    /// Post counter incremented by a vote of this kind
    pub fn counter_column(&self) -> posts::Column {
        match self {
            VoteType::Matches => posts::Column::MatchesCount,
            VoteType::NotMatches => posts::Column::NotMatchesCount,
            VoteType::CommonIssue => posts::Column::CommonIssue,
            VoteType::Recent => posts::Column::Recent,
            VoteType::StillHappening => posts::Column::StillHappening,
            VoteType::ManagementDriven => posts::Column::ManagementDriven,
        }
    }

    /// Validation votes feed the visibility score; topic reactions do not.
    pub fn is_validation(&self) -> bool {
        match self {
            VoteType::Matches | VoteType::NotMatches => true,
            VoteType::CommonIssue
            | VoteType::Recent
            | VoteType::StillHappening
            | VoteType::ManagementDriven => false,
        }
    }
}

impl FromStr for VoteType {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "matches" => Ok(VoteType::Matches),
            "not_matches" => Ok(VoteType::NotMatches),
            "common_issue" => Ok(VoteType::CommonIssue),
            "recent" => Ok(VoteType::Recent),
            "still_happening" => Ok(VoteType::StillHappening),
            "management_driven" => Ok(VoteType::ManagementDriven),
            other => Err(crate::error::Error::InvalidVoteType(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "votes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub post_id: i32,
    /// Authenticated voter. Exclusive with `device_id`.
    #[serde(skip)]
    pub user_id: Option<i32>,
    /// Fingerprint of an anonymous voter's device. Exclusive with `user_id`.
    #[serde(skip)]
    pub device_id: Option<String>,
    pub vote_type: VoteType,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::posts::Entity",
        from = "Column::PostId",
        to = "super::posts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Post,
}

impl Related<super::posts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
