//! SeaORM Entity for posts table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Author's overall sentiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    #[sea_orm(string_value = "positive")]
    Positive,
    #[sea_orm(string_value = "neutral")]
    Neutral,
    #[sea_orm(string_value = "negative")]
    Negative,
}

/// Author's relationship with the company
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    #[sea_orm(string_value = "current")]
    Current,
    #[sea_orm(string_value = "past")]
    Past,
    #[sea_orm(string_value = "interviewing")]
    Interviewing,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub company_id: i32,
    #[serde(skip)]
    pub user_id: Option<i32>,
    pub primary_category: String,
    pub sub_category: Option<String>,
    pub employment_status: EmploymentStatus,
    pub team_function: Option<String>,
    pub location: Option<String>,
    pub sentiment: Sentiment,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub matches_count: i32,
    pub not_matches_count: i32,
    pub common_issue: i32,
    pub recent: i32,
    pub still_happening: i32,
    pub management_driven: i32,
    pub reports_count: i32,
    pub is_hidden: bool,
    pub is_published: bool,
    pub publish_at: DateTime,
    pub visibility_score: f64,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::companies::Entity",
        from = "Column::CompanyId",
        to = "super::companies::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Company,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Author,
    #[sea_orm(has_many = "super::votes::Entity")]
    Votes,
    #[sea_orm(has_many = "super::reports::Entity")]
    Reports,
}

impl Related<super::companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::votes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Votes.def()
    }
}

impl Related<super::reports::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reports.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
