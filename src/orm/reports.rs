//! SeaORM Entity for reports table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Why a reader reported a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ReportReason {
    #[sea_orm(string_value = "harassment")]
    Harassment,
    #[sea_orm(string_value = "fake")]
    Fake,
    #[sea_orm(string_value = "confidential")]
    Confidential,
    #[sea_orm(string_value = "spam")]
    Spam,
    #[sea_orm(string_value = "other")]
    Other,
}

impl ReportReason {
    pub fn label(&self) -> &'static str {
        match self {
            ReportReason::Harassment => "Harassment or personal attack",
            ReportReason::Fake => "Fake or misleading information",
            ReportReason::Confidential => "Contains confidential information",
            ReportReason::Spam => "Spam or irrelevant",
            ReportReason::Other => "Other",
        }
    }
}

/// Report review state
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "resolved")]
    Resolved,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reports")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub post_id: i32,
    #[serde(skip)]
    pub user_id: Option<i32>,
    pub reason: ReportReason,
    #[sea_orm(column_type = "Text", nullable)]
    pub details: Option<String>,
    pub status: ReportStatus,
    pub created_at: DateTime,
    pub resolved_at: Option<DateTime>,
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
