//! SeaORM Entity for users table
//!
//! Users are never exposed publicly. They exist for ownership checks and
//! anti-abuse only.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Opaque identifier issued by the identity provider
    #[sea_orm(unique)]
    pub external_uid: Option<String>,
    #[sea_orm(unique)]
    pub email_hash: Option<String>,
    pub trust_score: f64,
    pub is_verified: bool,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::posts::Entity")]
    Posts,
}

impl Related<super::posts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
