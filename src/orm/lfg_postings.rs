//! SeaORM Entity for lfg_postings table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Posting lifecycle state. `Completed` and `Cancelled` are terminal;
/// expiry is a derived read-time condition, not a fourth state.
#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(Some(10))")]
#[serde(rename_all = "lowercase")]
pub enum PostingStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl PostingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PostingStatus::Completed | PostingStatus::Cancelled)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "lfg_postings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Owning user; immutable after creation.
    pub creator_id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub game_mode: String,
    pub skill_level: String,
    pub preferred_map: String,
    pub timezone: String,
    pub language: String,
    pub players_needed: i32,
    pub status: PostingStatus,
    pub is_featured: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    /// Always created_at + the configured TTL, computed server-side.
    pub expires_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatorId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Creator,
    #[sea_orm(has_many = "super::lfg_participants::Entity")]
    Participants,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::lfg_participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
