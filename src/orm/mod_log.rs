//! SeaORM Entity for mod_log table
//!
//! Append-only audit trail. Rows are written by moderation actions and the
//! owner sign-in hook, and are never updated or deleted by application code.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Audit action kind. A closed set; a new moderation feature adds a variant
/// here rather than writing a free-form string.
#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    #[sea_orm(string_value = "ban")]
    Ban,
    #[sea_orm(string_value = "unban")]
    Unban,
    #[sea_orm(string_value = "feature")]
    Feature,
    #[sea_orm(string_value = "unfeature")]
    Unfeature,
    #[sea_orm(string_value = "remove_posting")]
    RemovePosting,
    #[sea_orm(string_value = "owner_signin")]
    OwnerSignin,
}

/// What an audit entry points at.
#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(Some(8))")]
#[serde(rename_all = "lowercase")]
pub enum AuditTarget {
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "posting")]
    Posting,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "mod_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub moderator_id: Option<i32>,
    pub action: AuditAction,
    pub target_type: AuditTarget,
    pub target_id: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub reason: Option<String>,
    pub metadata: Option<Json>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ModeratorId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Moderator,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Moderator.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
