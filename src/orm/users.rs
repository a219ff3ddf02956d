//! SeaORM Entity for users table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Site-wide role. At most one account holds `Owner`; it is asserted from
/// configuration on every sign-in rather than trusted from this column.
#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(Some(12))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "owner")]
    Owner,
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "moderator")]
    Moderator,
    #[sea_orm(string_value = "user")]
    User,
}

impl Role {
    /// Roles allowed to manage postings they do not own.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Owner | Role::Admin)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// External identity-provider account id. Stable, unique per user.
    #[sea_orm(unique)]
    pub discord_id: String,
    pub discord_tag: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    /// Game-account link, set at most once per account.
    pub embark_id: Option<String>,
    pub embark_username: Option<String>,
    pub role: Role,
    pub is_owner: bool,
    pub is_admin: bool,
    pub is_banned: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub ban_reason: Option<String>,
    pub banned_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::lfg_postings::Entity")]
    Postings,
    #[sea_orm(has_many = "super::lfg_participants::Entity")]
    Participations,
}

impl Related<super::lfg_postings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Postings.def()
    }
}

impl Related<super::lfg_participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
