//! SeaORM Entity for lfg_participants table
//!
//! Join relation between postings and users. The participant count derived
//! from these rows is authoritative; it is never stored on the posting.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "lfg_participants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub posting_id: i32,
    pub user_id: i32,
    pub joined_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::lfg_postings::Entity",
        from = "Column::PostingId",
        to = "super::lfg_postings::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Posting,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::lfg_postings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posting.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
