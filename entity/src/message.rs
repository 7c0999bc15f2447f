use sea_orm::entity::prelude::*;

use crate::sea_orm_active_enums::MessageType;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "message")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub thread_id: i32,
    pub sender_id: i32,
    pub message_type: MessageType,
    pub content: String,
    pub is_deleted: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::message_thread::Entity",
        from = "Column::ThreadId",
        to = "super::message_thread::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    MessageThread,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SenderId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::message_thread::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MessageThread.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
