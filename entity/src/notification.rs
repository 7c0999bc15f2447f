use sea_orm::entity::prelude::*;

use crate::sea_orm_active_enums::{DeliveryChannel, NotificationStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "notification")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub channel: DeliveryChannel,
    pub status: NotificationStatus,
    /// Event tag such as `booking_created` or `offer_countered`.
    pub kind: String,
    pub title: String,
    pub content: String,
    pub data: Option<Json>,
    /// Overrides the owner's phone number; used for emergency contact SMS.
    pub phone_number: Option<String>,
    pub is_read: bool,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub scheduled_at: DateTimeUtc,
    pub sent_at: Option<DateTimeUtc>,
    pub read_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
