use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "message_thread")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Set for the group conversation of a trip; at most one thread per trip.
    #[sea_orm(unique)]
    pub trip_id: Option<i32>,
    pub subject: Option<String>,
    pub last_message_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::trip::Entity",
        from = "Column::TripId",
        to = "super::trip::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Trip,
    #[sea_orm(has_many = "super::thread_participant::Entity")]
    ThreadParticipant,
    #[sea_orm(has_many = "super::message::Entity")]
    Message,
}

impl Related<super::trip::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trip.def()
    }
}

impl Related<super::thread_participant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ThreadParticipant.def()
    }
}

impl Related<super::message::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Message.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
