use sea_orm::entity::prelude::*;

use crate::sea_orm_active_enums::EmergencyType;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "emergency_alert")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub trip_id: Option<i32>,
    pub emergency_type: EmergencyType,
    pub description: Option<String>,
    pub location_lat: Option<Decimal>,
    pub location_lng: Option<Decimal>,
    pub location_address: Option<String>,
    pub is_resolved: bool,
    pub resolved_at: Option<DateTimeUtc>,
    pub resolved_by: Option<i32>,
    pub resolution_note: Option<String>,
    /// Number of emergency contacts an SMS was queued for.
    pub contacts_notified: i32,
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
    #[sea_orm(
        belongs_to = "super::trip::Entity",
        from = "Column::TripId",
        to = "super::trip::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Trip,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::trip::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trip.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
