use sea_orm::entity::prelude::*;

use crate::sea_orm_active_enums::TripStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "trip")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub driver_id: i32,
    pub car_id: i32,
    pub from_location: String,
    pub to_location: String,
    pub departure_datetime: DateTimeUtc,
    pub estimated_arrival_datetime: Option<DateTimeUtc>,
    pub price_per_seat: Decimal,
    pub total_seats_offered: i32,
    pub available_seats: i32,
    pub status: TripStatus,
    pub additional_info: Option<String>,
    pub is_instant_booking: bool,
    pub price_negotiable: bool,
    pub allow_smoking: bool,
    pub allow_pets: bool,
    pub allow_music: bool,
    pub female_only: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::DriverId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::car::Entity",
        from = "Column::CarId",
        to = "super::car::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Car,
    #[sea_orm(has_many = "super::booking::Entity")]
    Booking,
    #[sea_orm(has_many = "super::price_negotiation::Entity")]
    PriceNegotiation,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::car::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Car.def()
    }
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Booking.def()
    }
}

impl Related<super::price_negotiation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PriceNegotiation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
