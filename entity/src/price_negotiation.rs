//! Header row of a negotiation chain.
//!
//! The individual offers live in `negotiation_offer`; `head_offer_id` points at the most
//! recent one.

use sea_orm::entity::prelude::*;

use crate::sea_orm_active_enums::NegotiationStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "price_negotiation")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub trip_id: i32,
    pub passenger_id: i32,
    pub driver_id: i32,
    pub seats_requested: i32,
    /// Trip seat price at the time the chain was opened.
    pub original_price: Decimal,
    pub final_price: Option<Decimal>,
    pub status: NegotiationStatus,
    pub head_offer_id: Option<i32>,
    pub booking_id: Option<i32>,
    pub expires_at: DateTimeUtc,
    pub resolved_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::trip::Entity",
        from = "Column::TripId",
        to = "super::trip::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Trip,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::PassengerId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Passenger,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::DriverId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Driver,
    #[sea_orm(has_many = "super::negotiation_offer::Entity")]
    NegotiationOffer,
}

impl Related<super::trip::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trip.def()
    }
}

impl Related<super::negotiation_offer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NegotiationOffer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
