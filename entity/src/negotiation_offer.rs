use sea_orm::entity::prelude::*;

use crate::sea_orm_active_enums::{OfferProposer, OfferStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "negotiation_offer")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub negotiation_id: i32,
    /// Offer this one counters, `None` for the opening offer.
    pub previous_offer_id: Option<i32>,
    pub proposer: OfferProposer,
    pub price: Decimal,
    pub message: Option<String>,
    pub status: OfferStatus,
    pub expires_at: DateTimeUtc,
    pub responded_at: Option<DateTimeUtc>,
    pub response_message: Option<String>,
    pub auto_accepted: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::price_negotiation::Entity",
        from = "Column::NegotiationId",
        to = "super::price_negotiation::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    PriceNegotiation,
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::PreviousOfferId",
        to = "Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    PreviousOffer,
}

impl Related<super::price_negotiation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PriceNegotiation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
