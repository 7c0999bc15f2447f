use crate::server::{
    data::negotiation::{ChainUpdate, NegotiationRepository},
    model::negotiation::{AutoAcceptRule, ChainVersion},
};
use chrono::{Duration, Utc};
use entity::sea_orm_active_enums::{NegotiationStatus, OfferStatus};
use rust_decimal::Decimal;
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

mod auto_accept_rule;
mod get_stale_pending_offers;
mod respond_to_offer;
mod update_chain_if_unchanged;
