//! Price negotiation data repository.
//!
//! Persists negotiation chain headers, their offers, and drivers' auto-accept rules.
//! Status transitions are decided by the negotiation service. Header and offer writes
//! are compare-and-swap updates, so a transition decided on a stale snapshot writes
//! nothing and the caller rolls back.

use chrono::{DateTime, Utc};
use entity::sea_orm_active_enums::{NegotiationStatus, OfferStatus};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr,
    EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::server::model::negotiation::{
    AutoAcceptRule, ChainVersion, Negotiation, NewOffer, Offer,
};

/// Chain statuses that still allow counters, accepts, and rejects.
pub const UNRESOLVED: [NegotiationStatus; 2] =
    [NegotiationStatus::Open, NegotiationStatus::Countered];

/// Column values for a new chain header.
#[derive(Debug, Clone)]
pub struct NewNegotiation {
    pub trip_id: i32,
    pub passenger_id: i32,
    pub driver_id: i32,
    pub seats_requested: i32,
    pub original_price: Decimal,
    pub expires_at: DateTime<Utc>,
}

/// Resolution written to a chain header.
#[derive(Debug, Clone)]
pub struct ChainUpdate {
    pub status: NegotiationStatus,
    pub head_offer_id: Option<i32>,
    pub expires_at: Option<DateTime<Utc>>,
    pub final_price: Option<Decimal>,
    pub booking_id: Option<i32>,
    pub resolved_at: Option<DateTime<Utc>>,
}

pub struct NegotiationRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> NegotiationRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Creates an `Open` chain header without offers.
    ///
    /// # Returns
    /// - `Ok(Model)` - The created header, `head_offer_id` still unset
    /// - `Err(DbErr)` - Database error during insert
    pub async fn create_chain(
        &self,
        chain: NewNegotiation,
    ) -> Result<entity::price_negotiation::Model, DbErr> {
        let now = Utc::now();
        entity::price_negotiation::ActiveModel {
            trip_id: ActiveValue::Set(chain.trip_id),
            passenger_id: ActiveValue::Set(chain.passenger_id),
            driver_id: ActiveValue::Set(chain.driver_id),
            seats_requested: ActiveValue::Set(chain.seats_requested),
            original_price: ActiveValue::Set(chain.original_price),
            final_price: ActiveValue::Set(None),
            status: ActiveValue::Set(NegotiationStatus::Open),
            head_offer_id: ActiveValue::Set(None),
            booking_id: ActiveValue::Set(None),
            expires_at: ActiveValue::Set(chain.expires_at),
            resolved_at: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }

    /// Inserts a `Pending` offer.
    pub async fn insert_offer(&self, offer: NewOffer) -> Result<Offer, DbErr> {
        let entity = entity::negotiation_offer::ActiveModel {
            negotiation_id: ActiveValue::Set(offer.negotiation_id),
            previous_offer_id: ActiveValue::Set(offer.previous_offer_id),
            proposer: ActiveValue::Set(offer.proposer),
            price: ActiveValue::Set(offer.price),
            message: ActiveValue::Set(offer.message),
            status: ActiveValue::Set(OfferStatus::Pending),
            expires_at: ActiveValue::Set(offer.expires_at),
            responded_at: ActiveValue::Set(None),
            response_message: ActiveValue::Set(None),
            auto_accepted: ActiveValue::Set(false),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Ok(Offer::from_entity(entity))
    }

    /// Loads a chain with its offers.
    ///
    /// # Returns
    /// - `Ok(Some(Negotiation))` - Chain with offers sorted oldest first
    /// - `Ok(None)` - No chain with that ID
    /// - `Err(DbErr)` - Database error during query
    pub async fn find_by_id(&self, id: i32) -> Result<Option<Negotiation>, DbErr> {
        let Some(chain) = entity::prelude::PriceNegotiation::find_by_id(id)
            .one(self.db)
            .await?
        else {
            return Ok(None);
        };

        let offers = self.offers_of(id).await?;

        Ok(Some(Negotiation::from_entity(chain, offers)))
    }

    /// Finds the passenger's unresolved chain for a trip.
    pub async fn find_unresolved(
        &self,
        trip_id: i32,
        passenger_id: i32,
    ) -> Result<Option<entity::price_negotiation::Model>, DbErr> {
        entity::prelude::PriceNegotiation::find()
            .filter(entity::price_negotiation::Column::TripId.eq(trip_id))
            .filter(entity::price_negotiation::Column::PassengerId.eq(passenger_id))
            .filter(entity::price_negotiation::Column::Status.is_in(UNRESOLVED))
            .one(self.db)
            .await
    }

    /// Writes the outcome of a response to a still pending offer.
    ///
    /// # Arguments
    /// - `offer_id` - Offer being answered
    /// - `status` - New offer status
    /// - `response_message` - Note from the responder
    /// - `auto_accepted` - Whether the driver's rule accepted the offer
    /// - `now` - Response instant
    ///
    /// # Returns
    /// - `Ok(true)` - The offer was answered
    /// - `Ok(false)` - The offer was no longer pending, nothing was written
    /// - `Err(DbErr)` - Database error during update
    pub async fn respond_to_offer(
        &self,
        offer_id: i32,
        status: OfferStatus,
        response_message: Option<String>,
        auto_accepted: bool,
        now: DateTime<Utc>,
    ) -> Result<bool, DbErr> {
        let result = entity::prelude::NegotiationOffer::update_many()
            .filter(entity::negotiation_offer::Column::Id.eq(offer_id))
            .filter(entity::negotiation_offer::Column::Status.eq(OfferStatus::Pending))
            .col_expr(entity::negotiation_offer::Column::Status, Expr::value(status))
            .col_expr(
                entity::negotiation_offer::Column::RespondedAt,
                Expr::value(Some(now)),
            )
            .col_expr(
                entity::negotiation_offer::Column::ResponseMessage,
                Expr::value(response_message),
            )
            .col_expr(
                entity::negotiation_offer::Column::AutoAccepted,
                Expr::value(auto_accepted),
            )
            .exec(self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Writes a new status and head pointer to a chain header.
    ///
    /// The write only happens while the header still carries the status and head offer
    /// in `expected`.
    ///
    /// # Returns
    /// - `Ok(true)` - The header was updated
    /// - `Ok(false)` - Another transition landed first, nothing was written
    /// - `Err(DbErr)` - Database error during update
    pub async fn update_chain_if_unchanged(
        &self,
        expected: ChainVersion,
        update: ChainUpdate,
    ) -> Result<bool, DbErr> {
        let head_filter = match expected.head_offer_id {
            Some(head_offer_id) => {
                entity::price_negotiation::Column::HeadOfferId.eq(head_offer_id)
            }
            None => entity::price_negotiation::Column::HeadOfferId.is_null(),
        };

        let mut query = entity::prelude::PriceNegotiation::update_many()
            .filter(entity::price_negotiation::Column::Id.eq(expected.id))
            .filter(entity::price_negotiation::Column::Status.eq(expected.status))
            .filter(head_filter)
            .col_expr(
                entity::price_negotiation::Column::Status,
                Expr::value(update.status),
            )
            .col_expr(
                entity::price_negotiation::Column::UpdatedAt,
                Expr::value(Utc::now()),
            );
        if let Some(head_offer_id) = update.head_offer_id {
            query = query.col_expr(
                entity::price_negotiation::Column::HeadOfferId,
                Expr::value(head_offer_id),
            );
        }
        if let Some(expires_at) = update.expires_at {
            query = query.col_expr(
                entity::price_negotiation::Column::ExpiresAt,
                Expr::value(expires_at),
            );
        }
        if let Some(final_price) = update.final_price {
            query = query.col_expr(
                entity::price_negotiation::Column::FinalPrice,
                Expr::value(final_price),
            );
        }
        if let Some(booking_id) = update.booking_id {
            query = query.col_expr(
                entity::price_negotiation::Column::BookingId,
                Expr::value(booking_id),
            );
        }
        if let Some(resolved_at) = update.resolved_at {
            query = query.col_expr(
                entity::price_negotiation::Column::ResolvedAt,
                Expr::value(resolved_at),
            );
        }

        let result = query.exec(self.db).await?;

        Ok(result.rows_affected == 1)
    }

    /// Gets a passenger's chains, newest first, optionally filtered by status.
    pub async fn get_by_passenger_paginated(
        &self,
        passenger_id: i32,
        status: Option<NegotiationStatus>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Negotiation>, u64), DbErr> {
        let mut query = entity::prelude::PriceNegotiation::find()
            .filter(entity::price_negotiation::Column::PassengerId.eq(passenger_id));
        if let Some(status) = status {
            query = query.filter(entity::price_negotiation::Column::Status.eq(status));
        }

        let paginator = query
            .order_by_desc(entity::price_negotiation::Column::CreatedAt)
            .order_by_desc(entity::price_negotiation::Column::Id)
            .paginate(self.db, per_page);

        let total = paginator.num_items().await?;
        let chains = paginator.fetch_page(page).await?;

        Ok((self.with_offers(chains).await?, total))
    }

    /// Gets chains addressed to a driver, newest first, optionally filtered by status.
    pub async fn get_by_driver_paginated(
        &self,
        driver_id: i32,
        status: Option<NegotiationStatus>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Negotiation>, u64), DbErr> {
        let mut query = entity::prelude::PriceNegotiation::find()
            .filter(entity::price_negotiation::Column::DriverId.eq(driver_id));
        if let Some(status) = status {
            query = query.filter(entity::price_negotiation::Column::Status.eq(status));
        }

        let paginator = query
            .order_by_desc(entity::price_negotiation::Column::CreatedAt)
            .order_by_desc(entity::price_negotiation::Column::Id)
            .paginate(self.db, per_page);

        let total = paginator.num_items().await?;
        let chains = paginator.fetch_page(page).await?;

        Ok((self.with_offers(chains).await?, total))
    }

    /// Gets every chain opened on a trip, newest first.
    pub async fn get_by_trip(&self, trip_id: i32) -> Result<Vec<Negotiation>, DbErr> {
        let chains = entity::prelude::PriceNegotiation::find()
            .filter(entity::price_negotiation::Column::TripId.eq(trip_id))
            .order_by_desc(entity::price_negotiation::Column::CreatedAt)
            .order_by_desc(entity::price_negotiation::Column::Id)
            .all(self.db)
            .await?;

        self.with_offers(chains).await
    }

    /// Gets unresolved chains of a trip.
    pub async fn get_unresolved_by_trip(
        &self,
        trip_id: i32,
    ) -> Result<Vec<entity::price_negotiation::Model>, DbErr> {
        entity::prelude::PriceNegotiation::find()
            .filter(entity::price_negotiation::Column::TripId.eq(trip_id))
            .filter(entity::price_negotiation::Column::Status.is_in(UNRESOLVED))
            .all(self.db)
            .await
    }

    /// Gets unresolved chains a passenger opened.
    pub async fn get_unresolved_by_passenger(
        &self,
        passenger_id: i32,
    ) -> Result<Vec<entity::price_negotiation::Model>, DbErr> {
        entity::prelude::PriceNegotiation::find()
            .filter(entity::price_negotiation::Column::PassengerId.eq(passenger_id))
            .filter(entity::price_negotiation::Column::Status.is_in(UNRESOLVED))
            .all(self.db)
            .await
    }

    /// Gets pending offers whose expiry has passed.
    pub async fn get_stale_pending_offers(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<entity::negotiation_offer::Model>, DbErr> {
        entity::prelude::NegotiationOffer::find()
            .filter(entity::negotiation_offer::Column::Status.eq(OfferStatus::Pending))
            .filter(entity::negotiation_offer::Column::ExpiresAt.lte(now))
            .order_by_asc(entity::negotiation_offer::Column::Id)
            .all(self.db)
            .await
    }

    /// Marks every pending offer of a chain with `status`.
    pub async fn close_pending_offers(
        &self,
        negotiation_id: i32,
        status: OfferStatus,
    ) -> Result<u64, DbErr> {
        let result = entity::prelude::NegotiationOffer::update_many()
            .filter(entity::negotiation_offer::Column::NegotiationId.eq(negotiation_id))
            .filter(entity::negotiation_offer::Column::Status.eq(OfferStatus::Pending))
            .col_expr(entity::negotiation_offer::Column::Status, Expr::value(status))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }

    /// Gets a driver's auto-accept rule, `None` when never configured.
    pub async fn get_auto_accept_rule(
        &self,
        driver_id: i32,
    ) -> Result<Option<AutoAcceptRule>, DbErr> {
        let rule = entity::prelude::AutoAcceptRule::find()
            .filter(entity::auto_accept_rule::Column::DriverId.eq(driver_id))
            .one(self.db)
            .await?;

        Ok(rule.map(AutoAcceptRule::from_entity))
    }

    /// Creates or replaces a driver's auto-accept rule.
    pub async fn upsert_auto_accept_rule(
        &self,
        driver_id: i32,
        rule: AutoAcceptRule,
    ) -> Result<AutoAcceptRule, DbErr> {
        let now = Utc::now();
        let existing = entity::prelude::AutoAcceptRule::find()
            .filter(entity::auto_accept_rule::Column::DriverId.eq(driver_id))
            .one(self.db)
            .await?;

        let entity = match existing {
            Some(existing) => {
                let mut active = existing.into_active_model();
                active.enabled = ActiveValue::Set(rule.enabled);
                active.min_price_percentage = ActiveValue::Set(rule.min_price_percentage);
                active.max_discount_amount = ActiveValue::Set(rule.max_discount_amount);
                active.updated_at = ActiveValue::Set(now);
                active.update(self.db).await?
            }
            None => {
                entity::auto_accept_rule::ActiveModel {
                    driver_id: ActiveValue::Set(driver_id),
                    enabled: ActiveValue::Set(rule.enabled),
                    min_price_percentage: ActiveValue::Set(rule.min_price_percentage),
                    max_discount_amount: ActiveValue::Set(rule.max_discount_amount),
                    created_at: ActiveValue::Set(now),
                    updated_at: ActiveValue::Set(now),
                    ..Default::default()
                }
                .insert(self.db)
                .await?
            }
        };

        Ok(AutoAcceptRule::from_entity(entity))
    }

    async fn offers_of(
        &self,
        negotiation_id: i32,
    ) -> Result<Vec<entity::negotiation_offer::Model>, DbErr> {
        entity::prelude::NegotiationOffer::find()
            .filter(entity::negotiation_offer::Column::NegotiationId.eq(negotiation_id))
            .order_by_asc(entity::negotiation_offer::Column::Id)
            .all(self.db)
            .await
    }

    async fn with_offers(
        &self,
        chains: Vec<entity::price_negotiation::Model>,
    ) -> Result<Vec<Negotiation>, DbErr> {
        let mut negotiations = Vec::with_capacity(chains.len());
        for chain in chains {
            let offers = self.offers_of(chain.id).await?;
            negotiations.push(Negotiation::from_entity(chain, offers));
        }
        Ok(negotiations)
    }
}
