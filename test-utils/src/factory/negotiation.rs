//! Negotiation factory for creating a chain together with its opening offer.

use chrono::{DateTime, Duration, Utc};
use entity::sea_orm_active_enums::{NegotiationStatus, OfferProposer, OfferStatus};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr, IntoActiveModel};

/// Factory for an open negotiation chain whose head is a pending passenger offer.
///
/// # Example
///
/// ```rust,ignore
/// let (chain, offer) = NegotiationFactory::new(&db, trip.id, passenger.id, driver.id)
///     .offer_price(Decimal::new(70_000, 0))
///     .expires_at(Utc::now() - Duration::minutes(1))
///     .build()
///     .await?;
/// ```
pub struct NegotiationFactory<'a> {
    db: &'a DatabaseConnection,
    trip_id: i32,
    passenger_id: i32,
    driver_id: i32,
    seats_requested: i32,
    original_price: Decimal,
    offer_price: Decimal,
    expires_at: DateTime<Utc>,
}

impl<'a> NegotiationFactory<'a> {
    /// Creates a new NegotiationFactory.
    ///
    /// Defaults:
    /// - original_price: `100000`, offer_price: `80000`
    /// - seats_requested: `1`
    /// - expires_at: 24 hours from now
    pub fn new(
        db: &'a DatabaseConnection,
        trip_id: i32,
        passenger_id: i32,
        driver_id: i32,
    ) -> Self {
        Self {
            db,
            trip_id,
            passenger_id,
            driver_id,
            seats_requested: 1,
            original_price: Decimal::new(100_000, 0),
            offer_price: Decimal::new(80_000, 0),
            expires_at: Utc::now() + Duration::hours(24),
        }
    }

    pub fn seats_requested(mut self, seats: i32) -> Self {
        self.seats_requested = seats;
        self
    }

    pub fn original_price(mut self, price: Decimal) -> Self {
        self.original_price = price;
        self
    }

    pub fn offer_price(mut self, price: Decimal) -> Self {
        self.offer_price = price;
        self
    }

    /// Sets the expiry of both the chain and the opening offer.
    pub fn expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = expires_at;
        self
    }

    /// Inserts the chain and its opening offer, linking the offer as the chain head.
    ///
    /// # Returns
    /// - `Ok((chain, offer))` - Created chain (with `head_offer_id` set) and opening offer
    /// - `Err(DbErr)` - Database error during insert
    pub async fn build(
        self,
    ) -> Result<
        (
            entity::price_negotiation::Model,
            entity::negotiation_offer::Model,
        ),
        DbErr,
    > {
        let now = Utc::now();
        let chain = entity::price_negotiation::ActiveModel {
            trip_id: ActiveValue::Set(self.trip_id),
            passenger_id: ActiveValue::Set(self.passenger_id),
            driver_id: ActiveValue::Set(self.driver_id),
            seats_requested: ActiveValue::Set(self.seats_requested),
            original_price: ActiveValue::Set(self.original_price),
            final_price: ActiveValue::Set(None),
            status: ActiveValue::Set(NegotiationStatus::Open),
            head_offer_id: ActiveValue::Set(None),
            booking_id: ActiveValue::Set(None),
            expires_at: ActiveValue::Set(self.expires_at),
            resolved_at: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        let offer = entity::negotiation_offer::ActiveModel {
            negotiation_id: ActiveValue::Set(chain.id),
            previous_offer_id: ActiveValue::Set(None),
            proposer: ActiveValue::Set(OfferProposer::Passenger),
            price: ActiveValue::Set(self.offer_price),
            message: ActiveValue::Set(None),
            status: ActiveValue::Set(OfferStatus::Pending),
            expires_at: ActiveValue::Set(self.expires_at),
            responded_at: ActiveValue::Set(None),
            response_message: ActiveValue::Set(None),
            auto_accepted: ActiveValue::Set(false),
            created_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        let mut chain = chain.into_active_model();
        chain.head_offer_id = ActiveValue::Set(Some(offer.id));
        let chain = chain.update(self.db).await?;

        Ok((chain, offer))
    }
}
