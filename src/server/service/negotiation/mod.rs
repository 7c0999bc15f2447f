//! Price negotiation workflow.
//!
//! A passenger opens a chain with an offer below the seat price; the driver and the
//! passenger then take turns countering until one side accepts or rejects, the passenger
//! cancels, or the head offer expires. Accepting books the seats at the agreed price.
//! Transitions are decided by the pure `state::NegotiationState` and applied here inside a
//! single transaction per request. Every header write compares the status and head offer
//! it was decided on, so concurrent transitions on one chain cannot both commit.

pub mod state;

use chrono::{DateTime, Duration, Utc};
use entity::sea_orm_active_enums::{ComfortLevel, NegotiationStatus, OfferProposer, OfferStatus};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, DatabaseConnection, SqlErr, TransactionTrait};
use serde_json::json;

use crate::{
    model::negotiation::BulkAnswer,
    server::{
        data::{
            booking::BookingRepository,
            negotiation::{ChainUpdate, NegotiationRepository, NewNegotiation},
            trip::TripRepository,
        },
        error::AppError,
        model::{
            booking::{NewBooking, PAYMENT_NEGOTIATED},
            negotiation::{
                AutoAcceptRule, BulkOutcome, ChainVersion, Negotiation, NewOffer, Offer,
                OpenNegotiationParams, PaginatedNegotiations, PriceRecommendation,
            },
            notification::{NotificationEvent, NotificationKind},
        },
        service::{
            booking::reserve_seats,
            message::join_trip_thread,
            negotiation::state::{
                should_auto_accept, Action, NegotiationState, Outcome, TransitionError,
            },
            notification::NotificationService,
        },
        util::pagination::total_pages,
    },
};

/// Lifetime of the opening offer.
pub const OPENING_OFFER_TTL_HOURS: i64 = 24;
/// Lifetime of a counter offer.
pub const COUNTER_OFFER_TTL_HOURS: i64 = 12;
/// Response recorded on offers accepted by a driver's rule.
pub const AUTO_ACCEPT_MESSAGE: &str = "Auto-accepted based on your pricing preferences.";
/// Most chains a driver may answer in one bulk response.
pub const MAX_BULK_NEGOTIATIONS: usize = 20;
/// Seat price suggested when no trips exist on a route, in som.
pub const FALLBACK_SEAT_PRICE: i64 = 15_000;

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::NotYourTurn | TransitionError::NotPassenger => {
                AppError::Forbidden(err.to_string())
            }
            TransitionError::InvalidPrice(_) => AppError::BadRequest(err.to_string()),
            TransitionError::Resolved(_)
            | TransitionError::HeadNotPending
            | TransitionError::Expired => AppError::Conflict(err.to_string()),
        }
    }
}

/// Closes a chain: the header takes `status` with `resolved_at = now` and every pending
/// offer takes `offer_status`.
///
/// # Returns
/// - `Ok(())` - Chain closed
/// - `Err(AppError::Conflict)` - The chain moved past `version` concurrently
pub(crate) async fn close_chain<C: ConnectionTrait>(
    db: &C,
    version: ChainVersion,
    status: NegotiationStatus,
    offer_status: OfferStatus,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    let repo = NegotiationRepository::new(db);

    let closed = repo
        .update_chain_if_unchanged(
            version,
            ChainUpdate {
                status,
                head_offer_id: None,
                expires_at: None,
                final_price: None,
                booking_id: None,
                resolved_at: Some(now),
            },
        )
        .await?;
    if !closed {
        return Err(stale_chain());
    }
    repo.close_pending_offers(version.id, offer_status).await?;

    Ok(())
}

/// An offer about to be accepted and booked.
struct Acceptance {
    offer_id: i32,
    final_price: Decimal,
    response_message: Option<String>,
    auto_accepted: bool,
}

fn stale_chain() -> AppError {
    AppError::Conflict("Negotiation changed concurrently, please try again".to_string())
}

pub struct NegotiationService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> NegotiationService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Opens a negotiation with the passenger's first offer.
    ///
    /// The driver's auto-accept rule is evaluated immediately; when the offer meets it the
    /// chain is accepted and the booking created in the same transaction.
    ///
    /// # Arguments
    /// - `params` - Passenger, trip, seats, offered seat price and optional message
    ///
    /// # Returns
    /// - `Ok(Negotiation)` - The chain with its offer history
    /// - `Err(AppError::NotFound)` - Trip does not exist
    /// - `Err(AppError::BadRequest)` - Trip not negotiable, own trip, price or seats invalid
    /// - `Err(AppError::Conflict)` - Unresolved chain or confirmed booking already exists
    pub async fn open(&self, params: OpenNegotiationParams) -> Result<Negotiation, AppError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;
        let repo = NegotiationRepository::new(&txn);

        let trip = TripRepository::new(&txn)
            .find_by_id(params.trip_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

        if !trip.is_bookable(now) {
            return Err(AppError::BadRequest(
                "Trip is not open for negotiation".to_string(),
            ));
        }
        if !trip.price_negotiable {
            return Err(AppError::BadRequest(
                "The price of this trip is not negotiable".to_string(),
            ));
        }
        if trip.driver_id == params.passenger_id {
            return Err(AppError::BadRequest(
                "You cannot negotiate on your own trip".to_string(),
            ));
        }
        if repo
            .find_unresolved(trip.id, params.passenger_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "You already have an active negotiation for this trip".to_string(),
            ));
        }
        if BookingRepository::new(&txn)
            .find_confirmed(trip.id, params.passenger_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "You already have a booking on this trip".to_string(),
            ));
        }
        if params.proposed_price <= Decimal::ZERO || params.proposed_price >= trip.price_per_seat
        {
            return Err(AppError::BadRequest(
                "Offered price must be positive and below the seat price".to_string(),
            ));
        }
        if params.seats_requested < 1 || params.seats_requested > trip.available_seats {
            return Err(AppError::BadRequest(format!(
                "Seats requested must be between 1 and {}",
                trip.available_seats
            )));
        }

        let expires_at = now + Duration::hours(OPENING_OFFER_TTL_HOURS);
        let chain = repo
            .create_chain(NewNegotiation {
                trip_id: trip.id,
                passenger_id: params.passenger_id,
                driver_id: trip.driver_id,
                seats_requested: params.seats_requested,
                original_price: trip.price_per_seat,
                expires_at,
            })
            .await
            .map_err(|err| match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(
                    "You already have an active negotiation for this trip".to_string(),
                ),
                _ => AppError::from(err),
            })?;
        let offer = repo
            .insert_offer(NewOffer {
                negotiation_id: chain.id,
                previous_offer_id: None,
                proposer: OfferProposer::Passenger,
                price: params.proposed_price,
                message: params.message,
                expires_at,
            })
            .await?;
        let headed = repo
            .update_chain_if_unchanged(
                ChainVersion::of_entity(&chain),
                ChainUpdate {
                    status: NegotiationStatus::Open,
                    head_offer_id: Some(offer.id),
                    expires_at: None,
                    final_price: None,
                    booking_id: None,
                    resolved_at: None,
                },
            )
            .await?;
        if !headed {
            return Err(stale_chain());
        }

        let negotiation = self.load(&txn, chain.id).await?;
        let rule = repo
            .get_auto_accept_rule(trip.driver_id)
            .await?
            .unwrap_or_default();

        if should_auto_accept(offer.price, trip.price_per_seat, &rule) {
            self.finalize_acceptance(
                &txn,
                &negotiation,
                Acceptance {
                    offer_id: offer.id,
                    final_price: offer.price,
                    response_message: Some(AUTO_ACCEPT_MESSAGE.to_string()),
                    auto_accepted: true,
                },
                now,
            )
            .await?;
            tracing::info!(
                "Offer {} on trip {} auto-accepted for driver {}",
                offer.id,
                trip.id,
                trip.driver_id
            );
        } else {
            let event = NotificationEvent::new(
                NotificationKind::NegotiationOffer,
                "New price offer",
                format!(
                    "A passenger offered {} per seat for {} seat(s) on {}",
                    offer.price,
                    negotiation.seats_requested,
                    trip.route()
                ),
            )
            .with_data(json!({ "negotiation_id": chain.id, "trip_id": trip.id }));
            NotificationService::new(&txn)
                .notify(&[trip.driver_id], &event)
                .await?;
        }

        let negotiation = self.load(&txn, chain.id).await?;
        txn.commit().await?;

        Ok(negotiation)
    }

    /// Answers the head offer with a counter offer.
    ///
    /// A passenger counter is checked against the driver's auto-accept rule again. If the
    /// head has expired the chain is expired and committed before the 409 is returned.
    ///
    /// # Arguments
    /// - `user_id` - Acting user, must be the non-proposer of the head offer
    /// - `negotiation_id` - Chain to counter
    /// - `price` - New seat price
    /// - `message` - Optional note to the other party
    ///
    /// # Returns
    /// - `Ok(Negotiation)` - Updated chain
    /// - `Err(AppError::Forbidden)` - Not a party or not the caller's turn
    /// - `Err(AppError::BadRequest)` - Price outside the allowed range
    /// - `Err(AppError::Conflict)` - Chain resolved, head expired, or changed concurrently
    pub async fn counter(
        &self,
        user_id: i32,
        negotiation_id: i32,
        price: Decimal,
        message: Option<String>,
    ) -> Result<Negotiation, AppError> {
        self.transition(user_id, negotiation_id, Action::Counter(price), message)
            .await
    }

    /// Accepts the head offer and books the seats at its price.
    ///
    /// # Returns
    /// - `Ok(Negotiation)` - Accepted chain with `booking_id` set
    /// - `Err(AppError::Forbidden)` - Not a party or not the caller's turn
    /// - `Err(AppError::Conflict)` - Chain resolved, head expired, trip departed, or seats
    ///   gone
    pub async fn accept(
        &self,
        user_id: i32,
        negotiation_id: i32,
        message: Option<String>,
    ) -> Result<Negotiation, AppError> {
        self.transition(user_id, negotiation_id, Action::Accept, message)
            .await
    }

    /// Rejects the head offer, ending the chain.
    pub async fn reject(
        &self,
        user_id: i32,
        negotiation_id: i32,
        message: Option<String>,
    ) -> Result<Negotiation, AppError> {
        self.transition(user_id, negotiation_id, Action::Reject, message)
            .await
    }

    /// Withdraws an unresolved chain on behalf of its passenger.
    pub async fn cancel(
        &self,
        user_id: i32,
        negotiation_id: i32,
    ) -> Result<Negotiation, AppError> {
        self.transition(user_id, negotiation_id, Action::Cancel, None)
            .await
    }

    /// Accepts or rejects the head offer of several chains the caller drives.
    ///
    /// Each chain is answered in its own transaction, so one failure leaves the others
    /// untouched. Chains the caller does not drive, or where it is not the driver's turn,
    /// are reported as failed.
    ///
    /// # Arguments
    /// - `driver_id` - Signed-in driver
    /// - `negotiation_ids` - Chains to answer; duplicates are answered once
    /// - `answer` - Accept or reject
    /// - `message` - Note stored on every answered offer
    ///
    /// # Returns
    /// - `Ok(BulkOutcome)` - Which chains succeeded and which failed
    /// - `Err(AppError::BadRequest)` - No IDs or more than [`MAX_BULK_NEGOTIATIONS`]
    pub async fn bulk_respond(
        &self,
        driver_id: i32,
        negotiation_ids: &[i32],
        answer: BulkAnswer,
        message: Option<String>,
    ) -> Result<BulkOutcome, AppError> {
        let mut ids = Vec::with_capacity(negotiation_ids.len());
        for &id in negotiation_ids {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        if ids.is_empty() || ids.len() > MAX_BULK_NEGOTIATIONS {
            return Err(AppError::BadRequest(format!(
                "Between 1 and {} negotiations can be answered at once",
                MAX_BULK_NEGOTIATIONS
            )));
        }

        let mut outcome = BulkOutcome {
            answer,
            succeeded: Vec::new(),
            failed: Vec::new(),
        };
        for id in ids {
            match self
                .respond_as_driver(driver_id, id, answer, message.clone())
                .await
            {
                Ok(_) => outcome.succeeded.push(id),
                Err(err) => {
                    tracing::debug!("Bulk {:?} of negotiation {} failed: {}", answer, id, err);
                    outcome.failed.push(id);
                }
            }
        }

        tracing::info!(
            "Driver {} answered {} negotiations in bulk, {} failed",
            driver_id,
            outcome.succeeded.len(),
            outcome.failed.len()
        );

        Ok(outcome)
    }

    async fn respond_as_driver(
        &self,
        driver_id: i32,
        negotiation_id: i32,
        answer: BulkAnswer,
        message: Option<String>,
    ) -> Result<Negotiation, AppError> {
        let negotiation = self.load(self.db, negotiation_id).await?;
        if negotiation.driver_id != driver_id {
            return Err(AppError::Forbidden(
                "You are not the driver of this negotiation".to_string(),
            ));
        }

        match answer {
            BulkAnswer::Accept => self.accept(driver_id, negotiation_id, message).await,
            BulkAnswer::Reject => self.reject(driver_id, negotiation_id, message).await,
        }
    }

    /// Runs one party action through the state machine and persists its outcome.
    async fn transition(
        &self,
        user_id: i32,
        negotiation_id: i32,
        action: Action,
        message: Option<String>,
    ) -> Result<Negotiation, AppError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let negotiation = self.load(&txn, negotiation_id).await?;
        let (role, state, head) = Self::prepare(&negotiation, user_id)?;

        let outcome = match state.apply(role, action, now) {
            Ok(outcome) => outcome,
            Err(TransitionError::Expired) => {
                self.expire(&txn, &negotiation, now).await?;
                txn.commit().await?;
                return Err(TransitionError::Expired.into());
            }
            Err(err) => return Err(err.into()),
        };

        match outcome {
            Outcome::Countered { price } => {
                self.persist_counter(&txn, &negotiation, &head, price, message, now)
                    .await?
            }
            Outcome::Accepted { final_price } => {
                let acceptance = Acceptance {
                    offer_id: head.id,
                    final_price,
                    response_message: message,
                    auto_accepted: false,
                };
                self.finalize_acceptance(&txn, &negotiation, acceptance, now)
                    .await?
            }
            Outcome::Rejected => {
                self.persist_rejection(&txn, &negotiation, role, &head, message, now)
                    .await?
            }
            Outcome::Cancelled => self.persist_cancellation(&txn, &negotiation, now).await?,
        }

        let negotiation = self.load(&txn, negotiation_id).await?;
        txn.commit().await?;

        Ok(negotiation)
    }

    /// Replaces the head with a counter from the party that did not propose it.
    async fn persist_counter<C: ConnectionTrait>(
        &self,
        db: &C,
        negotiation: &Negotiation,
        head: &Offer,
        price: Decimal,
        message: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let repo = NegotiationRepository::new(db);
        let role = match head.proposer {
            OfferProposer::Passenger => OfferProposer::Driver,
            OfferProposer::Driver => OfferProposer::Passenger,
        };

        if !repo
            .respond_to_offer(head.id, OfferStatus::Countered, None, false, now)
            .await?
        {
            return Err(stale_chain());
        }

        let expires_at = now + Duration::hours(COUNTER_OFFER_TTL_HOURS);
        let offer = repo
            .insert_offer(NewOffer {
                negotiation_id: negotiation.id,
                previous_offer_id: Some(head.id),
                proposer: role,
                price,
                message,
                expires_at,
            })
            .await?;
        let headed = repo
            .update_chain_if_unchanged(
                negotiation.version(),
                ChainUpdate {
                    status: NegotiationStatus::Countered,
                    head_offer_id: Some(offer.id),
                    expires_at: Some(expires_at),
                    final_price: None,
                    booking_id: None,
                    resolved_at: None,
                },
            )
            .await?;
        if !headed {
            return Err(stale_chain());
        }

        let rule = match role {
            OfferProposer::Passenger => repo
                .get_auto_accept_rule(negotiation.driver_id)
                .await?
                .unwrap_or_default(),
            OfferProposer::Driver => AutoAcceptRule::default(),
        };

        if should_auto_accept(offer.price, negotiation.original_price, &rule) {
            let countered = self.load(db, negotiation.id).await?;
            self.finalize_acceptance(
                db,
                &countered,
                Acceptance {
                    offer_id: offer.id,
                    final_price: offer.price,
                    response_message: Some(AUTO_ACCEPT_MESSAGE.to_string()),
                    auto_accepted: true,
                },
                now,
            )
            .await?;
        } else {
            let event = NotificationEvent::new(
                NotificationKind::NegotiationCounter,
                "Counter offer received",
                format!("New counter offer: {} per seat", offer.price),
            )
            .with_data(json!({ "negotiation_id": negotiation.id, "offer_id": offer.id }));
            NotificationService::new(db)
                .notify(&[negotiation.counterpart_of(role)], &event)
                .await?;
        }

        Ok(())
    }

    async fn persist_rejection<C: ConnectionTrait>(
        &self,
        db: &C,
        negotiation: &Negotiation,
        role: OfferProposer,
        head: &Offer,
        message: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let repo = NegotiationRepository::new(db);

        let rejected = repo
            .update_chain_if_unchanged(
                negotiation.version(),
                ChainUpdate {
                    status: NegotiationStatus::Rejected,
                    head_offer_id: None,
                    expires_at: None,
                    final_price: None,
                    booking_id: None,
                    resolved_at: Some(now),
                },
            )
            .await?;
        if !rejected
            || !repo
                .respond_to_offer(head.id, OfferStatus::Rejected, message, false, now)
                .await?
        {
            return Err(stale_chain());
        }

        let event = NotificationEvent::new(
            NotificationKind::NegotiationRejected,
            "Offer rejected",
            format!("Your offer of {} per seat was rejected", head.price),
        )
        .with_data(json!({ "negotiation_id": negotiation.id }));
        NotificationService::new(db)
            .notify(&[negotiation.counterpart_of(role)], &event)
            .await?;

        Ok(())
    }

    async fn persist_cancellation<C: ConnectionTrait>(
        &self,
        db: &C,
        negotiation: &Negotiation,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        close_chain(
            db,
            negotiation.version(),
            NegotiationStatus::Cancelled,
            OfferStatus::Cancelled,
            now,
        )
        .await?;

        let event = NotificationEvent::new(
            NotificationKind::NegotiationCancelled,
            "Negotiation cancelled",
            "The passenger withdrew their price offer",
        )
        .with_data(json!({ "negotiation_id": negotiation.id }));
        NotificationService::new(db)
            .notify(&[negotiation.driver_id], &event)
            .await?;

        Ok(())
    }

    /// Gets a chain with its offer history for one of its parties.
    ///
    /// # Returns
    /// - `Ok(Negotiation)` - The chain
    /// - `Err(AppError::NotFound)` - No such chain
    /// - `Err(AppError::Forbidden)` - Caller is neither passenger nor driver of the chain
    pub async fn get(&self, user_id: i32, negotiation_id: i32) -> Result<Negotiation, AppError> {
        let negotiation = self.load(self.db, negotiation_id).await?;

        if negotiation.role_of(user_id).is_none() {
            return Err(AppError::Forbidden(
                "You are not a party to this negotiation".to_string(),
            ));
        }

        Ok(negotiation)
    }

    /// Gets chains opened by the passenger.
    pub async fn get_my_offers(
        &self,
        passenger_id: i32,
        status: Option<NegotiationStatus>,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedNegotiations, AppError> {
        let (negotiations, total) = NegotiationRepository::new(self.db)
            .get_by_passenger_paginated(passenger_id, status, page, per_page)
            .await?;

        Ok(PaginatedNegotiations {
            negotiations,
            total,
            page,
            per_page,
            total_pages: total_pages(total, per_page),
        })
    }

    /// Gets chains addressed to the driver.
    pub async fn get_received_offers(
        &self,
        driver_id: i32,
        status: Option<NegotiationStatus>,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedNegotiations, AppError> {
        let (negotiations, total) = NegotiationRepository::new(self.db)
            .get_by_driver_paginated(driver_id, status, page, per_page)
            .await?;

        Ok(PaginatedNegotiations {
            negotiations,
            total,
            page,
            per_page,
            total_pages: total_pages(total, per_page),
        })
    }

    /// Gets every chain of a trip for its driver.
    pub async fn get_for_trip(
        &self,
        driver_id: i32,
        trip_id: i32,
    ) -> Result<Vec<Negotiation>, AppError> {
        let trip = TripRepository::new(self.db)
            .find_by_id(trip_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

        if trip.driver_id != driver_id {
            return Err(AppError::Forbidden(
                "Only the driver can view negotiations for this trip".to_string(),
            ));
        }

        Ok(NegotiationRepository::new(self.db)
            .get_by_trip(trip_id)
            .await?)
    }

    /// Gets the driver's auto-accept rule, the disabled default when never configured.
    pub async fn get_auto_accept_rule(&self, driver_id: i32) -> Result<AutoAcceptRule, AppError> {
        Ok(NegotiationRepository::new(self.db)
            .get_auto_accept_rule(driver_id)
            .await?
            .unwrap_or_default())
    }

    /// Saves the driver's auto-accept rule.
    ///
    /// # Returns
    /// - `Ok(AutoAcceptRule)` - Stored rule
    /// - `Err(AppError::BadRequest)` - Percentage outside 1..=100 or negative discount
    pub async fn update_auto_accept_rule(
        &self,
        driver_id: i32,
        rule: AutoAcceptRule,
    ) -> Result<AutoAcceptRule, AppError> {
        if !(1..=100).contains(&rule.min_price_percentage) {
            return Err(AppError::BadRequest(
                "Minimum price percentage must be between 1 and 100".to_string(),
            ));
        }
        if rule
            .max_discount_amount
            .is_some_and(|discount| discount < Decimal::ZERO)
        {
            return Err(AppError::BadRequest(
                "Maximum discount cannot be negative".to_string(),
            ));
        }

        Ok(NegotiationRepository::new(self.db)
            .upsert_auto_accept_rule(driver_id, rule)
            .await?)
    }

    /// Suggests a seat price for a route from past and upcoming trips.
    ///
    /// # Arguments
    /// - `from_location` / `to_location` - Route, matched case-insensitively
    /// - `comfort_level` - Scales the average: economy 1.0, comfort 1.2, luxury 1.5
    pub async fn recommend_price(
        &self,
        from_location: &str,
        to_location: &str,
        comfort_level: Option<ComfortLevel>,
    ) -> Result<PriceRecommendation, AppError> {
        let prices = TripRepository::new(self.db)
            .route_prices(from_location, to_location)
            .await?;

        Ok(recommendation(
            from_location,
            to_location,
            &prices,
            comfort_level,
        ))
    }

    /// Expires every chain whose pending head offer is past its expiry.
    ///
    /// # Returns
    /// - `Ok(u64)` - Number of chains expired
    /// - `Err(AppError)` - Database error; nothing is written
    pub async fn expire_stale(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let txn = self.db.begin().await?;
        let repo = NegotiationRepository::new(&txn);

        let stale = repo.get_stale_pending_offers(now).await?;
        let mut chain_ids: Vec<i32> = stale.iter().map(|offer| offer.negotiation_id).collect();
        chain_ids.sort_unstable();
        chain_ids.dedup();

        let mut expired = 0;
        for chain_id in chain_ids {
            let negotiation = self.load(&txn, chain_id).await?;
            let unresolved = NegotiationState::from_negotiation(&negotiation)
                .is_some_and(|state| !state.is_resolved());
            if unresolved {
                match self.expire(&txn, &negotiation, now).await {
                    Ok(()) => expired += 1,
                    Err(AppError::Conflict(_)) => {
                        tracing::debug!("Negotiation {} resolved before it could expire", chain_id)
                    }
                    Err(err) => return Err(err),
                }
            } else {
                repo.close_pending_offers(chain_id, OfferStatus::Expired)
                    .await?;
            }
        }

        txn.commit().await?;

        Ok(expired)
    }

    async fn load<C: ConnectionTrait>(
        &self,
        db: &C,
        negotiation_id: i32,
    ) -> Result<Negotiation, AppError> {
        NegotiationRepository::new(db)
            .find_by_id(negotiation_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Negotiation not found".to_string()))
    }

    /// Resolves the caller's role and the state snapshot needed for a transition.
    fn prepare(
        negotiation: &Negotiation,
        user_id: i32,
    ) -> Result<(OfferProposer, NegotiationState, Offer), AppError> {
        let role = negotiation.role_of(user_id).ok_or_else(|| {
            AppError::Forbidden("You are not a party to this negotiation".to_string())
        })?;
        let state = NegotiationState::from_negotiation(negotiation).ok_or_else(|| {
            AppError::InternalError(format!(
                "Negotiation {} has no head offer",
                negotiation.id
            ))
        })?;
        let head = negotiation.head().cloned().ok_or_else(|| {
            AppError::InternalError(format!(
                "Negotiation {} has no head offer",
                negotiation.id
            ))
        })?;

        Ok((role, state, head))
    }

    async fn expire<C: ConnectionTrait>(
        &self,
        db: &C,
        negotiation: &Negotiation,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        close_chain(
            db,
            negotiation.version(),
            NegotiationStatus::Expired,
            OfferStatus::Expired,
            now,
        )
        .await?;

        let event = NotificationEvent::new(
            NotificationKind::NegotiationExpired,
            "Offer expired",
            "A price offer expired without a response",
        )
        .with_data(json!({ "negotiation_id": negotiation.id }));
        NotificationService::new(db)
            .notify(&[negotiation.passenger_id, negotiation.driver_id], &event)
            .await?;

        Ok(())
    }

    /// Books the seats at the agreed price and marks the offer and the chain accepted.
    ///
    /// # Returns
    /// - `Ok(())` - Booking created and chain accepted
    /// - `Err(AppError::Conflict)` - Trip cancelled, started, departed or full, or the
    ///   chain changed concurrently
    async fn finalize_acceptance<C: ConnectionTrait>(
        &self,
        db: &C,
        negotiation: &Negotiation,
        acceptance: Acceptance,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let repo = NegotiationRepository::new(db);
        let Acceptance {
            offer_id,
            final_price,
            response_message,
            auto_accepted,
        } = acceptance;

        let trip = TripRepository::new(db)
            .find_by_id(negotiation.trip_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;
        if !trip.is_bookable(now) {
            return Err(AppError::Conflict(
                "Trip is no longer accepting bookings".to_string(),
            ));
        }

        reserve_seats(db, &trip, negotiation.seats_requested).await?;

        let booking = BookingRepository::new(db)
            .create(NewBooking {
                trip_id: trip.id,
                passenger_id: negotiation.passenger_id,
                seats_booked: negotiation.seats_requested,
                total_price: final_price * Decimal::from(negotiation.seats_requested),
                pickup_location: None,
                dropoff_location: None,
                special_requests: None,
                payment_method: PAYMENT_NEGOTIATED,
                negotiation_id: Some(negotiation.id),
            })
            .await?;

        let accepted = repo
            .update_chain_if_unchanged(
                negotiation.version(),
                ChainUpdate {
                    status: NegotiationStatus::Accepted,
                    head_offer_id: None,
                    expires_at: None,
                    final_price: Some(final_price),
                    booking_id: Some(booking.id),
                    resolved_at: Some(now),
                },
            )
            .await?;
        if !accepted
            || !repo
                .respond_to_offer(
                    offer_id,
                    OfferStatus::Accepted,
                    response_message,
                    auto_accepted,
                    now,
                )
                .await?
        {
            return Err(stale_chain());
        }

        join_trip_thread(db, &trip, negotiation.passenger_id).await?;

        let event = NotificationEvent::new(
            NotificationKind::NegotiationAccepted,
            "Offer accepted",
            format!(
                "Price agreed at {} per seat for {}",
                final_price,
                trip.route()
            ),
        )
        .with_data(json!({
            "negotiation_id": negotiation.id,
            "booking_id": booking.id,
            "auto_accepted": auto_accepted,
        }));
        NotificationService::new(db)
            .notify(&[negotiation.passenger_id, negotiation.driver_id], &event)
            .await?;

        Ok(())
    }
}

/// Builds a recommendation from the seat prices found on a route.
fn recommendation(
    from_location: &str,
    to_location: &str,
    prices: &[Decimal],
    comfort_level: Option<ComfortLevel>,
) -> PriceRecommendation {
    let base = if prices.is_empty() {
        Decimal::from(FALLBACK_SEAT_PRICE)
    } else {
        prices.iter().sum::<Decimal>() / Decimal::from(prices.len() as u64)
    };

    let multiplier = match comfort_level {
        Some(ComfortLevel::Comfort) => Decimal::new(12, 1),
        Some(ComfortLevel::Luxury) => Decimal::new(15, 1),
        Some(ComfortLevel::Economy) | None => Decimal::ONE,
    };
    let recommended = (base * multiplier).round_dp(0);

    PriceRecommendation {
        from_location: from_location.trim().to_string(),
        to_location: to_location.trim().to_string(),
        recommended_price: recommended,
        min_price: (recommended * Decimal::new(8, 1)).round_dp(0),
        max_price: (recommended * Decimal::new(12, 1)).round_dp(0),
        sample_size: prices.len() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Expected: the fallback price is used for unknown routes
    #[test]
    fn recommendation_falls_back_without_history() {
        let result = recommendation("Tashkent", "Nukus", &[], None);

        assert_eq!(result.recommended_price, Decimal::from(15_000));
        assert_eq!(result.min_price, Decimal::from(12_000));
        assert_eq!(result.max_price, Decimal::from(18_000));
        assert_eq!(result.sample_size, 0);
    }

    /// Expected: the route average is scaled by the comfort multiplier
    #[test]
    fn recommendation_scales_average_by_comfort() {
        let prices = [Decimal::from(100_000), Decimal::from(120_000)];

        let result = recommendation(
            "Tashkent",
            "Samarkand",
            &prices,
            Some(ComfortLevel::Comfort),
        );

        assert_eq!(result.recommended_price, Decimal::from(132_000));
        assert_eq!(result.sample_size, 2);
    }
}
