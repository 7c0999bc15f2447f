use chrono::{Duration, Utc};
use entity::sea_orm_active_enums::{NegotiationStatus, OfferProposer, OfferStatus, TripStatus};
use rust_decimal::Decimal;

use crate::server::{
    data::{
        booking::BookingRepository, negotiation::NegotiationRepository,
        notification::NotificationRepository, trip::TripRepository,
    },
    error::AppError,
    model::{
        negotiation::{AutoAcceptRule, ChainVersion, OpenNegotiationParams},
        trip::Trip,
    },
    service::negotiation::{close_chain, NegotiationService, MAX_BULK_NEGOTIATIONS},
};
use crate::model::negotiation::BulkAnswer;
use test_utils::{builder::TestBuilder, factory};

fn dec(value: i64) -> Decimal {
    Decimal::new(value, 0)
}

fn offer(passenger_id: i32, trip_id: i32, price: i64) -> OpenNegotiationParams {
    OpenNegotiationParams {
        passenger_id,
        trip_id,
        seats_requested: 1,
        proposed_price: dec(price),
        message: None,
    }
}

/// Tests an offer below the driver's threshold waits for the driver.
///
/// Expected: Ok with an open chain, a pending passenger head offer and one notification
/// queued for the driver
#[tokio::test]
async fn opening_below_threshold_stays_open() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let passenger = factory::user::create_user(db).await?;

    let negotiation = NegotiationService::new(db)
        .open(offer(passenger.id, trip.id, 70_000))
        .await?;

    assert_eq!(negotiation.status, NegotiationStatus::Open);
    assert!(negotiation.booking_id.is_none());
    let head = negotiation.head().unwrap();
    assert_eq!(head.proposer, OfferProposer::Passenger);
    assert_eq!(head.status, OfferStatus::Pending);
    assert_eq!(head.price, dec(70_000));

    let (driver_inbox, _) = NotificationRepository::new(db)
        .get_for_user_paginated(driver.id, false, 0, 10)
        .await?;
    assert_eq!(driver_inbox.len(), 1);

    Ok(())
}

/// Tests an offer exactly at the auto-accept threshold books immediately.
///
/// Rule accepts 80% of the 100000 seat price, the passenger offers 80000.
///
/// Expected: Ok with an accepted chain, an auto-accepted offer, a booking at the offered
/// price and one seat taken from the trip
#[tokio::test]
async fn offer_at_threshold_is_auto_accepted() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let passenger = factory::user::create_user(db).await?;
    NegotiationRepository::new(db)
        .upsert_auto_accept_rule(
            driver.id,
            AutoAcceptRule {
                enabled: true,
                min_price_percentage: 80,
                max_discount_amount: None,
            },
        )
        .await?;

    let negotiation = NegotiationService::new(db)
        .open(offer(passenger.id, trip.id, 80_000))
        .await?;

    assert_eq!(negotiation.status, NegotiationStatus::Accepted);
    assert_eq!(negotiation.final_price, Some(dec(80_000)));
    let opening = &negotiation.offers[0];
    assert_eq!(opening.status, OfferStatus::Accepted);
    assert!(opening.auto_accepted);

    let booking_id = negotiation.booking_id.expect("booking created");
    let booking = BookingRepository::new(db)
        .find_by_id(booking_id)
        .await?
        .unwrap();
    assert_eq!(booking.total_price, dec(80_000));
    assert_eq!(booking.negotiation_id, Some(negotiation.id));

    let trip = TripRepository::new(db).find_by_id(trip.id).await?.unwrap();
    assert_eq!(trip.available_seats, 2);

    Ok(())
}

/// Tests the proposer of the head offer cannot counter their own offer.
///
/// Expected: Err(AppError::Forbidden)
#[tokio::test]
async fn counter_out_of_turn_is_forbidden() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (_driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let passenger = factory::user::create_user(db).await?;

    let service = NegotiationService::new(db);
    let negotiation = service.open(offer(passenger.id, trip.id, 70_000)).await?;

    let result = service
        .counter(passenger.id, negotiation.id, dec(75_000), None)
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));

    Ok(())
}

/// Tests a driver counter followed by the passenger accepting it.
///
/// Expected: Ok with the chain accepted at the driver's price and the booking priced at
/// that amount
#[tokio::test]
async fn passenger_accepts_driver_counter() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let passenger = factory::user::create_user(db).await?;

    let service = NegotiationService::new(db);
    let negotiation = service.open(offer(passenger.id, trip.id, 70_000)).await?;

    let countered = service
        .counter(driver.id, negotiation.id, dec(90_000), Some("Meet halfway".to_string()))
        .await?;
    assert_eq!(countered.status, NegotiationStatus::Countered);
    assert_eq!(countered.offers.len(), 2);
    assert_eq!(countered.offers[0].status, OfferStatus::Countered);
    assert_eq!(countered.offers[1].previous_offer_id, Some(countered.offers[0].id));

    let accepted = service.accept(passenger.id, negotiation.id, None).await?;

    assert_eq!(accepted.status, NegotiationStatus::Accepted);
    assert_eq!(accepted.final_price, Some(dec(90_000)));
    let booking = BookingRepository::new(db)
        .find_by_id(accepted.booking_id.unwrap())
        .await?
        .unwrap();
    assert_eq!(booking.total_price, dec(90_000));

    Ok(())
}

/// Tests acting on an expired head offer expires the chain before failing.
///
/// Expected: Err(AppError::Conflict) and the chain stored as expired
#[tokio::test]
async fn acting_on_expired_offer_expires_chain() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let passenger = factory::user::create_user(db).await?;
    let (chain, _) =
        factory::negotiation::NegotiationFactory::new(db, trip.id, passenger.id, driver.id)
            .expires_at(Utc::now() - Duration::minutes(5))
            .build()
            .await?;

    let result = NegotiationService::new(db)
        .accept(driver.id, chain.id, None)
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
    let stored = NegotiationRepository::new(db)
        .find_by_id(chain.id)
        .await?
        .unwrap();
    assert_eq!(stored.status, NegotiationStatus::Expired);
    assert!(stored
        .offers
        .iter()
        .all(|offer| offer.status == OfferStatus::Expired));

    Ok(())
}

/// Tests the sweep expires only chains whose head offer ran out.
///
/// Expected: Ok(1) with the fresh chain still open
#[tokio::test]
async fn expire_stale_sweeps_expired_chains() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let late = factory::user::create_user(db).await?;
    let fresh = factory::user::create_user(db).await?;
    let (stale_chain, _) =
        factory::negotiation::NegotiationFactory::new(db, trip.id, late.id, driver.id)
            .expires_at(Utc::now() - Duration::minutes(1))
            .build()
            .await?;
    let (fresh_chain, _) =
        factory::negotiation::NegotiationFactory::new(db, trip.id, fresh.id, driver.id)
            .build()
            .await?;

    let expired = NegotiationService::new(db).expire_stale(Utc::now()).await?;

    assert_eq!(expired, 1);
    let repo = NegotiationRepository::new(db);
    assert_eq!(
        repo.find_by_id(stale_chain.id).await?.unwrap().status,
        NegotiationStatus::Expired
    );
    assert_eq!(
        repo.find_by_id(fresh_chain.id).await?.unwrap().status,
        NegotiationStatus::Open
    );

    Ok(())
}

/// Tests a second chain on the same trip is refused while the first is unresolved.
///
/// Expected: Err(AppError::Conflict)
#[tokio::test]
async fn second_open_chain_conflicts() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (_driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let passenger = factory::user::create_user(db).await?;

    let service = NegotiationService::new(db);
    service.open(offer(passenger.id, trip.id, 70_000)).await?;
    let result = service.open(offer(passenger.id, trip.id, 75_000)).await;

    assert!(matches!(result, Err(AppError::Conflict(_))));

    Ok(())
}

async fn enable_auto_accept(
    db: &sea_orm::DatabaseConnection,
    driver_id: i32,
    min_price_percentage: i32,
) -> Result<(), AppError> {
    NegotiationRepository::new(db)
        .upsert_auto_accept_rule(
            driver_id,
            AutoAcceptRule {
                enabled: true,
                min_price_percentage,
                max_discount_amount: None,
            },
        )
        .await?;
    Ok(())
}

/// Tests the driver rejecting the opening offer ends the chain.
///
/// Expected: Ok with a rejected chain and head offer, no booking, and the passenger
/// notified
#[tokio::test]
async fn driver_rejects_opening_offer() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let passenger = factory::user::create_user(db).await?;

    let service = NegotiationService::new(db);
    let negotiation = service.open(offer(passenger.id, trip.id, 60_000)).await?;
    let rejected = service
        .reject(driver.id, negotiation.id, Some("Too low".to_string()))
        .await?;

    assert_eq!(rejected.status, NegotiationStatus::Rejected);
    assert!(rejected.resolved_at.is_some());
    assert!(rejected.booking_id.is_none());
    assert_eq!(rejected.offers[0].status, OfferStatus::Rejected);
    assert_eq!(rejected.offers[0].response_message.as_deref(), Some("Too low"));

    let (passenger_inbox, _) = NotificationRepository::new(db)
        .get_for_user_paginated(passenger.id, false, 0, 10)
        .await?;
    assert_eq!(passenger_inbox.len(), 1);

    Ok(())
}

/// Tests the passenger withdrawing an open chain.
///
/// Expected: Ok with a cancelled chain and a cancelled head offer
#[tokio::test]
async fn passenger_cancels_negotiation() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (_driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let passenger = factory::user::create_user(db).await?;

    let service = NegotiationService::new(db);
    let negotiation = service.open(offer(passenger.id, trip.id, 60_000)).await?;
    let cancelled = service.cancel(passenger.id, negotiation.id).await?;

    assert_eq!(cancelled.status, NegotiationStatus::Cancelled);
    assert_eq!(cancelled.offers[0].status, OfferStatus::Cancelled);

    Ok(())
}

/// Tests only the passenger may withdraw a chain.
///
/// Expected: Err(AppError::Forbidden) and the chain still open
#[tokio::test]
async fn driver_cannot_cancel_negotiation() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let passenger = factory::user::create_user(db).await?;

    let service = NegotiationService::new(db);
    let negotiation = service.open(offer(passenger.id, trip.id, 60_000)).await?;
    let result = service.cancel(driver.id, negotiation.id).await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
    let stored = service.get(passenger.id, negotiation.id).await?;
    assert_eq!(stored.status, NegotiationStatus::Open);

    Ok(())
}

/// Tests a passenger counter that meets the driver's rule is accepted on the spot.
///
/// Rule accepts 80000 of 100000. Passenger opens at 70000, driver counters at 95000,
/// passenger counters at 85000.
///
/// Expected: Ok with an accepted chain at 85000, the last offer auto-accepted and a
/// booking created
#[tokio::test]
async fn passenger_counter_meeting_rule_is_auto_accepted() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let passenger = factory::user::create_user(db).await?;

    let service = NegotiationService::new(db);
    let negotiation = service.open(offer(passenger.id, trip.id, 70_000)).await?;
    enable_auto_accept(db, driver.id, 80).await?;

    service
        .counter(driver.id, negotiation.id, dec(95_000), None)
        .await?;
    let settled = service
        .counter(passenger.id, negotiation.id, dec(85_000), None)
        .await?;

    assert_eq!(settled.status, NegotiationStatus::Accepted);
    assert_eq!(settled.final_price, Some(dec(85_000)));
    let last = settled.offers.last().unwrap();
    assert_eq!(last.proposer, OfferProposer::Passenger);
    assert_eq!(last.status, OfferStatus::Accepted);
    assert!(last.auto_accepted);
    assert!(settled.booking_id.is_some());

    Ok(())
}

/// Tests accepting when the requested seats were booked in the meantime.
///
/// Expected: Err(AppError::Conflict), no booking, and the chain left open
#[tokio::test]
async fn accept_without_seats_conflicts() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let passenger = factory::user::create_user(db).await?;

    let service = NegotiationService::new(db);
    let negotiation = service
        .open(OpenNegotiationParams {
            seats_requested: 2,
            ..offer(passenger.id, trip.id, 70_000)
        })
        .await?;

    let snapshot = Trip::from_entity(trip);
    TripRepository::new(db)
        .set_seats_if_unchanged(&snapshot, snapshot.total_seats_offered, 1, TripStatus::Scheduled)
        .await?;

    let result = service.accept(driver.id, negotiation.id, None).await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
    let stored = service.get(passenger.id, negotiation.id).await?;
    assert_eq!(stored.status, NegotiationStatus::Open);
    assert!(stored.booking_id.is_none());
    assert!(BookingRepository::new(db)
        .find_confirmed(snapshot.id, passenger.id)
        .await?
        .is_none());

    Ok(())
}

/// Tests an unexpired offer cannot be accepted once the trip has departed.
///
/// Expected: Err(AppError::Conflict) and no booking on the departed trip
#[tokio::test]
async fn accept_after_departure_conflicts() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let driver = factory::user::create_driver(db).await?;
    let car = factory::car::create_car(db, driver.id).await?;
    let trip = factory::trip::TripFactory::new(db, driver.id, car.id)
        .departure(Utc::now() - Duration::hours(1))
        .build()
        .await?;
    let passenger = factory::user::create_user(db).await?;
    let (chain, _) =
        factory::negotiation::NegotiationFactory::new(db, trip.id, passenger.id, driver.id)
            .build()
            .await?;

    let result = NegotiationService::new(db)
        .accept(driver.id, chain.id, None)
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert!(BookingRepository::new(db)
        .find_confirmed(trip.id, passenger.id)
        .await?
        .is_none());
    let stored = TripRepository::new(db).find_by_id(trip.id).await?.unwrap();
    assert_eq!(stored.available_seats, trip.available_seats);

    Ok(())
}

/// Tests closing a chain from a snapshot taken before it was accepted.
///
/// Mirrors a trip cancellation or expiry sweep that read the chain while it was open
/// and writes after the accept committed.
///
/// Expected: Err(AppError::Conflict) and the chain stays accepted with its booking
#[tokio::test]
async fn closing_from_stale_snapshot_conflicts() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let passenger = factory::user::create_user(db).await?;

    let service = NegotiationService::new(db);
    let negotiation = service.open(offer(passenger.id, trip.id, 70_000)).await?;
    let snapshot: ChainVersion = negotiation.version();

    let accepted = service.accept(driver.id, negotiation.id, None).await?;
    let result = close_chain(
        db,
        snapshot,
        NegotiationStatus::Expired,
        OfferStatus::Expired,
        Utc::now(),
    )
    .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
    let stored = service.get(passenger.id, negotiation.id).await?;
    assert_eq!(stored.status, NegotiationStatus::Accepted);
    assert_eq!(stored.booking_id, accepted.booking_id);
    assert_eq!(stored.offers[0].status, OfferStatus::Accepted);

    Ok(())
}

/// Tests a driver rejects several chains at once, skipping one they do not drive.
///
/// Expected: two chains rejected, the foreign chain reported as failed and left open
#[tokio::test]
async fn bulk_reject_skips_foreign_chains() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let (other_driver, _other_car, other_trip) =
        factory::helpers::create_trip_with_dependencies(db).await?;
    let first = factory::user::create_user(db).await?;
    let second = factory::user::create_user(db).await?;

    let (chain_a, _) =
        factory::negotiation::NegotiationFactory::new(db, trip.id, first.id, driver.id)
            .build()
            .await?;
    let (chain_b, _) =
        factory::negotiation::NegotiationFactory::new(db, trip.id, second.id, driver.id)
            .build()
            .await?;
    let (foreign, _) = factory::negotiation::NegotiationFactory::new(
        db,
        other_trip.id,
        first.id,
        other_driver.id,
    )
    .build()
    .await?;

    let outcome = NegotiationService::new(db)
        .bulk_respond(
            driver.id,
            &[chain_a.id, chain_b.id, foreign.id, chain_a.id],
            BulkAnswer::Reject,
            Some("Fully booked".to_string()),
        )
        .await?;

    assert_eq!(outcome.succeeded, vec![chain_a.id, chain_b.id]);
    assert_eq!(outcome.failed, vec![foreign.id]);
    let dto = outcome.into_dto();
    assert_eq!(dto.processed, 3);

    let repo = NegotiationRepository::new(db);
    for id in [chain_a.id, chain_b.id] {
        let chain = repo.find_by_id(id).await?.unwrap();
        assert_eq!(chain.status, NegotiationStatus::Rejected);
    }
    let foreign = repo.find_by_id(foreign.id).await?.unwrap();
    assert_eq!(foreign.status, NegotiationStatus::Open);

    Ok(())
}

/// Tests a bulk accept books the seats for each chain.
///
/// Expected: both chains accepted with bookings, two seats taken from the trip
#[tokio::test]
async fn bulk_accept_books_each_chain() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let first = factory::user::create_user(db).await?;
    let second = factory::user::create_user(db).await?;
    let (chain_a, _) =
        factory::negotiation::NegotiationFactory::new(db, trip.id, first.id, driver.id)
            .build()
            .await?;
    let (chain_b, _) =
        factory::negotiation::NegotiationFactory::new(db, trip.id, second.id, driver.id)
            .build()
            .await?;

    let outcome = NegotiationService::new(db)
        .bulk_respond(driver.id, &[chain_a.id, chain_b.id], BulkAnswer::Accept, None)
        .await?;

    assert_eq!(outcome.failed, Vec::<i32>::new());
    let repo = NegotiationRepository::new(db);
    for id in [chain_a.id, chain_b.id] {
        let chain = repo.find_by_id(id).await?.unwrap();
        assert_eq!(chain.status, NegotiationStatus::Accepted);
        assert!(chain.booking_id.is_some());
    }
    let trip = TripRepository::new(db).find_by_id(trip.id).await?.unwrap();
    assert_eq!(trip.available_seats, 1);

    Ok(())
}

/// Tests the bulk size limits.
///
/// Expected: Err(AppError::BadRequest) for no IDs and for one more than the limit
#[tokio::test]
async fn bulk_respond_limits_batch_size() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let driver = factory::user::create_driver(db).await?;
    let service = NegotiationService::new(db);

    let empty = service
        .bulk_respond(driver.id, &[], BulkAnswer::Reject, None)
        .await;
    assert!(matches!(empty, Err(AppError::BadRequest(_))));

    let ids: Vec<i32> = (1..=MAX_BULK_NEGOTIATIONS as i32 + 1).collect();
    let oversized = service
        .bulk_respond(driver.id, &ids, BulkAnswer::Reject, None)
        .await;
    assert!(matches!(oversized, Err(AppError::BadRequest(_))));

    Ok(())
}
