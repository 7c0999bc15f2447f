use chrono::{Duration, Utc};
use entity::sea_orm_active_enums::{BookingStatus, NegotiationStatus, OfferStatus, TripStatus};
use rust_decimal::Decimal;

use crate::server::{
    data::{
        booking::BookingRepository, message::MessageRepository,
        negotiation::NegotiationRepository, notification::NotificationRepository,
        trip::TripRepository,
    },
    error::AppError,
    model::trip::{CreateTripParams, Trip, UpdateTripParams},
    service::{booking::reserve_seats, trip::TripService},
};
use test_utils::{builder::TestBuilder, factory};

fn new_trip(driver_id: i32, car_id: i32, seats: i32) -> CreateTripParams {
    CreateTripParams {
        driver_id,
        car_id,
        from_location: "Bishkek".to_string(),
        to_location: "Osh".to_string(),
        departure_datetime: Utc::now() + Duration::days(2),
        estimated_arrival_datetime: Some(Utc::now() + Duration::days(2) + Duration::hours(10)),
        price_per_seat: Decimal::new(150_000, 0),
        total_seats_offered: seats,
        additional_info: None,
        is_instant_booking: true,
        price_negotiable: true,
        allow_smoking: false,
        allow_pets: false,
        allow_music: true,
        female_only: false,
    }
}

fn seats_only(total_seats_offered: i32) -> UpdateTripParams {
    UpdateTripParams {
        departure_datetime: None,
        estimated_arrival_datetime: None,
        price_per_seat: None,
        total_seats_offered: Some(total_seats_offered),
        additional_info: None,
        is_instant_booking: None,
        price_negotiable: None,
        allow_smoking: None,
        allow_pets: None,
        allow_music: None,
        female_only: None,
    }
}

/// Tests publishing a trip with an approved four seat car.
///
/// Expected: Ok with a scheduled trip offering every seat and the driver placed in the
/// trip conversation
#[tokio::test]
async fn create_publishes_scheduled_trip() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let driver = factory::user::create_driver(db).await?;
    let car = factory::car::create_car(db, driver.id).await?;

    let trip = TripService::new(db)
        .create(new_trip(driver.id, car.id, 3))
        .await?;

    assert_eq!(trip.status, TripStatus::Scheduled);
    assert_eq!(trip.total_seats_offered, 3);
    assert_eq!(trip.available_seats, 3);

    let thread = MessageRepository::new(db)
        .find_thread_by_trip(trip.id)
        .await?
        .expect("trip thread created");
    assert!(MessageRepository::new(db)
        .is_participant(thread.id, driver.id)
        .await?);

    Ok(())
}

/// Tests the driver's own seat is never offered.
///
/// Expected: Err(AppError::BadRequest) for four seats in a four seat car
#[tokio::test]
async fn create_rejects_driver_seat() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let driver = factory::user::create_driver(db).await?;
    let car = factory::car::create_car(db, driver.id).await?;

    let result = TripService::new(db)
        .create(new_trip(driver.id, car.id, 4))
        .await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));

    Ok(())
}

/// Tests publishing with a car still awaiting verification.
///
/// Expected: Err(AppError::BadRequest)
#[tokio::test]
async fn create_requires_approved_car() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let driver = factory::user::create_driver(db).await?;
    let car = factory::car::CarFactory::new(db, driver.id)
        .verification_status(entity::sea_orm_active_enums::CarVerificationStatus::PendingVerification)
        .build()
        .await?;

    let result = TripService::new(db)
        .create(new_trip(driver.id, car.id, 2))
        .await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));

    Ok(())
}

/// Tests shrinking the offered seats around an existing booking.
///
/// Expected: zero seats is rejected, shrinking to the one booked seat leaves the trip
/// full with nothing available
#[tokio::test]
async fn update_keeps_booked_seats() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, _passenger, trip, _booking) = factory::helpers::create_booked_trip(db).await?;
    let service = TripService::new(db);

    let result = service.update(driver.id, trip.id, seats_only(0)).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    let updated = service.update(driver.id, trip.id, seats_only(1)).await?;
    assert_eq!(updated.total_seats_offered, 1);
    assert_eq!(updated.available_seats, 0);
    assert_eq!(updated.status, TripStatus::Full);

    Ok(())
}

/// Tests a trip cannot be edited by anyone but its driver.
///
/// Expected: Err(AppError::Forbidden)
#[tokio::test]
async fn update_by_other_driver_is_forbidden() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (_driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let other = factory::user::create_driver(db).await?;

    let result = TripService::new(db)
        .update(other.id, trip.id, seats_only(2))
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));

    Ok(())
}

/// Tests the start and complete transitions and their passenger notifications.
///
/// Expected: completing a scheduled trip fails, start then complete succeed, and the
/// booked passenger is told about both
#[tokio::test]
async fn start_then_complete_notifies_passenger() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, passenger, trip, _booking) = factory::helpers::create_booked_trip(db).await?;
    let service = TripService::new(db);

    let early = service.complete(driver.id, trip.id).await;
    assert!(matches!(early, Err(AppError::BadRequest(_))));

    let started = service.start(driver.id, trip.id).await?;
    assert_eq!(started.status, TripStatus::InProgress);
    let completed = service.complete(driver.id, trip.id).await?;
    assert_eq!(completed.status, TripStatus::Completed);

    let stored = TripRepository::new(db).find_by_id(trip.id).await?.unwrap();
    assert_eq!(stored.status, TripStatus::Completed);

    let (inbox, total) = NotificationRepository::new(db)
        .get_for_user_paginated(passenger.id, false, 0, 10)
        .await?;
    assert_eq!(total, 2);
    assert!(inbox.iter().any(|n| n.kind == "trip_started"));
    assert!(inbox.iter().any(|n| n.kind == "trip_completed"));

    Ok(())
}

/// Tests cancelling a trip with a booking and an open negotiation.
///
/// Expected: trip cancelled by driver, booking cancelled by driver with the reason,
/// the negotiation and its offer expired, and both passengers notified
#[tokio::test]
async fn cancel_cascades_to_bookings_and_negotiations() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, booked, trip, booking) = factory::helpers::create_booked_trip(db).await?;
    let negotiating = factory::user::create_user(db).await?;
    let (chain, _offer) =
        factory::negotiation::NegotiationFactory::new(db, trip.id, negotiating.id, driver.id)
            .build()
            .await?;

    let cancelled = TripService::new(db)
        .cancel(driver.id, trip.id, Some("Car broke down".to_string()))
        .await?;
    assert_eq!(cancelled.status, TripStatus::CancelledByDriver);

    let booking = BookingRepository::new(db)
        .find_by_id(booking.id)
        .await?
        .unwrap();
    assert_eq!(booking.status, BookingStatus::CancelledByDriver);
    assert_eq!(booking.cancellation_reason.as_deref(), Some("Car broke down"));

    let chain = NegotiationRepository::new(db)
        .find_by_id(chain.id)
        .await?
        .unwrap();
    assert_eq!(chain.status, NegotiationStatus::Expired);
    assert!(chain.resolved_at.is_some());
    assert!(chain
        .offers
        .iter()
        .all(|offer| offer.status == OfferStatus::Expired));

    let notifications = NotificationRepository::new(db);
    for passenger_id in [booked.id, negotiating.id] {
        let (inbox, _) = notifications
            .get_for_user_paginated(passenger_id, false, 0, 10)
            .await?;
        assert!(inbox.iter().any(|n| n.kind == "trip_cancelled"));
    }

    Ok(())
}

/// Tests a booking racing a cancellation cannot revive the trip.
///
/// The snapshot is read before the cancel commits, so its seat count still matches
/// the stored row.
///
/// Expected: Err(AppError::Conflict) and the trip stays cancelled with its seats
/// untouched
#[tokio::test]
async fn reserve_after_cancel_conflicts() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let snapshot = Trip::from_entity(trip);

    TripService::new(db)
        .cancel(driver.id, snapshot.id, None)
        .await?;
    let result = reserve_seats(db, &snapshot, 1).await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
    let stored = TripRepository::new(db)
        .find_by_id(snapshot.id)
        .await?
        .unwrap();
    assert_eq!(stored.status, TripStatus::CancelledByDriver);
    assert_eq!(stored.available_seats, snapshot.available_seats);

    Ok(())
}

/// Tests a finished trip cannot be cancelled.
///
/// Expected: Err(AppError::BadRequest)
#[tokio::test]
async fn cancel_completed_trip_fails() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let driver = factory::user::create_driver(db).await?;
    let car = factory::car::create_car(db, driver.id).await?;
    let trip = factory::trip::TripFactory::new(db, driver.id, car.id)
        .status(TripStatus::Completed)
        .build()
        .await?;

    let result = TripService::new(db).cancel(driver.id, trip.id, None).await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));

    Ok(())
}

/// Tests the driver reminds confirmed passengers before departure.
///
/// Expected: one reminder for the booked passenger, none for the cancelled booking,
/// and Forbidden for another driver
#[tokio::test]
async fn remind_notifies_confirmed_passengers() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, passenger, trip, _booking) = factory::helpers::create_booked_trip(db).await?;
    let gone = factory::user::create_user(db).await?;
    factory::booking::BookingFactory::new(db, trip.id, gone.id)
        .status(BookingStatus::CancelledByPassenger)
        .build()
        .await?;
    let other = factory::user::create_driver(db).await?;
    let service = TripService::new(db);

    let foreign = service.remind(other.id, trip.id).await;
    assert!(matches!(foreign, Err(AppError::Forbidden(_))));

    assert_eq!(service.remind(driver.id, trip.id).await?, 1);

    let notifications = NotificationRepository::new(db);
    let (inbox, _) = notifications
        .get_for_user_paginated(passenger.id, false, 0, 10)
        .await?;
    assert!(inbox.iter().any(|n| n.kind == "trip_reminder"));
    let (_, total) = notifications
        .get_for_user_paginated(gone.id, false, 0, 10)
        .await?;
    assert_eq!(total, 0);

    Ok(())
}

/// Tests reminders stop once the trip is under way.
///
/// Expected: Err(AppError::BadRequest)
#[tokio::test]
async fn remind_after_start_fails() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, _passenger, trip, _booking) = factory::helpers::create_booked_trip(db).await?;
    let service = TripService::new(db);
    service.start(driver.id, trip.id).await?;

    let result = service.remind(driver.id, trip.id).await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));

    Ok(())
}
