use entity::sea_orm_active_enums::{BookingStatus, TripStatus};
use rust_decimal::Decimal;

use crate::server::{
    data::{message::MessageRepository, trip::TripRepository},
    error::AppError,
    model::booking::CreateBookingParams,
    service::booking::BookingService,
};
use test_utils::{builder::TestBuilder, factory};

fn booking(passenger_id: i32, trip_id: i32, seats_booked: i32) -> CreateBookingParams {
    CreateBookingParams {
        passenger_id,
        trip_id,
        seats_booked,
        pickup_location: None,
        dropoff_location: None,
        special_requests: None,
    }
}

/// Tests booking the last seats marks the trip full and prices the booking per seat.
///
/// Expected: Ok with total price of two seats, trip full with zero seats left and the
/// passenger added to the trip conversation
#[tokio::test]
async fn booking_last_seats_fills_trip() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let driver = factory::user::create_driver(db).await?;
    let car = factory::car::create_car(db, driver.id).await?;
    let trip = factory::trip::TripFactory::new(db, driver.id, car.id)
        .seats(2)
        .price(Decimal::new(50_000, 0))
        .build()
        .await?;
    let passenger = factory::user::create_user(db).await?;

    let created = BookingService::new(db)
        .create(booking(passenger.id, trip.id, 2))
        .await?;

    assert_eq!(created.status, BookingStatus::Confirmed);
    assert_eq!(created.total_price, Decimal::new(100_000, 0));

    let trip = TripRepository::new(db).find_by_id(trip.id).await?.unwrap();
    assert_eq!(trip.available_seats, 0);
    assert_eq!(trip.status, TripStatus::Full);

    let thread = MessageRepository::new(db)
        .find_thread_by_trip(trip.id)
        .await?
        .expect("trip thread created");
    assert!(MessageRepository::new(db)
        .is_participant(thread.id, passenger.id)
        .await?);

    Ok(())
}

/// Tests a request for more seats than remain is refused without side effects.
///
/// Expected: Err(AppError::BadRequest) and the seat count unchanged
#[tokio::test]
async fn overbooking_is_rejected() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let driver = factory::user::create_driver(db).await?;
    let car = factory::car::create_car(db, driver.id).await?;
    let trip = factory::trip::TripFactory::new(db, driver.id, car.id)
        .seats(1)
        .build()
        .await?;
    let passenger = factory::user::create_user(db).await?;

    let result = BookingService::new(db)
        .create(booking(passenger.id, trip.id, 2))
        .await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));
    let trip = TripRepository::new(db).find_by_id(trip.id).await?.unwrap();
    assert_eq!(trip.available_seats, 1);

    Ok(())
}

/// Tests a driver cannot book a seat on their own trip.
///
/// Expected: Err(AppError::BadRequest)
#[tokio::test]
async fn driver_cannot_book_own_trip() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;

    let result = BookingService::new(db)
        .create(booking(driver.id, trip.id, 1))
        .await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));

    Ok(())
}

/// Tests a passenger can hold only one confirmed booking per trip.
///
/// Expected: Err(AppError::Conflict) on the second booking
#[tokio::test]
async fn duplicate_booking_conflicts() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (_driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let passenger = factory::user::create_user(db).await?;

    let service = BookingService::new(db);
    service.create(booking(passenger.id, trip.id, 1)).await?;
    let result = service.create(booking(passenger.id, trip.id, 1)).await;

    assert!(matches!(result, Err(AppError::Conflict(_))));

    Ok(())
}

/// Tests cancelling a booking on a full trip returns the seats and reopens it.
///
/// Expected: Ok with the booking cancelled by the passenger and the trip scheduled again
#[tokio::test]
async fn cancelling_reopens_full_trip() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let driver = factory::user::create_driver(db).await?;
    let car = factory::car::create_car(db, driver.id).await?;
    let trip = factory::trip::TripFactory::new(db, driver.id, car.id)
        .seats(1)
        .build()
        .await?;
    let passenger = factory::user::create_user(db).await?;

    let service = BookingService::new(db);
    let created = service.create(booking(passenger.id, trip.id, 1)).await?;
    let cancelled = service
        .cancel(passenger.id, created.id, Some("Plans changed".to_string()))
        .await?;

    assert_eq!(cancelled.status, BookingStatus::CancelledByPassenger);
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("Plans changed"));
    let trip = TripRepository::new(db).find_by_id(trip.id).await?.unwrap();
    assert_eq!(trip.available_seats, 1);
    assert_eq!(trip.status, TripStatus::Scheduled);

    Ok(())
}

/// Tests only the passenger may cancel their booking.
///
/// Expected: Err(AppError::Forbidden) for the driver
#[tokio::test]
async fn only_passenger_cancels() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, _passenger, _trip, booking) = factory::helpers::create_booked_trip(db).await?;

    let result = BookingService::new(db)
        .cancel(driver.id, booking.id, None)
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));

    Ok(())
}
