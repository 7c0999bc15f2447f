use entity::sea_orm_active_enums::{BookingStatus, NegotiationStatus, TripStatus, UserStatus};

use crate::server::{
    data::{
        booking::BookingRepository, negotiation::NegotiationRepository, trip::TripRepository,
        user::UserRepository,
    },
    error::AppError,
    model::user::User,
    service::user::UserService,
};
use test_utils::{builder::TestBuilder, factory};

/// Tests a passenger closing their account releases what they hold.
///
/// Expected: the booking cancelled by the passenger with the reason, the open chain
/// withdrawn, the seat returned and the account deactivated
#[tokio::test]
async fn deactivating_passenger_cancels_bookings_and_offers() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (_driver, passenger, trip, booking) = factory::helpers::create_booked_trip(db).await?;
    let (other_driver, _car, other_trip) =
        factory::helpers::create_trip_with_dependencies(db).await?;
    let (chain, _offer) = factory::negotiation::NegotiationFactory::new(
        db,
        other_trip.id,
        passenger.id,
        other_driver.id,
    )
    .build()
    .await?;

    let report = UserService::new(db)
        .deactivate(
            &User::from_entity(passenger.clone()),
            Some("Moving abroad".to_string()),
        )
        .await?;

    assert_eq!(report.trips_cancelled, 0);
    assert_eq!(report.bookings_cancelled, 1);
    assert_eq!(report.negotiations_cancelled, 1);

    let booking = BookingRepository::new(db)
        .find_by_id(booking.id)
        .await?
        .unwrap();
    assert_eq!(booking.status, BookingStatus::CancelledByPassenger);
    assert_eq!(booking.cancellation_reason.as_deref(), Some("Moving abroad"));

    let trip = TripRepository::new(db).find_by_id(trip.id).await?.unwrap();
    assert_eq!(trip.available_seats, 3);

    let chain = NegotiationRepository::new(db)
        .find_by_id(chain.id)
        .await?
        .unwrap();
    assert_eq!(chain.status, NegotiationStatus::Cancelled);

    let user = UserRepository::new(db).find_by_id(passenger.id).await?.unwrap();
    assert_eq!(user.status, UserStatus::Deactivated);

    Ok(())
}

/// Tests a driver closing their account cancels the trips they still have to drive.
///
/// Expected: the scheduled trip cancelled by the driver, its booking cancelled, the
/// completed trip untouched
#[tokio::test]
async fn deactivating_driver_cancels_upcoming_trips() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, _passenger, trip, booking) = factory::helpers::create_booked_trip(db).await?;
    let car = factory::car::CarFactory::new(db, driver.id)
        .is_default(false)
        .build()
        .await?;
    let finished = factory::trip::TripFactory::new(db, driver.id, car.id)
        .status(TripStatus::Completed)
        .build()
        .await?;

    let report = UserService::new(db)
        .deactivate(&User::from_entity(driver.clone()), None)
        .await?;

    assert_eq!(report.trips_cancelled, 1);
    let repo = TripRepository::new(db);
    assert_eq!(
        repo.find_by_id(trip.id).await?.unwrap().status,
        TripStatus::CancelledByDriver
    );
    assert_eq!(
        repo.find_by_id(finished.id).await?.unwrap().status,
        TripStatus::Completed
    );
    let booking = BookingRepository::new(db)
        .find_by_id(booking.id)
        .await?
        .unwrap();
    assert_eq!(booking.status, BookingStatus::CancelledByDriver);

    Ok(())
}
