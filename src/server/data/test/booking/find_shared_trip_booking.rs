use super::*;

/// Tests a booking the driver cancelled still links the passenger to the trip.
///
/// Expected: Ok(Some) with the driver-cancelled booking
#[tokio::test]
async fn counts_driver_cancellation_as_shared() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (_driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let passenger = factory::user::create_user(db).await?;
    let booking = factory::booking::BookingFactory::new(db, trip.id, passenger.id)
        .status(BookingStatus::CancelledByDriver)
        .build()
        .await?;

    let repo = BookingRepository::new(db);
    let result = repo.find_shared_trip_booking(trip.id, passenger.id).await?;

    assert_eq!(result.map(|booking| booking.id), Some(booking.id));

    Ok(())
}

/// Tests a passenger who cancelled did not travel on the trip.
///
/// Expected: Ok(None)
#[tokio::test]
async fn ignores_passenger_cancellation() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (_driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let passenger = factory::user::create_user(db).await?;
    factory::booking::BookingFactory::new(db, trip.id, passenger.id)
        .status(BookingStatus::CancelledByPassenger)
        .build()
        .await?;

    let repo = BookingRepository::new(db);
    let result = repo.find_shared_trip_booking(trip.id, passenger.id).await?;

    assert!(result.is_none());

    Ok(())
}
