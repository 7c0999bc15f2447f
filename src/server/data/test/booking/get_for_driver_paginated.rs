use super::*;

/// Tests incoming bookings include every trip of the driver and nothing else.
///
/// Expected: Ok with the two bookings on the driver's trips
#[tokio::test]
async fn returns_bookings_on_driver_trips() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, car, first_trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let second_trip = factory::trip::create_trip(db, driver.id, car.id).await?;
    let (_other_driver, _other_car, other_trip) =
        factory::helpers::create_trip_with_dependencies(db).await?;

    let passenger = factory::user::create_user(db).await?;
    factory::booking::create_booking(db, first_trip.id, passenger.id).await?;
    factory::booking::create_booking(db, second_trip.id, passenger.id).await?;
    factory::booking::create_booking(db, other_trip.id, passenger.id).await?;

    let repo = BookingRepository::new(db);
    let (bookings, total) = repo.get_for_driver_paginated(driver.id, 0, 10).await?;

    assert_eq!(total, 2);
    assert!(bookings
        .iter()
        .all(|booking| booking.trip_id == first_trip.id || booking.trip_id == second_trip.id));

    Ok(())
}

/// Tests pagination splits the driver's bookings into pages.
///
/// Expected: Ok with one booking per page and the full total on each page
#[tokio::test]
async fn paginates_results() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    for _ in 0..3 {
        let passenger = factory::user::create_user(db).await?;
        factory::booking::create_booking(db, trip.id, passenger.id).await?;
    }

    let repo = BookingRepository::new(db);
    let (first_page, total) = repo.get_for_driver_paginated(driver.id, 0, 1).await?;
    let (last_page, _) = repo.get_for_driver_paginated(driver.id, 2, 1).await?;

    assert_eq!(total, 3);
    assert_eq!(first_page.len(), 1);
    assert_eq!(last_page.len(), 1);
    assert_ne!(first_page[0].id, last_page[0].id);

    Ok(())
}
