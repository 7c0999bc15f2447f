use super::*;

/// Tests search only returns scheduled trips in the future.
///
/// Full, cancelled and already departed trips are filtered out even when the route
/// matches.
///
/// Expected: Ok with only the bookable trip
#[tokio::test]
async fn returns_only_bookable_trips() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let driver = factory::user::create_driver(db).await?;
    let car = factory::car::create_car(db, driver.id).await?;

    let bookable = factory::trip::create_trip(db, driver.id, car.id).await?;
    factory::trip::TripFactory::new(db, driver.id, car.id)
        .status(TripStatus::Full)
        .available_seats(0)
        .build()
        .await?;
    factory::trip::TripFactory::new(db, driver.id, car.id)
        .status(TripStatus::CancelledByDriver)
        .build()
        .await?;
    factory::trip::TripFactory::new(db, driver.id, car.id)
        .departure(Utc::now() - Duration::hours(1))
        .build()
        .await?;

    let repo = TripRepository::new(db);
    let (trips, total) = repo
        .search(&search_params(None, None, 1), Utc::now())
        .await?;

    assert_eq!(total, 1);
    assert_eq!(trips.len(), 1);
    assert_eq!(trips[0].id, bookable.id);

    Ok(())
}

/// Tests location filters are case-insensitive substring matches.
///
/// Expected: Ok with the Tashkent to Samarkand trip only
#[tokio::test]
async fn matches_locations_case_insensitively() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let driver = factory::user::create_driver(db).await?;
    let car = factory::car::create_car(db, driver.id).await?;

    let samarkand = factory::trip::TripFactory::new(db, driver.id, car.id)
        .route("Tashkent", "Samarkand")
        .build()
        .await?;
    factory::trip::TripFactory::new(db, driver.id, car.id)
        .route("Tashkent", "Bukhara")
        .build()
        .await?;

    let repo = TripRepository::new(db);
    let (trips, total) = repo
        .search(&search_params(Some("tash"), Some("SAMAR"), 1), Utc::now())
        .await?;

    assert_eq!(total, 1);
    assert_eq!(trips[0].id, samarkand.id);

    Ok(())
}

/// Tests trips without enough free seats are excluded.
///
/// Expected: Ok with only the trip offering three seats
#[tokio::test]
async fn requires_enough_free_seats() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let driver = factory::user::create_driver(db).await?;
    let car = factory::car::create_car(db, driver.id).await?;

    let roomy = factory::trip::TripFactory::new(db, driver.id, car.id)
        .seats(3)
        .build()
        .await?;
    factory::trip::TripFactory::new(db, driver.id, car.id)
        .seats(3)
        .available_seats(1)
        .build()
        .await?;

    let repo = TripRepository::new(db);
    let (trips, _) = repo
        .search(&search_params(None, None, 2), Utc::now())
        .await?;

    assert_eq!(trips.len(), 1);
    assert_eq!(trips[0].id, roomy.id);

    Ok(())
}

/// Tests results are ordered by departure, soonest first.
///
/// Expected: Ok with trips in ascending departure order
#[tokio::test]
async fn orders_by_departure() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let driver = factory::user::create_driver(db).await?;
    let car = factory::car::create_car(db, driver.id).await?;

    let later = factory::trip::TripFactory::new(db, driver.id, car.id)
        .departure(Utc::now() + Duration::days(3))
        .build()
        .await?;
    let sooner = factory::trip::TripFactory::new(db, driver.id, car.id)
        .departure(Utc::now() + Duration::hours(5))
        .build()
        .await?;

    let repo = TripRepository::new(db);
    let (trips, _) = repo
        .search(&search_params(None, None, 1), Utc::now())
        .await?;

    let ids: Vec<i32> = trips.iter().map(|trip| trip.id).collect();
    assert_eq!(ids, vec![sooner.id, later.id]);

    Ok(())
}
