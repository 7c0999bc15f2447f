use super::*;

/// Tests route prices include scheduled and completed trips on the exact route.
///
/// Expected: Ok with the two matching prices, ignoring the cancelled trip and other routes
#[tokio::test]
async fn collects_prices_for_route() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let driver = factory::user::create_driver(db).await?;
    let car = factory::car::create_car(db, driver.id).await?;

    factory::trip::TripFactory::new(db, driver.id, car.id)
        .price(Decimal::new(90_000, 0))
        .build()
        .await?;
    factory::trip::TripFactory::new(db, driver.id, car.id)
        .price(Decimal::new(110_000, 0))
        .status(TripStatus::Completed)
        .build()
        .await?;
    factory::trip::TripFactory::new(db, driver.id, car.id)
        .price(Decimal::new(10_000, 0))
        .status(TripStatus::CancelledByDriver)
        .build()
        .await?;
    factory::trip::TripFactory::new(db, driver.id, car.id)
        .route("Tashkent", "Bukhara")
        .price(Decimal::new(200_000, 0))
        .build()
        .await?;

    let repo = TripRepository::new(db);
    let mut prices = repo.route_prices(" tashkent ", "Samarkand").await?;
    prices.sort();

    assert_eq!(
        prices,
        vec![Decimal::new(90_000, 0), Decimal::new(110_000, 0)]
    );

    Ok(())
}
