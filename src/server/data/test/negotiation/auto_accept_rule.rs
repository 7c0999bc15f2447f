use super::*;

/// Tests a driver without a stored rule has none.
///
/// Expected: Ok(None)
#[tokio::test]
async fn missing_rule_is_none() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let driver = factory::user::create_driver(db).await?;

    let repo = NegotiationRepository::new(db);
    assert!(repo.get_auto_accept_rule(driver.id).await?.is_none());

    Ok(())
}

/// Tests saving twice replaces the first rule instead of adding a second.
///
/// Expected: Ok with the latest values returned on read
#[tokio::test]
async fn upsert_replaces_existing_rule() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let driver = factory::user::create_driver(db).await?;
    let repo = NegotiationRepository::new(db);

    repo.upsert_auto_accept_rule(
        driver.id,
        AutoAcceptRule {
            enabled: true,
            min_price_percentage: 90,
            max_discount_amount: None,
        },
    )
    .await?;
    let updated = AutoAcceptRule {
        enabled: false,
        min_price_percentage: 75,
        max_discount_amount: Some(Decimal::new(20_000, 0)),
    };
    repo.upsert_auto_accept_rule(driver.id, updated).await?;

    let stored = repo.get_auto_accept_rule(driver.id).await?;
    assert_eq!(stored, Some(updated));

    Ok(())
}
