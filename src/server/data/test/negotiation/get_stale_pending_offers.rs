use super::*;

/// Tests only pending offers past their expiry are stale.
///
/// Expected: Ok with the expired offer only
#[tokio::test]
async fn returns_expired_pending_offers() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let late = factory::user::create_user(db).await?;
    let fresh = factory::user::create_user(db).await?;

    let (_, stale_offer) =
        factory::negotiation::NegotiationFactory::new(db, trip.id, late.id, driver.id)
            .expires_at(Utc::now() - Duration::minutes(1))
            .build()
            .await?;
    factory::negotiation::NegotiationFactory::new(db, trip.id, fresh.id, driver.id)
        .build()
        .await?;

    let repo = NegotiationRepository::new(db);
    let stale = repo.get_stale_pending_offers(Utc::now()).await?;

    assert_eq!(stale.len(), 1);
    assert_eq!(stale[0].id, stale_offer.id);

    Ok(())
}

/// Tests closing a chain's pending offers removes them from the stale set.
///
/// Expected: Ok(1) closed, then no stale offers left
#[tokio::test]
async fn closed_offers_are_no_longer_stale() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let passenger = factory::user::create_user(db).await?;
    let (chain, _) =
        factory::negotiation::NegotiationFactory::new(db, trip.id, passenger.id, driver.id)
            .expires_at(Utc::now() - Duration::minutes(1))
            .build()
            .await?;

    let repo = NegotiationRepository::new(db);
    let closed = repo
        .close_pending_offers(chain.id, OfferStatus::Expired)
        .await?;

    assert_eq!(closed, 1);
    assert!(repo.get_stale_pending_offers(Utc::now()).await?.is_empty());

    Ok(())
}
