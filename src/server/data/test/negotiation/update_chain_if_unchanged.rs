use super::*;

fn resolution(status: NegotiationStatus) -> ChainUpdate {
    ChainUpdate {
        status,
        head_offer_id: None,
        expires_at: None,
        final_price: None,
        booking_id: None,
        resolved_at: Some(Utc::now()),
    }
}

/// Tests a header write lands while status and head still match.
///
/// Expected: Ok(true) and the chain stored as accepted with its final price
#[tokio::test]
async fn writes_when_version_matches() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let passenger = factory::user::create_user(db).await?;
    let (chain, _) =
        factory::negotiation::NegotiationFactory::new(db, trip.id, passenger.id, driver.id)
            .build()
            .await?;

    let repo = NegotiationRepository::new(db);
    let written = repo
        .update_chain_if_unchanged(
            ChainVersion::of_entity(&chain),
            ChainUpdate {
                final_price: Some(Decimal::new(80_000, 0)),
                ..resolution(NegotiationStatus::Accepted)
            },
        )
        .await?;

    assert!(written);
    let stored = repo.find_by_id(chain.id).await?.unwrap();
    assert_eq!(stored.status, NegotiationStatus::Accepted);
    assert_eq!(stored.final_price, Some(Decimal::new(80_000, 0)));
    assert!(stored.resolved_at.is_some());

    Ok(())
}

/// Tests a transition decided on a stale snapshot cannot overwrite a resolved chain.
///
/// Two requests read the same open chain; the accept lands first, then the cancel
/// tries to write with the snapshot it read.
///
/// Expected: Ok(false) for the second write and the chain stays accepted
#[tokio::test]
async fn stale_snapshot_does_not_overwrite() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let passenger = factory::user::create_user(db).await?;
    let (chain, _) =
        factory::negotiation::NegotiationFactory::new(db, trip.id, passenger.id, driver.id)
            .build()
            .await?;
    let snapshot = ChainVersion::of_entity(&chain);

    let repo = NegotiationRepository::new(db);
    assert!(
        repo.update_chain_if_unchanged(snapshot, resolution(NegotiationStatus::Accepted))
            .await?
    );
    let overwritten = repo
        .update_chain_if_unchanged(snapshot, resolution(NegotiationStatus::Cancelled))
        .await?;

    assert!(!overwritten);
    let stored = repo.find_by_id(chain.id).await?.unwrap();
    assert_eq!(stored.status, NegotiationStatus::Accepted);

    Ok(())
}

/// Tests a counter that moved the head blocks writes based on the old head.
///
/// Expected: Ok(false) when the expected head offer is no longer the chain head
#[tokio::test]
async fn moved_head_blocks_write() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let passenger = factory::user::create_user(db).await?;
    let (chain, offer) =
        factory::negotiation::NegotiationFactory::new(db, trip.id, passenger.id, driver.id)
            .build()
            .await?;

    let stale = ChainVersion {
        head_offer_id: Some(offer.id + 100),
        ..ChainVersion::of_entity(&chain)
    };

    let repo = NegotiationRepository::new(db);
    let written = repo
        .update_chain_if_unchanged(stale, resolution(NegotiationStatus::Rejected))
        .await?;

    assert!(!written);
    let stored = repo.find_by_id(chain.id).await?.unwrap();
    assert_eq!(stored.status, NegotiationStatus::Open);

    Ok(())
}
