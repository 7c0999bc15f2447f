use super::*;

/// Tests a pending offer takes the response.
///
/// Expected: Ok(true) with status, response time and auto-accept flag stored
#[tokio::test]
async fn answers_pending_offer() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let passenger = factory::user::create_user(db).await?;
    let (chain, offer) =
        factory::negotiation::NegotiationFactory::new(db, trip.id, passenger.id, driver.id)
            .build()
            .await?;

    let repo = NegotiationRepository::new(db);
    let answered = repo
        .respond_to_offer(
            offer.id,
            OfferStatus::Accepted,
            Some("Deal".to_string()),
            true,
            Utc::now(),
        )
        .await?;

    assert!(answered);
    let stored = repo.find_by_id(chain.id).await?.unwrap();
    let head = stored.head().unwrap();
    assert_eq!(head.status, OfferStatus::Accepted);
    assert_eq!(head.response_message.as_deref(), Some("Deal"));
    assert!(head.auto_accepted);
    assert!(head.responded_at.is_some());

    Ok(())
}

/// Tests an offer answered once cannot be answered again.
///
/// Expected: Ok(false) on the second response and the first status kept
#[tokio::test]
async fn answered_offer_is_not_overwritten() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let passenger = factory::user::create_user(db).await?;
    let (chain, offer) =
        factory::negotiation::NegotiationFactory::new(db, trip.id, passenger.id, driver.id)
            .build()
            .await?;

    let repo = NegotiationRepository::new(db);
    assert!(
        repo.respond_to_offer(offer.id, OfferStatus::Rejected, None, false, Utc::now())
            .await?
    );
    let second = repo
        .respond_to_offer(offer.id, OfferStatus::Accepted, None, false, Utc::now())
        .await?;

    assert!(!second);
    let stored = repo.find_by_id(chain.id).await?.unwrap();
    assert_eq!(stored.head().unwrap().status, OfferStatus::Rejected);

    Ok(())
}
