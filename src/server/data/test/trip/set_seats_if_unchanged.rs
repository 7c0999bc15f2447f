use super::*;

/// Tests the seat count is written while it still matches the expected value.
///
/// Expected: Ok(true) with the new seat count and status stored
#[tokio::test]
async fn writes_when_count_matches() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (_driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let snapshot = Trip::from_entity(trip);

    let repo = TripRepository::new(db);
    let written = repo
        .set_seats_if_unchanged(&snapshot, snapshot.total_seats_offered, 0, TripStatus::Full)
        .await?;

    assert!(written);
    let stored = repo.find_by_id(snapshot.id).await?.unwrap();
    assert_eq!(stored.available_seats, 0);
    assert_eq!(stored.status, TripStatus::Full);

    Ok(())
}

/// Tests a stale expected count leaves the row untouched.
///
/// Simulates a concurrent booking that changed the count between read and write.
///
/// Expected: Ok(false) and the original seat count preserved
#[tokio::test]
async fn skips_when_count_changed() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (_driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let original = Trip::from_entity(trip);
    let stale = Trip {
        available_seats: original.available_seats - 1,
        ..original.clone()
    };

    let repo = TripRepository::new(db);
    let written = repo
        .set_seats_if_unchanged(&stale, stale.total_seats_offered, 0, TripStatus::Full)
        .await?;

    assert!(!written);
    let stored = repo.find_by_id(original.id).await?.unwrap();
    assert_eq!(stored.available_seats, original.available_seats);
    assert_eq!(stored.status, TripStatus::Scheduled);

    Ok(())
}

/// Tests a status change since the snapshot blocks the seat write.
///
/// The trip was cancelled after the caller read it as scheduled.
///
/// Expected: Ok(false) and the trip stays cancelled with its seats unchanged
#[tokio::test]
async fn skips_when_status_changed() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (_driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let snapshot = Trip::from_entity(trip);

    let repo = TripRepository::new(db);
    assert!(
        repo.set_status_if_unchanged(&snapshot, TripStatus::CancelledByDriver)
            .await?
    );

    let written = repo
        .set_seats_if_unchanged(
            &snapshot,
            snapshot.total_seats_offered,
            snapshot.available_seats - 1,
            TripStatus::Scheduled,
        )
        .await?;

    assert!(!written);
    let stored = repo.find_by_id(snapshot.id).await?.unwrap();
    assert_eq!(stored.status, TripStatus::CancelledByDriver);
    assert_eq!(stored.available_seats, snapshot.available_seats);

    Ok(())
}
