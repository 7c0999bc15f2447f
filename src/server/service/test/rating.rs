use chrono::{Duration, Utc};
use entity::sea_orm_active_enums::{BookingStatus, RatingType, TripStatus};
use rust_decimal::Decimal;
use sea_orm::{sea_query::Expr, ColumnTrait, EntityTrait, QueryFilter};

use crate::server::{
    data::user::UserRepository,
    error::AppError,
    model::rating::{CreateRatingParams, RatingEligibility, UpdateRatingParams},
    service::rating::RatingService,
};
use test_utils::{builder::TestBuilder, factory};

fn rating(rater_id: i32, trip_id: i32, rated_user_id: i32, score: i32) -> CreateRatingParams {
    CreateRatingParams {
        rater_id,
        trip_id,
        rated_user_id,
        score,
        review: None,
        punctuality: None,
        cleanliness: None,
        communication: None,
        driving_quality: None,
    }
}

/// Tests a passenger rates the driver after a completed trip.
///
/// Expected: Ok and the driver's cached average and count updated
#[tokio::test]
async fn passenger_rates_driver_after_completion() -> Result<(), AppError> {
    let test = TestBuilder::new().with_all_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let driver = factory::user::create_driver(db).await?;
    let car = factory::car::create_car(db, driver.id).await?;
    let trip = factory::trip::TripFactory::new(db, driver.id, car.id)
        .status(TripStatus::Completed)
        .build()
        .await?;
    let first = factory::user::create_user(db).await?;
    let second = factory::user::create_user(db).await?;
    factory::booking::create_booking(db, trip.id, first.id).await?;
    factory::booking::create_booking(db, trip.id, second.id).await?;

    let service = RatingService::new(db);
    service.create(rating(first.id, trip.id, driver.id, 5)).await?;
    service.create(rating(second.id, trip.id, driver.id, 4)).await?;

    let driver = UserRepository::new(db).find_by_id(driver.id).await?.unwrap();
    assert_eq!(driver.rating_count, 2);
    assert_eq!(driver.rating_average, Decimal::new(450, 2));

    let summary = service.summary(driver.id).await?;
    assert_eq!(summary.count, 2);
    assert_eq!(summary.distribution, [0, 0, 0, 1, 1]);

    Ok(())
}

/// Tests ratings are refused before the trip is over.
///
/// Expected: Err(AppError::BadRequest)
#[tokio::test]
async fn scheduled_trip_cannot_be_rated() -> Result<(), AppError> {
    let test = TestBuilder::new().with_all_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, passenger, trip, _booking) = factory::helpers::create_booked_trip(db).await?;

    let result = RatingService::new(db)
        .create(rating(passenger.id, trip.id, driver.id, 5))
        .await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));

    Ok(())
}

/// Tests a user without a booking on the trip cannot rate its driver.
///
/// Expected: Err(AppError::Forbidden)
#[tokio::test]
async fn stranger_cannot_rate_driver() -> Result<(), AppError> {
    let test = TestBuilder::new().with_all_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let driver = factory::user::create_driver(db).await?;
    let car = factory::car::create_car(db, driver.id).await?;
    let trip = factory::trip::TripFactory::new(db, driver.id, car.id)
        .status(TripStatus::Completed)
        .build()
        .await?;
    let stranger = factory::user::create_user(db).await?;

    let result = RatingService::new(db)
        .create(rating(stranger.id, trip.id, driver.id, 1))
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));

    Ok(())
}

/// Tests the same pair can rate each other only once per trip.
///
/// Expected: Ok for the driver rating the passenger, Err(AppError::Conflict) on repeat
#[tokio::test]
async fn duplicate_rating_conflicts() -> Result<(), AppError> {
    let test = TestBuilder::new().with_all_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let driver = factory::user::create_driver(db).await?;
    let car = factory::car::create_car(db, driver.id).await?;
    let trip = factory::trip::TripFactory::new(db, driver.id, car.id)
        .status(TripStatus::Completed)
        .build()
        .await?;
    let passenger = factory::user::create_user(db).await?;
    factory::booking::create_booking(db, trip.id, passenger.id).await?;

    let service = RatingService::new(db);
    service.create(rating(driver.id, trip.id, passenger.id, 4)).await?;
    let result = service.create(rating(driver.id, trip.id, passenger.id, 2)).await;

    assert!(matches!(result, Err(AppError::Conflict(_))));

    Ok(())
}

/// Tests deleting a rating recomputes the aggregate.
///
/// Expected: Ok with the rated user's count back to zero
#[tokio::test]
async fn deleting_rating_resets_aggregate() -> Result<(), AppError> {
    let test = TestBuilder::new().with_all_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let driver = factory::user::create_driver(db).await?;
    let car = factory::car::create_car(db, driver.id).await?;
    let trip = factory::trip::TripFactory::new(db, driver.id, car.id)
        .status(TripStatus::Completed)
        .build()
        .await?;
    let passenger = factory::user::create_user(db).await?;
    factory::booking::create_booking(db, trip.id, passenger.id).await?;

    let service = RatingService::new(db);
    let created = service.create(rating(passenger.id, trip.id, driver.id, 3)).await?;
    service.delete(passenger.id, created.id).await?;

    let driver = UserRepository::new(db).find_by_id(driver.id).await?.unwrap();
    assert_eq!(driver.rating_count, 0);

    Ok(())
}

fn new_score(score: i32) -> UpdateRatingParams {
    UpdateRatingParams {
        score,
        review: Some("Changed my mind".to_string()),
        punctuality: Some(score),
        cleanliness: None,
        communication: None,
        driving_quality: None,
    }
}

/// Tests the rater edits a fresh rating and the aggregate follows.
///
/// Expected: Ok with the new score and review, and the driver's average moved from 2 to 5
#[tokio::test]
async fn rater_edits_rating_within_window() -> Result<(), AppError> {
    let test = TestBuilder::new().with_all_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let driver = factory::user::create_driver(db).await?;
    let car = factory::car::create_car(db, driver.id).await?;
    let trip = factory::trip::TripFactory::new(db, driver.id, car.id)
        .status(TripStatus::Completed)
        .build()
        .await?;
    let passenger = factory::user::create_user(db).await?;
    factory::booking::create_booking(db, trip.id, passenger.id).await?;

    let service = RatingService::new(db);
    let created = service.create(rating(passenger.id, trip.id, driver.id, 2)).await?;
    let updated = service
        .update(passenger.id, created.id, new_score(5))
        .await?;

    assert_eq!(updated.score, 5);
    assert_eq!(updated.review.as_deref(), Some("Changed my mind"));
    let driver = UserRepository::new(db).find_by_id(driver.id).await?.unwrap();
    assert_eq!(driver.rating_average, Decimal::new(500, 2));
    assert_eq!(driver.rating_count, 1);

    Ok(())
}

/// Tests edits are refused to other users, once the window closed, and out of range.
///
/// Expected: Forbidden for the driver, BadRequest for a score of 6, BadRequest once the
/// rating is 25 hours old, and the delete refused the same way
#[tokio::test]
async fn rating_edits_are_guarded() -> Result<(), AppError> {
    let test = TestBuilder::new().with_all_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let driver = factory::user::create_driver(db).await?;
    let car = factory::car::create_car(db, driver.id).await?;
    let trip = factory::trip::TripFactory::new(db, driver.id, car.id)
        .status(TripStatus::Completed)
        .build()
        .await?;
    let passenger = factory::user::create_user(db).await?;
    factory::booking::create_booking(db, trip.id, passenger.id).await?;

    let service = RatingService::new(db);
    let created = service.create(rating(passenger.id, trip.id, driver.id, 4)).await?;

    let foreign = service.update(driver.id, created.id, new_score(1)).await;
    assert!(matches!(foreign, Err(AppError::Forbidden(_))));

    let out_of_range = service.update(passenger.id, created.id, new_score(6)).await;
    assert!(matches!(out_of_range, Err(AppError::BadRequest(_))));

    entity::prelude::Rating::update_many()
        .filter(entity::rating::Column::Id.eq(created.id))
        .col_expr(
            entity::rating::Column::CreatedAt,
            Expr::value(Utc::now() - Duration::hours(25)),
        )
        .exec(db)
        .await?;

    let late_edit = service.update(passenger.id, created.id, new_score(5)).await;
    assert!(matches!(late_edit, Err(AppError::BadRequest(_))));
    let late_delete = service.delete(passenger.id, created.id).await;
    assert!(matches!(late_delete, Err(AppError::BadRequest(_))));

    Ok(())
}

/// Tests eligibility from both sides of a booking and for an outsider.
///
/// Expected: the passenger may rate the driver until they do, the driver may rate the
/// passenger, an outsider is told they are not involved
#[tokio::test]
async fn can_rate_reports_each_side() -> Result<(), AppError> {
    let test = TestBuilder::new().with_all_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let driver = factory::user::create_driver(db).await?;
    let car = factory::car::create_car(db, driver.id).await?;
    let trip = factory::trip::TripFactory::new(db, driver.id, car.id)
        .status(TripStatus::Completed)
        .build()
        .await?;
    let passenger = factory::user::create_user(db).await?;
    let outsider = factory::user::create_user(db).await?;
    let booking = factory::booking::create_booking(db, trip.id, passenger.id).await?;

    let service = RatingService::new(db);

    let RatingEligibility::Eligible { rateable_users, .. } =
        service.can_rate(passenger.id, booking.id).await?
    else {
        panic!("passenger should be eligible");
    };
    assert_eq!(rateable_users.len(), 1);
    assert_eq!(rateable_users[0].user_id, driver.id);
    assert_eq!(rateable_users[0].rating_type, RatingType::PassengerToDriver);
    assert!(!rateable_users[0].already_rated);

    service.create(rating(passenger.id, trip.id, driver.id, 5)).await?;
    let RatingEligibility::Eligible { rateable_users, .. } =
        service.can_rate(passenger.id, booking.id).await?
    else {
        panic!("passenger should stay eligible");
    };
    assert!(rateable_users[0].already_rated);

    let RatingEligibility::Eligible { rateable_users, .. } =
        service.can_rate(driver.id, booking.id).await?
    else {
        panic!("driver should be eligible");
    };
    assert_eq!(rateable_users[0].user_id, passenger.id);
    assert_eq!(rateable_users[0].rating_type, RatingType::DriverToPassenger);

    assert_eq!(
        service.can_rate(outsider.id, booking.id).await?,
        RatingEligibility::Ineligible("Not involved in this booking")
    );

    Ok(())
}

/// Tests a booking cancelled by its passenger and an unfinished trip are not rateable.
///
/// Expected: Ineligible with the booking status reason, then with the trip reason
#[tokio::test]
async fn can_rate_rejects_unfinished_or_cancelled() -> Result<(), AppError> {
    let test = TestBuilder::new().with_all_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let driver = factory::user::create_driver(db).await?;
    let car = factory::car::create_car(db, driver.id).await?;
    let completed = factory::trip::TripFactory::new(db, driver.id, car.id)
        .status(TripStatus::Completed)
        .build()
        .await?;
    let passenger = factory::user::create_user(db).await?;
    let cancelled = factory::booking::BookingFactory::new(db, completed.id, passenger.id)
        .status(BookingStatus::CancelledByPassenger)
        .build()
        .await?;

    let (_driver, booked, _trip, upcoming) = factory::helpers::create_booked_trip(db).await?;

    let service = RatingService::new(db);
    assert_eq!(
        service.can_rate(passenger.id, cancelled.id).await?,
        RatingEligibility::Ineligible("Invalid booking status")
    );
    assert_eq!(
        service.can_rate(booked.id, upcoming.id).await?,
        RatingEligibility::Ineligible("Trip not completed")
    );

    Ok(())
}

/// Tests the pending list shrinks as the driver rates passengers.
///
/// Expected: the driver sees both passengers, then only the unrated one; a passenger
/// sees the driver; a stranger sees nobody
#[tokio::test]
async fn pending_ratings_exclude_rated_users() -> Result<(), AppError> {
    let test = TestBuilder::new().with_all_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let driver = factory::user::create_driver(db).await?;
    let car = factory::car::create_car(db, driver.id).await?;
    let trip = factory::trip::TripFactory::new(db, driver.id, car.id)
        .status(TripStatus::Completed)
        .build()
        .await?;
    let first = factory::user::create_user(db).await?;
    let second = factory::user::create_user(db).await?;
    let stranger = factory::user::create_user(db).await?;
    factory::booking::create_booking(db, trip.id, first.id).await?;
    factory::booking::create_booking(db, trip.id, second.id).await?;

    let service = RatingService::new(db);
    let pending = service.pending_for_trip(driver.id, trip.id).await?;
    assert_eq!(pending.len(), 2);

    service.create(rating(driver.id, trip.id, first.id, 5)).await?;
    let pending = service.pending_for_trip(driver.id, trip.id).await?;
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].user_id, second.id);

    let pending = service.pending_for_trip(first.id, trip.id).await?;
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].user_id, driver.id);

    assert!(service.pending_for_trip(stranger.id, trip.id).await?.is_empty());

    Ok(())
}
