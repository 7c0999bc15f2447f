use entity::sea_orm_active_enums::{CarVerificationStatus, ComfortLevel, TripStatus};

use crate::server::{
    data::car::CarRepository, error::AppError, model::car::CreateCarParams,
    service::car::CarService,
};
use test_utils::{builder::TestBuilder, factory};

fn car(driver_id: i32, license_plate: &str, seats_count: i32) -> CreateCarParams {
    CreateCarParams {
        driver_id,
        make: "Toyota".to_string(),
        model: "Camry".to_string(),
        year: Some(2018),
        color: Some("white".to_string()),
        license_plate: license_plate.to_string(),
        seats_count,
        comfort_level: ComfortLevel::Comfort,
    }
}

/// Tests the first registered car becomes the default and the second does not.
///
/// Expected: both cars pending verification, only the first marked default
#[tokio::test]
async fn first_car_becomes_default() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let driver = factory::user::create_driver(db).await?;
    let service = CarService::new(db);

    let first = service.create(car(driver.id, "01KG123ABC", 5)).await?;
    let second = service.create(car(driver.id, "01KG456DEF", 5)).await?;

    assert!(first.is_default);
    assert!(!second.is_default);
    assert_eq!(first.verification_status, CarVerificationStatus::PendingVerification);

    Ok(())
}

/// Tests license plates are unique across drivers.
///
/// Expected: Err(AppError::Conflict) for the second registration
#[tokio::test]
async fn duplicate_plate_conflicts() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let driver = factory::user::create_driver(db).await?;
    let other = factory::user::create_driver(db).await?;
    let service = CarService::new(db);

    service.create(car(driver.id, "01KG123ABC", 5)).await?;
    let result = service.create(car(other.id, "01KG123ABC", 5)).await;

    assert!(matches!(result, Err(AppError::Conflict(_))));

    Ok(())
}

/// Tests the declared seat count must hold between two and nine seats.
///
/// Expected: 1 and 10 rejected, 2 and 9 accepted
#[tokio::test]
async fn seat_count_bounds() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let driver = factory::user::create_driver(db).await?;
    let service = CarService::new(db);

    let too_few = service.create(car(driver.id, "01KG000AAA", 1)).await;
    let too_many = service.create(car(driver.id, "01KG000BBB", 10)).await;
    assert!(matches!(too_few, Err(AppError::BadRequest(_))));
    assert!(matches!(too_many, Err(AppError::BadRequest(_))));

    service.create(car(driver.id, "01KG000CCC", 2)).await?;
    service.create(car(driver.id, "01KG000DDD", 9)).await?;

    Ok(())
}

/// Tests a car with a scheduled trip cannot be deleted.
///
/// Expected: Err(AppError::Conflict) and the car still stored
#[tokio::test]
async fn delete_with_scheduled_trip_conflicts() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, car, _trip) = factory::helpers::create_trip_with_dependencies(db).await?;

    let result = CarService::new(db).delete(driver.id, car.id).await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert!(CarRepository::new(db).find_by_id(car.id).await?.is_some());

    Ok(())
}

/// Tests deleting the default car hands the default to the oldest remaining car.
///
/// The only trip on the default car is completed, so it does not block the delete.
///
/// Expected: Ok, the car removed and the next car now default
#[tokio::test]
async fn delete_default_moves_default() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let driver = factory::user::create_driver(db).await?;
    let default = factory::car::create_car(db, driver.id).await?;
    let spare = factory::car::CarFactory::new(db, driver.id)
        .is_default(false)
        .build()
        .await?;
    factory::trip::TripFactory::new(db, driver.id, default.id)
        .status(TripStatus::Completed)
        .build()
        .await?;

    CarService::new(db).delete(driver.id, default.id).await?;

    let repo = CarRepository::new(db);
    assert!(repo.find_by_id(default.id).await?.is_none());
    assert!(repo.find_by_id(spare.id).await?.unwrap().is_default);

    Ok(())
}

/// Tests another driver's car is invisible to the caller.
///
/// Expected: Err(AppError::NotFound)
#[tokio::test]
async fn foreign_car_is_not_found() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let owner = factory::user::create_driver(db).await?;
    let other = factory::user::create_driver(db).await?;
    let car = factory::car::create_car(db, owner.id).await?;

    let result = CarService::new(db).get(other.id, car.id).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));

    Ok(())
}
