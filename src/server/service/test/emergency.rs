use chrono::Utc;
use entity::sea_orm_active_enums::{EmergencyType, TripStatus};
use sea_orm::DatabaseConnection;

use crate::server::{
    data::{notification::NotificationRepository, user::UserRepository},
    error::AppError,
    model::{emergency::CreateEmergencyAlertParams, notification::Notification},
    service::emergency::EmergencyService,
};
use test_utils::{builder::TestBuilder, factory};

fn alert(
    user_id: i32,
    emergency_type: EmergencyType,
    trip_id: Option<i32>,
) -> CreateEmergencyAlertParams {
    CreateEmergencyAlertParams {
        user_id,
        trip_id,
        emergency_type,
        description: Some("Need help".to_string()),
        location_lat: None,
        location_lng: None,
        location_address: Some("Tashkent ring road".to_string()),
    }
}

async fn queued(db: &DatabaseConnection) -> Result<Vec<Notification>, AppError> {
    Ok(NotificationRepository::new(db).get_due(Utc::now()).await?)
}

/// Tests an SOS reaches every emergency contact and every administrator.
///
/// Expected: Ok with `contacts_notified` of 2, one SMS per contact number and one
/// record for the admin
#[tokio::test]
async fn sos_notifies_contacts_and_admins() -> Result<(), AppError> {
    let test = TestBuilder::new().with_all_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let user = factory::user::create_user(db).await?;
    let admin = factory::user::create_admin(db).await?;
    factory::emergency_contact::EmergencyContactFactory::new(db, user.id)
        .phone_number("+998901000001")
        .is_primary(true)
        .build()
        .await?;
    factory::emergency_contact::EmergencyContactFactory::new(db, user.id)
        .phone_number("+998901000002")
        .build()
        .await?;
    let user = UserRepository::new(db).find_by_id(user.id).await?.unwrap();

    let created = EmergencyService::new(db)
        .create_alert(&user, alert(user.id, EmergencyType::Sos, None))
        .await?;

    assert_eq!(created.contacts_notified, 2);
    assert!(!created.is_resolved);

    let records = queued(db).await?;
    let mut contact_numbers: Vec<String> = records
        .iter()
        .filter_map(|record| record.phone_number.clone())
        .collect();
    contact_numbers.sort();
    assert_eq!(contact_numbers, vec!["+998901000001", "+998901000002"]);
    assert!(records
        .iter()
        .all(|record| record.content.contains("Tashkent ring road")));
    assert!(records.iter().any(|record| record.user_id == admin.id));

    Ok(())
}

/// Tests a breakdown alert stays between the user and their contacts.
///
/// Expected: Ok with no record addressed to the admin
#[tokio::test]
async fn breakdown_does_not_escalate() -> Result<(), AppError> {
    let test = TestBuilder::new().with_all_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let user = factory::user::create_user(db).await?;
    let admin = factory::user::create_admin(db).await?;
    factory::emergency_contact::create_emergency_contact(db, user.id).await?;
    let user = UserRepository::new(db).find_by_id(user.id).await?.unwrap();

    EmergencyService::new(db)
        .create_alert(&user, alert(user.id, EmergencyType::Breakdown, None))
        .await?;

    let records = queued(db).await?;
    assert_eq!(records.len(), 1);
    assert!(records.iter().all(|record| record.user_id != admin.id));

    Ok(())
}

/// Tests an alert tied to a trip is refused for users not on it.
///
/// Expected: Err(AppError::Forbidden)
#[tokio::test]
async fn trip_alert_requires_participation() -> Result<(), AppError> {
    let test = TestBuilder::new().with_all_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (_driver, _car, trip) = factory::helpers::create_trip_with_dependencies(db).await?;
    let outsider = factory::user::create_user(db).await?;
    let outsider = UserRepository::new(db).find_by_id(outsider.id).await?.unwrap();

    let result = EmergencyService::new(db)
        .create_alert(&outsider, alert(outsider.id, EmergencyType::Accident, Some(trip.id)))
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));

    Ok(())
}

/// Tests a passenger's alert on an in-progress trip notifies the driver.
///
/// Expected: Ok with a record queued for the driver
#[tokio::test]
async fn trip_alert_notifies_driver() -> Result<(), AppError> {
    let test = TestBuilder::new().with_all_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let driver = factory::user::create_driver(db).await?;
    let car = factory::car::create_car(db, driver.id).await?;
    let trip = factory::trip::TripFactory::new(db, driver.id, car.id)
        .status(TripStatus::InProgress)
        .build()
        .await?;
    let passenger = factory::user::create_user(db).await?;
    factory::booking::create_booking(db, trip.id, passenger.id).await?;
    let passenger = UserRepository::new(db).find_by_id(passenger.id).await?.unwrap();

    EmergencyService::new(db)
        .create_alert(&passenger, alert(passenger.id, EmergencyType::Accident, Some(trip.id)))
        .await?;

    let records = queued(db).await?;
    assert!(records.iter().any(|record| record.user_id == driver.id));

    Ok(())
}

/// Tests resolving twice is a conflict.
///
/// Expected: Ok on the first resolve, Err(AppError::Conflict) on the second
#[tokio::test]
async fn resolving_twice_conflicts() -> Result<(), AppError> {
    let test = TestBuilder::new().with_all_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let user = factory::user::create_user(db).await?;
    let user = UserRepository::new(db).find_by_id(user.id).await?.unwrap();

    let service = EmergencyService::new(db);
    let created = service
        .create_alert(&user, alert(user.id, EmergencyType::Other, None))
        .await?;

    let resolved = service
        .resolve_alert(&user, created.id, Some("False alarm".to_string()))
        .await?;
    assert!(resolved.is_resolved);

    let result = service.resolve_alert(&user, created.id, None).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    Ok(())
}
