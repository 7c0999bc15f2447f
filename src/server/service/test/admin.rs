use entity::sea_orm_active_enums::{UserRole, UserStatus};

use crate::server::{
    data::notification::NotificationRepository,
    error::AppError,
    service::admin::{AdminService, MAX_BROADCAST_TITLE_LENGTH},
};
use test_utils::{builder::TestBuilder, factory};

/// Tests a broadcast reaches active users and honours the role filter.
///
/// Expected: four active users reached without a filter, the blocked user skipped, and
/// only the driver reached when filtering on drivers
#[tokio::test]
async fn broadcast_reaches_active_users() -> Result<(), AppError> {
    let test = TestBuilder::new().with_user_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let admin = factory::user::create_admin(db).await?;
    let passenger = factory::user::create_user(db).await?;
    factory::user::create_user(db).await?;
    let driver = factory::user::create_driver(db).await?;
    let blocked = factory::user::UserFactory::new(db)
        .status(UserStatus::Blocked)
        .build()
        .await?;
    let service = AdminService::new(db);

    let reached = service
        .broadcast(admin.id, "Holiday schedule", "Offices close on Friday", None)
        .await?;
    assert_eq!(reached, 4);

    let drivers = service
        .broadcast(
            admin.id,
            "Road works",
            "The Kamchik pass is closed at night",
            Some(UserRole::Driver),
        )
        .await?;
    assert_eq!(drivers, 1);

    let notifications = NotificationRepository::new(db);
    let (inbox, total) = notifications
        .get_for_user_paginated(driver.id, false, 0, 10)
        .await?;
    assert_eq!(total, 2);
    assert!(inbox.iter().all(|n| n.kind == "broadcast"));
    let (_, total) = notifications
        .get_for_user_paginated(passenger.id, false, 0, 10)
        .await?;
    assert_eq!(total, 1);
    let (_, total) = notifications
        .get_for_user_paginated(blocked.id, false, 0, 10)
        .await?;
    assert_eq!(total, 0);

    Ok(())
}

/// Tests broadcast text bounds after trimming.
///
/// Expected: Err(AppError::BadRequest) for a blank title and an oversized title
#[tokio::test]
async fn broadcast_validates_text() -> Result<(), AppError> {
    let test = TestBuilder::new().with_user_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let admin = factory::user::create_admin(db).await?;
    let service = AdminService::new(db);

    let blank = service.broadcast(admin.id, "   ", "Body", None).await;
    assert!(matches!(blank, Err(AppError::BadRequest(_))));

    let long_title = "t".repeat(MAX_BROADCAST_TITLE_LENGTH + 1);
    let oversized = service.broadcast(admin.id, &long_title, "Body", None).await;
    assert!(matches!(oversized, Err(AppError::BadRequest(_))));

    Ok(())
}
