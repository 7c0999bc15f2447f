use super::*;

/// Tests only pending records scheduled at or before now are due.
///
/// Expected: Ok with the overdue pending record only
#[tokio::test]
async fn returns_pending_records_that_are_due() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_user_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let user = factory::user::create_user(db).await?;
    let due = factory::notification::create_notification(db, user.id).await?;
    factory::notification::NotificationFactory::new(db, user.id)
        .scheduled_at(Utc::now() + Duration::hours(1))
        .build()
        .await?;
    factory::notification::NotificationFactory::new(db, user.id)
        .status(NotificationStatus::Sent)
        .build()
        .await?;
    factory::notification::NotificationFactory::new(db, user.id)
        .status(NotificationStatus::Failed)
        .build()
        .await?;

    let repo = NotificationRepository::new(db);
    let records = repo.get_due(Utc::now()).await?;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, due.id);

    Ok(())
}

/// Tests due records are grouped per user and ordered by schedule within a user.
///
/// Expected: Ok with user A's records oldest first, followed by user B's
#[tokio::test]
async fn orders_by_user_then_schedule() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_user_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let first_user = factory::user::create_user(db).await?;
    let second_user = factory::user::create_user(db).await?;

    let second_of_first = factory::notification::NotificationFactory::new(db, first_user.id)
        .scheduled_at(Utc::now() - Duration::minutes(1))
        .build()
        .await?;
    let only_of_second = factory::notification::NotificationFactory::new(db, second_user.id)
        .scheduled_at(Utc::now() - Duration::minutes(10))
        .build()
        .await?;
    let first_of_first = factory::notification::NotificationFactory::new(db, first_user.id)
        .scheduled_at(Utc::now() - Duration::minutes(5))
        .build()
        .await?;

    let repo = NotificationRepository::new(db);
    let ids: Vec<i32> = repo
        .get_due(Utc::now())
        .await?
        .into_iter()
        .map(|notification| notification.id)
        .collect();

    assert_eq!(
        ids,
        vec![first_of_first.id, second_of_first.id, only_of_second.id]
    );

    Ok(())
}
