use super::*;

/// Tests failed records return to the queue with a fresh attempt budget.
///
/// Expected: Ok(1), record pending with zero attempts and due immediately
#[tokio::test]
async fn requeues_failed_records() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_user_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let user = factory::user::create_user(db).await?;
    let failed = factory::notification::NotificationFactory::new(db, user.id)
        .status(NotificationStatus::Failed)
        .attempts(3)
        .build()
        .await?;
    factory::notification::NotificationFactory::new(db, user.id)
        .status(NotificationStatus::Sent)
        .build()
        .await?;

    let now = Utc::now();
    let repo = NotificationRepository::new(db);
    let requeued = repo.retry_failed(now).await?;

    assert_eq!(requeued, 1);
    let stored = repo.find_by_id(failed.id).await?.unwrap();
    assert_eq!(stored.status, NotificationStatus::Pending);
    assert_eq!(stored.attempts, 0);
    assert!(repo
        .get_due(now)
        .await?
        .iter()
        .any(|notification| notification.id == failed.id));

    Ok(())
}
