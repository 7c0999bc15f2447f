use super::*;

/// Tests the unread count skips records addressed to a phone override.
///
/// Emergency contact SMS are stored under the sender's id but never shown in their inbox.
///
/// Expected: Ok(1) for one own unread record and one contact SMS
#[tokio::test]
async fn unread_count_excludes_phone_overrides() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_user_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let user = factory::user::create_user(db).await?;
    factory::notification::NotificationFactory::new(db, user.id)
        .channel(DeliveryChannel::InApp)
        .status(NotificationStatus::Delivered)
        .build()
        .await?;
    factory::notification::NotificationFactory::new(db, user.id)
        .phone_number("+998901112233")
        .build()
        .await?;

    let repo = NotificationRepository::new(db);
    let count = repo.unread_count(user.id).await?;

    assert_eq!(count, 1);

    Ok(())
}

/// Tests marking another user's notification read finds nothing.
///
/// Expected: Ok(None) and the record stays unread
#[tokio::test]
async fn mark_read_is_scoped_to_owner() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_user_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let owner = factory::user::create_user(db).await?;
    let stranger = factory::user::create_user(db).await?;
    let notification = factory::notification::create_notification(db, owner.id).await?;

    let repo = NotificationRepository::new(db);
    let result = repo
        .mark_read(stranger.id, notification.id, Utc::now())
        .await?;

    assert!(result.is_none());
    let stored = repo.find_by_id(notification.id).await?.unwrap();
    assert!(!stored.is_read);

    Ok(())
}

/// Tests mark-all-read only touches unread records of the user.
///
/// Expected: Ok(2) and zero unread afterwards, other user untouched
#[tokio::test]
async fn mark_all_read_counts_changed_records() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_user_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let user = factory::user::create_user(db).await?;
    let other = factory::user::create_user(db).await?;
    factory::notification::create_notification(db, user.id).await?;
    factory::notification::create_notification(db, user.id).await?;
    factory::notification::NotificationFactory::new(db, user.id)
        .is_read(true)
        .build()
        .await?;
    factory::notification::create_notification(db, other.id).await?;

    let repo = NotificationRepository::new(db);
    let changed = repo.mark_all_read(user.id, Utc::now()).await?;

    assert_eq!(changed, 2);
    assert_eq!(repo.unread_count(user.id).await?, 0);
    assert_eq!(repo.unread_count(other.id).await?, 1);

    Ok(())
}
