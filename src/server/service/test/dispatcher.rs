use chrono::{Duration, Utc};
use entity::sea_orm_active_enums::{DeliveryChannel, NotificationStatus};

use crate::server::{
    data::notification::NotificationRepository,
    error::AppError,
    service::notification::{
        channel::fake::FakeGateways,
        dispatcher::{DispatchReport, NotificationDispatcher},
    },
};
use test_utils::{builder::TestBuilder, factory};

/// Tests a due SMS record is sent to the user's phone and marked sent.
///
/// Expected: Ok with one sent record and one SMS to the user's number
#[tokio::test]
async fn delivers_due_sms() -> Result<(), AppError> {
    let test = TestBuilder::new().with_user_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let fake = FakeGateways::new();
    let gateways = fake.gateways();

    let user = factory::user::create_user(db).await?;
    let notification = factory::notification::create_notification(db, user.id).await?;

    let report = NotificationDispatcher::new(db, &gateways)
        .dispatch_pending(Utc::now())
        .await?;

    assert_eq!(
        report,
        DispatchReport {
            sent: 1,
            failed: 0,
            deferred: 0
        }
    );
    let sent = fake.sms.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].address, user.phone_number);

    let stored = NotificationRepository::new(db)
        .find_by_id(notification.id)
        .await?
        .unwrap();
    assert_eq!(stored.status, NotificationStatus::Sent);
    assert!(stored.sent_at.is_some());

    Ok(())
}

/// Tests records with a phone override go to that number instead of the owner.
///
/// Expected: Ok with the SMS addressed to the override
#[tokio::test]
async fn phone_override_is_used() -> Result<(), AppError> {
    let test = TestBuilder::new().with_user_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let fake = FakeGateways::new();
    let gateways = fake.gateways();

    let user = factory::user::create_user(db).await?;
    factory::notification::NotificationFactory::new(db, user.id)
        .phone_number("+998977654321")
        .build()
        .await?;

    NotificationDispatcher::new(db, &gateways)
        .dispatch_pending(Utc::now())
        .await?;

    let sent = fake.sms.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].address, "+998977654321");

    Ok(())
}

/// Tests a failed delivery holds back the rest of that user's queue.
///
/// The other user's record is still delivered in the same tick.
///
/// Expected: Ok with one sent, one failed and one deferred; the failed record keeps
/// pending status with one attempt and the error stored
#[tokio::test]
async fn failure_defers_later_records_of_same_user() -> Result<(), AppError> {
    let test = TestBuilder::new().with_user_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let fake = FakeGateways::new();
    let gateways = fake.gateways();

    let unlucky = factory::user::create_user(db).await?;
    let other = factory::user::create_user(db).await?;
    fake.sms.fail_for(&unlucky.phone_number);

    let first = factory::notification::NotificationFactory::new(db, unlucky.id)
        .scheduled_at(Utc::now() - Duration::minutes(5))
        .build()
        .await?;
    let second = factory::notification::NotificationFactory::new(db, unlucky.id)
        .scheduled_at(Utc::now() - Duration::minutes(1))
        .build()
        .await?;
    factory::notification::create_notification(db, other.id).await?;

    let report = NotificationDispatcher::new(db, &gateways)
        .dispatch_pending(Utc::now())
        .await?;

    assert_eq!(
        report,
        DispatchReport {
            sent: 1,
            failed: 1,
            deferred: 1
        }
    );

    let repo = NotificationRepository::new(db);
    let first = repo.find_by_id(first.id).await?.unwrap();
    assert_eq!(first.status, NotificationStatus::Pending);
    assert_eq!(first.attempts, 1);
    assert!(first.last_error.is_some());

    let second = repo.find_by_id(second.id).await?.unwrap();
    assert_eq!(second.status, NotificationStatus::Pending);
    assert_eq!(second.attempts, 0);

    let sent = fake.sms.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].address, other.phone_number);

    Ok(())
}

/// Tests the third failed attempt gives up on the record.
///
/// Expected: Ok with the record marked failed after three attempts
#[tokio::test]
async fn third_failure_marks_failed() -> Result<(), AppError> {
    let test = TestBuilder::new().with_user_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let fake = FakeGateways::new();
    let gateways = fake.gateways();

    let user = factory::user::create_user(db).await?;
    fake.sms.fail_for(&user.phone_number);
    let notification = factory::notification::NotificationFactory::new(db, user.id)
        .attempts(2)
        .build()
        .await?;

    NotificationDispatcher::new(db, &gateways)
        .dispatch_pending(Utc::now())
        .await?;

    let stored = NotificationRepository::new(db)
        .find_by_id(notification.id)
        .await?
        .unwrap();
    assert_eq!(stored.status, NotificationStatus::Failed);
    assert_eq!(stored.attempts, 3);

    Ok(())
}

/// Tests a push record for a user without a device token counts as a failed attempt.
///
/// Expected: Ok with one failure and nothing handed to the push gateway
#[tokio::test]
async fn push_without_token_fails() -> Result<(), AppError> {
    let test = TestBuilder::new().with_user_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let fake = FakeGateways::new();
    let gateways = fake.gateways();

    let user = factory::user::create_user(db).await?;
    factory::notification::NotificationFactory::new(db, user.id)
        .channel(DeliveryChannel::Push)
        .build()
        .await?;

    let report = NotificationDispatcher::new(db, &gateways)
        .dispatch_pending(Utc::now())
        .await?;

    assert_eq!(report.failed, 1);
    assert!(fake.push.sent().is_empty());

    Ok(())
}

/// Tests emergency SMS to different contacts of one user are queued independently.
///
/// Both records belong to the alerting user but carry different phone overrides.
///
/// Expected: Ok with the first contact's record failed and the second contact's record
/// still sent in the same tick
#[tokio::test]
async fn failed_contact_does_not_block_other_contacts() -> Result<(), AppError> {
    let test = TestBuilder::new().with_user_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let fake = FakeGateways::new();
    let gateways = fake.gateways();

    let user = factory::user::create_user(db).await?;
    fake.sms.fail_for("+998901111111");
    factory::notification::NotificationFactory::new(db, user.id)
        .phone_number("+998901111111")
        .scheduled_at(Utc::now() - Duration::minutes(2))
        .build()
        .await?;
    let reachable = factory::notification::NotificationFactory::new(db, user.id)
        .phone_number("+998902222222")
        .scheduled_at(Utc::now() - Duration::minutes(1))
        .build()
        .await?;

    let report = NotificationDispatcher::new(db, &gateways)
        .dispatch_pending(Utc::now())
        .await?;

    assert_eq!(
        report,
        DispatchReport {
            sent: 1,
            failed: 1,
            deferred: 0
        }
    );
    let sent = fake.sms.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].address, "+998902222222");

    let stored = NotificationRepository::new(db)
        .find_by_id(reachable.id)
        .await?
        .unwrap();
    assert_eq!(stored.status, NotificationStatus::Sent);

    Ok(())
}

/// Tests a push record is moved to SMS when no push gateway is configured.
///
/// Expected: Ok with the record sent over SMS, stored on the SMS channel, and no
/// failed attempt recorded
#[tokio::test]
async fn disabled_push_falls_back_to_sms() -> Result<(), AppError> {
    let test = TestBuilder::new().with_user_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let fake = FakeGateways::new();
    fake.push.disable();
    let gateways = fake.gateways();

    let user = factory::user::UserFactory::new(db)
        .push_token("device-token")
        .build()
        .await?;
    let notification = factory::notification::NotificationFactory::new(db, user.id)
        .channel(DeliveryChannel::Push)
        .build()
        .await?;

    let report = NotificationDispatcher::new(db, &gateways)
        .dispatch_pending(Utc::now())
        .await?;

    assert_eq!(report.sent, 1);
    assert_eq!(report.failed, 0);
    assert!(fake.push.sent().is_empty());
    assert_eq!(fake.sms.sent()[0].address, user.phone_number);

    let stored = NotificationRepository::new(db)
        .find_by_id(notification.id)
        .await?
        .unwrap();
    assert_eq!(stored.channel, DeliveryChannel::Sms);
    assert_eq!(stored.status, NotificationStatus::Sent);
    assert_eq!(stored.attempts, 0);

    Ok(())
}

/// Tests a push record lands in the inbox when push is unconfigured and the user has
/// turned SMS off.
///
/// Expected: Ok with the record delivered in-app and nothing handed to a gateway
#[tokio::test]
async fn disabled_push_without_fallback_goes_in_app() -> Result<(), AppError> {
    let test = TestBuilder::new().with_user_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let fake = FakeGateways::new();
    fake.push.disable();
    let gateways = fake.gateways();

    let user = factory::user::UserFactory::new(db)
        .push_token("device-token")
        .build()
        .await?;
    factory::user_settings::UserSettingsFactory::new(db, user.id)
        .sms(false)
        .build()
        .await?;
    let notification = factory::notification::NotificationFactory::new(db, user.id)
        .channel(DeliveryChannel::Push)
        .build()
        .await?;

    NotificationDispatcher::new(db, &gateways)
        .dispatch_pending(Utc::now())
        .await?;

    assert!(fake.push.sent().is_empty());
    assert!(fake.sms.sent().is_empty());

    let stored = NotificationRepository::new(db)
        .find_by_id(notification.id)
        .await?
        .unwrap();
    assert_eq!(stored.channel, DeliveryChannel::InApp);
    assert_eq!(stored.status, NotificationStatus::Delivered);
    assert!(stored.sent_at.is_some());

    Ok(())
}

/// Tests a record already claimed by another tick is left alone.
///
/// Expected: Ok with nothing sent and the record still claimed; releasing claims puts it
/// back in the queue for the next tick
#[tokio::test]
async fn claimed_record_is_not_sent_twice() -> Result<(), AppError> {
    let test = TestBuilder::new().with_user_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();
    let fake = FakeGateways::new();
    let gateways = fake.gateways();

    let user = factory::user::create_user(db).await?;
    let notification = factory::notification::create_notification(db, user.id).await?;
    let repo = NotificationRepository::new(db);
    assert!(repo.claim(notification.id).await?);
    assert!(!repo.claim(notification.id).await?);

    let report = NotificationDispatcher::new(db, &gateways)
        .dispatch_pending(Utc::now())
        .await?;

    assert_eq!(report, DispatchReport::default());
    assert!(fake.sms.sent().is_empty());
    let stored = repo.find_by_id(notification.id).await?.unwrap();
    assert_eq!(stored.status, NotificationStatus::Sending);

    assert_eq!(repo.release_claims().await?, 1);
    let report = NotificationDispatcher::new(db, &gateways)
        .dispatch_pending(Utc::now())
        .await?;
    assert_eq!(report.sent, 1);
    assert_eq!(fake.sms.sent().len(), 1);

    Ok(())
}
