use entity::sea_orm_active_enums::MessageType;

use crate::server::{
    data::{message::MessageRepository, notification::NotificationRepository},
    error::AppError,
    model::message::MAX_MESSAGE_LENGTH,
    service::message::MessageService,
};
use test_utils::{builder::TestBuilder, factory};

/// Tests a confirmed passenger opens the trip conversation with the driver.
///
/// Expected: Ok with a thread holding the driver and the passenger
#[tokio::test]
async fn booked_passenger_starts_conversation() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, passenger, trip, _booking) = factory::helpers::create_booked_trip(db).await?;

    let thread = MessageService::new(db)
        .start_trip_conversation(passenger.id, trip.id)
        .await?;

    assert_eq!(thread.trip_id, Some(trip.id));
    assert!(thread.participant_ids.contains(&driver.id));
    assert!(thread.participant_ids.contains(&passenger.id));

    Ok(())
}

/// Tests a user without a booking cannot join a trip conversation.
///
/// Expected: Err(AppError::Forbidden)
#[tokio::test]
async fn outsider_cannot_start_conversation() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (_driver, _passenger, trip, _booking) = factory::helpers::create_booked_trip(db).await?;
    let outsider = factory::user::create_user(db).await?;

    let result = MessageService::new(db)
        .start_trip_conversation(outsider.id, trip.id)
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));

    Ok(())
}

/// Tests only participants may post to a thread.
///
/// Expected: Err(AppError::Forbidden) for a user outside the thread
#[tokio::test]
async fn non_participant_cannot_send() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (_driver, passenger, trip, _booking) = factory::helpers::create_booked_trip(db).await?;
    let outsider = factory::user::create_user(db).await?;
    let service = MessageService::new(db);
    let thread = service.start_trip_conversation(passenger.id, trip.id).await?;

    let result = service
        .send(outsider.id, thread.id, "Hello", MessageType::Text)
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));

    Ok(())
}

/// Tests message length limits after trimming.
///
/// Expected: blank and over-long messages rejected, a message of exactly the limit
/// stored
#[tokio::test]
async fn message_length_limits() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (_driver, passenger, trip, _booking) = factory::helpers::create_booked_trip(db).await?;
    let service = MessageService::new(db);
    let thread = service.start_trip_conversation(passenger.id, trip.id).await?;

    let blank = service
        .send(passenger.id, thread.id, "   ", MessageType::Text)
        .await;
    assert!(matches!(blank, Err(AppError::BadRequest(_))));

    let too_long = "a".repeat(MAX_MESSAGE_LENGTH + 1);
    let result = service
        .send(passenger.id, thread.id, &too_long, MessageType::Text)
        .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    let at_limit = "a".repeat(MAX_MESSAGE_LENGTH);
    let stored = service
        .send(passenger.id, thread.id, &at_limit, MessageType::Text)
        .await?;
    assert_eq!(stored.content.chars().count(), MAX_MESSAGE_LENGTH);

    Ok(())
}

/// Tests unread counters follow the read marker of each participant.
///
/// Expected: the driver sees two unread messages and a notification per message, the
/// sender sees none, and reading the thread clears the driver's count
#[tokio::test]
async fn unread_counts_track_reads() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, passenger, trip, _booking) = factory::helpers::create_booked_trip(db).await?;
    let service = MessageService::new(db);
    let thread = service.start_trip_conversation(passenger.id, trip.id).await?;

    service
        .send(passenger.id, thread.id, "Where do we meet?", MessageType::Text)
        .await?;
    service
        .send(passenger.id, thread.id, "I have one bag", MessageType::Text)
        .await?;

    assert_eq!(service.unread_count(driver.id).await?, 2);
    assert_eq!(service.unread_count(passenger.id).await?, 0);

    let threads = service.get_threads(driver.id).await?;
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].unread_count, 2);
    assert_eq!(
        threads[0]
            .last_message
            .as_ref()
            .map(|message| message.content.as_str()),
        Some("I have one bag")
    );

    let (inbox, _) = NotificationRepository::new(db)
        .get_for_user_paginated(driver.id, false, 0, 10)
        .await?;
    assert_eq!(inbox.iter().filter(|n| n.kind == "new_message").count(), 2);

    let detail = service.get_thread(driver.id, thread.id).await?;
    assert_eq!(detail.messages.len(), 2);
    assert_eq!(service.unread_count(driver.id).await?, 0);

    Ok(())
}

/// Tests a driver writes directly to a former passenger and the thread is reused.
///
/// Expected: one trip-less thread holding both users, the second call appending to it
#[tokio::test]
async fn direct_conversation_is_reused() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, passenger, _trip, _booking) = factory::helpers::create_booked_trip(db).await?;
    let service = MessageService::new(db);

    let first = service
        .start_direct_conversation(driver.id, passenger.id, "Thanks for riding")
        .await?;
    assert_eq!(first.trip_id, None);
    assert_eq!(first.participant_ids, vec![driver.id, passenger.id]);
    assert_eq!(first.messages.len(), 1);

    let reply = service
        .start_direct_conversation(passenger.id, driver.id, "Any trips next week?")
        .await?;
    assert_eq!(reply.id, first.id);
    assert_eq!(reply.messages.len(), 2);

    Ok(())
}

/// Tests direct messages need a shared booking and a different recipient.
///
/// Expected: BadRequest to yourself, Forbidden to a stranger, NotFound to a missing user
#[tokio::test]
async fn direct_conversation_requires_connection() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (_driver, passenger, _trip, _booking) = factory::helpers::create_booked_trip(db).await?;
    let stranger = factory::user::create_user(db).await?;
    let service = MessageService::new(db);

    let to_self = service
        .start_direct_conversation(passenger.id, passenger.id, "Hi")
        .await;
    assert!(matches!(to_self, Err(AppError::BadRequest(_))));

    let to_stranger = service
        .start_direct_conversation(passenger.id, stranger.id, "Hi")
        .await;
    assert!(matches!(to_stranger, Err(AppError::Forbidden(_))));

    let to_nobody = service
        .start_direct_conversation(passenger.id, stranger.id + 1000, "Hi")
        .await;
    assert!(matches!(to_nobody, Err(AppError::NotFound(_))));

    Ok(())
}

/// Tests only the sender can delete a message and it disappears for everyone.
///
/// Expected: NotFound for the driver, Ok for the sender, then the thread is empty and a
/// second delete is NotFound
#[tokio::test]
async fn sender_deletes_own_message() -> Result<(), AppError> {
    let test = TestBuilder::new().with_trip_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let (driver, passenger, trip, _booking) = factory::helpers::create_booked_trip(db).await?;
    let service = MessageService::new(db);
    let thread = service.start_trip_conversation(passenger.id, trip.id).await?;
    let message = service
        .send(passenger.id, thread.id, "Wrong chat", MessageType::Text)
        .await?;

    let foreign = service.delete_message(driver.id, message.id).await;
    assert!(matches!(foreign, Err(AppError::NotFound(_))));

    service.delete_message(passenger.id, message.id).await?;

    assert!(MessageRepository::new(db)
        .get_messages(thread.id)
        .await?
        .is_empty());
    let again = service.delete_message(passenger.id, message.id).await;
    assert!(matches!(again, Err(AppError::NotFound(_))));

    Ok(())
}
