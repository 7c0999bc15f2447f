//! In-app messaging between trip participants.
//!
//! Every trip has at most one thread. The driver joins it when it is created and each
//! passenger joins when their booking is confirmed. Two users who share a booking can
//! also hold one direct thread with no trip attached.

use chrono::Utc;
use entity::sea_orm_active_enums::MessageType;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, TransactionTrait};
use serde_json::json;

use crate::server::{
    data::{
        booking::BookingRepository, message::MessageRepository, trip::TripRepository,
        user::UserRepository,
    },
    error::AppError,
    model::{
        message::{ChatMessage, ThreadDetail, ThreadSummary, MAX_MESSAGE_LENGTH},
        notification::{NotificationEvent, NotificationKind},
        trip::Trip,
    },
    service::notification::NotificationService,
};

/// Adds `user_id` to the trip's thread, creating the thread with the driver when missing.
///
/// # Returns
/// - `Ok(i32)` - ID of the trip thread
/// - `Err(DbErr)` - Database error
pub(crate) async fn join_trip_thread<C: ConnectionTrait>(
    db: &C,
    trip: &Trip,
    user_id: i32,
) -> Result<i32, DbErr> {
    let repo = MessageRepository::new(db);

    let thread = match repo.find_thread_by_trip(trip.id).await? {
        Some(thread) => thread,
        None => {
            let thread = repo
                .create_thread(Some(trip.id), Some(trip.route()))
                .await?;
            repo.add_participant(thread.id, trip.driver_id).await?;
            thread
        }
    };
    repo.add_participant(thread.id, user_id).await?;

    Ok(thread.id)
}

pub struct MessageService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> MessageService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets the user's threads, most recently active first.
    pub async fn get_threads(&self, user_id: i32) -> Result<Vec<ThreadSummary>, AppError> {
        let repo = MessageRepository::new(self.db);
        let mut threads = Vec::new();

        for participation in repo.participations_of(user_id).await? {
            let Some(thread) = repo.find_thread(participation.thread_id).await? else {
                continue;
            };

            threads.push(ThreadSummary {
                id: thread.id,
                trip_id: thread.trip_id,
                subject: thread.subject,
                participant_ids: repo.participant_ids(thread.id).await?,
                last_message: repo.last_message(thread.id).await?,
                last_message_at: thread.last_message_at,
                unread_count: repo
                    .unread_count(thread.id, user_id, participation.last_read_at)
                    .await?,
            });
        }

        threads.sort_by(|a, b| {
            b.last_message_at
                .cmp(&a.last_message_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(threads)
    }

    /// Gets a thread with its messages and marks it read for the viewer.
    ///
    /// # Returns
    /// - `Ok(ThreadDetail)` - Thread and messages, oldest first
    /// - `Err(AppError::NotFound)` - No such thread
    /// - `Err(AppError::Forbidden)` - Viewer is not a participant
    pub async fn get_thread(
        &self,
        user_id: i32,
        thread_id: i32,
    ) -> Result<ThreadDetail, AppError> {
        let repo = MessageRepository::new(self.db);
        let thread = self.participant_thread(user_id, thread_id).await?;

        let detail = ThreadDetail {
            id: thread.id,
            trip_id: thread.trip_id,
            subject: thread.subject,
            participant_ids: repo.participant_ids(thread.id).await?,
            messages: repo.get_messages(thread.id).await?,
        };
        repo.mark_read(thread.id, user_id, Utc::now()).await?;

        Ok(detail)
    }

    /// Posts a message and notifies the other participants.
    ///
    /// # Arguments
    /// - `sender_id` - Posting participant
    /// - `thread_id` - Target thread
    /// - `content` - Message text, trimmed, 1..=2000 characters
    /// - `message_type` - Text, location or system
    ///
    /// # Returns
    /// - `Ok(ChatMessage)` - Stored message
    /// - `Err(AppError::BadRequest)` - Empty or too long
    /// - `Err(AppError::Forbidden)` - Sender is not a participant
    pub async fn send(
        &self,
        sender_id: i32,
        thread_id: i32,
        content: &str,
        message_type: MessageType,
    ) -> Result<ChatMessage, AppError> {
        let content = message_body(content)?;

        self.participant_thread(sender_id, thread_id).await?;

        let txn = self.db.begin().await?;
        let repo = MessageRepository::new(&txn);

        let message = repo
            .create_message(thread_id, sender_id, message_type, content.to_string())
            .await?;
        repo.mark_read(thread_id, sender_id, message.created_at)
            .await?;

        let recipients: Vec<i32> = repo
            .participant_ids(thread_id)
            .await?
            .into_iter()
            .filter(|&id| id != sender_id)
            .collect();
        let preview: String = content.chars().take(100).collect();
        let event = NotificationEvent::new(NotificationKind::NewMessage, "New message", preview)
            .with_data(json!({ "thread_id": thread_id, "message_id": message.id }));
        NotificationService::new(&txn)
            .notify(&recipients, &event)
            .await?;

        txn.commit().await?;

        Ok(message)
    }

    /// Opens, or returns, the conversation of a trip.
    ///
    /// # Returns
    /// - `Ok(ThreadDetail)` - The trip thread
    /// - `Err(AppError::NotFound)` - No such trip
    /// - `Err(AppError::Forbidden)` - Caller is neither the driver nor a confirmed passenger
    pub async fn start_trip_conversation(
        &self,
        user_id: i32,
        trip_id: i32,
    ) -> Result<ThreadDetail, AppError> {
        let trip = TripRepository::new(self.db)
            .find_by_id(trip_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

        if trip.driver_id != user_id
            && BookingRepository::new(self.db)
                .find_confirmed(trip.id, user_id)
                .await?
                .is_none()
        {
            return Err(AppError::Forbidden(
                "Only the driver and confirmed passengers can message about this trip"
                    .to_string(),
            ));
        }

        let txn = self.db.begin().await?;
        let thread_id = join_trip_thread(&txn, &trip, user_id).await?;
        txn.commit().await?;

        self.get_thread(user_id, thread_id).await
    }

    /// Opens, or reuses, the direct thread with another user and posts a first message.
    ///
    /// # Arguments
    /// - `user_id` - Caller
    /// - `other_id` - User to write to
    /// - `content` - Opening message, same limits as [`Self::send`]
    ///
    /// # Returns
    /// - `Ok(ThreadDetail)` - The direct thread including the new message
    /// - `Err(AppError::BadRequest)` - Writing to yourself, or an empty or too long message
    /// - `Err(AppError::NotFound)` - No such user
    /// - `Err(AppError::Forbidden)` - Neither user ever booked a trip driven by the other
    pub async fn start_direct_conversation(
        &self,
        user_id: i32,
        other_id: i32,
        content: &str,
    ) -> Result<ThreadDetail, AppError> {
        if user_id == other_id {
            return Err(AppError::BadRequest(
                "You cannot message yourself".to_string(),
            ));
        }
        let content = message_body(content)?;

        if UserRepository::new(self.db)
            .find_by_id(other_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        if !BookingRepository::new(self.db)
            .are_connected(user_id, other_id)
            .await?
        {
            return Err(AppError::Forbidden(
                "You can only message users you have traveled with".to_string(),
            ));
        }

        let txn = self.db.begin().await?;
        let repo = MessageRepository::new(&txn);
        let thread = match repo.find_direct_thread(user_id, other_id).await? {
            Some(thread) => thread,
            None => {
                let thread = repo.create_thread(None, None).await?;
                repo.add_participant(thread.id, user_id).await?;
                repo.add_participant(thread.id, other_id).await?;
                thread
            }
        };
        txn.commit().await?;

        self.send(user_id, thread.id, content, MessageType::Text)
            .await?;

        self.get_thread(user_id, thread.id).await
    }

    /// Deletes one of the caller's own messages for every participant.
    ///
    /// # Returns
    /// - `Ok(())` - Message hidden
    /// - `Err(AppError::NotFound)` - No such message, already deleted, or sent by someone else
    pub async fn delete_message(&self, user_id: i32, message_id: i32) -> Result<(), AppError> {
        let repo = MessageRepository::new(self.db);

        let message = repo
            .find_message(message_id)
            .await?
            .filter(|message| message.sender_id == user_id)
            .ok_or_else(|| AppError::NotFound("Message not found".to_string()))?;
        repo.soft_delete(message.id).await?;

        Ok(())
    }

    /// Total unread messages across the user's threads.
    pub async fn unread_count(&self, user_id: i32) -> Result<u64, AppError> {
        let repo = MessageRepository::new(self.db);
        let mut total = 0;

        for participation in repo.participations_of(user_id).await? {
            total += repo
                .unread_count(participation.thread_id, user_id, participation.last_read_at)
                .await?;
        }

        Ok(total)
    }

    pub async fn mark_read(&self, user_id: i32, thread_id: i32) -> Result<(), AppError> {
        self.participant_thread(user_id, thread_id).await?;

        MessageRepository::new(self.db)
            .mark_read(thread_id, user_id, Utc::now())
            .await?;

        Ok(())
    }

    async fn participant_thread(
        &self,
        user_id: i32,
        thread_id: i32,
    ) -> Result<entity::message_thread::Model, AppError> {
        let repo = MessageRepository::new(self.db);

        let thread = repo
            .find_thread(thread_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Thread not found".to_string()))?;
        if !repo.is_participant(thread_id, user_id).await? {
            return Err(AppError::Forbidden(
                "You are not a participant of this thread".to_string(),
            ));
        }

        Ok(thread)
    }
}

/// Trims a message body and checks its length.
fn message_body(content: &str) -> Result<&str, AppError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::BadRequest("Message cannot be empty".to_string()));
    }
    if content.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Message cannot exceed {} characters",
            MAX_MESSAGE_LENGTH
        )));
    }
    Ok(content)
}
