//! Messaging data repository: threads, participants, and messages.

use chrono::{DateTime, Utc};
use entity::sea_orm_active_enums::MessageType;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};

use crate::server::model::message::ChatMessage;

pub struct MessageRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> MessageRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn find_thread(
        &self,
        thread_id: i32,
    ) -> Result<Option<entity::message_thread::Model>, DbErr> {
        entity::prelude::MessageThread::find_by_id(thread_id)
            .one(self.db)
            .await
    }

    /// Finds the conversation attached to a trip.
    pub async fn find_thread_by_trip(
        &self,
        trip_id: i32,
    ) -> Result<Option<entity::message_thread::Model>, DbErr> {
        entity::prelude::MessageThread::find()
            .filter(entity::message_thread::Column::TripId.eq(trip_id))
            .one(self.db)
            .await
    }

    /// Finds the trip-less conversation two users share.
    pub async fn find_direct_thread(
        &self,
        user_id: i32,
        other_id: i32,
    ) -> Result<Option<entity::message_thread::Model>, DbErr> {
        let participations = entity::prelude::ThreadParticipant::find()
            .join(
                JoinType::InnerJoin,
                entity::thread_participant::Relation::MessageThread.def(),
            )
            .filter(entity::thread_participant::Column::UserId.eq(user_id))
            .filter(entity::message_thread::Column::TripId.is_null())
            .order_by_asc(entity::thread_participant::Column::ThreadId)
            .all(self.db)
            .await?;

        for participation in participations {
            if self.is_participant(participation.thread_id, other_id).await? {
                return self.find_thread(participation.thread_id).await;
            }
        }

        Ok(None)
    }

    /// Creates a thread, optionally bound to a trip.
    pub async fn create_thread(
        &self,
        trip_id: Option<i32>,
        subject: Option<String>,
    ) -> Result<entity::message_thread::Model, DbErr> {
        entity::message_thread::ActiveModel {
            trip_id: ActiveValue::Set(trip_id),
            subject: ActiveValue::Set(subject),
            last_message_at: ActiveValue::Set(None),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }

    /// Adds a user to a thread unless already a participant.
    pub async fn add_participant(&self, thread_id: i32, user_id: i32) -> Result<(), DbErr> {
        if self.is_participant(thread_id, user_id).await? {
            return Ok(());
        }

        entity::thread_participant::ActiveModel {
            thread_id: ActiveValue::Set(thread_id),
            user_id: ActiveValue::Set(user_id),
            last_read_at: ActiveValue::Set(None),
            joined_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;
        Ok(())
    }

    pub async fn is_participant(&self, thread_id: i32, user_id: i32) -> Result<bool, DbErr> {
        let count = entity::prelude::ThreadParticipant::find()
            .filter(entity::thread_participant::Column::ThreadId.eq(thread_id))
            .filter(entity::thread_participant::Column::UserId.eq(user_id))
            .count(self.db)
            .await?;

        Ok(count > 0)
    }

    /// User IDs of a thread's participants in join order.
    pub async fn participant_ids(&self, thread_id: i32) -> Result<Vec<i32>, DbErr> {
        let participants = entity::prelude::ThreadParticipant::find()
            .filter(entity::thread_participant::Column::ThreadId.eq(thread_id))
            .order_by_asc(entity::thread_participant::Column::Id)
            .all(self.db)
            .await?;

        Ok(participants.into_iter().map(|p| p.user_id).collect())
    }

    /// A user's participation rows across all threads.
    pub async fn participations_of(
        &self,
        user_id: i32,
    ) -> Result<Vec<entity::thread_participant::Model>, DbErr> {
        entity::prelude::ThreadParticipant::find()
            .filter(entity::thread_participant::Column::UserId.eq(user_id))
            .all(self.db)
            .await
    }

    /// Inserts a message and bumps the thread's `last_message_at`.
    pub async fn create_message(
        &self,
        thread_id: i32,
        sender_id: i32,
        message_type: MessageType,
        content: String,
    ) -> Result<ChatMessage, DbErr> {
        let now = Utc::now();
        let message = entity::message::ActiveModel {
            thread_id: ActiveValue::Set(thread_id),
            sender_id: ActiveValue::Set(sender_id),
            message_type: ActiveValue::Set(message_type),
            content: ActiveValue::Set(content),
            is_deleted: ActiveValue::Set(false),
            created_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        entity::prelude::MessageThread::update_many()
            .filter(entity::message_thread::Column::Id.eq(thread_id))
            .col_expr(
                entity::message_thread::Column::LastMessageAt,
                sea_orm::sea_query::Expr::value(now),
            )
            .exec(self.db)
            .await?;

        Ok(ChatMessage::from_entity(message))
    }

    /// Finds a message that has not been deleted.
    pub async fn find_message(&self, id: i32) -> Result<Option<ChatMessage>, DbErr> {
        let message = entity::prelude::Message::find_by_id(id)
            .filter(entity::message::Column::IsDeleted.eq(false))
            .one(self.db)
            .await?;

        Ok(message.map(ChatMessage::from_entity))
    }

    /// Hides a message from every reader; the row is kept.
    pub async fn soft_delete(&self, id: i32) -> Result<(), DbErr> {
        entity::prelude::Message::update_many()
            .filter(entity::message::Column::Id.eq(id))
            .col_expr(
                entity::message::Column::IsDeleted,
                sea_orm::sea_query::Expr::value(true),
            )
            .exec(self.db)
            .await?;
        Ok(())
    }

    /// Non-deleted messages of a thread, oldest first.
    pub async fn get_messages(&self, thread_id: i32) -> Result<Vec<ChatMessage>, DbErr> {
        let messages = entity::prelude::Message::find()
            .filter(entity::message::Column::ThreadId.eq(thread_id))
            .filter(entity::message::Column::IsDeleted.eq(false))
            .order_by_asc(entity::message::Column::CreatedAt)
            .order_by_asc(entity::message::Column::Id)
            .all(self.db)
            .await?;

        Ok(messages.into_iter().map(ChatMessage::from_entity).collect())
    }

    pub async fn last_message(&self, thread_id: i32) -> Result<Option<ChatMessage>, DbErr> {
        let message = entity::prelude::Message::find()
            .filter(entity::message::Column::ThreadId.eq(thread_id))
            .filter(entity::message::Column::IsDeleted.eq(false))
            .order_by_desc(entity::message::Column::CreatedAt)
            .order_by_desc(entity::message::Column::Id)
            .one(self.db)
            .await?;

        Ok(message.map(ChatMessage::from_entity))
    }

    /// Counts messages from others in a thread newer than `since`.
    ///
    /// # Arguments
    /// - `thread_id` - Thread to count in
    /// - `user_id` - Viewer, whose own messages never count as unread
    /// - `since` - Viewer's `last_read_at`, `None` counts everything
    pub async fn unread_count(
        &self,
        thread_id: i32,
        user_id: i32,
        since: Option<DateTime<Utc>>,
    ) -> Result<u64, DbErr> {
        let mut query = entity::prelude::Message::find()
            .filter(entity::message::Column::ThreadId.eq(thread_id))
            .filter(entity::message::Column::SenderId.ne(user_id))
            .filter(entity::message::Column::IsDeleted.eq(false));
        if let Some(since) = since {
            query = query.filter(entity::message::Column::CreatedAt.gt(since));
        }

        query.count(self.db).await
    }

    /// Moves the participant's read marker to `now`.
    pub async fn mark_read(
        &self,
        thread_id: i32,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        entity::prelude::ThreadParticipant::update_many()
            .filter(entity::thread_participant::Column::ThreadId.eq(thread_id))
            .filter(entity::thread_participant::Column::UserId.eq(user_id))
            .col_expr(
                entity::thread_participant::Column::LastReadAt,
                sea_orm::sea_query::Expr::value(now),
            )
            .exec(self.db)
            .await?;
        Ok(())
    }
}
