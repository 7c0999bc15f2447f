//! Messaging domain models.

use chrono::{DateTime, Utc};
use entity::sea_orm_active_enums::MessageType;

use crate::model::message::{ChatMessageDto, ThreadDetailDto, ThreadSummaryDto};

/// Longest accepted message body, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 2000;

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: i32,
    pub thread_id: i32,
    pub sender_id: i32,
    pub message_type: MessageType,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn from_entity(entity: entity::message::Model) -> Self {
        Self {
            id: entity.id,
            thread_id: entity.thread_id,
            sender_id: entity.sender_id,
            message_type: entity.message_type,
            content: entity.content,
            created_at: entity.created_at,
        }
    }

    pub fn into_dto(self) -> ChatMessageDto {
        ChatMessageDto {
            id: self.id,
            thread_id: self.thread_id,
            sender_id: self.sender_id,
            message_type: self.message_type,
            content: self.content,
            created_at: self.created_at,
        }
    }
}

/// A thread as listed in a user's inbox.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadSummary {
    pub id: i32,
    pub trip_id: Option<i32>,
    pub subject: Option<String>,
    pub participant_ids: Vec<i32>,
    pub last_message: Option<ChatMessage>,
    pub last_message_at: Option<DateTime<Utc>>,
    /// Messages from other participants newer than the viewer's `last_read_at`
    pub unread_count: u64,
}

impl ThreadSummary {
    pub fn into_dto(self) -> ThreadSummaryDto {
        ThreadSummaryDto {
            id: self.id,
            trip_id: self.trip_id,
            subject: self.subject,
            participant_ids: self.participant_ids,
            last_message: self.last_message.map(ChatMessage::into_dto),
            last_message_at: self.last_message_at,
            unread_count: self.unread_count,
        }
    }
}

/// A thread with its full message history, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadDetail {
    pub id: i32,
    pub trip_id: Option<i32>,
    pub subject: Option<String>,
    pub participant_ids: Vec<i32>,
    pub messages: Vec<ChatMessage>,
}

impl ThreadDetail {
    pub fn into_dto(self) -> ThreadDetailDto {
        ThreadDetailDto {
            id: self.id,
            trip_id: self.trip_id,
            subject: self.subject,
            participant_ids: self.participant_ids,
            messages: self.messages.into_iter().map(ChatMessage::into_dto).collect(),
        }
    }
}
