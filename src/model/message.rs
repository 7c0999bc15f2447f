use chrono::{DateTime, Utc};
use entity::sea_orm_active_enums::MessageType;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChatMessageDto {
    pub id: i32,
    pub thread_id: i32,
    pub sender_id: i32,
    pub message_type: MessageType,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ThreadSummaryDto {
    pub id: i32,
    pub trip_id: Option<i32>,
    pub subject: Option<String>,
    pub participant_ids: Vec<i32>,
    pub last_message: Option<ChatMessageDto>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub unread_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ThreadDetailDto {
    pub id: i32,
    pub trip_id: Option<i32>,
    pub subject: Option<String>,
    pub participant_ids: Vec<i32>,
    pub messages: Vec<ChatMessageDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SendMessageDto {
    pub content: String,
    #[serde(default = "default_type")]
    pub message_type: MessageType,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DirectMessageDto {
    /// Opening message of the conversation
    pub content: String,
}

fn default_type() -> MessageType {
    MessageType::Text
}
