//! Notification domain models.
//!
//! A `NotificationEvent` describes something that happened. The fan-out service turns one
//! event into one `Notification` row per recipient, each already bound to a delivery
//! channel.

use chrono::{DateTime, Utc};
use entity::sea_orm_active_enums::{DeliveryChannel, NotificationStatus};

use crate::model::notification::{NotificationDto, NotificationPageDto};

/// Event tags stored in the `kind` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    BookingCreated,
    BookingCancelled,
    NegotiationOffer,
    NegotiationCounter,
    NegotiationAccepted,
    NegotiationRejected,
    NegotiationCancelled,
    NegotiationExpired,
    TripStarted,
    TripCompleted,
    TripCancelled,
    TripReminder,
    NewMessage,
    EmergencyAlert,
    EmergencyResolved,
    DriverApproved,
    DriverRejected,
    CarApproved,
    CarRejected,
    Broadcast,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BookingCreated => "booking_created",
            Self::BookingCancelled => "booking_cancelled",
            Self::NegotiationOffer => "negotiation_offer",
            Self::NegotiationCounter => "negotiation_counter",
            Self::NegotiationAccepted => "negotiation_accepted",
            Self::NegotiationRejected => "negotiation_rejected",
            Self::NegotiationCancelled => "negotiation_cancelled",
            Self::NegotiationExpired => "negotiation_expired",
            Self::TripStarted => "trip_started",
            Self::TripCompleted => "trip_completed",
            Self::TripCancelled => "trip_cancelled",
            Self::TripReminder => "trip_reminder",
            Self::NewMessage => "new_message",
            Self::EmergencyAlert => "emergency_alert",
            Self::EmergencyResolved => "emergency_resolved",
            Self::DriverApproved => "driver_approved",
            Self::DriverRejected => "driver_rejected",
            Self::CarApproved => "car_approved",
            Self::CarRejected => "car_rejected",
            Self::Broadcast => "broadcast",
        }
    }
}

/// Something that happened and should be told to one or more users.
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    pub kind: NotificationKind,
    /// Short headline, truncated to 200 characters on insert
    pub title: String,
    pub content: String,
    /// Structured payload for clients, e.g. `{"trip_id": 4}`
    pub data: Option<serde_json::Value>,
}

impl NotificationEvent {
    pub fn new(kind: NotificationKind, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            content: content.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// A stored notification bound to one user and one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: i32,
    pub user_id: i32,
    pub channel: DeliveryChannel,
    pub status: NotificationStatus,
    pub kind: String,
    pub title: String,
    pub content: String,
    pub data: Option<serde_json::Value>,
    /// SMS destination override for recipients without an account
    pub phone_number: Option<String>,
    pub is_read: bool,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn from_entity(entity: entity::notification::Model) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            channel: entity.channel,
            status: entity.status,
            kind: entity.kind,
            title: entity.title,
            content: entity.content,
            data: entity.data,
            phone_number: entity.phone_number,
            is_read: entity.is_read,
            attempts: entity.attempts,
            last_error: entity.last_error,
            scheduled_at: entity.scheduled_at,
            sent_at: entity.sent_at,
            read_at: entity.read_at,
            created_at: entity.created_at,
        }
    }

    pub fn into_dto(self) -> NotificationDto {
        NotificationDto {
            id: self.id,
            kind: self.kind,
            channel: self.channel,
            status: self.status,
            title: self.title,
            content: self.content,
            data: self.data,
            is_read: self.is_read,
            created_at: self.created_at,
            read_at: self.read_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaginatedNotifications {
    pub notifications: Vec<Notification>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl PaginatedNotifications {
    pub fn into_dto(self) -> NotificationPageDto {
        NotificationPageDto {
            notifications: self
                .notifications
                .into_iter()
                .map(Notification::into_dto)
                .collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
        }
    }
}

/// Column values for inserting a notification row.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: i32,
    pub channel: DeliveryChannel,
    pub status: NotificationStatus,
    pub kind: &'static str,
    pub title: String,
    pub content: String,
    pub data: Option<serde_json::Value>,
    pub phone_number: Option<String>,
    pub scheduled_at: DateTime<Utc>,
}
