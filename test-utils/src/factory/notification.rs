//! Notification factory for creating queued or delivered notification records.

use chrono::{DateTime, Duration, Utc};
use entity::sea_orm_active_enums::{DeliveryChannel, NotificationStatus};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

pub struct NotificationFactory<'a> {
    db: &'a DatabaseConnection,
    user_id: i32,
    channel: DeliveryChannel,
    status: NotificationStatus,
    title: String,
    phone_number: Option<String>,
    is_read: bool,
    attempts: i32,
    scheduled_at: DateTime<Utc>,
}

impl<'a> NotificationFactory<'a> {
    /// Creates a new NotificationFactory.
    ///
    /// Defaults to a pending SMS record that became due one minute ago.
    pub fn new(db: &'a DatabaseConnection, user_id: i32) -> Self {
        Self {
            db,
            user_id,
            channel: DeliveryChannel::Sms,
            status: NotificationStatus::Pending,
            title: "New booking".to_string(),
            phone_number: None,
            is_read: false,
            attempts: 0,
            scheduled_at: Utc::now() - Duration::minutes(1),
        }
    }

    pub fn channel(mut self, channel: DeliveryChannel) -> Self {
        self.channel = channel;
        self
    }

    pub fn status(mut self, status: NotificationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }

    pub fn is_read(mut self, is_read: bool) -> Self {
        self.is_read = is_read;
        self
    }

    pub fn attempts(mut self, attempts: i32) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn scheduled_at(mut self, scheduled_at: DateTime<Utc>) -> Self {
        self.scheduled_at = scheduled_at;
        self
    }

    /// Builds and inserts the notification entity into the database.
    pub async fn build(self) -> Result<entity::notification::Model, DbErr> {
        let now = Utc::now();
        entity::notification::ActiveModel {
            user_id: ActiveValue::Set(self.user_id),
            channel: ActiveValue::Set(self.channel),
            status: ActiveValue::Set(self.status),
            kind: ActiveValue::Set("booking_created".to_string()),
            content: ActiveValue::Set(format!("{} content", self.title)),
            title: ActiveValue::Set(self.title),
            data: ActiveValue::Set(None),
            phone_number: ActiveValue::Set(self.phone_number),
            is_read: ActiveValue::Set(self.is_read),
            attempts: ActiveValue::Set(self.attempts),
            last_error: ActiveValue::Set(None),
            scheduled_at: ActiveValue::Set(self.scheduled_at),
            sent_at: ActiveValue::Set(None),
            read_at: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}

/// Creates a pending, due SMS notification for `user_id`.
pub async fn create_notification(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<entity::notification::Model, DbErr> {
    NotificationFactory::new(db, user_id).build().await
}
