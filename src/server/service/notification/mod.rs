//! Notification fan-out.
//!
//! `NotificationService` is the producer: it turns one `NotificationEvent` into one
//! pending record per recipient, choosing each recipient's channel from their settings.
//! `NotificationDispatcher` is the consumer run by the scheduler, delivering pending
//! records through the gateways in per-user order.

pub mod channel;
pub mod dispatcher;
pub mod email;
pub mod inbox;
pub mod push;
pub mod sms;

use chrono::{DateTime, Utc};
use entity::sea_orm_active_enums::{DeliveryChannel, NotificationStatus};
use sea_orm::{ConnectionTrait, DbErr};

use crate::server::{
    data::{
        notification::NotificationRepository, preference::PreferenceRepository,
        user::UserRepository,
    },
    model::{
        notification::{NewNotification, Notification, NotificationEvent},
        preference::UserSettings,
    },
};

/// Picks the delivery channel for a user.
///
/// Push when enabled and a device token is registered, else SMS when enabled, else email
/// when enabled and an address is known, else the in-app inbox.
///
/// # Arguments
/// - `settings` - Recipient's notification switches
/// - `push_token` - Registered device token, if any
/// - `email` - Recipient's email, if any
pub fn select_channel(
    settings: &UserSettings,
    push_token: Option<&str>,
    email: Option<&str>,
) -> DeliveryChannel {
    let has = |value: Option<&str>| value.is_some_and(|v| !v.trim().is_empty());

    if settings.push_notifications && has(push_token) {
        DeliveryChannel::Push
    } else if settings.sms_notifications {
        DeliveryChannel::Sms
    } else if settings.email_notifications && has(email) {
        DeliveryChannel::Email
    } else {
        DeliveryChannel::InApp
    }
}

/// Enqueues notification records.
///
/// Generic over the connection so records are written inside the caller's transaction
/// and disappear with it on rollback.
pub struct NotificationService<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> NotificationService<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Fans an event out to each recipient.
    ///
    /// Unknown user IDs are skipped. In-app records are stored as already delivered and
    /// never reach the dispatcher.
    ///
    /// # Arguments
    /// - `recipients` - User IDs to notify, duplicates are notified once
    /// - `event` - What happened
    ///
    /// # Returns
    /// - `Ok(Vec<Notification>)` - One record per notified user
    /// - `Err(DbErr)` - Database error while reading settings or inserting
    pub async fn notify(
        &self,
        recipients: &[i32],
        event: &NotificationEvent,
    ) -> Result<Vec<Notification>, DbErr> {
        self.notify_at(recipients, event, Utc::now()).await
    }

    /// Same as `notify`, scheduling delivery for `scheduled_at`.
    pub async fn notify_at(
        &self,
        recipients: &[i32],
        event: &NotificationEvent,
        scheduled_at: DateTime<Utc>,
    ) -> Result<Vec<Notification>, DbErr> {
        let user_repo = UserRepository::new(self.db);
        let preference_repo = PreferenceRepository::new(self.db);
        let notification_repo = NotificationRepository::new(self.db);

        let mut seen = Vec::with_capacity(recipients.len());
        let mut created = Vec::with_capacity(recipients.len());

        for &user_id in recipients {
            if seen.contains(&user_id) {
                continue;
            }
            seen.push(user_id);

            let Some(user) = user_repo.find_by_id(user_id).await? else {
                tracing::warn!("Skipping notification for unknown user {}", user_id);
                continue;
            };
            let settings = preference_repo.get_settings(user_id).await?;
            let channel = select_channel(
                &settings,
                user.push_token.as_deref(),
                user.email.as_deref(),
            );
            let status = match channel {
                DeliveryChannel::InApp => NotificationStatus::Delivered,
                _ => NotificationStatus::Pending,
            };

            created.push(
                notification_repo
                    .create(NewNotification {
                        user_id,
                        channel,
                        status,
                        kind: event.kind.as_str(),
                        title: event.title.clone(),
                        content: event.content.clone(),
                        data: event.data.clone(),
                        phone_number: None,
                        scheduled_at,
                    })
                    .await?,
            );
        }

        Ok(created)
    }

    /// Enqueues an SMS to a phone number that has no account, such as an emergency contact.
    ///
    /// # Arguments
    /// - `owner_id` - User on whose behalf the SMS is sent, who owns the record
    /// - `phone_number` - Destination overriding the owner's phone
    /// - `event` - Message contents
    pub async fn notify_phone(
        &self,
        owner_id: i32,
        phone_number: &str,
        event: &NotificationEvent,
    ) -> Result<Notification, DbErr> {
        NotificationRepository::new(self.db)
            .create(NewNotification {
                user_id: owner_id,
                channel: DeliveryChannel::Sms,
                status: NotificationStatus::Pending,
                kind: event.kind.as_str(),
                title: event.title.clone(),
                content: event.content.clone(),
                data: event.data.clone(),
                phone_number: Some(phone_number.to_string()),
                scheduled_at: Utc::now(),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(push: bool, sms: bool, email: bool) -> UserSettings {
        UserSettings {
            push_notifications: push,
            sms_notifications: sms,
            email_notifications: email,
            ..UserSettings::default()
        }
    }

    /// Expected: push wins when enabled and a token exists
    #[test]
    fn prefers_push_with_token() {
        let channel = select_channel(&settings(true, true, true), Some("token"), Some("a@b.uz"));
        assert_eq!(channel, DeliveryChannel::Push);
    }

    /// Expected: falls back to SMS when push is enabled but no token is registered
    #[test]
    fn falls_back_to_sms_without_token() {
        let channel = select_channel(&settings(true, true, false), None, None);
        assert_eq!(channel, DeliveryChannel::Sms);
    }

    /// Expected: email only when SMS is off and an address exists
    #[test]
    fn uses_email_when_sms_disabled() {
        assert_eq!(
            select_channel(&settings(false, false, true), None, Some("a@b.uz")),
            DeliveryChannel::Email
        );
        assert_eq!(
            select_channel(&settings(false, false, true), None, None),
            DeliveryChannel::InApp
        );
    }

    /// Expected: default settings pick SMS for a user without a push token
    #[test]
    fn defaults_pick_sms() {
        assert_eq!(
            select_channel(&UserSettings::default(), None, Some("a@b.uz")),
            DeliveryChannel::Sms
        );
    }

    #[test]
    fn everything_off_goes_in_app() {
        assert_eq!(
            select_channel(&settings(false, false, false), Some("token"), Some("a@b.uz")),
            DeliveryChannel::InApp
        );
    }
}
