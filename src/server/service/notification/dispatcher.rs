//! Background delivery of pending notifications.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use entity::sea_orm_active_enums::{DeliveryChannel, NotificationStatus};
use sea_orm::DatabaseConnection;

use crate::server::{
    data::{
        notification::NotificationRepository, preference::PreferenceRepository,
        user::UserRepository,
    },
    error::{notification::NotificationError, AppError},
    model::{notification::Notification, user::User},
    service::notification::{
        channel::{Delivery, Gateways},
        select_channel,
    },
};

/// Delivery attempts before a record is marked failed.
pub const MAX_ATTEMPTS: i32 = 3;

/// Outcome counts of one dispatcher tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: u32,
    /// Attempts that failed, whether or not the record will be retried
    pub failed: u32,
    /// Records left pending because an earlier record for the same recipient failed
    pub deferred: u32,
}

/// Who a record actually reaches: the owning user, or the phone number overriding them.
type Recipient = (i32, Option<String>);

pub struct NotificationDispatcher<'a> {
    db: &'a DatabaseConnection,
    gateways: &'a Gateways,
}

impl<'a> NotificationDispatcher<'a> {
    pub fn new(db: &'a DatabaseConnection, gateways: &'a Gateways) -> Self {
        Self { db, gateways }
    }

    /// Delivers every pending record due at `now`.
    ///
    /// Records are walked in `(user_id, scheduled_at, id)` order. When a delivery fails,
    /// the remaining records for that recipient wait for the next tick so a recipient
    /// never receives them out of order. Records carrying a phone override count as a
    /// recipient of their own. Each record is claimed before it is handed to a gateway,
    /// so a record is delivered at most once even if two ticks overlap.
    ///
    /// A record whose gateway is not configured is moved to the next channel the user
    /// allows, falling back to the in-app inbox.
    ///
    /// A failure increments `attempts` and stores the error; the third failure marks the
    /// record `Failed`.
    ///
    /// # Arguments
    /// - `now` - Reference instant for due records and `sent_at`
    ///
    /// # Returns
    /// - `Ok(DispatchReport)` - Counts of sent, failed, and deferred records
    /// - `Err(AppError)` - Database error while loading or updating records
    pub async fn dispatch_pending(&self, now: DateTime<Utc>) -> Result<DispatchReport, AppError> {
        let notification_repo = NotificationRepository::new(self.db);
        let user_repo = UserRepository::new(self.db);

        let due = notification_repo.get_due(now).await?;
        let mut report = DispatchReport::default();
        let mut blocked: HashSet<Recipient> = HashSet::new();
        let mut current_user: Option<User> = None;

        for notification in due {
            let recipient = (notification.user_id, notification.phone_number.clone());
            if blocked.contains(&recipient) {
                report.deferred += 1;
                continue;
            }

            if !notification_repo.claim(notification.id).await? {
                tracing::debug!(
                    "Notification {} already claimed by another dispatcher",
                    notification.id
                );
                continue;
            }

            if current_user.as_ref().map(|u| u.id) != Some(notification.user_id) {
                current_user = user_repo.find_by_id(notification.user_id).await?;
            }

            let channel = self.route(&notification, current_user.as_ref()).await?;
            if channel != notification.channel {
                tracing::debug!(
                    "Rerouting notification {} from {:?} to {:?}",
                    notification.id,
                    notification.channel,
                    channel
                );
                notification_repo
                    .reroute(notification.id, channel, now)
                    .await?;
                if channel == DeliveryChannel::InApp {
                    report.sent += 1;
                    continue;
                }
            }

            match self
                .deliver(&notification, channel, current_user.as_ref())
                .await
            {
                Ok(()) => {
                    notification_repo.mark_sent(notification.id, now).await?;
                    report.sent += 1;
                }
                Err(err) => {
                    let attempts = notification.attempts + 1;
                    let status = if attempts >= MAX_ATTEMPTS {
                        NotificationStatus::Failed
                    } else {
                        NotificationStatus::Pending
                    };
                    tracing::warn!(
                        "Delivery of notification {} to user {} failed (attempt {}): {}",
                        notification.id,
                        notification.user_id,
                        attempts,
                        err
                    );
                    notification_repo
                        .record_failure(notification.id, attempts, err.to_string(), status)
                        .await?;
                    report.failed += 1;
                    blocked.insert(recipient);
                }
            }
        }

        Ok(report)
    }

    /// Channel the record should leave on given the configured gateways.
    ///
    /// Phone override records stay on SMS since there is no account to fall back to.
    async fn route(
        &self,
        notification: &Notification,
        user: Option<&User>,
    ) -> Result<DeliveryChannel, AppError> {
        if self.gateways.is_enabled(notification.channel) || notification.phone_number.is_some()
        {
            return Ok(notification.channel);
        }
        let Some(user) = user else {
            return Ok(notification.channel);
        };

        let settings = PreferenceRepository::new(self.db)
            .get_settings(user.id)
            .await?;

        Ok(select_channel(
            &self.gateways.restrict(&settings),
            user.push_token.as_deref(),
            user.email.as_deref(),
        ))
    }

    async fn deliver(
        &self,
        notification: &Notification,
        channel: DeliveryChannel,
        user: Option<&User>,
    ) -> Result<(), NotificationError> {
        let Some(gateway) = self.gateways.for_channel(channel) else {
            return Ok(());
        };

        let address = match channel {
            DeliveryChannel::Sms => notification
                .phone_number
                .clone()
                .or_else(|| user.map(|u| u.phone_number.clone())),
            DeliveryChannel::Push => user.and_then(|u| u.push_token.clone()),
            DeliveryChannel::Email => user.and_then(|u| u.email.clone()),
            DeliveryChannel::InApp => None,
        }
        .ok_or(NotificationError::MissingAddress(gateway.name()))?;

        gateway
            .deliver(&Delivery {
                address,
                title: notification.title.clone(),
                body: notification.content.clone(),
                data: notification.data.clone(),
            })
            .await
    }
}
