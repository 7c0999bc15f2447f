//! Notification data repository.
//!
//! Stores fan-out records and serves both the user inbox and the background dispatcher.

use chrono::{DateTime, Utc};
use entity::sea_orm_active_enums::{DeliveryChannel, NotificationStatus};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::server::model::notification::{NewNotification, Notification};

/// Longest title stored, in characters.
const MAX_TITLE_LENGTH: usize = 200;

pub struct NotificationRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> NotificationRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Inserts a notification record.
    ///
    /// Titles longer than 200 characters are truncated.
    ///
    /// # Returns
    /// - `Ok(Notification)` - The stored record
    /// - `Err(DbErr)` - Database error during insert
    pub async fn create(&self, notification: NewNotification) -> Result<Notification, DbErr> {
        let now = Utc::now();
        let title: String = notification.title.chars().take(MAX_TITLE_LENGTH).collect();
        let sent_at = (notification.status == NotificationStatus::Delivered).then_some(now);

        let entity = entity::notification::ActiveModel {
            user_id: ActiveValue::Set(notification.user_id),
            channel: ActiveValue::Set(notification.channel),
            status: ActiveValue::Set(notification.status),
            kind: ActiveValue::Set(notification.kind.to_string()),
            title: ActiveValue::Set(title),
            content: ActiveValue::Set(notification.content),
            data: ActiveValue::Set(notification.data),
            phone_number: ActiveValue::Set(notification.phone_number),
            is_read: ActiveValue::Set(false),
            attempts: ActiveValue::Set(0),
            last_error: ActiveValue::Set(None),
            scheduled_at: ActiveValue::Set(notification.scheduled_at),
            sent_at: ActiveValue::Set(sent_at),
            read_at: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Ok(Notification::from_entity(entity))
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Notification>, DbErr> {
        let entity = entity::prelude::Notification::find_by_id(id)
            .one(self.db)
            .await?;

        Ok(entity.map(Notification::from_entity))
    }

    /// Gets pending records due at `now` in per-user delivery order.
    ///
    /// Ordered by `(user_id, scheduled_at, id)` so the dispatcher can walk each user's
    /// queue front to back.
    pub async fn get_due(&self, now: DateTime<Utc>) -> Result<Vec<Notification>, DbErr> {
        let notifications = entity::prelude::Notification::find()
            .filter(entity::notification::Column::Status.eq(NotificationStatus::Pending))
            .filter(entity::notification::Column::ScheduledAt.lte(now))
            .order_by_asc(entity::notification::Column::UserId)
            .order_by_asc(entity::notification::Column::ScheduledAt)
            .order_by_asc(entity::notification::Column::Id)
            .all(self.db)
            .await?;

        Ok(notifications
            .into_iter()
            .map(Notification::from_entity)
            .collect())
    }

    /// Claims a pending record for delivery.
    ///
    /// # Returns
    /// - `Ok(true)` - The record moved to `Sending` and belongs to the caller
    /// - `Ok(false)` - Another dispatcher claimed or settled it first
    pub async fn claim(&self, id: i32) -> Result<bool, DbErr> {
        let result = entity::prelude::Notification::update_many()
            .filter(entity::notification::Column::Id.eq(id))
            .filter(entity::notification::Column::Status.eq(NotificationStatus::Pending))
            .col_expr(
                entity::notification::Column::Status,
                sea_orm::sea_query::Expr::value(NotificationStatus::Sending),
            )
            .exec(self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Returns every claimed record to the pending queue.
    ///
    /// Only safe while no dispatcher is running, i.e. before the scheduler starts.
    pub async fn release_claims(&self) -> Result<u64, DbErr> {
        let result = entity::prelude::Notification::update_many()
            .filter(entity::notification::Column::Status.eq(NotificationStatus::Sending))
            .col_expr(
                entity::notification::Column::Status,
                sea_orm::sea_query::Expr::value(NotificationStatus::Pending),
            )
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }

    /// Moves a claimed record to another channel.
    ///
    /// Records moved to the in-app inbox are delivered on the spot.
    pub async fn reroute(
        &self,
        id: i32,
        channel: DeliveryChannel,
        now: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        let mut update = entity::prelude::Notification::update_many()
            .filter(entity::notification::Column::Id.eq(id))
            .col_expr(
                entity::notification::Column::Channel,
                sea_orm::sea_query::Expr::value(channel),
            );
        if channel == DeliveryChannel::InApp {
            update = update
                .col_expr(
                    entity::notification::Column::Status,
                    sea_orm::sea_query::Expr::value(NotificationStatus::Delivered),
                )
                .col_expr(
                    entity::notification::Column::SentAt,
                    sea_orm::sea_query::Expr::value(now),
                );
        }
        update.exec(self.db).await?;
        Ok(())
    }

    /// Marks a record as handed to its gateway.
    pub async fn mark_sent(&self, id: i32, now: DateTime<Utc>) -> Result<(), DbErr> {
        entity::prelude::Notification::update_many()
            .filter(entity::notification::Column::Id.eq(id))
            .col_expr(
                entity::notification::Column::Status,
                sea_orm::sea_query::Expr::value(NotificationStatus::Sent),
            )
            .col_expr(
                entity::notification::Column::SentAt,
                sea_orm::sea_query::Expr::value(now),
            )
            .col_expr(
                entity::notification::Column::LastError,
                sea_orm::sea_query::Expr::value(Option::<String>::None),
            )
            .exec(self.db)
            .await?;
        Ok(())
    }

    /// Records a failed delivery attempt.
    ///
    /// # Arguments
    /// - `id` - Notification ID
    /// - `attempts` - Attempt count including this failure
    /// - `error` - Gateway error message
    /// - `status` - `Pending` to retry later, `Failed` once attempts are exhausted
    pub async fn record_failure(
        &self,
        id: i32,
        attempts: i32,
        error: String,
        status: NotificationStatus,
    ) -> Result<(), DbErr> {
        entity::prelude::Notification::update_many()
            .filter(entity::notification::Column::Id.eq(id))
            .col_expr(
                entity::notification::Column::Attempts,
                sea_orm::sea_query::Expr::value(attempts),
            )
            .col_expr(
                entity::notification::Column::LastError,
                sea_orm::sea_query::Expr::value(Some(error)),
            )
            .col_expr(
                entity::notification::Column::Status,
                sea_orm::sea_query::Expr::value(status),
            )
            .exec(self.db)
            .await?;
        Ok(())
    }

    /// Gets a user's notifications, newest first.
    pub async fn get_for_user_paginated(
        &self,
        user_id: i32,
        unread_only: bool,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Notification>, u64), DbErr> {
        let mut query = entity::prelude::Notification::find()
            .filter(entity::notification::Column::UserId.eq(user_id))
            .filter(entity::notification::Column::PhoneNumber.is_null());
        if unread_only {
            query = query.filter(entity::notification::Column::IsRead.eq(false));
        }

        let paginator = query
            .order_by_desc(entity::notification::Column::CreatedAt)
            .order_by_desc(entity::notification::Column::Id)
            .paginate(self.db, per_page);

        let total = paginator.num_items().await?;
        let notifications = paginator.fetch_page(page).await?;

        Ok((
            notifications
                .into_iter()
                .map(Notification::from_entity)
                .collect(),
            total,
        ))
    }

    /// Counts a user's unread inbox entries.
    ///
    /// Records carrying a phone override were addressed to someone else (an emergency
    /// contact) and are excluded.
    pub async fn unread_count(&self, user_id: i32) -> Result<u64, DbErr> {
        entity::prelude::Notification::find()
            .filter(entity::notification::Column::UserId.eq(user_id))
            .filter(entity::notification::Column::PhoneNumber.is_null())
            .filter(entity::notification::Column::IsRead.eq(false))
            .count(self.db)
            .await
    }

    /// Marks one of the user's notifications read.
    ///
    /// # Returns
    /// - `Ok(Some(Notification))` - The updated notification
    /// - `Ok(None)` - No such notification owned by the user
    pub async fn mark_read(
        &self,
        user_id: i32,
        id: i32,
        now: DateTime<Utc>,
    ) -> Result<Option<Notification>, DbErr> {
        let Some(notification) = entity::prelude::Notification::find_by_id(id)
            .filter(entity::notification::Column::UserId.eq(user_id))
            .one(self.db)
            .await?
        else {
            return Ok(None);
        };

        if notification.is_read {
            return Ok(Some(Notification::from_entity(notification)));
        }

        let mut notification = notification.into_active_model();
        notification.is_read = ActiveValue::Set(true);
        notification.read_at = ActiveValue::Set(Some(now));

        Ok(Some(Notification::from_entity(
            notification.update(self.db).await?,
        )))
    }

    /// Marks all of a user's notifications read.
    pub async fn mark_all_read(&self, user_id: i32, now: DateTime<Utc>) -> Result<u64, DbErr> {
        let result = entity::prelude::Notification::update_many()
            .filter(entity::notification::Column::UserId.eq(user_id))
            .filter(entity::notification::Column::IsRead.eq(false))
            .col_expr(
                entity::notification::Column::IsRead,
                sea_orm::sea_query::Expr::value(true),
            )
            .col_expr(
                entity::notification::Column::ReadAt,
                sea_orm::sea_query::Expr::value(now),
            )
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }

    /// Deletes one of the user's notifications.
    ///
    /// # Returns
    /// - `Ok(true)` - Deleted
    /// - `Ok(false)` - No such notification owned by the user
    pub async fn delete(&self, user_id: i32, id: i32) -> Result<bool, DbErr> {
        let result = entity::prelude::Notification::delete_many()
            .filter(entity::notification::Column::Id.eq(id))
            .filter(entity::notification::Column::UserId.eq(user_id))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Moves every failed record back to pending with a fresh attempt budget.
    pub async fn retry_failed(&self, now: DateTime<Utc>) -> Result<u64, DbErr> {
        let result = entity::prelude::Notification::update_many()
            .filter(entity::notification::Column::Status.eq(NotificationStatus::Failed))
            .col_expr(
                entity::notification::Column::Status,
                sea_orm::sea_query::Expr::value(NotificationStatus::Pending),
            )
            .col_expr(
                entity::notification::Column::Attempts,
                sea_orm::sea_query::Expr::value(0),
            )
            .col_expr(
                entity::notification::Column::ScheduledAt,
                sea_orm::sea_query::Expr::value(now),
            )
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }
}
