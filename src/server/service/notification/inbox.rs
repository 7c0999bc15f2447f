//! A user's own view of their notifications.

use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::server::{
    data::notification::NotificationRepository,
    error::AppError,
    model::notification::{Notification, PaginatedNotifications},
    util::pagination::total_pages,
};

pub struct InboxService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> InboxService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets the user's notifications, newest first.
    ///
    /// # Arguments
    /// - `user_id` - Inbox owner
    /// - `unread_only` - Skip notifications already read
    /// - `page` - Zero-indexed page number
    /// - `per_page` - Notifications per page
    pub async fn list(
        &self,
        user_id: i32,
        unread_only: bool,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedNotifications, AppError> {
        let (notifications, total) = NotificationRepository::new(self.db)
            .get_for_user_paginated(user_id, unread_only, page, per_page)
            .await?;

        Ok(PaginatedNotifications {
            notifications,
            total,
            page,
            per_page,
            total_pages: total_pages(total, per_page),
        })
    }

    pub async fn unread_count(&self, user_id: i32) -> Result<u64, AppError> {
        Ok(NotificationRepository::new(self.db)
            .unread_count(user_id)
            .await?)
    }

    /// Marks one notification read.
    ///
    /// # Returns
    /// - `Ok(Notification)` - The notification, read
    /// - `Err(AppError::NotFound)` - No such notification in the user's inbox
    pub async fn mark_read(&self, user_id: i32, id: i32) -> Result<Notification, AppError> {
        NotificationRepository::new(self.db)
            .mark_read(user_id, id, Utc::now())
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))
    }

    /// Marks every notification read and returns how many changed.
    pub async fn mark_all_read(&self, user_id: i32) -> Result<u64, AppError> {
        Ok(NotificationRepository::new(self.db)
            .mark_all_read(user_id, Utc::now())
            .await?)
    }

    pub async fn delete(&self, user_id: i32, id: i32) -> Result<(), AppError> {
        let deleted = NotificationRepository::new(self.db)
            .delete(user_id, id)
            .await?;

        if !deleted {
            return Err(AppError::NotFound("Notification not found".to_string()));
        }

        Ok(())
    }
}
