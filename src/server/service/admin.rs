//! Administrative moderation.
//!
//! Driver applications and car registrations wait in a queue until an administrator
//! approves or rejects them. Administrators can also block accounts and requeue failed
//! notifications.

use chrono::Utc;
use entity::sea_orm_active_enums::{CarVerificationStatus, UserRole, UserStatus};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde_json::json;

use crate::server::{
    data::{car::CarRepository, notification::NotificationRepository, user::UserRepository},
    error::AppError,
    model::{
        car::{Car, PaginatedCars},
        notification::{NotificationEvent, NotificationKind},
        user::{PaginatedUsers, User},
    },
    service::notification::NotificationService,
    util::pagination::total_pages,
};

/// Service providing business logic for administrators.
/// Longest broadcast headline, in characters.
pub const MAX_BROADCAST_TITLE_LENGTH: usize = 200;
/// Longest broadcast body, in characters.
pub const MAX_BROADCAST_CONTENT_LENGTH: usize = 1000;

pub struct AdminService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AdminService<'a> {
    /// Creates a new AdminService instance.
    ///
    /// # Arguments
    /// - `db` - Reference to the database connection
    ///
    /// # Returns
    /// - `AdminService` - New service instance
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets driver applicants awaiting a decision, oldest first.
    pub async fn get_pending_drivers(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedUsers, AppError> {
        let (users, total) = UserRepository::new(self.db)
            .get_pending_drivers_paginated(page, per_page)
            .await?;

        Ok(PaginatedUsers {
            users,
            total,
            page,
            per_page,
            total_pages: total_pages(total, per_page),
        })
    }

    /// Gets cars awaiting verification, oldest first.
    pub async fn get_pending_cars(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedCars, AppError> {
        let (cars, total) = CarRepository::new(self.db)
            .get_pending_paginated(page, per_page)
            .await?;

        Ok(PaginatedCars {
            cars,
            total,
            page,
            per_page,
            total_pages: total_pages(total, per_page),
        })
    }

    /// Approves a driver application, activating the account.
    ///
    /// # Arguments
    /// - `user_id` - Applicant's user ID
    ///
    /// # Returns
    /// - `Ok(User)` - The active driver
    /// - `Err(AppError::NotFound)` - No such user
    /// - `Err(AppError::BadRequest)` - The user has no pending driver application
    pub async fn approve_driver(&self, user_id: i32) -> Result<User, AppError> {
        let txn = self.db.begin().await?;
        let repo = UserRepository::new(&txn);

        let user = pending_driver(repo.find_by_id(user_id).await?)?;
        let approved = repo.set_status(user.id, UserStatus::Active).await?;

        let event = NotificationEvent::new(
            NotificationKind::DriverApproved,
            "Driver application approved",
            "You can now register cars and publish trips on AutoPort",
        );
        NotificationService::new(&txn)
            .notify(&[user.id], &event)
            .await?;

        txn.commit().await?;

        tracing::info!("Driver {} approved", user.id);

        Ok(approved)
    }

    /// Rejects a driver application; the user goes back to an active passenger.
    ///
    /// # Arguments
    /// - `user_id` - Applicant's user ID
    /// - `reason` - Explanation sent to the applicant
    pub async fn reject_driver(&self, user_id: i32, reason: String) -> Result<User, AppError> {
        let reason = required_reason(reason)?;

        let txn = self.db.begin().await?;
        let repo = UserRepository::new(&txn);

        let user = pending_driver(repo.find_by_id(user_id).await?)?;
        let rejected = repo
            .set_role_and_status(user.id, UserRole::Passenger, UserStatus::Active)
            .await?;

        let event = NotificationEvent::new(
            NotificationKind::DriverRejected,
            "Driver application rejected",
            format!("Your driver application was rejected: {}", reason),
        )
        .with_data(json!({ "reason": reason }));
        NotificationService::new(&txn)
            .notify(&[user.id], &event)
            .await?;

        txn.commit().await?;

        Ok(rejected)
    }

    /// Approves a car so it can be used for trips.
    pub async fn approve_car(&self, car_id: i32) -> Result<Car, AppError> {
        self.decide_car(car_id, CarVerificationStatus::Approved, None)
            .await
    }

    /// Rejects a car with a reason shown to its driver.
    pub async fn reject_car(&self, car_id: i32, reason: String) -> Result<Car, AppError> {
        let reason = required_reason(reason)?;
        self.decide_car(car_id, CarVerificationStatus::Rejected, Some(reason))
            .await
    }

    /// Blocks an account. Administrators cannot block themselves or other administrators.
    ///
    /// # Returns
    /// - `Ok(User)` - The blocked user
    /// - `Err(AppError::NotFound)` - No such user
    /// - `Err(AppError::BadRequest)` - Target is an administrator
    pub async fn block_user(&self, admin_id: i32, user_id: i32) -> Result<User, AppError> {
        let repo = UserRepository::new(self.db);
        let user = repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if user.id == admin_id || user.role == UserRole::Admin {
            return Err(AppError::BadRequest(
                "Administrators cannot be blocked".to_string(),
            ));
        }

        let blocked = repo.set_status(user.id, UserStatus::Blocked).await?;
        tracing::warn!("User {} blocked by admin {}", user.id, admin_id);

        Ok(blocked)
    }

    /// Restores a blocked account to `Active`.
    pub async fn unblock_user(&self, user_id: i32) -> Result<User, AppError> {
        let repo = UserRepository::new(self.db);
        let user = repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if user.status != UserStatus::Blocked {
            return Err(AppError::BadRequest("User is not blocked".to_string()));
        }

        Ok(repo.set_status(user.id, UserStatus::Active).await?)
    }

    /// Moves failed notifications back to the dispatch queue.
    ///
    /// # Returns
    /// - `Ok(u64)` - Number of notifications requeued
    pub async fn retry_failed_notifications(&self) -> Result<u64, AppError> {
        let requeued = NotificationRepository::new(self.db)
            .retry_failed(Utc::now())
            .await?;

        tracing::info!("Requeued {} failed notification(s)", requeued);

        Ok(requeued)
    }

    /// Sends an announcement to every active user, or to active users with one role.
    ///
    /// # Arguments
    /// - `admin_id` - Sending administrator, recorded in the payload
    /// - `title` - Headline, 1..=200 characters after trimming
    /// - `content` - Body, 1..=1000 characters after trimming
    /// - `role` - Restricts the audience when set
    ///
    /// # Returns
    /// - `Ok(u64)` - Number of users notified
    /// - `Err(AppError::BadRequest)` - Empty or oversized title or content
    pub async fn broadcast(
        &self,
        admin_id: i32,
        title: &str,
        content: &str,
        role: Option<UserRole>,
    ) -> Result<u64, AppError> {
        let title = bounded_text("Title", title, MAX_BROADCAST_TITLE_LENGTH)?;
        let content = bounded_text("Content", content, MAX_BROADCAST_CONTENT_LENGTH)?;

        let txn = self.db.begin().await?;
        let recipients = UserRepository::new(&txn).get_active_ids(role).await?;

        let event = NotificationEvent::new(NotificationKind::Broadcast, title, content)
            .with_data(json!({
                "broadcast": true,
                "sender_id": admin_id,
                "target_role": role,
            }));
        let sent = NotificationService::new(&txn)
            .notify(&recipients, &event)
            .await?;

        txn.commit().await?;

        tracing::info!("Admin {} broadcast to {} user(s)", admin_id, sent.len());

        Ok(sent.len() as u64)
    }

    async fn decide_car(
        &self,
        car_id: i32,
        status: CarVerificationStatus,
        reason: Option<String>,
    ) -> Result<Car, AppError> {
        let txn = self.db.begin().await?;
        let repo = CarRepository::new(&txn);

        let car = repo
            .find_by_id(car_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Car not found".to_string()))?;
        if car.verification_status != CarVerificationStatus::PendingVerification {
            return Err(AppError::BadRequest(
                "Car is not awaiting verification".to_string(),
            ));
        }

        let decided = repo.set_verification(car.id, status, reason.clone()).await?;

        let label = format!("{} {} ({})", car.make, car.model, car.license_plate);
        let event = match reason {
            Some(reason) => NotificationEvent::new(
                NotificationKind::CarRejected,
                "Car rejected",
                format!("{} was rejected: {}", label, reason),
            ),
            None => NotificationEvent::new(
                NotificationKind::CarApproved,
                "Car approved",
                format!("{} is approved for trips", label),
            ),
        }
        .with_data(json!({ "car_id": car.id }));
        NotificationService::new(&txn)
            .notify(&[car.driver_id], &event)
            .await?;

        txn.commit().await?;

        Ok(decided)
    }
}

fn pending_driver(user: Option<User>) -> Result<User, AppError> {
    let user = user.ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if user.role != UserRole::Driver || user.status != UserStatus::PendingProfileCompletion {
        return Err(AppError::BadRequest(
            "User has no pending driver application".to_string(),
        ));
    }

    Ok(user)
}

fn required_reason(reason: String) -> Result<String, AppError> {
    let reason = reason.trim().to_string();
    if reason.is_empty() {
        return Err(AppError::BadRequest("A reason is required".to_string()));
    }
    Ok(reason)
}

fn bounded_text<'t>(field: &str, text: &'t str, max: usize) -> Result<&'t str, AppError> {
    let text = text.trim();
    if text.is_empty() || text.chars().count() > max {
        return Err(AppError::BadRequest(format!(
            "{} must be between 1 and {} characters",
            field, max
        )));
    }
    Ok(text)
}
