//! User service for business logic.
//!
//! This module provides the `UserService` for profile management, driver applications,
//! public profiles and account deactivation. It works with domain models rather than
//! DTOs.

use entity::sea_orm_active_enums::{UserRole, UserStatus};
use sea_orm::DatabaseConnection;

use crate::server::{
    data::{
        booking::BookingRepository, negotiation::NegotiationRepository, trip::TripRepository,
        user::UserRepository,
    },
    error::AppError,
    model::user::{Deactivation, UpdateProfileParams, User},
    service::{booking::BookingService, negotiation::NegotiationService, trip::TripService},
};

/// Languages the clients ship translations for.
pub const SUPPORTED_LANGUAGES: [&str; 3] = ["uz", "ru", "en"];

/// Service providing business logic for user management.
pub struct UserService<'a> {
    pub db: &'a DatabaseConnection,
}

impl<'a> UserService<'a> {
    /// Creates a new UserService instance.
    ///
    /// # Arguments
    /// - `db` - Reference to the database connection
    ///
    /// # Returns
    /// - `UserService` - New service instance
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Updates the caller's own profile.
    ///
    /// # Arguments
    /// - `user_id` - ID of the authenticated user
    /// - `params` - Fields to change; `None` keeps the stored value
    ///
    /// # Returns
    /// - `Ok(User)` - Updated profile
    /// - `Err(AppError::BadRequest)` - Blank name, malformed email or unsupported language
    /// - `Err(AppError::DbErr)` - Database error
    pub async fn update_profile(
        &self,
        user_id: i32,
        params: UpdateProfileParams,
    ) -> Result<User, AppError> {
        if params
            .full_name
            .as_deref()
            .is_some_and(|name| name.is_empty() || name.chars().count() > 100)
        {
            return Err(AppError::BadRequest(
                "Full name must be between 1 and 100 characters".to_string(),
            ));
        }
        if params
            .email
            .as_deref()
            .is_some_and(|email| !is_plausible_email(email))
        {
            return Err(AppError::BadRequest("Invalid email address".to_string()));
        }
        if params
            .preferred_language
            .as_deref()
            .is_some_and(|language| !SUPPORTED_LANGUAGES.contains(&language))
        {
            return Err(AppError::BadRequest(format!(
                "Preferred language must be one of: {}",
                SUPPORTED_LANGUAGES.join(", ")
            )));
        }

        Ok(UserRepository::new(self.db)
            .update_profile(user_id, params)
            .await?)
    }

    /// Turns a passenger into a driver applicant.
    ///
    /// The account moves to `PendingProfileCompletion` and stays there until an
    /// administrator approves it.
    ///
    /// # Arguments
    /// - `user` - The authenticated user
    ///
    /// # Returns
    /// - `Ok(User)` - Updated user with the driver role
    /// - `Err(AppError::BadRequest)` - Already a driver or an administrator
    pub async fn apply_driver(&self, user: &User) -> Result<User, AppError> {
        if user.role != UserRole::Passenger {
            return Err(AppError::BadRequest(
                "Only passengers can apply to become drivers".to_string(),
            ));
        }
        if user.full_name.is_none() {
            return Err(AppError::BadRequest(
                "Complete your profile before applying to drive".to_string(),
            ));
        }

        let updated = UserRepository::new(self.db)
            .set_role_and_status(
                user.id,
                UserRole::Driver,
                UserStatus::PendingProfileCompletion,
            )
            .await?;

        tracing::info!("User {} applied to become a driver", user.id);

        Ok(updated)
    }

    /// Gets another user's public profile.
    ///
    /// # Returns
    /// - `Ok(User)` - The user; callers must convert with `into_public_dto`
    /// - `Err(AppError::NotFound)` - No such user, or the account is not active yet
    pub async fn get_public_profile(&self, user_id: i32) -> Result<User, AppError> {
        UserRepository::new(self.db)
            .find_by_id(user_id)
            .await?
            .filter(|user| user.status != UserStatus::PendingSmsVerification)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Stores or clears the device token used for push delivery.
    pub async fn set_push_token(
        &self,
        user_id: i32,
        push_token: Option<String>,
    ) -> Result<(), AppError> {
        let push_token = push_token
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());

        UserRepository::new(self.db)
            .set_push_token(user_id, push_token)
            .await?;

        Ok(())
    }

    /// Closes the caller's account.
    ///
    /// Upcoming trips the user drives are cancelled, which cancels their bookings and
    /// expires negotiations on them. The user's own upcoming bookings are cancelled and
    /// their unresolved negotiations withdrawn. The account is marked `deactivated` last,
    /// so a failure part way leaves it usable and the call can be repeated.
    ///
    /// # Arguments
    /// - `user` - The authenticated user
    /// - `reason` - Optional reason copied to cancelled trips and bookings
    ///
    /// # Returns
    /// - `Ok(Deactivation)` - What was cancelled on the way
    /// - `Err(AppError)` - A cancellation or the status update failed
    pub async fn deactivate(
        &self,
        user: &User,
        reason: Option<String>,
    ) -> Result<Deactivation, AppError> {
        let reason = reason
            .map(|reason| reason.trim().to_string())
            .filter(|reason| !reason.is_empty());
        let mut report = Deactivation::default();

        let trip_service = TripService::new(self.db);
        for trip in TripRepository::new(self.db)
            .get_upcoming_by_driver(user.id)
            .await?
        {
            trip_service.cancel(user.id, trip.id, reason.clone()).await?;
            report.trips_cancelled += 1;
        }

        let booking_service = BookingService::new(self.db);
        for booking in BookingRepository::new(self.db)
            .get_upcoming_by_passenger(user.id)
            .await?
        {
            booking_service
                .cancel(user.id, booking.id, reason.clone())
                .await?;
            report.bookings_cancelled += 1;
        }

        let negotiation_service = NegotiationService::new(self.db);
        for chain in NegotiationRepository::new(self.db)
            .get_unresolved_by_passenger(user.id)
            .await?
        {
            negotiation_service.cancel(user.id, chain.id).await?;
            report.negotiations_cancelled += 1;
        }

        UserRepository::new(self.db)
            .set_status(user.id, UserStatus::Deactivated)
            .await?;

        tracing::info!(
            "User {} deactivated their account ({} trips, {} bookings, {} negotiations cancelled)",
            user.id,
            report.trips_cancelled,
            report.bookings_cancelled,
            report.negotiations_cancelled
        );

        Ok(report)
    }
}

/// Loose shape check: one `@` with text on both sides and a dot in the domain.
fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_email_shapes() {
        assert!(is_plausible_email("driver@autoport.uz"));
        assert!(is_plausible_email("a.b@mail.example.com"));
    }

    #[test]
    fn rejects_malformed_emails() {
        assert!(!is_plausible_email("driver"));
        assert!(!is_plausible_email("@autoport.uz"));
        assert!(!is_plausible_email("driver@autoport"));
        assert!(!is_plausible_email("a@b@c.uz"));
    }
}
