//! User data repository for database operations.
//!
//! This module provides the `UserRepository` for managing user records in the database.
//! It handles registration, profile updates, role and status changes, and rating
//! aggregates, converting entity models to the `User` domain model at the boundary.

use chrono::Utc;
use entity::sea_orm_active_enums::{UserRole, UserStatus};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::server::model::user::{UpdateProfileParams, User};

/// Repository providing database operations for user management.
pub struct UserRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> UserRepository<'a, C> {
    /// Creates a new UserRepository instance.
    ///
    /// # Arguments
    /// - `db` - Database connection or open transaction
    ///
    /// # Returns
    /// - `UserRepository` - New repository instance
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Finds a user by primary key.
    ///
    /// # Arguments
    /// - `id` - User ID
    ///
    /// # Returns
    /// - `Ok(Some(User))` - User found
    /// - `Ok(None)` - No user with that ID
    /// - `Err(DbErr)` - Database error during query
    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>, DbErr> {
        let entity = entity::prelude::User::find_by_id(id).one(self.db).await?;

        Ok(entity.map(User::from_entity))
    }

    /// Finds a user by their phone number.
    ///
    /// # Arguments
    /// - `phone_number` - Phone number in `+998XXXXXXXXX` form
    ///
    /// # Returns
    /// - `Ok(Some(User))` - User registered with that phone
    /// - `Ok(None)` - Phone not registered
    /// - `Err(DbErr)` - Database error during query
    pub async fn find_by_phone(&self, phone_number: &str) -> Result<Option<User>, DbErr> {
        let entity = entity::prelude::User::find()
            .filter(entity::user::Column::PhoneNumber.eq(phone_number))
            .one(self.db)
            .await?;

        Ok(entity.map(User::from_entity))
    }

    /// Creates a passenger account awaiting SMS verification.
    ///
    /// # Arguments
    /// - `phone_number` - Validated phone number
    ///
    /// # Returns
    /// - `Ok(User)` - The new user in `PendingSmsVerification` status
    /// - `Err(DbErr)` - Database error, including a unique violation on the phone
    pub async fn create_pending(&self, phone_number: &str) -> Result<User, DbErr> {
        let now = Utc::now();
        let entity = entity::user::ActiveModel {
            phone_number: ActiveValue::Set(phone_number.to_string()),
            full_name: ActiveValue::Set(None),
            email: ActiveValue::Set(None),
            gender: ActiveValue::Set(None),
            role: ActiveValue::Set(UserRole::Passenger),
            status: ActiveValue::Set(UserStatus::PendingSmsVerification),
            preferred_language: ActiveValue::Set("uz".to_string()),
            is_phone_verified: ActiveValue::Set(false),
            push_token: ActiveValue::Set(None),
            rating_average: ActiveValue::Set(Decimal::ZERO),
            rating_count: ActiveValue::Set(0),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Ok(User::from_entity(entity))
    }

    /// Completes registration after OTP verification.
    ///
    /// Sets the display name, marks the phone verified, and activates the account.
    ///
    /// # Arguments
    /// - `id` - ID of the pending user
    /// - `full_name` - Name entered during registration
    ///
    /// # Returns
    /// - `Ok(User)` - The activated user
    /// - `Err(DbErr::RecordNotFound)` - No user with that ID
    pub async fn activate(&self, id: i32, full_name: &str) -> Result<User, DbErr> {
        let mut user = self.find_entity(id).await?.into_active_model();
        user.full_name = ActiveValue::Set(Some(full_name.to_string()));
        user.is_phone_verified = ActiveValue::Set(true);
        user.status = ActiveValue::Set(UserStatus::Active);
        user.updated_at = ActiveValue::Set(Utc::now());

        Ok(User::from_entity(user.update(self.db).await?))
    }

    /// Applies a partial profile update.
    ///
    /// # Arguments
    /// - `id` - User ID
    /// - `params` - Fields to change, `None` values are left untouched
    ///
    /// # Returns
    /// - `Ok(User)` - The updated user
    /// - `Err(DbErr::RecordNotFound)` - No user with that ID
    pub async fn update_profile(
        &self,
        id: i32,
        params: UpdateProfileParams,
    ) -> Result<User, DbErr> {
        let mut user = self.find_entity(id).await?.into_active_model();
        if let Some(full_name) = params.full_name {
            user.full_name = ActiveValue::Set(Some(full_name));
        }
        if let Some(email) = params.email {
            user.email = ActiveValue::Set(Some(email));
        }
        if let Some(gender) = params.gender {
            user.gender = ActiveValue::Set(Some(gender));
        }
        if let Some(language) = params.preferred_language {
            user.preferred_language = ActiveValue::Set(language);
        }
        user.updated_at = ActiveValue::Set(Utc::now());

        Ok(User::from_entity(user.update(self.db).await?))
    }

    /// Sets both the role and the status of a user.
    ///
    /// Used when a passenger applies to drive and when an administrator decides on
    /// the application.
    pub async fn set_role_and_status(
        &self,
        id: i32,
        role: UserRole,
        status: UserStatus,
    ) -> Result<User, DbErr> {
        let mut user = self.find_entity(id).await?.into_active_model();
        user.role = ActiveValue::Set(role);
        user.status = ActiveValue::Set(status);
        user.updated_at = ActiveValue::Set(Utc::now());

        Ok(User::from_entity(user.update(self.db).await?))
    }

    /// Sets the account status (block, unblock).
    pub async fn set_status(&self, id: i32, status: UserStatus) -> Result<User, DbErr> {
        let mut user = self.find_entity(id).await?.into_active_model();
        user.status = ActiveValue::Set(status);
        user.updated_at = ActiveValue::Set(Utc::now());

        Ok(User::from_entity(user.update(self.db).await?))
    }

    /// Stores the device token used for push delivery.
    pub async fn set_push_token(&self, id: i32, push_token: Option<String>) -> Result<(), DbErr> {
        entity::prelude::User::update_many()
            .filter(entity::user::Column::Id.eq(id))
            .col_expr(
                entity::user::Column::PushToken,
                sea_orm::sea_query::Expr::value(push_token),
            )
            .col_expr(
                entity::user::Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(Utc::now()),
            )
            .exec(self.db)
            .await?;
        Ok(())
    }

    /// Writes the cached rating aggregate of a user.
    ///
    /// # Arguments
    /// - `id` - Rated user's ID
    /// - `average` - Mean score rounded to two decimals
    /// - `count` - Number of ratings received
    pub async fn update_rating(&self, id: i32, average: Decimal, count: i32) -> Result<(), DbErr> {
        entity::prelude::User::update_many()
            .filter(entity::user::Column::Id.eq(id))
            .col_expr(
                entity::user::Column::RatingAverage,
                sea_orm::sea_query::Expr::value(average),
            )
            .col_expr(
                entity::user::Column::RatingCount,
                sea_orm::sea_query::Expr::value(count),
            )
            .exec(self.db)
            .await?;
        Ok(())
    }

    /// Gets drivers awaiting administrative approval, oldest application first.
    ///
    /// # Arguments
    /// - `page` - Zero-indexed page number
    /// - `per_page` - Number of users per page
    ///
    /// # Returns
    /// - `Ok((Vec<User>, u64))` - Users on the page and total matching users
    /// - `Err(DbErr)` - Database error during query
    pub async fn get_pending_drivers_paginated(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<User>, u64), DbErr> {
        let paginator = entity::prelude::User::find()
            .filter(entity::user::Column::Role.eq(UserRole::Driver))
            .filter(entity::user::Column::Status.eq(UserStatus::PendingProfileCompletion))
            .order_by_asc(entity::user::Column::UpdatedAt)
            .paginate(self.db, per_page);

        let total = paginator.num_items().await?;
        let users = paginator.fetch_page(page).await?;

        Ok((users.into_iter().map(User::from_entity).collect(), total))
    }

    /// Gets all active administrators, used for emergency escalation.
    pub async fn get_active_admins(&self) -> Result<Vec<User>, DbErr> {
        let admins = entity::prelude::User::find()
            .filter(entity::user::Column::Role.eq(UserRole::Admin))
            .filter(entity::user::Column::Status.eq(UserStatus::Active))
            .order_by_asc(entity::user::Column::Id)
            .all(self.db)
            .await?;

        Ok(admins.into_iter().map(User::from_entity).collect())
    }

    /// IDs of active users, optionally only those holding `role`.
    pub async fn get_active_ids(&self, role: Option<UserRole>) -> Result<Vec<i32>, DbErr> {
        let mut query = entity::prelude::User::find()
            .filter(entity::user::Column::Status.eq(UserStatus::Active));
        if let Some(role) = role {
            query = query.filter(entity::user::Column::Role.eq(role));
        }

        let users = query
            .order_by_asc(entity::user::Column::Id)
            .all(self.db)
            .await?;

        Ok(users.into_iter().map(|user| user.id).collect())
    }

    async fn find_entity(&self, id: i32) -> Result<entity::user::Model, DbErr> {
        entity::prelude::User::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("User with id {} not found", id)))
    }
}
