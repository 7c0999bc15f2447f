//! User domain models and parameters.
//!
//! Provides the domain model for riders and drivers identified by phone number, plus
//! parameter types for profile updates and administrative status changes.

use chrono::{DateTime, Utc};
use entity::sea_orm_active_enums::{Gender, UserRole, UserStatus};
use rust_decimal::Decimal;

use crate::model::user::{
    DeactivationDto, PublicProfileDto, UpdateProfileDto, UserDto, UserPageDto,
};

/// Registered user of the platform.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i32,
    /// Verified phone number in `+998XXXXXXXXX` form, the login identity
    pub phone_number: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<Gender>,
    pub role: UserRole,
    pub status: UserStatus,
    pub preferred_language: String,
    pub is_phone_verified: bool,
    /// Device token for push delivery
    pub push_token: Option<String>,
    pub rating_average: Decimal,
    pub rating_count: i32,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Converts an entity model to a user domain model at the repository boundary.
    pub fn from_entity(entity: entity::user::Model) -> Self {
        Self {
            id: entity.id,
            phone_number: entity.phone_number,
            full_name: entity.full_name,
            email: entity.email,
            gender: entity.gender,
            role: entity.role,
            status: entity.status,
            preferred_language: entity.preferred_language,
            is_phone_verified: entity.is_phone_verified,
            push_token: entity.push_token,
            rating_average: entity.rating_average,
            rating_count: entity.rating_count,
            created_at: entity.created_at,
        }
    }

    /// Converts the user domain model to a DTO for API responses.
    pub fn into_dto(self) -> UserDto {
        UserDto {
            id: self.id,
            phone_number: self.phone_number,
            full_name: self.full_name,
            email: self.email,
            gender: self.gender,
            role: self.role,
            status: self.status,
            preferred_language: self.preferred_language,
            is_phone_verified: self.is_phone_verified,
            rating_average: self.rating_average,
            rating_count: self.rating_count,
            created_at: self.created_at,
        }
    }

    /// Converts to the reduced profile other users may see.
    ///
    /// Contact details (phone, email) are never part of the public profile.
    pub fn into_public_dto(self) -> PublicProfileDto {
        PublicProfileDto {
            id: self.id,
            full_name: self.full_name,
            role: self.role,
            gender: self.gender,
            rating_average: self.rating_average,
            rating_count: self.rating_count,
            member_since: self.created_at,
        }
    }

    /// Display name used in notification texts.
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or("AutoPort user")
    }
}

/// Paginated collection of users.
#[derive(Debug, Clone)]
pub struct PaginatedUsers {
    pub users: Vec<User>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl PaginatedUsers {
    pub fn into_dto(self) -> UserPageDto {
        UserPageDto {
            users: self.users.into_iter().map(User::into_dto).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
        }
    }
}

/// Profile fields a user may change about themselves.
///
/// `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileParams {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<Gender>,
    pub preferred_language: Option<String>,
}

impl UpdateProfileParams {
    pub fn from_dto(dto: UpdateProfileDto) -> Self {
        Self {
            full_name: dto.full_name.map(|name| name.trim().to_string()),
            email: dto.email.map(|email| email.trim().to_lowercase()),
            gender: dto.gender,
            preferred_language: dto.preferred_language,
        }
    }
}

/// Counts of what an account deactivation cancelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deactivation {
    pub trips_cancelled: u32,
    pub bookings_cancelled: u32,
    pub negotiations_cancelled: u32,
}

impl Deactivation {
    pub fn into_dto(self) -> DeactivationDto {
        DeactivationDto {
            trips_cancelled: self.trips_cancelled,
            bookings_cancelled: self.bookings_cancelled,
            negotiations_cancelled: self.negotiations_cancelled,
        }
    }
}
