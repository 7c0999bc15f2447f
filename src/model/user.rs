use chrono::{DateTime, Utc};
use entity::sea_orm_active_enums::{Gender, UserRole, UserStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: i32,
    pub phone_number: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<Gender>,
    pub role: UserRole,
    pub status: UserStatus,
    pub preferred_language: String,
    pub is_phone_verified: bool,
    pub rating_average: Decimal,
    pub rating_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileDto {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<Gender>,
    pub preferred_language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicProfileDto {
    pub id: i32,
    pub full_name: Option<String>,
    pub role: UserRole,
    pub gender: Option<Gender>,
    pub rating_average: Decimal,
    pub rating_count: i32,
    pub member_since: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PushTokenDto {
    pub push_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserPageDto {
    pub users: Vec<UserDto>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

/// Reason attached to an administrative rejection.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RejectDto {
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DeactivateAccountDto {
    /// Shown to passengers whose bookings are cancelled
    pub reason: Option<String>,
}

/// What closing an account cancelled on the way.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeactivationDto {
    pub trips_cancelled: u32,
    pub bookings_cancelled: u32,
    pub negotiations_cancelled: u32,
}
