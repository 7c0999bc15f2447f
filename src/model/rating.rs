use chrono::{DateTime, Utc};
use entity::sea_orm_active_enums::RatingType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RatingDto {
    pub id: i32,
    pub trip_id: i32,
    pub booking_id: Option<i32>,
    pub rater_id: i32,
    pub rated_user_id: i32,
    pub rating_type: RatingType,
    pub score: i32,
    pub review: Option<String>,
    pub punctuality: Option<i32>,
    pub cleanliness: Option<i32>,
    pub communication: Option<i32>,
    pub driving_quality: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateRatingDto {
    pub trip_id: i32,
    pub rated_user_id: i32,
    pub score: i32,
    pub review: Option<String>,
    pub punctuality: Option<i32>,
    pub cleanliness: Option<i32>,
    pub communication: Option<i32>,
    pub driving_quality: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RatingSummaryDto {
    pub user_id: i32,
    pub average: Decimal,
    pub count: i32,
    /// Number of ratings per score, index 0 holds score 1
    pub distribution: Vec<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateRatingDto {
    pub score: i32,
    pub review: Option<String>,
    pub punctuality: Option<i32>,
    pub cleanliness: Option<i32>,
    pub communication: Option<i32>,
    pub driving_quality: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RateableUserDto {
    pub user_id: i32,
    /// Direction the rating would be recorded in
    pub rating_type: RatingType,
    pub booking_id: i32,
    pub already_rated: bool,
}

/// Whether the caller may rate the other side of a booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RatingEligibilityDto {
    pub can_rate: bool,
    /// Set when `can_rate` is false
    pub reason: Option<String>,
    pub trip_id: Option<i32>,
    pub rateable_users: Vec<RateableUserDto>,
}
