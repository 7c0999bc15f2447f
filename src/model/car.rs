use chrono::{DateTime, Utc};
use entity::sea_orm_active_enums::{CarVerificationStatus, ComfortLevel};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CarDto {
    pub id: i32,
    pub driver_id: i32,
    pub make: String,
    pub model: String,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub license_plate: String,
    pub seats_count: i32,
    pub comfort_level: ComfortLevel,
    pub verification_status: CarVerificationStatus,
    pub rejection_reason: Option<String>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateCarDto {
    pub make: String,
    pub model: String,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub license_plate: String,
    #[serde(default = "default_seats")]
    pub seats_count: i32,
    #[serde(default = "default_comfort")]
    pub comfort_level: ComfortLevel,
}

fn default_seats() -> i32 {
    4
}

fn default_comfort() -> ComfortLevel {
    ComfortLevel::Economy
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateCarDto {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub license_plate: Option<String>,
    pub seats_count: Option<i32>,
    pub comfort_level: Option<ComfortLevel>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CarPageDto {
    pub cars: Vec<CarDto>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}
