use chrono::{DateTime, NaiveDate, Utc};
use entity::sea_orm_active_enums::TripStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TripDto {
    pub id: i32,
    pub driver_id: i32,
    pub car_id: i32,
    pub from_location: String,
    pub to_location: String,
    pub departure_datetime: DateTime<Utc>,
    pub estimated_arrival_datetime: Option<DateTime<Utc>>,
    pub price_per_seat: Decimal,
    pub total_seats_offered: i32,
    pub available_seats: i32,
    pub status: TripStatus,
    pub additional_info: Option<String>,
    pub is_instant_booking: bool,
    pub price_negotiable: bool,
    pub allow_smoking: bool,
    pub allow_pets: bool,
    pub allow_music: bool,
    pub female_only: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateTripDto {
    pub car_id: i32,
    pub from_location: String,
    pub to_location: String,
    pub departure_datetime: DateTime<Utc>,
    pub estimated_arrival_datetime: Option<DateTime<Utc>>,
    pub price_per_seat: Decimal,
    pub total_seats_offered: i32,
    pub additional_info: Option<String>,
    #[serde(default = "default_true")]
    pub is_instant_booking: bool,
    #[serde(default = "default_true")]
    pub price_negotiable: bool,
    #[serde(default)]
    pub allow_smoking: bool,
    #[serde(default)]
    pub allow_pets: bool,
    #[serde(default = "default_true")]
    pub allow_music: bool,
    #[serde(default)]
    pub female_only: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateTripDto {
    pub departure_datetime: Option<DateTime<Utc>>,
    pub estimated_arrival_datetime: Option<DateTime<Utc>>,
    pub price_per_seat: Option<Decimal>,
    pub total_seats_offered: Option<i32>,
    pub additional_info: Option<String>,
    pub is_instant_booking: Option<bool>,
    pub price_negotiable: Option<bool>,
    pub allow_smoking: Option<bool>,
    pub allow_pets: Option<bool>,
    pub allow_music: Option<bool>,
    pub female_only: Option<bool>,
}

/// Search filters for published trips.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct TripSearchQuery {
    /// Case-insensitive substring of the origin
    pub from_location: Option<String>,
    /// Case-insensitive substring of the destination
    pub to_location: Option<String>,
    /// Departure date (UTC)
    pub departure_date: Option<NaiveDate>,
    /// Minimum number of free seats, defaults to 1
    pub seats_needed: Option<i32>,
    #[serde(default)]
    pub page: u64,
    #[serde(default = "default_entries")]
    pub entries: u64,
}

fn default_entries() -> u64 {
    20
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TripPageDto {
    pub trips: Vec<TripDto>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CancelTripDto {
    pub reason: Option<String>,
}
