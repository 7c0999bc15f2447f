//! Trip domain models and parameters.

use chrono::{DateTime, NaiveDate, Utc};
use entity::sea_orm_active_enums::TripStatus;
use rust_decimal::Decimal;

use crate::model::trip::{CreateTripDto, TripDto, TripPageDto, TripSearchQuery, UpdateTripDto};

/// A published intercity trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
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

impl Trip {
    pub fn from_entity(entity: entity::trip::Model) -> Self {
        Self {
            id: entity.id,
            driver_id: entity.driver_id,
            car_id: entity.car_id,
            from_location: entity.from_location,
            to_location: entity.to_location,
            departure_datetime: entity.departure_datetime,
            estimated_arrival_datetime: entity.estimated_arrival_datetime,
            price_per_seat: entity.price_per_seat,
            total_seats_offered: entity.total_seats_offered,
            available_seats: entity.available_seats,
            status: entity.status,
            additional_info: entity.additional_info,
            is_instant_booking: entity.is_instant_booking,
            price_negotiable: entity.price_negotiable,
            allow_smoking: entity.allow_smoking,
            allow_pets: entity.allow_pets,
            allow_music: entity.allow_music,
            female_only: entity.female_only,
            created_at: entity.created_at,
        }
    }

    pub fn into_dto(self) -> TripDto {
        TripDto {
            id: self.id,
            driver_id: self.driver_id,
            car_id: self.car_id,
            from_location: self.from_location,
            to_location: self.to_location,
            departure_datetime: self.departure_datetime,
            estimated_arrival_datetime: self.estimated_arrival_datetime,
            price_per_seat: self.price_per_seat,
            total_seats_offered: self.total_seats_offered,
            available_seats: self.available_seats,
            status: self.status,
            additional_info: self.additional_info,
            is_instant_booking: self.is_instant_booking,
            price_negotiable: self.price_negotiable,
            allow_smoking: self.allow_smoking,
            allow_pets: self.allow_pets,
            allow_music: self.allow_music,
            female_only: self.female_only,
            created_at: self.created_at,
        }
    }

    /// Seats currently held by confirmed bookings.
    pub fn booked_seats(&self) -> i32 {
        self.total_seats_offered - self.available_seats
    }

    /// Whether the trip still accepts bookings and offers.
    pub fn is_bookable(&self, now: DateTime<Utc>) -> bool {
        self.status == TripStatus::Scheduled && self.departure_datetime > now
    }

    /// Short route label used in notification texts, e.g. `Tashkent → Samarkand`.
    pub fn route(&self) -> String {
        format!("{} → {}", self.from_location, self.to_location)
    }
}

/// Paginated collection of trips.
#[derive(Debug, Clone)]
pub struct PaginatedTrips {
    pub trips: Vec<Trip>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl PaginatedTrips {
    pub fn into_dto(self) -> TripPageDto {
        TripPageDto {
            trips: self.trips.into_iter().map(Trip::into_dto).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
        }
    }
}

/// Parameters for publishing a trip.
#[derive(Debug, Clone)]
pub struct CreateTripParams {
    pub driver_id: i32,
    pub car_id: i32,
    pub from_location: String,
    pub to_location: String,
    pub departure_datetime: DateTime<Utc>,
    pub estimated_arrival_datetime: Option<DateTime<Utc>>,
    pub price_per_seat: Decimal,
    pub total_seats_offered: i32,
    pub additional_info: Option<String>,
    pub is_instant_booking: bool,
    pub price_negotiable: bool,
    pub allow_smoking: bool,
    pub allow_pets: bool,
    pub allow_music: bool,
    pub female_only: bool,
}

impl CreateTripParams {
    pub fn from_dto(driver_id: i32, dto: CreateTripDto) -> Self {
        Self {
            driver_id,
            car_id: dto.car_id,
            from_location: dto.from_location.trim().to_string(),
            to_location: dto.to_location.trim().to_string(),
            departure_datetime: dto.departure_datetime,
            estimated_arrival_datetime: dto.estimated_arrival_datetime,
            price_per_seat: dto.price_per_seat,
            total_seats_offered: dto.total_seats_offered,
            additional_info: dto.additional_info,
            is_instant_booking: dto.is_instant_booking,
            price_negotiable: dto.price_negotiable,
            allow_smoking: dto.allow_smoking,
            allow_pets: dto.allow_pets,
            allow_music: dto.allow_music,
            female_only: dto.female_only,
        }
    }
}

/// Partial trip update. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateTripParams {
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

impl UpdateTripParams {
    pub fn from_dto(dto: UpdateTripDto) -> Self {
        Self {
            departure_datetime: dto.departure_datetime,
            estimated_arrival_datetime: dto.estimated_arrival_datetime,
            price_per_seat: dto.price_per_seat,
            total_seats_offered: dto.total_seats_offered,
            additional_info: dto.additional_info,
            is_instant_booking: dto.is_instant_booking,
            price_negotiable: dto.price_negotiable,
            allow_smoking: dto.allow_smoking,
            allow_pets: dto.allow_pets,
            allow_music: dto.allow_music,
            female_only: dto.female_only,
        }
    }
}

/// Search filters applied to scheduled, future trips.
#[derive(Debug, Clone)]
pub struct TripSearchParams {
    pub from_location: Option<String>,
    pub to_location: Option<String>,
    pub departure_date: Option<NaiveDate>,
    pub seats_needed: i32,
    pub page: u64,
    pub per_page: u64,
}

impl TripSearchParams {
    pub fn from_query(query: TripSearchQuery) -> Self {
        Self {
            from_location: query
                .from_location
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            to_location: query
                .to_location
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            departure_date: query.departure_date,
            seats_needed: query.seats_needed.unwrap_or(1).max(1),
            page: query.page,
            per_page: query.entries.clamp(1, 100),
        }
    }
}
