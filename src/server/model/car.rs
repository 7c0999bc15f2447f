//! Car domain models and parameters.

use chrono::{DateTime, Utc};
use entity::sea_orm_active_enums::{CarVerificationStatus, ComfortLevel};

use crate::model::car::{CarDto, CarPageDto, CreateCarDto, UpdateCarDto};

/// Vehicle registered by a driver.
///
/// Only cars with `Approved` verification status can be used to publish trips.
#[derive(Debug, Clone, PartialEq)]
pub struct Car {
    pub id: i32,
    pub driver_id: i32,
    pub make: String,
    pub model: String,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub license_plate: String,
    /// Total seats including the driver's
    pub seats_count: i32,
    pub comfort_level: ComfortLevel,
    pub verification_status: CarVerificationStatus,
    pub rejection_reason: Option<String>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

impl Car {
    pub fn from_entity(entity: entity::car::Model) -> Self {
        Self {
            id: entity.id,
            driver_id: entity.driver_id,
            make: entity.make,
            model: entity.model,
            year: entity.year,
            color: entity.color,
            license_plate: entity.license_plate,
            seats_count: entity.seats_count,
            comfort_level: entity.comfort_level,
            verification_status: entity.verification_status,
            rejection_reason: entity.rejection_reason,
            is_default: entity.is_default,
            created_at: entity.created_at,
        }
    }

    pub fn into_dto(self) -> CarDto {
        CarDto {
            id: self.id,
            driver_id: self.driver_id,
            make: self.make,
            model: self.model,
            year: self.year,
            color: self.color,
            license_plate: self.license_plate,
            seats_count: self.seats_count,
            comfort_level: self.comfort_level,
            verification_status: self.verification_status,
            rejection_reason: self.rejection_reason,
            is_default: self.is_default,
            created_at: self.created_at,
        }
    }
}

/// Paginated collection of cars, used by the verification queue.
#[derive(Debug, Clone)]
pub struct PaginatedCars {
    pub cars: Vec<Car>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl PaginatedCars {
    pub fn into_dto(self) -> CarPageDto {
        CarPageDto {
            cars: self.cars.into_iter().map(Car::into_dto).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
        }
    }
}

/// Parameters for registering a new car.
#[derive(Debug, Clone)]
pub struct CreateCarParams {
    pub driver_id: i32,
    pub make: String,
    pub model: String,
    pub year: Option<i32>,
    pub color: Option<String>,
    /// Normalized to upper case without spaces
    pub license_plate: String,
    pub seats_count: i32,
    pub comfort_level: ComfortLevel,
}

impl CreateCarParams {
    pub fn from_dto(driver_id: i32, dto: CreateCarDto) -> Self {
        Self {
            driver_id,
            make: dto.make.trim().to_string(),
            model: dto.model.trim().to_string(),
            year: dto.year,
            color: dto.color,
            license_plate: normalize_plate(&dto.license_plate),
            seats_count: dto.seats_count,
            comfort_level: dto.comfort_level,
        }
    }
}

/// Parameters for a partial car update.
#[derive(Debug, Clone, Default)]
pub struct UpdateCarParams {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub color: Option<String>,
    pub license_plate: Option<String>,
    pub seats_count: Option<i32>,
    pub comfort_level: Option<ComfortLevel>,
}

impl UpdateCarParams {
    pub fn from_dto(dto: UpdateCarDto) -> Self {
        Self {
            make: dto.make,
            model: dto.model,
            year: dto.year,
            color: dto.color,
            license_plate: dto.license_plate.as_deref().map(normalize_plate),
            seats_count: dto.seats_count,
            comfort_level: dto.comfort_level,
        }
    }
}

/// Upper-cases a license plate and drops whitespace so `01 a 123 bc` matches `01A123BC`.
pub fn normalize_plate(plate: &str) -> String {
    plate
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}
