//! Car factory for creating test car entities.

use crate::factory::helpers::next_id;
use chrono::Utc;
use entity::sea_orm_active_enums::{CarVerificationStatus, ComfortLevel};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for creating test cars owned by a driver.
///
/// Cars are approved by default so trips can be published with them immediately.
pub struct CarFactory<'a> {
    db: &'a DatabaseConnection,
    driver_id: i32,
    license_plate: String,
    seats_count: i32,
    comfort_level: ComfortLevel,
    verification_status: CarVerificationStatus,
    is_default: bool,
}

impl<'a> CarFactory<'a> {
    /// Creates a new CarFactory with default values.
    ///
    /// Defaults:
    /// - license_plate: `01A{id}AA`
    /// - seats_count: `4`, comfort_level: `Economy`
    /// - verification_status: `Approved`, is_default: `true`
    pub fn new(db: &'a DatabaseConnection, driver_id: i32) -> Self {
        let id = next_id();
        Self {
            db,
            driver_id,
            license_plate: format!("01A{:05}AA", id),
            seats_count: 4,
            comfort_level: ComfortLevel::Economy,
            verification_status: CarVerificationStatus::Approved,
            is_default: true,
        }
    }

    pub fn license_plate(mut self, license_plate: impl Into<String>) -> Self {
        self.license_plate = license_plate.into();
        self
    }

    pub fn seats_count(mut self, seats_count: i32) -> Self {
        self.seats_count = seats_count;
        self
    }

    pub fn comfort_level(mut self, comfort_level: ComfortLevel) -> Self {
        self.comfort_level = comfort_level;
        self
    }

    pub fn verification_status(mut self, status: CarVerificationStatus) -> Self {
        self.verification_status = status;
        self
    }

    pub fn is_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    /// Builds and inserts the car entity into the database.
    pub async fn build(self) -> Result<entity::car::Model, DbErr> {
        let now = Utc::now();
        entity::car::ActiveModel {
            driver_id: ActiveValue::Set(self.driver_id),
            make: ActiveValue::Set("Chevrolet".to_string()),
            model: ActiveValue::Set("Cobalt".to_string()),
            year: ActiveValue::Set(Some(2021)),
            color: ActiveValue::Set(Some("white".to_string())),
            license_plate: ActiveValue::Set(self.license_plate),
            seats_count: ActiveValue::Set(self.seats_count),
            comfort_level: ActiveValue::Set(self.comfort_level),
            verification_status: ActiveValue::Set(self.verification_status),
            rejection_reason: ActiveValue::Set(None),
            is_default: ActiveValue::Set(self.is_default),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}

/// Creates an approved default car for `driver_id`.
pub async fn create_car(
    db: &DatabaseConnection,
    driver_id: i32,
) -> Result<entity::car::Model, DbErr> {
    CarFactory::new(db, driver_id).build().await
}
