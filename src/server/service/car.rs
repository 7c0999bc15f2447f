//! Car registry for drivers.
//!
//! New cars start in `PendingVerification` and must be approved by an administrator
//! before they can be used to publish trips.

use sea_orm::{DatabaseConnection, TransactionTrait};

use crate::server::{
    data::{car::CarRepository, trip::TripRepository},
    error::AppError,
    model::car::{Car, CreateCarParams, UpdateCarParams},
};

/// Smallest number of seats a car may declare, driver included.
pub const MIN_CAR_SEATS: i32 = 2;
/// Largest number of seats a car may declare, driver included.
pub const MAX_CAR_SEATS: i32 = 9;

pub struct CarService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CarService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Registers a car. The driver's first car becomes the default.
    ///
    /// # Arguments
    /// - `params` - Car details; the plate is already normalized
    ///
    /// # Returns
    /// - `Ok(Car)` - Car awaiting verification
    /// - `Err(AppError::BadRequest)` - Missing make/model/plate or seats outside 2..=9
    /// - `Err(AppError::Conflict)` - License plate already registered
    pub async fn create(&self, params: CreateCarParams) -> Result<Car, AppError> {
        if params.make.is_empty() || params.model.is_empty() {
            return Err(AppError::BadRequest(
                "Make and model are required".to_string(),
            ));
        }
        if params.license_plate.is_empty() {
            return Err(AppError::BadRequest("License plate is required".to_string()));
        }
        validate_seats(params.seats_count)?;

        let txn = self.db.begin().await?;
        let repo = CarRepository::new(&txn);

        if repo.find_by_plate(&params.license_plate).await?.is_some() {
            return Err(AppError::Conflict(
                "A car with this license plate is already registered".to_string(),
            ));
        }

        let is_default = repo.count_by_driver(params.driver_id).await? == 0;
        let car = repo.create(params, is_default).await?;
        txn.commit().await?;

        tracing::info!("Driver {} registered car {}", car.driver_id, car.id);

        Ok(car)
    }

    /// Gets the driver's cars, default first.
    pub async fn get_mine(&self, driver_id: i32) -> Result<Vec<Car>, AppError> {
        Ok(CarRepository::new(self.db).get_by_driver(driver_id).await?)
    }

    /// Gets one of the driver's cars.
    ///
    /// # Returns
    /// - `Ok(Car)` - The car
    /// - `Err(AppError::NotFound)` - No such car, or it belongs to another driver
    pub async fn get(&self, driver_id: i32, car_id: i32) -> Result<Car, AppError> {
        CarRepository::new(self.db)
            .find_by_id(car_id)
            .await?
            .filter(|car| car.driver_id == driver_id)
            .ok_or_else(|| AppError::NotFound("Car not found".to_string()))
    }

    /// Updates a car. Changing the plate sends it back to verification.
    pub async fn update(
        &self,
        driver_id: i32,
        car_id: i32,
        params: UpdateCarParams,
    ) -> Result<Car, AppError> {
        if let Some(seats) = params.seats_count {
            validate_seats(seats)?;
        }

        let car = self.get(driver_id, car_id).await?;

        if let Some(plate) = params.license_plate.as_deref() {
            if plate.is_empty() {
                return Err(AppError::BadRequest("License plate is required".to_string()));
            }
            if plate != car.license_plate
                && CarRepository::new(self.db)
                    .find_by_plate(plate)
                    .await?
                    .is_some()
            {
                return Err(AppError::Conflict(
                    "A car with this license plate is already registered".to_string(),
                ));
            }
        }

        Ok(CarRepository::new(self.db).update(car.id, params).await?)
    }

    /// Deletes a car that has no scheduled, full or running trips.
    ///
    /// When the default car is removed the oldest remaining car becomes the default.
    ///
    /// # Returns
    /// - `Ok(())` - Car deleted
    /// - `Err(AppError::NotFound)` - No such car for this driver
    /// - `Err(AppError::Conflict)` - The car still has active trips
    pub async fn delete(&self, driver_id: i32, car_id: i32) -> Result<(), AppError> {
        let car = self.get(driver_id, car_id).await?;

        let txn = self.db.begin().await?;
        let repo = CarRepository::new(&txn);

        if TripRepository::new(&txn).count_active_for_car(car.id).await? > 0 {
            return Err(AppError::Conflict(
                "Cannot delete a car with active trips".to_string(),
            ));
        }

        repo.delete(car.id).await?;
        if car.is_default {
            if let Some(next) = repo
                .get_by_driver(driver_id)
                .await?
                .into_iter()
                .min_by_key(|car| car.id)
            {
                repo.set_default(driver_id, next.id).await?;
            }
        }

        txn.commit().await?;

        Ok(())
    }

    /// Makes the car the driver's only default car.
    pub async fn set_default(&self, driver_id: i32, car_id: i32) -> Result<Car, AppError> {
        let car = self.get(driver_id, car_id).await?;

        let txn = self.db.begin().await?;
        CarRepository::new(&txn)
            .set_default(driver_id, car.id)
            .await?;
        txn.commit().await?;

        self.get(driver_id, car_id).await
    }
}

fn validate_seats(seats: i32) -> Result<(), AppError> {
    if !(MIN_CAR_SEATS..=MAX_CAR_SEATS).contains(&seats) {
        return Err(AppError::BadRequest(format!(
            "Seats count must be between {} and {}",
            MIN_CAR_SEATS, MAX_CAR_SEATS
        )));
    }
    Ok(())
}
