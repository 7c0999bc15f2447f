//! Car data repository.
//!
//! Provides the `CarRepository` for driver vehicle records, default car selection, and
//! the administrative verification workflow.

use chrono::Utc;
use entity::sea_orm_active_enums::CarVerificationStatus;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::server::model::car::{Car, CreateCarParams, UpdateCarParams};

pub struct CarRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> CarRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Registers a car in `PendingVerification` status.
    ///
    /// # Arguments
    /// - `params` - Car details with the owning driver
    /// - `is_default` - Whether the car becomes the driver's default
    ///
    /// # Returns
    /// - `Ok(Car)` - The created car
    /// - `Err(DbErr)` - Database error, including a duplicate license plate
    pub async fn create(&self, params: CreateCarParams, is_default: bool) -> Result<Car, DbErr> {
        let now = Utc::now();
        let entity = entity::car::ActiveModel {
            driver_id: ActiveValue::Set(params.driver_id),
            make: ActiveValue::Set(params.make),
            model: ActiveValue::Set(params.model),
            year: ActiveValue::Set(params.year),
            color: ActiveValue::Set(params.color),
            license_plate: ActiveValue::Set(params.license_plate),
            seats_count: ActiveValue::Set(params.seats_count),
            comfort_level: ActiveValue::Set(params.comfort_level),
            verification_status: ActiveValue::Set(CarVerificationStatus::PendingVerification),
            rejection_reason: ActiveValue::Set(None),
            is_default: ActiveValue::Set(is_default),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Ok(Car::from_entity(entity))
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Car>, DbErr> {
        let entity = entity::prelude::Car::find_by_id(id).one(self.db).await?;

        Ok(entity.map(Car::from_entity))
    }

    /// Finds the car registered under a normalized license plate.
    pub async fn find_by_plate(&self, license_plate: &str) -> Result<Option<Car>, DbErr> {
        let entity = entity::prelude::Car::find()
            .filter(entity::car::Column::LicensePlate.eq(license_plate))
            .one(self.db)
            .await?;

        Ok(entity.map(Car::from_entity))
    }

    /// Gets a driver's cars, default car first.
    pub async fn get_by_driver(&self, driver_id: i32) -> Result<Vec<Car>, DbErr> {
        let cars = entity::prelude::Car::find()
            .filter(entity::car::Column::DriverId.eq(driver_id))
            .order_by_desc(entity::car::Column::IsDefault)
            .order_by_asc(entity::car::Column::Id)
            .all(self.db)
            .await?;

        Ok(cars.into_iter().map(Car::from_entity).collect())
    }

    pub async fn count_by_driver(&self, driver_id: i32) -> Result<u64, DbErr> {
        entity::prelude::Car::find()
            .filter(entity::car::Column::DriverId.eq(driver_id))
            .count(self.db)
            .await
    }

    /// Applies a partial update.
    ///
    /// A changed license plate resets verification to `PendingVerification`.
    ///
    /// # Returns
    /// - `Ok(Car)` - The updated car
    /// - `Err(DbErr::RecordNotFound)` - No car with that ID
    pub async fn update(&self, id: i32, params: UpdateCarParams) -> Result<Car, DbErr> {
        let existing = self.find_entity(id).await?;
        let plate_changed = params
            .license_plate
            .as_ref()
            .is_some_and(|plate| *plate != existing.license_plate);

        let mut car = existing.into_active_model();
        if let Some(make) = params.make {
            car.make = ActiveValue::Set(make);
        }
        if let Some(model) = params.model {
            car.model = ActiveValue::Set(model);
        }
        if let Some(year) = params.year {
            car.year = ActiveValue::Set(Some(year));
        }
        if let Some(color) = params.color {
            car.color = ActiveValue::Set(Some(color));
        }
        if let Some(seats_count) = params.seats_count {
            car.seats_count = ActiveValue::Set(seats_count);
        }
        if let Some(comfort_level) = params.comfort_level {
            car.comfort_level = ActiveValue::Set(comfort_level);
        }
        if let Some(license_plate) = params.license_plate {
            car.license_plate = ActiveValue::Set(license_plate);
        }
        if plate_changed {
            car.verification_status = ActiveValue::Set(CarVerificationStatus::PendingVerification);
            car.rejection_reason = ActiveValue::Set(None);
        }
        car.updated_at = ActiveValue::Set(Utc::now());

        Ok(Car::from_entity(car.update(self.db).await?))
    }

    pub async fn delete(&self, id: i32) -> Result<(), DbErr> {
        entity::prelude::Car::delete_by_id(id).exec(self.db).await?;
        Ok(())
    }

    /// Makes `car_id` the only default car of `driver_id`.
    pub async fn set_default(&self, driver_id: i32, car_id: i32) -> Result<(), DbErr> {
        entity::prelude::Car::update_many()
            .filter(entity::car::Column::DriverId.eq(driver_id))
            .col_expr(
                entity::car::Column::IsDefault,
                sea_orm::sea_query::Expr::value(false),
            )
            .exec(self.db)
            .await?;

        entity::prelude::Car::update_many()
            .filter(entity::car::Column::Id.eq(car_id))
            .filter(entity::car::Column::DriverId.eq(driver_id))
            .col_expr(
                entity::car::Column::IsDefault,
                sea_orm::sea_query::Expr::value(true),
            )
            .exec(self.db)
            .await?;
        Ok(())
    }

    /// Records an administrative verification decision.
    ///
    /// # Arguments
    /// - `id` - Car ID
    /// - `status` - `Approved` or `Rejected`
    /// - `reason` - Rejection reason, cleared on approval
    pub async fn set_verification(
        &self,
        id: i32,
        status: CarVerificationStatus,
        reason: Option<String>,
    ) -> Result<Car, DbErr> {
        let mut car = self.find_entity(id).await?.into_active_model();
        car.verification_status = ActiveValue::Set(status);
        car.rejection_reason = ActiveValue::Set(reason);
        car.updated_at = ActiveValue::Set(Utc::now());

        Ok(Car::from_entity(car.update(self.db).await?))
    }

    /// Gets cars awaiting verification, oldest first.
    pub async fn get_pending_paginated(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Car>, u64), DbErr> {
        let paginator = entity::prelude::Car::find()
            .filter(
                entity::car::Column::VerificationStatus
                    .eq(CarVerificationStatus::PendingVerification),
            )
            .order_by_asc(entity::car::Column::CreatedAt)
            .paginate(self.db, per_page);

        let total = paginator.num_items().await?;
        let cars = paginator.fetch_page(page).await?;

        Ok((cars.into_iter().map(Car::from_entity).collect(), total))
    }

    async fn find_entity(&self, id: i32) -> Result<entity::car::Model, DbErr> {
        entity::prelude::Car::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("Car with id {} not found", id)))
    }
}
