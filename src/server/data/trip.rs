//! Trip data repository.
//!
//! Besides CRUD this repository owns seat accounting. Seat counts and status are only
//! ever written through `set_seats_if_unchanged`, a compare-and-swap on
//! `available_seats` and `status` that fails when another request changed either first.

use chrono::{DateTime, Days, NaiveTime, Utc};
use entity::sea_orm_active_enums::TripStatus;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, ExprTrait, Func},
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::server::model::trip::{CreateTripParams, Trip, TripSearchParams, UpdateTripParams};

pub struct TripRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> TripRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Publishes a trip with all offered seats available.
    ///
    /// # Arguments
    /// - `params` - Validated trip parameters
    ///
    /// # Returns
    /// - `Ok(Trip)` - The created trip in `Scheduled` status
    /// - `Err(DbErr)` - Database error during insert
    pub async fn create(&self, params: CreateTripParams) -> Result<Trip, DbErr> {
        let now = Utc::now();
        let entity = entity::trip::ActiveModel {
            driver_id: ActiveValue::Set(params.driver_id),
            car_id: ActiveValue::Set(params.car_id),
            from_location: ActiveValue::Set(params.from_location),
            to_location: ActiveValue::Set(params.to_location),
            departure_datetime: ActiveValue::Set(params.departure_datetime),
            estimated_arrival_datetime: ActiveValue::Set(params.estimated_arrival_datetime),
            price_per_seat: ActiveValue::Set(params.price_per_seat),
            total_seats_offered: ActiveValue::Set(params.total_seats_offered),
            available_seats: ActiveValue::Set(params.total_seats_offered),
            status: ActiveValue::Set(TripStatus::Scheduled),
            additional_info: ActiveValue::Set(params.additional_info),
            is_instant_booking: ActiveValue::Set(params.is_instant_booking),
            price_negotiable: ActiveValue::Set(params.price_negotiable),
            allow_smoking: ActiveValue::Set(params.allow_smoking),
            allow_pets: ActiveValue::Set(params.allow_pets),
            allow_music: ActiveValue::Set(params.allow_music),
            female_only: ActiveValue::Set(params.female_only),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Ok(Trip::from_entity(entity))
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Trip>, DbErr> {
        let entity = entity::prelude::Trip::find_by_id(id).one(self.db).await?;

        Ok(entity.map(Trip::from_entity))
    }

    /// Searches bookable trips.
    ///
    /// Only `Scheduled` trips departing after `now` with at least `seats_needed` free seats
    /// are returned, soonest departure first. Location filters are case-insensitive
    /// substring matches.
    ///
    /// # Arguments
    /// - `params` - Search filters and pagination
    /// - `now` - Reference instant for "future departure"
    ///
    /// # Returns
    /// - `Ok((Vec<Trip>, u64))` - Trips on the requested page and the total match count
    /// - `Err(DbErr)` - Database error during query
    pub async fn search(
        &self,
        params: &TripSearchParams,
        now: DateTime<Utc>,
    ) -> Result<(Vec<Trip>, u64), DbErr> {
        let mut query = entity::prelude::Trip::find()
            .filter(entity::trip::Column::Status.eq(TripStatus::Scheduled))
            .filter(entity::trip::Column::DepartureDatetime.gt(now))
            .filter(entity::trip::Column::AvailableSeats.gte(params.seats_needed));

        if let Some(from) = &params.from_location {
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(entity::trip::Column::FromLocation)))
                    .like(format!("%{}%", from.to_lowercase())),
            );
        }
        if let Some(to) = &params.to_location {
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(entity::trip::Column::ToLocation)))
                    .like(format!("%{}%", to.to_lowercase())),
            );
        }
        if let Some(date) = params.departure_date {
            let start = date.and_time(NaiveTime::MIN).and_utc();
            if let Some(end) = start.checked_add_days(Days::new(1)) {
                query = query
                    .filter(entity::trip::Column::DepartureDatetime.gte(start))
                    .filter(entity::trip::Column::DepartureDatetime.lt(end));
            }
        }

        let paginator = query
            .order_by_asc(entity::trip::Column::DepartureDatetime)
            .order_by_asc(entity::trip::Column::Id)
            .paginate(self.db, params.per_page);

        let total = paginator.num_items().await?;
        let trips = paginator.fetch_page(params.page).await?;

        Ok((trips.into_iter().map(Trip::from_entity).collect(), total))
    }

    /// Gets a driver's trips, latest departure first.
    pub async fn get_by_driver_paginated(
        &self,
        driver_id: i32,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Trip>, u64), DbErr> {
        let paginator = entity::prelude::Trip::find()
            .filter(entity::trip::Column::DriverId.eq(driver_id))
            .order_by_desc(entity::trip::Column::DepartureDatetime)
            .paginate(self.db, per_page);

        let total = paginator.num_items().await?;
        let trips = paginator.fetch_page(page).await?;

        Ok((trips.into_iter().map(Trip::from_entity).collect(), total))
    }

    /// Gets a driver's trips that have not departed, earliest departure first.
    pub async fn get_upcoming_by_driver(&self, driver_id: i32) -> Result<Vec<Trip>, DbErr> {
        let trips = entity::prelude::Trip::find()
            .filter(entity::trip::Column::DriverId.eq(driver_id))
            .filter(
                entity::trip::Column::Status.is_in([TripStatus::Scheduled, TripStatus::Full]),
            )
            .order_by_asc(entity::trip::Column::DepartureDatetime)
            .all(self.db)
            .await?;

        Ok(trips.into_iter().map(Trip::from_entity).collect())
    }

    /// Applies a partial update to the descriptive fields of a trip.
    ///
    /// Seat counts and status are not touched here; those go through
    /// `set_seats_if_unchanged`.
    pub async fn update(&self, id: i32, params: UpdateTripParams) -> Result<Trip, DbErr> {
        let mut trip = self.find_entity(id).await?.into_active_model();
        if let Some(departure) = params.departure_datetime {
            trip.departure_datetime = ActiveValue::Set(departure);
        }
        if let Some(arrival) = params.estimated_arrival_datetime {
            trip.estimated_arrival_datetime = ActiveValue::Set(Some(arrival));
        }
        if let Some(price) = params.price_per_seat {
            trip.price_per_seat = ActiveValue::Set(price);
        }
        if let Some(info) = params.additional_info {
            trip.additional_info = ActiveValue::Set(Some(info));
        }
        if let Some(value) = params.is_instant_booking {
            trip.is_instant_booking = ActiveValue::Set(value);
        }
        if let Some(value) = params.price_negotiable {
            trip.price_negotiable = ActiveValue::Set(value);
        }
        if let Some(value) = params.allow_smoking {
            trip.allow_smoking = ActiveValue::Set(value);
        }
        if let Some(value) = params.allow_pets {
            trip.allow_pets = ActiveValue::Set(value);
        }
        if let Some(value) = params.allow_music {
            trip.allow_music = ActiveValue::Set(value);
        }
        if let Some(value) = params.female_only {
            trip.female_only = ActiveValue::Set(value);
        }
        trip.updated_at = ActiveValue::Set(Utc::now());

        Ok(Trip::from_entity(trip.update(self.db).await?))
    }

    /// Compare-and-swap on the seat count and status.
    ///
    /// Writes the new seat counts and status only while the row still holds the
    /// `available_seats` and `status` seen in `expected`. A trip cancelled or booked by
    /// another request in the meantime is left untouched.
    ///
    /// # Arguments
    /// - `expected` - Snapshot the caller based its decision on
    /// - `total_seats` - New `total_seats_offered`
    /// - `available_seats` - New `available_seats`
    /// - `status` - New status
    ///
    /// # Returns
    /// - `Ok(true)` - The row was updated
    /// - `Ok(false)` - Seats or status changed concurrently, nothing was written
    /// - `Err(DbErr)` - Database error during update
    pub async fn set_seats_if_unchanged(
        &self,
        expected: &Trip,
        total_seats: i32,
        available_seats: i32,
        status: TripStatus,
    ) -> Result<bool, DbErr> {
        let result = entity::prelude::Trip::update_many()
            .filter(entity::trip::Column::Id.eq(expected.id))
            .filter(entity::trip::Column::AvailableSeats.eq(expected.available_seats))
            .filter(entity::trip::Column::Status.eq(expected.status))
            .col_expr(entity::trip::Column::TotalSeatsOffered, Expr::value(total_seats))
            .col_expr(entity::trip::Column::AvailableSeats, Expr::value(available_seats))
            .col_expr(entity::trip::Column::Status, Expr::value(status))
            .col_expr(entity::trip::Column::UpdatedAt, Expr::value(Utc::now()))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Moves the trip to `status` while seats and status still match `expected`.
    ///
    /// # Returns
    /// - `Ok(true)` - The row was updated
    /// - `Ok(false)` - The trip changed concurrently, nothing was written
    /// - `Err(DbErr)` - Database error during update
    pub async fn set_status_if_unchanged(
        &self,
        expected: &Trip,
        status: TripStatus,
    ) -> Result<bool, DbErr> {
        self.set_seats_if_unchanged(
            expected,
            expected.total_seats_offered,
            expected.available_seats,
            status,
        )
        .await
    }

    /// Counts a car's trips that have not yet departed or finished.
    pub async fn count_active_for_car(&self, car_id: i32) -> Result<u64, DbErr> {
        entity::prelude::Trip::find()
            .filter(entity::trip::Column::CarId.eq(car_id))
            .filter(entity::trip::Column::Status.is_in([
                TripStatus::Scheduled,
                TripStatus::Full,
                TripStatus::InProgress,
            ]))
            .count(self.db)
            .await
    }

    /// Seat prices of completed and scheduled trips on a route.
    ///
    /// Locations are matched case-insensitively.
    pub async fn route_prices(&self, from: &str, to: &str) -> Result<Vec<Decimal>, DbErr> {
        let trips = entity::prelude::Trip::find()
            .filter(
                entity::trip::Column::Status
                    .is_in([TripStatus::Completed, TripStatus::Scheduled]),
            )
            .filter(
                Expr::expr(Func::lower(Expr::col(entity::trip::Column::FromLocation)))
                    .like(from.trim().to_lowercase()),
            )
            .filter(
                Expr::expr(Func::lower(Expr::col(entity::trip::Column::ToLocation)))
                    .like(to.trim().to_lowercase()),
            )
            .all(self.db)
            .await?;

        Ok(trips.into_iter().map(|trip| trip.price_per_seat).collect())
    }

    async fn find_entity(&self, id: i32) -> Result<entity::trip::Model, DbErr> {
        entity::prelude::Trip::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("Trip with id {} not found", id)))
    }
}
