//! Booking data repository.

use chrono::Utc;
use entity::sea_orm_active_enums::{BookingStatus, TripStatus};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait,
    IntoActiveModel, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait,
};

use crate::server::model::booking::{Booking, NewBooking};

pub struct BookingRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> BookingRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Inserts a confirmed booking.
    ///
    /// Seat accounting on the trip is the caller's responsibility.
    ///
    /// # Arguments
    /// - `booking` - Row values
    ///
    /// # Returns
    /// - `Ok(Booking)` - The created booking
    /// - `Err(DbErr)` - Database error during insert
    pub async fn create(&self, booking: NewBooking) -> Result<Booking, DbErr> {
        let now = Utc::now();
        let entity = entity::booking::ActiveModel {
            trip_id: ActiveValue::Set(booking.trip_id),
            passenger_id: ActiveValue::Set(booking.passenger_id),
            seats_booked: ActiveValue::Set(booking.seats_booked),
            total_price: ActiveValue::Set(booking.total_price),
            status: ActiveValue::Set(BookingStatus::Confirmed),
            pickup_location: ActiveValue::Set(booking.pickup_location),
            dropoff_location: ActiveValue::Set(booking.dropoff_location),
            special_requests: ActiveValue::Set(booking.special_requests),
            payment_method: ActiveValue::Set(booking.payment_method.to_string()),
            negotiation_id: ActiveValue::Set(booking.negotiation_id),
            cancellation_reason: ActiveValue::Set(None),
            booked_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Ok(Booking::from_entity(entity))
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Booking>, DbErr> {
        let entity = entity::prelude::Booking::find_by_id(id).one(self.db).await?;

        Ok(entity.map(Booking::from_entity))
    }

    /// Finds the passenger's confirmed booking on a trip, if any.
    pub async fn find_confirmed(
        &self,
        trip_id: i32,
        passenger_id: i32,
    ) -> Result<Option<Booking>, DbErr> {
        let entity = entity::prelude::Booking::find()
            .filter(entity::booking::Column::TripId.eq(trip_id))
            .filter(entity::booking::Column::PassengerId.eq(passenger_id))
            .filter(entity::booking::Column::Status.eq(BookingStatus::Confirmed))
            .one(self.db)
            .await?;

        Ok(entity.map(Booking::from_entity))
    }

    /// Finds the booking that links a passenger to a trip for rating purposes.
    ///
    /// Confirmed bookings and bookings cancelled by the driver both count as having
    /// traveled together.
    pub async fn find_shared_trip_booking(
        &self,
        trip_id: i32,
        passenger_id: i32,
    ) -> Result<Option<Booking>, DbErr> {
        let entity = entity::prelude::Booking::find()
            .filter(entity::booking::Column::TripId.eq(trip_id))
            .filter(entity::booking::Column::PassengerId.eq(passenger_id))
            .filter(
                entity::booking::Column::Status
                    .is_in([BookingStatus::Confirmed, BookingStatus::CancelledByDriver]),
            )
            .order_by_desc(entity::booking::Column::BookedAt)
            .one(self.db)
            .await?;

        Ok(entity.map(Booking::from_entity))
    }

    /// Gets a passenger's bookings, newest first.
    pub async fn get_by_passenger_paginated(
        &self,
        passenger_id: i32,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Booking>, u64), DbErr> {
        let paginator = entity::prelude::Booking::find()
            .filter(entity::booking::Column::PassengerId.eq(passenger_id))
            .order_by_desc(entity::booking::Column::BookedAt)
            .order_by_desc(entity::booking::Column::Id)
            .paginate(self.db, per_page);

        let total = paginator.num_items().await?;
        let bookings = paginator.fetch_page(page).await?;

        Ok((bookings.into_iter().map(Booking::from_entity).collect(), total))
    }

    /// Gets bookings on any trip driven by `driver_id`, newest first.
    pub async fn get_for_driver_paginated(
        &self,
        driver_id: i32,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Booking>, u64), DbErr> {
        let paginator = entity::prelude::Booking::find()
            .join(JoinType::InnerJoin, entity::booking::Relation::Trip.def())
            .filter(entity::trip::Column::DriverId.eq(driver_id))
            .order_by_desc(entity::booking::Column::BookedAt)
            .order_by_desc(entity::booking::Column::Id)
            .paginate(self.db, per_page);

        let total = paginator.num_items().await?;
        let bookings = paginator.fetch_page(page).await?;

        Ok((bookings.into_iter().map(Booking::from_entity).collect(), total))
    }

    /// Gets the confirmed bookings of a trip in booking order.
    pub async fn get_confirmed_by_trip(&self, trip_id: i32) -> Result<Vec<Booking>, DbErr> {
        let bookings = entity::prelude::Booking::find()
            .filter(entity::booking::Column::TripId.eq(trip_id))
            .filter(entity::booking::Column::Status.eq(BookingStatus::Confirmed))
            .order_by_asc(entity::booking::Column::Id)
            .all(self.db)
            .await?;

        Ok(bookings.into_iter().map(Booking::from_entity).collect())
    }

    /// Gets the bookings of a trip whose passengers count as having traveled on it.
    pub async fn get_shared_by_trip(&self, trip_id: i32) -> Result<Vec<Booking>, DbErr> {
        let bookings = entity::prelude::Booking::find()
            .filter(entity::booking::Column::TripId.eq(trip_id))
            .filter(
                entity::booking::Column::Status
                    .is_in([BookingStatus::Confirmed, BookingStatus::CancelledByDriver]),
            )
            .order_by_asc(entity::booking::Column::Id)
            .all(self.db)
            .await?;

        Ok(bookings.into_iter().map(Booking::from_entity).collect())
    }

    /// Whether either user ever booked a trip driven by the other.
    pub async fn are_connected(&self, user_id: i32, other_id: i32) -> Result<bool, DbErr> {
        let count = entity::prelude::Booking::find()
            .join(JoinType::InnerJoin, entity::booking::Relation::Trip.def())
            .filter(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(entity::booking::Column::PassengerId.eq(user_id))
                            .add(entity::trip::Column::DriverId.eq(other_id)),
                    )
                    .add(
                        Condition::all()
                            .add(entity::booking::Column::PassengerId.eq(other_id))
                            .add(entity::trip::Column::DriverId.eq(user_id)),
                    ),
            )
            .count(self.db)
            .await?;

        Ok(count > 0)
    }

    /// Gets a passenger's confirmed bookings on trips that have not departed.
    pub async fn get_upcoming_by_passenger(
        &self,
        passenger_id: i32,
    ) -> Result<Vec<Booking>, DbErr> {
        let bookings = entity::prelude::Booking::find()
            .join(JoinType::InnerJoin, entity::booking::Relation::Trip.def())
            .filter(entity::booking::Column::PassengerId.eq(passenger_id))
            .filter(entity::booking::Column::Status.eq(BookingStatus::Confirmed))
            .filter(
                entity::trip::Column::Status.is_in([TripStatus::Scheduled, TripStatus::Full]),
            )
            .order_by_asc(entity::booking::Column::Id)
            .all(self.db)
            .await?;

        Ok(bookings.into_iter().map(Booking::from_entity).collect())
    }

    /// Cancels a booking with an optional reason.
    ///
    /// # Arguments
    /// - `id` - Booking ID
    /// - `status` - `CancelledByPassenger` or `CancelledByDriver`
    /// - `reason` - Free-text reason shown to the other party
    pub async fn cancel(
        &self,
        id: i32,
        status: BookingStatus,
        reason: Option<String>,
    ) -> Result<Booking, DbErr> {
        let booking = entity::prelude::Booking::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("Booking with id {} not found", id)))?;

        let mut booking = booking.into_active_model();
        booking.status = ActiveValue::Set(status);
        booking.cancellation_reason = ActiveValue::Set(reason);
        booking.updated_at = ActiveValue::Set(Utc::now());

        Ok(Booking::from_entity(booking.update(self.db).await?))
    }
}
