//! Trip publishing and lifecycle.
//!
//! Status moves `scheduled ⇄ full → in_progress → completed`, or from `scheduled`/`full`
//! to `cancelled_by_driver`. `full` is derived from the seat count and is recomputed
//! whenever seats change.

use chrono::{DateTime, Utc};
use entity::sea_orm_active_enums::{
    BookingStatus, CarVerificationStatus, NegotiationStatus, OfferStatus, TripStatus,
};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde_json::json;

use crate::server::{
    data::{
        booking::BookingRepository, car::CarRepository, negotiation::NegotiationRepository,
        trip::TripRepository,
    },
    error::AppError,
    model::{
        negotiation::ChainVersion,
        notification::{NotificationEvent, NotificationKind},
        trip::{CreateTripParams, PaginatedTrips, Trip, TripSearchParams, UpdateTripParams},
    },
    service::{
        message::join_trip_thread, negotiation::close_chain, notification::NotificationService,
    },
    util::pagination::total_pages,
};

/// Lowest seat price a trip may be published with, in som.
pub const MIN_SEAT_PRICE: i64 = 1_000;
/// Highest seat price a trip may be published with, in som.
pub const MAX_SEAT_PRICE: i64 = 1_000_000;

pub struct TripService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TripService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Publishes a trip and opens its conversation thread for the driver.
    ///
    /// # Arguments
    /// - `params` - Trip details; the caller has already been checked to be an active driver
    ///
    /// # Returns
    /// - `Ok(Trip)` - The scheduled trip with every offered seat available
    /// - `Err(AppError::NotFound)` - Car missing or owned by another driver
    /// - `Err(AppError::BadRequest)` - Car not approved, departure in the past, seats or
    ///   price out of range, or blank locations
    pub async fn create(&self, params: CreateTripParams) -> Result<Trip, AppError> {
        let now = Utc::now();

        if params.from_location.is_empty() || params.to_location.is_empty() {
            return Err(AppError::BadRequest(
                "Departure and destination are required".to_string(),
            ));
        }
        if params.from_location.eq_ignore_ascii_case(&params.to_location) {
            return Err(AppError::BadRequest(
                "Departure and destination must differ".to_string(),
            ));
        }

        let car = CarRepository::new(self.db)
            .find_by_id(params.car_id)
            .await?
            .filter(|car| car.driver_id == params.driver_id)
            .ok_or_else(|| AppError::NotFound("Car not found".to_string()))?;
        if car.verification_status != CarVerificationStatus::Approved {
            return Err(AppError::BadRequest(
                "Car must be approved before publishing trips".to_string(),
            ));
        }

        validate_schedule(
            params.departure_datetime,
            params.estimated_arrival_datetime,
            now,
        )?;
        validate_price(params.price_per_seat)?;

        let max_seats = car.seats_count - 1;
        if params.total_seats_offered < 1 || params.total_seats_offered > max_seats {
            return Err(AppError::BadRequest(format!(
                "Seats offered must be between 1 and {}",
                max_seats
            )));
        }

        let txn = self.db.begin().await?;
        let trip = TripRepository::new(&txn).create(params).await?;
        join_trip_thread(&txn, &trip, trip.driver_id).await?;
        txn.commit().await?;

        tracing::info!(
            "Driver {} published trip {} ({})",
            trip.driver_id,
            trip.id,
            trip.route()
        );

        Ok(trip)
    }

    /// Finds scheduled trips departing in the future with enough free seats.
    pub async fn search(&self, params: TripSearchParams) -> Result<PaginatedTrips, AppError> {
        let (trips, total) = TripRepository::new(self.db)
            .search(&params, Utc::now())
            .await?;

        Ok(PaginatedTrips {
            trips,
            total,
            page: params.page,
            per_page: params.per_page,
            total_pages: total_pages(total, params.per_page),
        })
    }

    /// Gets the driver's own trips, latest departure first.
    pub async fn get_mine(
        &self,
        driver_id: i32,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedTrips, AppError> {
        let (trips, total) = TripRepository::new(self.db)
            .get_by_driver_paginated(driver_id, page, per_page)
            .await?;

        Ok(PaginatedTrips {
            trips,
            total,
            page,
            per_page,
            total_pages: total_pages(total, per_page),
        })
    }

    pub async fn get(&self, trip_id: i32) -> Result<Trip, AppError> {
        TripRepository::new(self.db)
            .find_by_id(trip_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))
    }

    /// Updates a scheduled or full trip.
    ///
    /// Seats offered cannot drop below the seats already booked. The status is
    /// recomputed: `full` when no seats remain, `scheduled` otherwise.
    ///
    /// # Returns
    /// - `Ok(Trip)` - Updated trip
    /// - `Err(AppError::Forbidden)` - Caller is not the trip's driver
    /// - `Err(AppError::BadRequest)` - Trip already started or ended, or invalid values
    /// - `Err(AppError::Conflict)` - A booking or status change landed first
    pub async fn update(
        &self,
        driver_id: i32,
        trip_id: i32,
        params: UpdateTripParams,
    ) -> Result<Trip, AppError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;
        let repo = TripRepository::new(&txn);

        let trip = self.owned_trip(&repo, driver_id, trip_id).await?;
        if !matches!(trip.status, TripStatus::Scheduled | TripStatus::Full) {
            return Err(AppError::BadRequest(
                "Only scheduled trips can be updated".to_string(),
            ));
        }

        if params.departure_datetime.is_some() || params.estimated_arrival_datetime.is_some() {
            validate_schedule(
                params.departure_datetime.unwrap_or(trip.departure_datetime),
                params
                    .estimated_arrival_datetime
                    .or(trip.estimated_arrival_datetime),
                now,
            )?;
        }
        if let Some(price) = params.price_per_seat {
            validate_price(price)?;
        }

        let seats = match params.total_seats_offered {
            Some(total) => {
                let car = CarRepository::new(&txn)
                    .find_by_id(trip.car_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::InternalError(format!("Car of trip {} is missing", trip.id))
                    })?;
                let booked = trip.booked_seats();
                if total < booked.max(1) || total > car.seats_count - 1 {
                    return Err(AppError::BadRequest(format!(
                        "Seats offered must be between {} and {}",
                        booked.max(1),
                        car.seats_count - 1
                    )));
                }
                Some((total, total - booked))
            }
            None => None,
        };

        let (total, available) =
            seats.unwrap_or((trip.total_seats_offered, trip.available_seats));
        let status = if available == 0 {
            TripStatus::Full
        } else {
            TripStatus::Scheduled
        };

        if !repo
            .set_seats_if_unchanged(&trip, total, available, status)
            .await?
        {
            return Err(stale_trip());
        }
        let updated = repo.update(trip.id, params).await?;
        txn.commit().await?;

        Ok(updated)
    }

    /// Marks a scheduled or full trip as departed and tells the passengers.
    pub async fn start(&self, driver_id: i32, trip_id: i32) -> Result<Trip, AppError> {
        let txn = self.db.begin().await?;
        let repo = TripRepository::new(&txn);

        let trip = self.owned_trip(&repo, driver_id, trip_id).await?;
        if !matches!(trip.status, TripStatus::Scheduled | TripStatus::Full) {
            return Err(AppError::BadRequest(
                "Only scheduled trips can be started".to_string(),
            ));
        }

        if !repo
            .set_status_if_unchanged(&trip, TripStatus::InProgress)
            .await?
        {
            return Err(stale_trip());
        }
        let started = Trip {
            status: TripStatus::InProgress,
            ..trip.clone()
        };
        let passengers = self.passenger_ids(&txn, trip.id).await?;

        let event = NotificationEvent::new(
            NotificationKind::TripStarted,
            "Trip started",
            format!("Your trip {} has started", trip.route()),
        )
        .with_data(json!({ "trip_id": trip.id }));
        NotificationService::new(&txn)
            .notify(&passengers, &event)
            .await?;

        txn.commit().await?;

        Ok(started)
    }

    /// Reminds the confirmed passengers of an upcoming trip about its departure.
    ///
    /// # Returns
    /// - `Ok(u64)` - Number of passengers reminded
    /// - `Err(AppError::NotFound)` - No such trip
    /// - `Err(AppError::Forbidden)` - Caller does not drive the trip
    /// - `Err(AppError::BadRequest)` - Trip already started, finished or cancelled
    pub async fn remind(&self, driver_id: i32, trip_id: i32) -> Result<u64, AppError> {
        let txn = self.db.begin().await?;
        let repo = TripRepository::new(&txn);

        let trip = self.owned_trip(&repo, driver_id, trip_id).await?;
        if !matches!(trip.status, TripStatus::Scheduled | TripStatus::Full) {
            return Err(AppError::BadRequest(
                "Reminders can only be sent before departure".to_string(),
            ));
        }
        let passengers = self.passenger_ids(&txn, trip.id).await?;

        let event = NotificationEvent::new(
            NotificationKind::TripReminder,
            "Trip reminder",
            format!(
                "Reminder: your trip {} departs on {}",
                trip.route(),
                trip.departure_datetime.format("%B %d at %H:%M")
            ),
        )
        .with_data(json!({ "trip_id": trip.id, "reminder_type": "trip_departure" }));
        let sent = NotificationService::new(&txn)
            .notify(&passengers, &event)
            .await?;

        txn.commit().await?;

        tracing::info!(
            "Driver {} reminded {} passengers of trip {}",
            driver_id,
            sent.len(),
            trip.id
        );

        Ok(sent.len() as u64)
    }

    /// Marks a running trip as finished and asks the passengers to rate the driver.
    pub async fn complete(&self, driver_id: i32, trip_id: i32) -> Result<Trip, AppError> {
        let txn = self.db.begin().await?;
        let repo = TripRepository::new(&txn);

        let trip = self.owned_trip(&repo, driver_id, trip_id).await?;
        if trip.status != TripStatus::InProgress {
            return Err(AppError::BadRequest(
                "Only trips in progress can be completed".to_string(),
            ));
        }

        if !repo
            .set_status_if_unchanged(&trip, TripStatus::Completed)
            .await?
        {
            return Err(stale_trip());
        }
        let completed = Trip {
            status: TripStatus::Completed,
            ..trip.clone()
        };
        let passengers = self.passenger_ids(&txn, trip.id).await?;

        let event = NotificationEvent::new(
            NotificationKind::TripCompleted,
            "Trip completed",
            format!("You arrived: {}. Please rate your driver", trip.route()),
        )
        .with_data(json!({ "trip_id": trip.id, "driver_id": trip.driver_id }));
        NotificationService::new(&txn)
            .notify(&passengers, &event)
            .await?;

        txn.commit().await?;

        tracing::info!("Trip {} completed", trip.id);

        Ok(completed)
    }

    /// Cancels a trip that has not departed.
    ///
    /// Every confirmed booking becomes `cancelled_by_driver` and every unresolved
    /// negotiation on the trip is expired. Booked passengers and negotiating passengers
    /// are notified.
    ///
    /// # Arguments
    /// - `driver_id` - Caller, must drive the trip
    /// - `trip_id` - Trip to cancel
    /// - `reason` - Optional reason copied to the bookings
    pub async fn cancel(
        &self,
        driver_id: i32,
        trip_id: i32,
        reason: Option<String>,
    ) -> Result<Trip, AppError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;
        let repo = TripRepository::new(&txn);
        let booking_repo = BookingRepository::new(&txn);

        let trip = self.owned_trip(&repo, driver_id, trip_id).await?;
        if !matches!(trip.status, TripStatus::Scheduled | TripStatus::Full) {
            return Err(AppError::BadRequest(
                "Only scheduled trips can be cancelled".to_string(),
            ));
        }

        if !repo
            .set_status_if_unchanged(&trip, TripStatus::CancelledByDriver)
            .await?
        {
            return Err(stale_trip());
        }

        let mut recipients = Vec::new();
        for booking in booking_repo.get_confirmed_by_trip(trip.id).await? {
            booking_repo
                .cancel(booking.id, BookingStatus::CancelledByDriver, reason.clone())
                .await?;
            recipients.push(booking.passenger_id);
        }
        for chain in NegotiationRepository::new(&txn)
            .get_unresolved_by_trip(trip.id)
            .await?
        {
            close_chain(
                &txn,
                ChainVersion::of_entity(&chain),
                NegotiationStatus::Expired,
                OfferStatus::Expired,
                now,
            )
            .await?;
            recipients.push(chain.passenger_id);
        }

        let cancelled = Trip {
            status: TripStatus::CancelledByDriver,
            ..trip.clone()
        };

        let content = match reason.as_deref() {
            Some(reason) => format!(
                "Trip {} was cancelled by the driver: {}",
                trip.route(),
                reason
            ),
            None => format!("Trip {} was cancelled by the driver", trip.route()),
        };
        let event =
            NotificationEvent::new(NotificationKind::TripCancelled, "Trip cancelled", content)
                .with_data(json!({ "trip_id": trip.id }));
        NotificationService::new(&txn)
            .notify(&recipients, &event)
            .await?;

        txn.commit().await?;

        tracing::info!(
            "Trip {} cancelled by driver {}, {} passenger(s) notified",
            trip.id,
            driver_id,
            recipients.len()
        );

        Ok(cancelled)
    }

    async fn owned_trip<C: ConnectionTrait>(
        &self,
        repo: &TripRepository<'_, C>,
        driver_id: i32,
        trip_id: i32,
    ) -> Result<Trip, AppError> {
        let trip = repo
            .find_by_id(trip_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

        if trip.driver_id != driver_id {
            return Err(AppError::Forbidden(
                "Only the driver can manage this trip".to_string(),
            ));
        }

        Ok(trip)
    }

    async fn passenger_ids<C: ConnectionTrait>(
        &self,
        db: &C,
        trip_id: i32,
    ) -> Result<Vec<i32>, AppError> {
        Ok(BookingRepository::new(db)
            .get_confirmed_by_trip(trip_id)
            .await?
            .into_iter()
            .map(|booking| booking.passenger_id)
            .collect())
    }
}

fn stale_trip() -> AppError {
    AppError::Conflict("Trip changed concurrently, please try again".to_string())
}

fn validate_schedule(
    departure: DateTime<Utc>,
    arrival: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if departure <= now {
        return Err(AppError::BadRequest(
            "Departure must be in the future".to_string(),
        ));
    }
    if arrival.is_some_and(|arrival| arrival <= departure) {
        return Err(AppError::BadRequest(
            "Estimated arrival must be after departure".to_string(),
        ));
    }
    Ok(())
}

fn validate_price(price: Decimal) -> Result<(), AppError> {
    if price < Decimal::from(MIN_SEAT_PRICE) || price > Decimal::from(MAX_SEAT_PRICE) {
        return Err(AppError::BadRequest(format!(
            "Price per seat must be between {} and {}",
            MIN_SEAT_PRICE, MAX_SEAT_PRICE
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn rejects_departure_in_the_past() {
        let now = Utc::now();

        assert!(validate_schedule(now - Duration::minutes(1), None, now).is_err());
        assert!(validate_schedule(now + Duration::hours(2), None, now).is_ok());
    }

    #[test]
    fn rejects_arrival_before_departure() {
        let now = Utc::now();
        let departure = now + Duration::hours(2);

        let early = Some(departure - Duration::minutes(5));
        let late = Some(departure + Duration::hours(4));

        assert!(validate_schedule(departure, early, now).is_err());
        assert!(validate_schedule(departure, late, now).is_ok());
    }

    #[test]
    fn price_bounds_are_inclusive() {
        assert!(validate_price(Decimal::from(1_000)).is_ok());
        assert!(validate_price(Decimal::from(1_000_000)).is_ok());
        assert!(validate_price(Decimal::from(999)).is_err());
        assert!(validate_price(Decimal::from(1_000_001)).is_err());
    }
}
