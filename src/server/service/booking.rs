//! Seat bookings.
//!
//! Seat counts change through a compare-and-swap on `available_seats` and the trip
//! status. Two passengers racing for the last seat cannot both succeed, and a booking
//! racing a driver's cancellation cannot reopen the trip. The loser gets a 409.

use chrono::Utc;
use entity::sea_orm_active_enums::{BookingStatus, TripStatus};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde_json::json;

use crate::server::{
    data::{booking::BookingRepository, trip::TripRepository, user::UserRepository},
    error::AppError,
    model::{
        booking::{Booking, CreateBookingParams, NewBooking, PaginatedBookings, PAYMENT_CASH},
        notification::{NotificationEvent, NotificationKind},
        trip::Trip,
    },
    service::{message::join_trip_thread, notification::NotificationService},
    util::pagination::total_pages,
};

/// Takes `seats` from the trip, marking it full when none remain.
///
/// # Returns
/// - `Ok(())` - Seats reserved
/// - `Err(AppError::Conflict)` - Not enough seats, or the seats or status changed
///   concurrently
pub(crate) async fn reserve_seats<C: ConnectionTrait>(
    db: &C,
    trip: &Trip,
    seats: i32,
) -> Result<(), AppError> {
    if seats > trip.available_seats {
        return Err(AppError::Conflict("Not enough seats available".to_string()));
    }

    let remaining = trip.available_seats - seats;
    let status = if remaining == 0 {
        TripStatus::Full
    } else {
        trip.status
    };

    let swapped = TripRepository::new(db)
        .set_seats_if_unchanged(trip, trip.total_seats_offered, remaining, status)
        .await?;
    if !swapped {
        return Err(AppError::Conflict(
            "Seats on this trip changed, please try again".to_string(),
        ));
    }

    Ok(())
}

/// Returns `seats` to the trip, reopening it when it was full.
pub(crate) async fn release_seats<C: ConnectionTrait>(
    db: &C,
    trip: &Trip,
    seats: i32,
) -> Result<(), AppError> {
    let restored = (trip.available_seats + seats).min(trip.total_seats_offered);
    let status = if trip.status == TripStatus::Full {
        TripStatus::Scheduled
    } else {
        trip.status
    };

    let swapped = TripRepository::new(db)
        .set_seats_if_unchanged(trip, trip.total_seats_offered, restored, status)
        .await?;
    if !swapped {
        return Err(AppError::Conflict(
            "Seats on this trip changed, please try again".to_string(),
        ));
    }

    Ok(())
}

pub struct BookingService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> BookingService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Books seats on a trip at its listed price.
    ///
    /// Decrements the trip's available seats, adds the passenger to the trip conversation
    /// and notifies the driver, all in one transaction.
    ///
    /// # Arguments
    /// - `params` - Passenger, trip, seat count and pickup details
    ///
    /// # Returns
    /// - `Ok(Booking)` - The confirmed booking
    /// - `Err(AppError::NotFound)` - Trip does not exist
    /// - `Err(AppError::BadRequest)` - Own trip, trip not bookable, or invalid seat count
    /// - `Err(AppError::Conflict)` - Already booked, or seats taken concurrently
    pub async fn create(&self, params: CreateBookingParams) -> Result<Booking, AppError> {
        let now = Utc::now();
        if params.seats_booked < 1 {
            return Err(AppError::BadRequest(
                "At least one seat must be booked".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let trip = TripRepository::new(&txn)
            .find_by_id(params.trip_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;

        if trip.driver_id == params.passenger_id {
            return Err(AppError::BadRequest(
                "You cannot book your own trip".to_string(),
            ));
        }
        if !trip.is_bookable(now) {
            return Err(AppError::BadRequest(
                "Trip is not available for booking".to_string(),
            ));
        }
        if params.seats_booked > trip.available_seats {
            return Err(AppError::BadRequest(format!(
                "Only {} seat(s) available",
                trip.available_seats
            )));
        }

        let booking_repo = BookingRepository::new(&txn);
        if booking_repo
            .find_confirmed(trip.id, params.passenger_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "You already have a booking on this trip".to_string(),
            ));
        }

        reserve_seats(&txn, &trip, params.seats_booked).await?;

        let booking = booking_repo
            .create(NewBooking {
                trip_id: trip.id,
                passenger_id: params.passenger_id,
                seats_booked: params.seats_booked,
                total_price: trip.price_per_seat * Decimal::from(params.seats_booked),
                pickup_location: params.pickup_location,
                dropoff_location: params.dropoff_location,
                special_requests: params.special_requests,
                payment_method: PAYMENT_CASH,
                negotiation_id: None,
            })
            .await?;

        join_trip_thread(&txn, &trip, params.passenger_id).await?;

        let passenger_name = UserRepository::new(&txn)
            .find_by_id(params.passenger_id)
            .await?
            .map(|user| user.display_name().to_string())
            .unwrap_or_default();

        let event = NotificationEvent::new(
            NotificationKind::BookingCreated,
            "New booking",
            format!(
                "{} booked {} seat(s) on your trip {}",
                passenger_name,
                booking.seats_booked,
                trip.route()
            ),
        )
        .with_data(json!({ "trip_id": trip.id, "booking_id": booking.id }));
        NotificationService::new(&txn)
            .notify(&[trip.driver_id], &event)
            .await?;

        txn.commit().await?;

        tracing::info!(
            "Passenger {} booked {} seat(s) on trip {}",
            booking.passenger_id,
            booking.seats_booked,
            booking.trip_id
        );

        Ok(booking)
    }

    /// Gets a booking visible to its passenger or the trip's driver.
    ///
    /// # Returns
    /// - `Ok(Booking)` - The booking
    /// - `Err(AppError::NotFound)` - No such booking
    /// - `Err(AppError::Forbidden)` - Caller is neither passenger nor driver
    pub async fn get(&self, user_id: i32, booking_id: i32) -> Result<Booking, AppError> {
        let booking = BookingRepository::new(self.db)
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        if booking.passenger_id == user_id {
            return Ok(booking);
        }

        let trip = TripRepository::new(self.db).find_by_id(booking.trip_id).await?;
        match trip {
            Some(trip) if trip.driver_id == user_id => Ok(booking),
            _ => Err(AppError::Forbidden(
                "You do not have access to this booking".to_string(),
            )),
        }
    }

    /// Gets the passenger's bookings, newest first.
    pub async fn get_mine(
        &self,
        passenger_id: i32,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedBookings, AppError> {
        let (bookings, total) = BookingRepository::new(self.db)
            .get_by_passenger_paginated(passenger_id, page, per_page)
            .await?;

        Ok(PaginatedBookings {
            bookings,
            total,
            page,
            per_page,
            total_pages: total_pages(total, per_page),
        })
    }

    /// Gets bookings made on the driver's trips, newest first.
    pub async fn get_incoming(
        &self,
        driver_id: i32,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedBookings, AppError> {
        let (bookings, total) = BookingRepository::new(self.db)
            .get_for_driver_paginated(driver_id, page, per_page)
            .await?;

        Ok(PaginatedBookings {
            bookings,
            total,
            page,
            per_page,
            total_pages: total_pages(total, per_page),
        })
    }

    /// Cancels a confirmed booking on behalf of its passenger.
    ///
    /// Restores the seats (a full trip becomes scheduled again) and notifies the driver.
    ///
    /// # Returns
    /// - `Ok(Booking)` - The cancelled booking
    /// - `Err(AppError::Forbidden)` - Caller is not the passenger
    /// - `Err(AppError::BadRequest)` - Booking already cancelled or trip already started
    pub async fn cancel(
        &self,
        passenger_id: i32,
        booking_id: i32,
        reason: Option<String>,
    ) -> Result<Booking, AppError> {
        let txn = self.db.begin().await?;
        let booking_repo = BookingRepository::new(&txn);

        let booking = booking_repo
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        if booking.passenger_id != passenger_id {
            return Err(AppError::Forbidden(
                "Only the passenger can cancel this booking".to_string(),
            ));
        }
        if booking.status != BookingStatus::Confirmed {
            return Err(AppError::BadRequest(
                "Booking is already cancelled".to_string(),
            ));
        }

        let trip = TripRepository::new(&txn)
            .find_by_id(booking.trip_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;
        if !matches!(trip.status, TripStatus::Scheduled | TripStatus::Full) {
            return Err(AppError::BadRequest(
                "Bookings can only be cancelled before the trip starts".to_string(),
            ));
        }

        let booking = booking_repo
            .cancel(booking.id, BookingStatus::CancelledByPassenger, reason)
            .await?;
        release_seats(&txn, &trip, booking.seats_booked).await?;

        let event = NotificationEvent::new(
            NotificationKind::BookingCancelled,
            "Booking cancelled",
            format!(
                "A passenger cancelled {} seat(s) on your trip {}",
                booking.seats_booked,
                trip.route()
            ),
        )
        .with_data(json!({ "trip_id": trip.id, "booking_id": booking.id }));
        NotificationService::new(&txn)
            .notify(&[trip.driver_id], &event)
            .await?;

        txn.commit().await?;

        Ok(booking)
    }
}
