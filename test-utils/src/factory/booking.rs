//! Booking factory for creating test booking entities.
//!
//! The factory only inserts the booking row; it does not touch the trip's available
//! seats. Adjust those through `TripFactory::available_seats` when a test depends on them.

use chrono::Utc;
use entity::sea_orm_active_enums::BookingStatus;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

pub struct BookingFactory<'a> {
    db: &'a DatabaseConnection,
    trip_id: i32,
    passenger_id: i32,
    seats_booked: i32,
    total_price: Decimal,
    status: BookingStatus,
}

impl<'a> BookingFactory<'a> {
    /// Creates a new BookingFactory: one confirmed seat at `100000`.
    pub fn new(db: &'a DatabaseConnection, trip_id: i32, passenger_id: i32) -> Self {
        Self {
            db,
            trip_id,
            passenger_id,
            seats_booked: 1,
            total_price: Decimal::new(100_000, 0),
            status: BookingStatus::Confirmed,
        }
    }

    pub fn seats_booked(mut self, seats: i32) -> Self {
        self.seats_booked = seats;
        self
    }

    pub fn total_price(mut self, total_price: Decimal) -> Self {
        self.total_price = total_price;
        self
    }

    pub fn status(mut self, status: BookingStatus) -> Self {
        self.status = status;
        self
    }

    /// Builds and inserts the booking entity into the database.
    pub async fn build(self) -> Result<entity::booking::Model, DbErr> {
        let now = Utc::now();
        entity::booking::ActiveModel {
            trip_id: ActiveValue::Set(self.trip_id),
            passenger_id: ActiveValue::Set(self.passenger_id),
            seats_booked: ActiveValue::Set(self.seats_booked),
            total_price: ActiveValue::Set(self.total_price),
            status: ActiveValue::Set(self.status),
            pickup_location: ActiveValue::Set(None),
            dropoff_location: ActiveValue::Set(None),
            special_requests: ActiveValue::Set(None),
            payment_method: ActiveValue::Set("cash".to_string()),
            negotiation_id: ActiveValue::Set(None),
            cancellation_reason: ActiveValue::Set(None),
            booked_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}

/// Creates a confirmed single-seat booking.
pub async fn create_booking(
    db: &DatabaseConnection,
    trip_id: i32,
    passenger_id: i32,
) -> Result<entity::booking::Model, DbErr> {
    BookingFactory::new(db, trip_id, passenger_id).build().await
}
