//! Booking domain models and parameters.

use chrono::{DateTime, Utc};
use entity::sea_orm_active_enums::BookingStatus;
use rust_decimal::Decimal;

use crate::model::booking::{BookingDto, BookingPageDto, CreateBookingDto};

/// Payment method recorded for regular seat bookings.
pub const PAYMENT_CASH: &str = "cash";
/// Payment method recorded for bookings created by an accepted negotiation.
pub const PAYMENT_NEGOTIATED: &str = "negotiated";

/// Seats held by a passenger on a trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: i32,
    pub trip_id: i32,
    pub passenger_id: i32,
    pub seats_booked: i32,
    pub total_price: Decimal,
    pub status: BookingStatus,
    pub pickup_location: Option<String>,
    pub dropoff_location: Option<String>,
    pub special_requests: Option<String>,
    pub payment_method: String,
    pub negotiation_id: Option<i32>,
    pub cancellation_reason: Option<String>,
    pub booked_at: DateTime<Utc>,
}

impl Booking {
    pub fn from_entity(entity: entity::booking::Model) -> Self {
        Self {
            id: entity.id,
            trip_id: entity.trip_id,
            passenger_id: entity.passenger_id,
            seats_booked: entity.seats_booked,
            total_price: entity.total_price,
            status: entity.status,
            pickup_location: entity.pickup_location,
            dropoff_location: entity.dropoff_location,
            special_requests: entity.special_requests,
            payment_method: entity.payment_method,
            negotiation_id: entity.negotiation_id,
            cancellation_reason: entity.cancellation_reason,
            booked_at: entity.booked_at,
        }
    }

    pub fn into_dto(self) -> BookingDto {
        BookingDto {
            id: self.id,
            trip_id: self.trip_id,
            passenger_id: self.passenger_id,
            seats_booked: self.seats_booked,
            total_price: self.total_price,
            status: self.status,
            pickup_location: self.pickup_location,
            dropoff_location: self.dropoff_location,
            special_requests: self.special_requests,
            payment_method: self.payment_method,
            negotiation_id: self.negotiation_id,
            cancellation_reason: self.cancellation_reason,
            booked_at: self.booked_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaginatedBookings {
    pub bookings: Vec<Booking>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl PaginatedBookings {
    pub fn into_dto(self) -> BookingPageDto {
        BookingPageDto {
            bookings: self.bookings.into_iter().map(Booking::into_dto).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
        }
    }
}

/// Parameters for a passenger booking request.
#[derive(Debug, Clone)]
pub struct CreateBookingParams {
    pub passenger_id: i32,
    pub trip_id: i32,
    pub seats_booked: i32,
    pub pickup_location: Option<String>,
    pub dropoff_location: Option<String>,
    pub special_requests: Option<String>,
}

impl CreateBookingParams {
    pub fn from_dto(passenger_id: i32, dto: CreateBookingDto) -> Self {
        Self {
            passenger_id,
            trip_id: dto.trip_id,
            seats_booked: dto.seats_booked,
            pickup_location: dto.pickup_location,
            dropoff_location: dto.dropoff_location,
            special_requests: dto.special_requests,
        }
    }
}

/// Row values for inserting a confirmed booking.
///
/// Built by the booking service for cash bookings and by the negotiation service when an
/// offer is accepted.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub trip_id: i32,
    pub passenger_id: i32,
    pub seats_booked: i32,
    pub total_price: Decimal,
    pub pickup_location: Option<String>,
    pub dropoff_location: Option<String>,
    pub special_requests: Option<String>,
    pub payment_method: &'static str,
    pub negotiation_id: Option<i32>,
}
