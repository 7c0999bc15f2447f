use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    model::{
        api::ErrorDto,
        booking::{BookingDto, BookingPageDto, CancelBookingDto, CreateBookingDto},
    },
    server::{
        error::AppError,
        middleware::{
            auth::{AuthGuard, Permission},
            token::BearerToken,
        },
        model::booking::CreateBookingParams,
        service::booking::BookingService,
        state::AppState,
        util::pagination::PaginationParams,
    },
};

/// Tag for grouping booking endpoints in OpenAPI documentation
pub static BOOKING_TAG: &str = "bookings";

/// Book seats on a trip.
///
/// Seats are taken atomically; the trip turns `full` when none remain. The driver is
/// notified and the passenger joins the trip conversation.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can book trips
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `payload` - Trip ID, seat count and pickup details
///
/// # Returns
/// - `201 Created` - Seats booked
/// - `400 Bad Request` - Trip not bookable or not enough seats
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - Drivers cannot book their own trip
/// - `404 Not Found` - Trip not found
/// - `409 Conflict` - Passenger already holds a booking on this trip
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/bookings",
    tag = BOOKING_TAG,
    security(("bearer_auth" = [])),
    request_body = CreateBookingDto,
    responses(
        (status = 201, description = "Seats booked", body = BookingDto),
        (status = 400, description = "Trip not bookable or not enough seats", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "Drivers cannot book their own trip", body = ErrorDto),
        (status = 404, description = "Trip not found", body = ErrorDto),
        (status = 409, description = "Passenger already holds a booking on this trip", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn create_booking(
    State(state): State<AppState>,
    bearer: BearerToken,
    Json(payload): Json<CreateBookingDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let booking = BookingService::new(&state.db)
        .create(CreateBookingParams::from_dto(user.id, payload))
        .await?;

    Ok((StatusCode::CREATED, Json(booking.into_dto())))
}

/// List the caller's bookings.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can view their own bookings
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `pagination` - Pagination parameters (page and entries)
///
/// # Returns
/// - `200 OK` - Bookings of the signed-in passenger
/// - `401 Unauthorized` - Missing or invalid token
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/bookings/my",
    tag = BOOKING_TAG,
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "Bookings of the signed-in passenger", body = BookingPageDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_my_bookings(
    State(state): State<AppState>,
    bearer: BearerToken,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let page = BookingService::new(&state.db)
        .get_mine(user.id, pagination.page, pagination.per_page())
        .await?;

    Ok((StatusCode::OK, Json(page.into_dto())))
}

/// List bookings on the caller's trips.
///
/// # Access Control
/// - `Driver` - Only drivers can view bookings on their trips
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `pagination` - Pagination parameters (page and entries)
///
/// # Returns
/// - `200 OK` - Bookings on the signed-in driver's trips
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - User is not a driver
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/bookings/incoming",
    tag = BOOKING_TAG,
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "Bookings on the signed-in driver's trips", body = BookingPageDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "User is not a driver", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_incoming_bookings(
    State(state): State<AppState>,
    bearer: BearerToken,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[Permission::Driver])
        .await?;

    let page = BookingService::new(&state.db)
        .get_incoming(user.id, pagination.page, pagination.per_page())
        .await?;

    Ok((StatusCode::OK, Json(page.into_dto())))
}

/// Get a booking.
///
/// Visible to the passenger and to the driver of the trip.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can view a booking they are part of
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Booking ID
///
/// # Returns
/// - `200 OK` - The booking
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - Caller is neither the passenger nor the driver
/// - `404 Not Found` - Booking not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/bookings/{id}",
    tag = BOOKING_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Booking ID")
    ),
    responses(
        (status = 200, description = "The booking", body = BookingDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "Caller is neither the passenger nor the driver", body = ErrorDto),
        (status = 404, description = "Booking not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_booking(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let booking = BookingService::new(&state.db).get(user.id, id).await?;

    Ok((StatusCode::OK, Json(booking.into_dto())))
}

/// Cancel a booking.
///
/// The booked seats go back to the trip and the driver is notified.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can cancel their own bookings
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Booking ID
/// - `payload` - Optional cancellation reason
///
/// # Returns
/// - `200 OK` - Booking cancelled and seats released
/// - `400 Bad Request` - Booking already cancelled or trip started
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - Caller is not the passenger
/// - `404 Not Found` - Booking not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/bookings/{id}/cancel",
    tag = BOOKING_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Booking ID")
    ),
    request_body = CancelBookingDto,
    responses(
        (status = 200, description = "Booking cancelled and seats released", body = BookingDto),
        (status = 400, description = "Booking already cancelled or trip started", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "Caller is not the passenger", body = ErrorDto),
        (status = 404, description = "Booking not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn cancel_booking(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
    Json(payload): Json<CancelBookingDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let booking = BookingService::new(&state.db)
        .cancel(user.id, id, payload.reason)
        .await?;

    Ok((StatusCode::OK, Json(booking.into_dto())))
}
