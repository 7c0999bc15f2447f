use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    model::{
        api::ErrorDto,
        notification::AffectedCountDto,
        trip::{CancelTripDto, CreateTripDto, TripDto, TripPageDto, TripSearchQuery, UpdateTripDto},
    },
    server::{
        error::AppError,
        middleware::{
            auth::{AuthGuard, Permission},
            token::BearerToken,
        },
        model::trip::{CreateTripParams, TripSearchParams, UpdateTripParams},
        service::trip::TripService,
        state::AppState,
        util::pagination::PaginationParams,
    },
};

pub static TRIP_TAG: &str = "trips";

/// Publish a trip.
///
/// The car must belong to the driver and be verified. The departure must be in the future.
///
/// # Access Control
/// - `ApprovedDriver` - Only approved drivers can publish trips
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `payload` - Route, departure, car, seats and price
///
/// # Returns
/// - `201 Created` - Trip published
/// - `400 Bad Request` - Invalid schedule, seats, price, or car not approved
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - User is not an approved driver
/// - `404 Not Found` - Car not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/trips",
    tag = TRIP_TAG,
    security(("bearer_auth" = [])),
    request_body = CreateTripDto,
    responses(
        (status = 201, description = "Trip published", body = TripDto),
        (status = 400, description = "Invalid schedule, seats, price, or car not approved", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "User is not an approved driver", body = ErrorDto),
        (status = 404, description = "Car not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn create_trip(
    State(state): State<AppState>,
    bearer: BearerToken,
    Json(payload): Json<CreateTripDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[Permission::ApprovedDriver])
        .await?;

    let trip = TripService::new(&state.db)
        .create(CreateTripParams::from_dto(user.id, payload))
        .await?;

    Ok((StatusCode::CREATED, Json(trip.into_dto())))
}

/// Search published trips.
///
/// Only scheduled trips departing in the future with enough free seats are returned,
/// soonest departure first. Location filters are case-insensitive substring matches.
///
/// # Access Control
/// - `Public` - No access token required
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `query` - Route, date, seat and pagination filters
///
/// # Returns
/// - `200 OK` - Matching trips
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/trips/search",
    tag = TRIP_TAG,
    params(TripSearchQuery),
    responses(
        (status = 200, description = "Matching trips", body = TripPageDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn search_trips(
    State(state): State<AppState>,
    Query(query): Query<TripSearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = TripService::new(&state.db)
        .search(TripSearchParams::from_query(query))
        .await?;

    Ok((StatusCode::OK, Json(page.into_dto())))
}

/// List the caller's trips.
///
/// # Access Control
/// - `Driver` - Only drivers can list their trips
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `pagination` - Pagination parameters (page and entries)
///
/// # Returns
/// - `200 OK` - Trips of the signed-in driver, newest departure first
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - User is not a driver
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/trips/my",
    tag = TRIP_TAG,
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "Trips of the signed-in driver, newest departure first", body = TripPageDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "User is not a driver", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_my_trips(
    State(state): State<AppState>,
    bearer: BearerToken,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[Permission::Driver])
        .await?;

    let page = TripService::new(&state.db)
        .get_mine(user.id, pagination.page, pagination.per_page())
        .await?;

    Ok((StatusCode::OK, Json(page.into_dto())))
}

/// Get a trip.
///
/// # Access Control
/// - `Public` - No access token required
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `id` - Trip ID
///
/// # Returns
/// - `200 OK` - The trip
/// - `404 Not Found` - Trip not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/trips/{id}",
    tag = TRIP_TAG,
    params(
        ("id" = i32, Path, description = "Trip ID")
    ),
    responses(
        (status = 200, description = "The trip", body = TripDto),
        (status = 404, description = "Trip not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_trip(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let trip = TripService::new(&state.db).get(id).await?;

    Ok((StatusCode::OK, Json(trip.into_dto())))
}

/// Update a trip before departure.
///
/// Seats cannot drop below the booked count. The trip switches between `scheduled` and
/// `full` as seats change.
///
/// # Access Control
/// - `Driver` - Only drivers can update their trips
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Trip ID
/// - `payload` - Trip fields to change
///
/// # Returns
/// - `200 OK` - Trip updated
/// - `400 Bad Request` - Trip already started or invalid values
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - Caller does not drive this trip
/// - `404 Not Found` - Trip not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    patch,
    path = "/trips/{id}",
    tag = TRIP_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Trip ID")
    ),
    request_body = UpdateTripDto,
    responses(
        (status = 200, description = "Trip updated", body = TripDto),
        (status = 400, description = "Trip already started or invalid values", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "Caller does not drive this trip", body = ErrorDto),
        (status = 404, description = "Trip not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn update_trip(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateTripDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[Permission::Driver])
        .await?;

    let trip = TripService::new(&state.db)
        .update(user.id, id, UpdateTripParams::from_dto(payload))
        .await?;

    Ok((StatusCode::OK, Json(trip.into_dto())))
}

/// Start a trip.
///
/// # Access Control
/// - `Driver` - Only drivers can start their trips
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Trip ID
///
/// # Returns
/// - `200 OK` - Trip in progress
/// - `400 Bad Request` - Trip is not scheduled or full
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - Caller does not drive this trip
/// - `404 Not Found` - Trip not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/trips/{id}/start",
    tag = TRIP_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Trip ID")
    ),
    responses(
        (status = 200, description = "Trip in progress", body = TripDto),
        (status = 400, description = "Trip is not scheduled or full", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "Caller does not drive this trip", body = ErrorDto),
        (status = 404, description = "Trip not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn start_trip(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[Permission::Driver])
        .await?;

    let trip = TripService::new(&state.db).start(user.id, id).await?;

    Ok((StatusCode::OK, Json(trip.into_dto())))
}

/// Complete a trip.
///
/// Passengers are asked to rate the driver.
///
/// # Access Control
/// - `Driver` - Only drivers can complete their trips
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Trip ID
///
/// # Returns
/// - `200 OK` - Trip completed
/// - `400 Bad Request` - Trip is not in progress
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - Caller does not drive this trip
/// - `404 Not Found` - Trip not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/trips/{id}/complete",
    tag = TRIP_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Trip ID")
    ),
    responses(
        (status = 200, description = "Trip completed", body = TripDto),
        (status = 400, description = "Trip is not in progress", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "Caller does not drive this trip", body = ErrorDto),
        (status = 404, description = "Trip not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn complete_trip(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[Permission::Driver])
        .await?;

    let trip = TripService::new(&state.db).complete(user.id, id).await?;

    Ok((StatusCode::OK, Json(trip.into_dto())))
}

/// Cancel a trip.
///
/// Bookings are cancelled, open negotiations expire and passengers are notified in one
/// transaction.
///
/// # Access Control
/// - `Driver` - Only drivers can cancel their trips
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Trip ID
/// - `payload` - Cancellation reason
///
/// # Returns
/// - `200 OK` - Trip cancelled, bookings cancelled and passengers notified
/// - `400 Bad Request` - Trip already departed or ended
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - Caller does not drive this trip
/// - `404 Not Found` - Trip not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/trips/{id}/cancel",
    tag = TRIP_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Trip ID")
    ),
    request_body = CancelTripDto,
    responses(
        (status = 200, description = "Trip cancelled, bookings cancelled and passengers notified", body = TripDto),
        (status = 400, description = "Trip already departed or ended", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "Caller does not drive this trip", body = ErrorDto),
        (status = 404, description = "Trip not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn cancel_trip(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
    Json(payload): Json<CancelTripDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[Permission::Driver])
        .await?;

    let trip = TripService::new(&state.db)
        .cancel(user.id, id, payload.reason)
        .await?;

    Ok((StatusCode::OK, Json(trip.into_dto())))
}

/// Remind confirmed passengers about a trip.
///
/// Only trips that have not started can send reminders.
///
/// # Access Control
/// - `Driver` - Only drivers can remind passengers on their trips
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Trip ID
///
/// # Returns
/// - `200 OK` - Number of passengers reminded
/// - `400 Bad Request` - Trip already departed or ended
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - Caller does not drive this trip
/// - `404 Not Found` - Trip not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/trips/{id}/remind",
    tag = TRIP_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Trip ID")
    ),
    responses(
        (status = 200, description = "Number of passengers reminded", body = AffectedCountDto),
        (status = 400, description = "Trip already departed or ended", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "Caller does not drive this trip", body = ErrorDto),
        (status = 404, description = "Trip not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn remind_passengers(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[Permission::Driver])
        .await?;

    let affected = TripService::new(&state.db).remind(user.id, id).await?;

    Ok((StatusCode::OK, Json(AffectedCountDto { affected })))
}
