use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    model::{
        api::ErrorDto,
        car::{CarDto, CreateCarDto, UpdateCarDto},
    },
    server::{
        error::AppError,
        middleware::{
            auth::{AuthGuard, Permission},
            token::BearerToken,
        },
        model::car::{CreateCarParams, UpdateCarParams},
        service::car::CarService,
        state::AppState,
    },
};

/// Tag for grouping car endpoints in OpenAPI documentation
pub static CAR_TAG: &str = "cars";

/// Register a car.
///
/// The first car becomes the default. New cars wait for admin verification.
///
/// # Access Control
/// - `Driver` - Only drivers can register cars
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `payload` - Car details (make, model, plate, seats, comfort level)
///
/// # Returns
/// - `201 Created` - Car registered and awaiting verification
/// - `400 Bad Request` - Invalid car data
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - User is not a driver
/// - `409 Conflict` - License plate already registered
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/cars",
    tag = CAR_TAG,
    security(("bearer_auth" = [])),
    request_body = CreateCarDto,
    responses(
        (status = 201, description = "Car registered and awaiting verification", body = CarDto),
        (status = 400, description = "Invalid car data", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "User is not a driver", body = ErrorDto),
        (status = 409, description = "License plate already registered", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn create_car(
    State(state): State<AppState>,
    bearer: BearerToken,
    Json(payload): Json<CreateCarDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[Permission::Driver])
        .await?;

    let car = CarService::new(&state.db)
        .create(CreateCarParams::from_dto(user.id, payload))
        .await?;

    Ok((StatusCode::CREATED, Json(car.into_dto())))
}

/// List the caller's cars.
///
/// # Access Control
/// - `Driver` - Only drivers can list their cars
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
///
/// # Returns
/// - `200 OK` - Cars of the signed-in driver, default first
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - User is not a driver
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/cars",
    tag = CAR_TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Cars of the signed-in driver, default first", body = Vec<CarDto>),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "User is not a driver", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_my_cars(
    State(state): State<AppState>,
    bearer: BearerToken,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[Permission::Driver])
        .await?;

    let cars = CarService::new(&state.db).get_mine(user.id).await?;
    let cars_dto: Vec<CarDto> = cars.into_iter().map(|car| car.into_dto()).collect();

    Ok((StatusCode::OK, Json(cars_dto)))
}

/// Get one of the caller's cars.
///
/// # Access Control
/// - `Driver` - Only drivers can view their cars
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Car ID
///
/// # Returns
/// - `200 OK` - The car
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - User is not a driver
/// - `404 Not Found` - Car not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/cars/{id}",
    tag = CAR_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Car ID")
    ),
    responses(
        (status = 200, description = "The car", body = CarDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "User is not a driver", body = ErrorDto),
        (status = 404, description = "Car not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_car(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[Permission::Driver])
        .await?;

    let car = CarService::new(&state.db).get(user.id, id).await?;

    Ok((StatusCode::OK, Json(car.into_dto())))
}

/// Update a car.
///
/// Changing the license plate sends the car back to verification.
///
/// # Access Control
/// - `Driver` - Only drivers can update their cars
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Car ID
/// - `payload` - Car fields to change
///
/// # Returns
/// - `200 OK` - Car updated
/// - `400 Bad Request` - Invalid car data
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - User is not a driver
/// - `404 Not Found` - Car not found
/// - `409 Conflict` - License plate already registered
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    patch,
    path = "/cars/{id}",
    tag = CAR_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Car ID")
    ),
    request_body = UpdateCarDto,
    responses(
        (status = 200, description = "Car updated", body = CarDto),
        (status = 400, description = "Invalid car data", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "User is not a driver", body = ErrorDto),
        (status = 404, description = "Car not found", body = ErrorDto),
        (status = 409, description = "License plate already registered", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn update_car(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCarDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[Permission::Driver])
        .await?;

    let car = CarService::new(&state.db)
        .update(user.id, id, UpdateCarParams::from_dto(payload))
        .await?;

    Ok((StatusCode::OK, Json(car.into_dto())))
}

/// Delete a car.
///
/// A car with a scheduled trip cannot be deleted. Deleting the default car moves the
/// default to the oldest remaining car.
///
/// # Access Control
/// - `Driver` - Only drivers can delete their cars
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Car ID
///
/// # Returns
/// - `204 No Content` - Car deleted
/// - `400 Bad Request` - Car still has scheduled trips
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - User is not a driver
/// - `404 Not Found` - Car not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    delete,
    path = "/cars/{id}",
    tag = CAR_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Car ID")
    ),
    responses(
        (status = 204, description = "Car deleted"),
        (status = 400, description = "Car still has scheduled trips", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "User is not a driver", body = ErrorDto),
        (status = 404, description = "Car not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn delete_car(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[Permission::Driver])
        .await?;

    CarService::new(&state.db).delete(user.id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Make a car the default.
///
/// # Access Control
/// - `Driver` - Only drivers can change their default car
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Car ID
///
/// # Returns
/// - `200 OK` - Car is now the default
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - User is not a driver
/// - `404 Not Found` - Car not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/cars/{id}/set-default",
    tag = CAR_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Car ID")
    ),
    responses(
        (status = 200, description = "Car is now the default", body = CarDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "User is not a driver", body = ErrorDto),
        (status = 404, description = "Car not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn set_default_car(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[Permission::Driver])
        .await?;

    let car = CarService::new(&state.db).set_default(user.id, id).await?;

    Ok((StatusCode::OK, Json(car.into_dto())))
}
