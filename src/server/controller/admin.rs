use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    model::{
        api::ErrorDto,
        car::{CarDto, CarPageDto},
        emergency::EmergencyAlertDto,
        notification::{AffectedCountDto, BroadcastDto},
        user::{RejectDto, UserDto, UserPageDto},
    },
    server::{
        error::AppError,
        middleware::{
            auth::{AuthGuard, Permission},
            token::BearerToken,
        },
        service::{admin::AdminService, emergency::EmergencyService},
        state::AppState,
        util::pagination::PaginationParams,
    },
};

/// Tag for grouping admin endpoints in OpenAPI documentation
pub static ADMIN_TAG: &str = "admin";

/// List drivers awaiting approval.
///
/// Returns every driver whose application is still pending, oldest first.
///
/// # Access Control
/// - `Admin` - Only admins can review driver applications
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `pagination` - Pagination parameters (page and entries)
///
/// # Returns
/// - `200 OK` - Drivers awaiting approval
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - User is not an admin
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/admin/drivers/pending",
    tag = ADMIN_TAG,
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "Drivers awaiting approval", body = UserPageDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "User is not an admin", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_pending_drivers(
    State(state): State<AppState>,
    bearer: BearerToken,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[Permission::Admin])
        .await?;

    let page = AdminService::new(&state.db)
        .get_pending_drivers(pagination.page, pagination.per_page())
        .await?;

    Ok((StatusCode::OK, Json(page.into_dto())))
}

/// List cars awaiting verification.
///
/// # Access Control
/// - `Admin` - Only admins can review car registrations
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `pagination` - Pagination parameters (page and entries)
///
/// # Returns
/// - `200 OK` - Cars awaiting verification
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - User is not an admin
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/admin/cars/pending",
    tag = ADMIN_TAG,
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "Cars awaiting verification", body = CarPageDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "User is not an admin", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_pending_cars(
    State(state): State<AppState>,
    bearer: BearerToken,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[Permission::Admin])
        .await?;

    let page = AdminService::new(&state.db)
        .get_pending_cars(pagination.page, pagination.per_page())
        .await?;

    Ok((StatusCode::OK, Json(page.into_dto())))
}

/// Approve a driver application.
///
/// The driver is notified and may publish trips once a car is verified.
///
/// # Access Control
/// - `Admin` - Only admins can approve drivers
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - User ID of the driver
///
/// # Returns
/// - `200 OK` - Driver approved
/// - `400 Bad Request` - User has no pending driver application
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - User is not an admin
/// - `404 Not Found` - User not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/admin/drivers/{id}/approve",
    tag = ADMIN_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID of the driver")
    ),
    responses(
        (status = 200, description = "Driver approved", body = UserDto),
        (status = 400, description = "User has no pending driver application", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "User is not an admin", body = ErrorDto),
        (status = 404, description = "User not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn approve_driver(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[Permission::Admin])
        .await?;

    let user = AdminService::new(&state.db).approve_driver(id).await?;

    Ok((StatusCode::OK, Json(user.into_dto())))
}

/// Reject a driver application.
///
/// The reason is stored on the user and sent to them in a notification.
///
/// # Access Control
/// - `Admin` - Only admins can reject drivers
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - User ID of the driver
/// - `payload` - Rejection reason
///
/// # Returns
/// - `200 OK` - Driver application rejected
/// - `400 Bad Request` - User has no pending driver application
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - User is not an admin
/// - `404 Not Found` - User not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/admin/drivers/{id}/reject",
    tag = ADMIN_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID of the driver")
    ),
    request_body = RejectDto,
    responses(
        (status = 200, description = "Driver application rejected", body = UserDto),
        (status = 400, description = "User has no pending driver application", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "User is not an admin", body = ErrorDto),
        (status = 404, description = "User not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn reject_driver(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
    Json(payload): Json<RejectDto>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[Permission::Admin])
        .await?;

    let user = AdminService::new(&state.db)
        .reject_driver(id, payload.reason)
        .await?;

    Ok((StatusCode::OK, Json(user.into_dto())))
}

/// Verify a registered car.
///
/// # Access Control
/// - `Admin` - Only admins can verify cars
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Car ID
///
/// # Returns
/// - `200 OK` - Car approved
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - User is not an admin
/// - `404 Not Found` - Car not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/admin/cars/{id}/approve",
    tag = ADMIN_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Car ID")
    ),
    responses(
        (status = 200, description = "Car approved", body = CarDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "User is not an admin", body = ErrorDto),
        (status = 404, description = "Car not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn approve_car(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[Permission::Admin])
        .await?;

    let car = AdminService::new(&state.db).approve_car(id).await?;

    Ok((StatusCode::OK, Json(car.into_dto())))
}

/// Reject a registered car.
///
/// The owner is notified with the given reason.
///
/// # Access Control
/// - `Admin` - Only admins can reject cars
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Car ID
/// - `payload` - Rejection reason
///
/// # Returns
/// - `200 OK` - Car rejected
/// - `400 Bad Request` - Blank rejection reason
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - User is not an admin
/// - `404 Not Found` - Car not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/admin/cars/{id}/reject",
    tag = ADMIN_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Car ID")
    ),
    request_body = RejectDto,
    responses(
        (status = 200, description = "Car rejected", body = CarDto),
        (status = 400, description = "Blank rejection reason", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "User is not an admin", body = ErrorDto),
        (status = 404, description = "Car not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn reject_car(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
    Json(payload): Json<RejectDto>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[Permission::Admin])
        .await?;

    let car = AdminService::new(&state.db)
        .reject_car(id, payload.reason)
        .await?;

    Ok((StatusCode::OK, Json(car.into_dto())))
}

/// Block a user account.
///
/// Blocked users keep their data but every authenticated request fails with 403.
///
/// # Access Control
/// - `Admin` - Only admins can block users
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - User ID
///
/// # Returns
/// - `200 OK` - User blocked
/// - `400 Bad Request` - Target is an administrator
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - User is not an admin
/// - `404 Not Found` - User not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/admin/users/{id}/block",
    tag = ADMIN_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User blocked", body = UserDto),
        (status = 400, description = "Target is an administrator", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "User is not an admin", body = ErrorDto),
        (status = 404, description = "User not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn block_user(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let admin = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[Permission::Admin])
        .await?;

    let user = AdminService::new(&state.db).block_user(admin.id, id).await?;

    Ok((StatusCode::OK, Json(user.into_dto())))
}

/// Unblock a user account.
///
/// # Access Control
/// - `Admin` - Only admins can unblock users
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - User ID
///
/// # Returns
/// - `200 OK` - User unblocked
/// - `400 Bad Request` - User is not blocked
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - User is not an admin
/// - `404 Not Found` - User not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/admin/users/{id}/unblock",
    tag = ADMIN_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User unblocked", body = UserDto),
        (status = 400, description = "User is not blocked", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "User is not an admin", body = ErrorDto),
        (status = 404, description = "User not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn unblock_user(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[Permission::Admin])
        .await?;

    let user = AdminService::new(&state.db).unblock_user(id).await?;

    Ok((StatusCode::OK, Json(user.into_dto())))
}

/// Requeue failed notifications.
///
/// Resets the attempt counter on every failed row so the dispatcher picks them up on its
/// next run.
///
/// # Access Control
/// - `Admin` - Only admins can requeue failed notifications
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
///
/// # Returns
/// - `200 OK` - Number of notifications moved back to the queue
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - User is not an admin
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/admin/notifications/retry-failed",
    tag = ADMIN_TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Number of notifications moved back to the queue", body = AffectedCountDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "User is not an admin", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn retry_failed_notifications(
    State(state): State<AppState>,
    bearer: BearerToken,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[Permission::Admin])
        .await?;

    let affected = AdminService::new(&state.db)
        .retry_failed_notifications()
        .await?;

    Ok((StatusCode::OK, Json(AffectedCountDto { affected })))
}

/// Broadcast a notification to active users.
///
/// Every active user receives the notification through their enabled channels. An optional
/// role limits the audience.
///
/// # Access Control
/// - `Admin` - Only admins can send broadcasts
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `payload` - Broadcast title, content and optional target role
///
/// # Returns
/// - `200 OK` - Number of users notified
/// - `400 Bad Request` - Empty or oversized title or content
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - User is not an admin
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/admin/notifications/broadcast",
    tag = ADMIN_TAG,
    security(("bearer_auth" = [])),
    request_body = BroadcastDto,
    responses(
        (status = 200, description = "Number of users notified", body = AffectedCountDto),
        (status = 400, description = "Empty or oversized title or content", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "User is not an admin", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn broadcast_notification(
    State(state): State<AppState>,
    bearer: BearerToken,
    Json(payload): Json<BroadcastDto>,
) -> Result<impl IntoResponse, AppError> {
    let admin = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[Permission::Admin])
        .await?;

    let affected = AdminService::new(&state.db)
        .broadcast(admin.id, &payload.title, &payload.content, payload.role)
        .await?;

    Ok((StatusCode::OK, Json(AffectedCountDto { affected })))
}

/// List unresolved emergency alerts.
///
/// # Access Control
/// - `Admin` - Only admins can view open emergency alerts
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
///
/// # Returns
/// - `200 OK` - Unresolved emergency alerts, oldest first
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - User is not an admin
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/admin/emergency/alerts",
    tag = ADMIN_TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Unresolved emergency alerts, oldest first", body = Vec<EmergencyAlertDto>),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "User is not an admin", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_unresolved_alerts(
    State(state): State<AppState>,
    bearer: BearerToken,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[Permission::Admin])
        .await?;

    let alerts = EmergencyService::new(&state.db).get_unresolved().await?;
    let alerts_dto: Vec<EmergencyAlertDto> =
        alerts.into_iter().map(|alert| alert.into_dto()).collect();

    Ok((StatusCode::OK, Json(alerts_dto)))
}
