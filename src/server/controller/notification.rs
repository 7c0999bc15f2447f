use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    model::{
        api::ErrorDto,
        notification::{
            AffectedCountDto, NotificationDto, NotificationListQuery, NotificationPageDto,
            UnreadCountDto,
        },
    },
    server::{
        error::AppError,
        middleware::{auth::AuthGuard, token::BearerToken},
        service::notification::inbox::InboxService,
        state::AppState,
    },
};

pub static NOTIFICATION_TAG: &str = "notifications";

/// List the caller's in-app notifications.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can read their notifications
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `query` - Unread-only flag and pagination
///
/// # Returns
/// - `200 OK` - Notifications of the signed-in user, newest first
/// - `401 Unauthorized` - Missing or invalid token
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/notifications",
    tag = NOTIFICATION_TAG,
    security(("bearer_auth" = [])),
    params(NotificationListQuery),
    responses(
        (status = 200, description = "Notifications of the signed-in user, newest first", body = NotificationPageDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_notifications(
    State(state): State<AppState>,
    bearer: BearerToken,
    Query(query): Query<NotificationListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let page = InboxService::new(&state.db)
        .list(
            user.id,
            query.unread_only,
            query.page,
            query.entries.clamp(1, 100),
        )
        .await?;

    Ok((StatusCode::OK, Json(page.into_dto())))
}

/// Count unread notifications.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can count their unread notifications
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
///
/// # Returns
/// - `200 OK` - Number of unread notifications
/// - `401 Unauthorized` - Missing or invalid token
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/notifications/unread-count",
    tag = NOTIFICATION_TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Number of unread notifications", body = UnreadCountDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_unread_count(
    State(state): State<AppState>,
    bearer: BearerToken,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let unread_count = InboxService::new(&state.db).unread_count(user.id).await?;

    Ok((StatusCode::OK, Json(UnreadCountDto { unread_count })))
}

/// Mark a notification as read.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can update their notifications
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Notification ID
///
/// # Returns
/// - `200 OK` - Notification marked read
/// - `401 Unauthorized` - Missing or invalid token
/// - `404 Not Found` - Notification not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/notifications/{id}/read",
    tag = NOTIFICATION_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Notification marked read", body = NotificationDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 404, description = "Notification not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn mark_read(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let notification = InboxService::new(&state.db).mark_read(user.id, id).await?;

    Ok((StatusCode::OK, Json(notification.into_dto())))
}

/// Mark every notification as read.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can update their notifications
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
///
/// # Returns
/// - `200 OK` - Number of notifications marked read
/// - `401 Unauthorized` - Missing or invalid token
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/notifications/read-all",
    tag = NOTIFICATION_TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Number of notifications marked read", body = AffectedCountDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn mark_all_read(
    State(state): State<AppState>,
    bearer: BearerToken,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let affected = InboxService::new(&state.db).mark_all_read(user.id).await?;

    Ok((StatusCode::OK, Json(AffectedCountDto { affected })))
}

/// Delete a notification.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can delete their notifications
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Notification ID
///
/// # Returns
/// - `204 No Content` - Notification deleted
/// - `401 Unauthorized` - Missing or invalid token
/// - `404 Not Found` - Notification not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    delete,
    path = "/notifications/{id}",
    tag = NOTIFICATION_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Notification ID")
    ),
    responses(
        (status = 204, description = "Notification deleted"),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 404, description = "Notification not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn delete_notification(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    InboxService::new(&state.db).delete(user.id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
