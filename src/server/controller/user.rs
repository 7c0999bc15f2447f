use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    model::{
        api::{ErrorDto, MessageDto},
        user::{
            DeactivateAccountDto, DeactivationDto, PublicProfileDto, PushTokenDto,
            UpdateProfileDto, UserDto,
        },
    },
    server::{
        error::AppError,
        middleware::{auth::AuthGuard, token::BearerToken},
        model::user::UpdateProfileParams,
        service::user::UserService,
        state::AppState,
    },
};

pub static USER_TAG: &str = "users";

/// Get the caller's profile.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can read their profile
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
///
/// # Returns
/// - `200 OK` - The signed-in user
/// - `401 Unauthorized` - Missing or invalid token
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/users/me",
    tag = USER_TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The signed-in user", body = UserDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_me(
    State(state): State<AppState>,
    bearer: BearerToken,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    Ok((StatusCode::OK, Json(user.into_dto())))
}

/// Update the caller's profile.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can update their profile
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `payload` - Profile fields to change
///
/// # Returns
/// - `200 OK` - Profile updated
/// - `400 Bad Request` - Invalid name, email, or language
/// - `401 Unauthorized` - Missing or invalid token
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    patch,
    path = "/users/me",
    tag = USER_TAG,
    security(("bearer_auth" = [])),
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Profile updated", body = UserDto),
        (status = 400, description = "Invalid name, email, or language", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn update_me(
    State(state): State<AppState>,
    bearer: BearerToken,
    Json(payload): Json<UpdateProfileDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let updated = UserService::new(&state.db)
        .update_profile(user.id, UpdateProfileParams::from_dto(payload))
        .await?;

    Ok((StatusCode::OK, Json(updated.into_dto())))
}

/// Request the driver role.
///
/// The user becomes a driver in `pending_profile_completion` status and cannot publish
/// trips until an administrator approves the application.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can apply to drive
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
///
/// # Returns
/// - `200 OK` - Application submitted
/// - `400 Bad Request` - Already a driver or profile incomplete
/// - `401 Unauthorized` - Missing or invalid token
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/users/me/apply-driver",
    tag = USER_TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Application submitted", body = UserDto),
        (status = 400, description = "Already a driver or profile incomplete", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn apply_driver(
    State(state): State<AppState>,
    bearer: BearerToken,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let updated = UserService::new(&state.db).apply_driver(&user).await?;

    Ok((StatusCode::OK, Json(updated.into_dto())))
}

/// Register a push token.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can register push tokens
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `payload` - Device push token
///
/// # Returns
/// - `200 OK` - Push token stored
/// - `401 Unauthorized` - Missing or invalid token
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    put,
    path = "/users/me/push-token",
    tag = USER_TAG,
    security(("bearer_auth" = [])),
    request_body = PushTokenDto,
    responses(
        (status = 200, description = "Push token stored", body = MessageDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn set_push_token(
    State(state): State<AppState>,
    bearer: BearerToken,
    Json(payload): Json<PushTokenDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    UserService::new(&state.db)
        .set_push_token(user.id, Some(payload.push_token))
        .await?;

    Ok((StatusCode::OK, Json(MessageDto::new("Push token stored"))))
}

/// Remove the push token.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can remove their push token
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
///
/// # Returns
/// - `204 No Content` - Push token removed
/// - `401 Unauthorized` - Missing or invalid token
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    delete,
    path = "/users/me/push-token",
    tag = USER_TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Push token removed"),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn clear_push_token(
    State(state): State<AppState>,
    bearer: BearerToken,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    UserService::new(&state.db)
        .set_push_token(user.id, None)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Get another user's public profile.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can view public profiles
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - User ID
///
/// # Returns
/// - `200 OK` - Public profile
/// - `401 Unauthorized` - Missing or invalid token
/// - `404 Not Found` - User not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/users/{id}/public-profile",
    tag = USER_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Public profile", body = PublicProfileDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 404, description = "User not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_public_profile(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let user = UserService::new(&state.db).get_public_profile(id).await?;

    Ok((StatusCode::OK, Json(user.into_public_dto())))
}

/// Deactivate the caller's account.
///
/// Cancels the user's bookings, open negotiations and upcoming trips. The account cannot
/// sign in afterwards.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can deactivate their account
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `payload` - Optional reason for leaving
///
/// # Returns
/// - `200 OK` - Account deactivated
/// - `401 Unauthorized` - Missing or invalid token
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/users/me/deactivate",
    tag = USER_TAG,
    security(("bearer_auth" = [])),
    request_body = DeactivateAccountDto,
    responses(
        (status = 200, description = "Account deactivated", body = DeactivationDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn deactivate_me(
    State(state): State<AppState>,
    bearer: BearerToken,
    Json(payload): Json<DeactivateAccountDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let deactivation = UserService::new(&state.db)
        .deactivate(&user, payload.reason)
        .await?;

    Ok((StatusCode::OK, Json(deactivation.into_dto())))
}
