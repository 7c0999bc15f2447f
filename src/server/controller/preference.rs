use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    model::{
        api::ErrorDto,
        preference::{
            CompatibilityDto, TravelPreferenceDto, UpdateUserSettingsDto, UserSettingsDto,
        },
    },
    server::{
        error::AppError,
        middleware::{auth::AuthGuard, token::BearerToken},
        model::preference::TravelPreference,
        service::preference::PreferenceService,
        state::AppState,
    },
};

pub static PREFERENCE_TAG: &str = "preferences";

/// Get the caller's travel preferences.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can read their preferences
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
///
/// # Returns
/// - `200 OK` - Travel preferences, defaults when never saved
/// - `401 Unauthorized` - Missing or invalid token
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/preferences/travel",
    tag = PREFERENCE_TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Travel preferences, defaults when never saved", body = TravelPreferenceDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_travel_preference(
    State(state): State<AppState>,
    bearer: BearerToken,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let preference = PreferenceService::new(&state.db)
        .get_travel_preference(user.id)
        .await?;

    Ok((StatusCode::OK, Json(preference.into_dto())))
}

/// Create or replace the caller's travel preferences.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can update their preferences
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `payload` - Travel habits, preferred gender and comfort level
///
/// # Returns
/// - `200 OK` - Travel preferences saved
/// - `400 Bad Request` - Non-positive price limit
/// - `401 Unauthorized` - Missing or invalid token
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    put,
    path = "/preferences/travel",
    tag = PREFERENCE_TAG,
    security(("bearer_auth" = [])),
    request_body = TravelPreferenceDto,
    responses(
        (status = 200, description = "Travel preferences saved", body = TravelPreferenceDto),
        (status = 400, description = "Non-positive price limit", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn save_travel_preference(
    State(state): State<AppState>,
    bearer: BearerToken,
    Json(payload): Json<TravelPreferenceDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let preference = PreferenceService::new(&state.db)
        .save_travel_preference(user.id, TravelPreference::from_dto(payload))
        .await?;

    Ok((StatusCode::OK, Json(preference.into_dto())))
}

/// Get the caller's notification settings.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can read their settings
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
///
/// # Returns
/// - `200 OK` - Notification and privacy settings
/// - `401 Unauthorized` - Missing or invalid token
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/preferences/settings",
    tag = PREFERENCE_TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Notification and privacy settings", body = UserSettingsDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_settings(
    State(state): State<AppState>,
    bearer: BearerToken,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let settings = PreferenceService::new(&state.db).get_settings(user.id).await?;

    Ok((StatusCode::OK, Json(settings.into_dto())))
}

/// Update the caller's notification settings.
///
/// The settings decide which channels the notification fan-out uses.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can update their settings
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `payload` - Channel and notification switches
///
/// # Returns
/// - `200 OK` - Settings updated
/// - `401 Unauthorized` - Missing or invalid token
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    patch,
    path = "/preferences/settings",
    tag = PREFERENCE_TAG,
    security(("bearer_auth" = [])),
    request_body = UpdateUserSettingsDto,
    responses(
        (status = 200, description = "Settings updated", body = UserSettingsDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn update_settings(
    State(state): State<AppState>,
    bearer: BearerToken,
    Json(payload): Json<UpdateUserSettingsDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let settings = PreferenceService::new(&state.db)
        .update_settings(user.id, payload)
        .await?;

    Ok((StatusCode::OK, Json(settings.into_dto())))
}

/// Score travel compatibility with another user.
///
/// Users are compatible at a score of 60 or more.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can compare preferences
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `user_id` - User to compare against
///
/// # Returns
/// - `200 OK` - Compatibility score between 0 and 100
/// - `400 Bad Request` - Compared a user with themselves
/// - `401 Unauthorized` - Missing or invalid token
/// - `404 Not Found` - User not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/preferences/compatibility/{user_id}",
    tag = PREFERENCE_TAG,
    security(("bearer_auth" = [])),
    params(
        ("user_id" = i32, Path, description = "User to compare against")
    ),
    responses(
        (status = 200, description = "Compatibility score between 0 and 100", body = CompatibilityDto),
        (status = 400, description = "Compared a user with themselves", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 404, description = "User not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_compatibility(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(user_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let compatibility = PreferenceService::new(&state.db)
        .compatibility(user.id, user_id)
        .await?;

    Ok((StatusCode::OK, Json(compatibility.into_dto())))
}
