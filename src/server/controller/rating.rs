use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    model::{
        api::ErrorDto,
        rating::{
            CreateRatingDto, RateableUserDto, RatingDto, RatingEligibilityDto, RatingSummaryDto,
            UpdateRatingDto,
        },
    },
    server::{
        error::AppError,
        middleware::{auth::AuthGuard, token::BearerToken},
        model::rating::{CreateRatingParams, RateableUser, UpdateRatingParams},
        service::rating::RatingService,
        state::AppState,
    },
};

pub static RATING_TAG: &str = "ratings";

/// Rate a user from a shared trip.
///
/// The trip must be completed and both users must have traveled on it. Each pair rates once
/// per trip.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can rate users
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `payload` - Trip, rated user and scores
///
/// # Returns
/// - `201 Created` - Rating recorded
/// - `400 Bad Request` - Scores out of range, trip not finished, or users did not travel
///   together
/// - `401 Unauthorized` - Missing or invalid token
/// - `404 Not Found` - Trip not found
/// - `409 Conflict` - Already rated this user for this trip
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/ratings",
    tag = RATING_TAG,
    security(("bearer_auth" = [])),
    request_body = CreateRatingDto,
    responses(
        (status = 201, description = "Rating recorded", body = RatingDto),
        (status = 400, description = "Scores out of range, trip not finished, or users did not travel together", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 404, description = "Trip not found", body = ErrorDto),
        (status = 409, description = "Already rated this user for this trip", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn create_rating(
    State(state): State<AppState>,
    bearer: BearerToken,
    Json(payload): Json<CreateRatingDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let rating = RatingService::new(&state.db)
        .create(CreateRatingParams::from_dto(user.id, payload))
        .await?;

    Ok((StatusCode::CREATED, Json(rating.into_dto())))
}

/// List ratings the caller gave.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can view their ratings
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
///
/// # Returns
/// - `200 OK` - Ratings written by the signed-in user
/// - `401 Unauthorized` - Missing or invalid token
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/ratings/given",
    tag = RATING_TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Ratings written by the signed-in user", body = Vec<RatingDto>),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_given_ratings(
    State(state): State<AppState>,
    bearer: BearerToken,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let ratings = RatingService::new(&state.db).get_given(user.id).await?;
    let ratings_dto: Vec<RatingDto> = ratings.into_iter().map(|r| r.into_dto()).collect();

    Ok((StatusCode::OK, Json(ratings_dto)))
}

/// List ratings the caller received.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can view their ratings
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
///
/// # Returns
/// - `200 OK` - Ratings about the signed-in user
/// - `401 Unauthorized` - Missing or invalid token
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/ratings/received",
    tag = RATING_TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Ratings about the signed-in user", body = Vec<RatingDto>),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_received_ratings(
    State(state): State<AppState>,
    bearer: BearerToken,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let ratings = RatingService::new(&state.db).get_received(user.id).await?;
    let ratings_dto: Vec<RatingDto> = ratings.into_iter().map(|r| r.into_dto()).collect();

    Ok((StatusCode::OK, Json(ratings_dto)))
}

/// Get a user's rating summary.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can view rating summaries
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - User ID
///
/// # Returns
/// - `200 OK` - Average, count, and score distribution
/// - `401 Unauthorized` - Missing or invalid token
/// - `404 Not Found` - User not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/ratings/users/{id}/summary",
    tag = RATING_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Average, count, and score distribution", body = RatingSummaryDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 404, description = "User not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_rating_summary(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let summary = RatingService::new(&state.db).summary(id).await?;

    Ok((StatusCode::OK, Json(summary.into_dto())))
}

/// Delete a rating.
///
/// Only allowed within 24 hours of creation. The rated user's average is recomputed.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can delete ratings they gave
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Rating ID
///
/// # Returns
/// - `204 No Content` - Rating deleted and aggregate recomputed
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - Caller did not write this rating
/// - `404 Not Found` - Rating not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    delete,
    path = "/ratings/{id}",
    tag = RATING_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Rating ID")
    ),
    responses(
        (status = 204, description = "Rating deleted and aggregate recomputed"),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "Caller did not write this rating", body = ErrorDto),
        (status = 404, description = "Rating not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn delete_rating(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    RatingService::new(&state.db).delete(user.id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Edit a rating.
///
/// Only allowed within 24 hours of creation. The rated user's average is recomputed.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can edit ratings they gave
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Rating ID
/// - `payload` - New scores and review
///
/// # Returns
/// - `200 OK` - Rating updated and aggregate recomputed
/// - `400 Bad Request` - Scores out of range or edit window closed
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - Caller did not write this rating
/// - `404 Not Found` - Rating not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    patch,
    path = "/ratings/{id}",
    tag = RATING_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Rating ID")
    ),
    request_body = UpdateRatingDto,
    responses(
        (status = 200, description = "Rating updated and aggregate recomputed", body = RatingDto),
        (status = 400, description = "Scores out of range or edit window closed", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "Caller did not write this rating", body = ErrorDto),
        (status = 404, description = "Rating not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn update_rating(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateRatingDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let rating = RatingService::new(&state.db)
        .update(user.id, id, UpdateRatingParams::from_dto(payload))
        .await?;

    Ok((StatusCode::OK, Json(rating.into_dto())))
}

/// Check whether the caller can rate from a booking.
///
/// An ineligible result carries the reason.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can check bookings they are part of
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Booking ID
///
/// # Returns
/// - `200 OK` - Eligibility and the user that can be rated
/// - `401 Unauthorized` - Missing or invalid token
/// - `404 Not Found` - Booking not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/ratings/bookings/{id}/can-rate",
    tag = RATING_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Booking ID")
    ),
    responses(
        (status = 200, description = "Eligibility and the user that can be rated", body = RatingEligibilityDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 404, description = "Booking not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn can_rate_booking(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let eligibility = RatingService::new(&state.db).can_rate(user.id, id).await?;

    Ok((StatusCode::OK, Json(eligibility.into_dto())))
}

/// List users the caller has yet to rate on a trip.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can check trips they took part in
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Trip ID
///
/// # Returns
/// - `200 OK` - Participants the caller has not rated yet
/// - `401 Unauthorized` - Missing or invalid token
/// - `404 Not Found` - Trip not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/ratings/trips/{id}/pending",
    tag = RATING_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Trip ID")
    ),
    responses(
        (status = 200, description = "Participants the caller has not rated yet", body = Vec<RateableUserDto>),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 404, description = "Trip not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_pending_ratings(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let pending = RatingService::new(&state.db)
        .pending_for_trip(user.id, id)
        .await?;
    let pending_dto: Vec<RateableUserDto> =
        pending.into_iter().map(RateableUser::into_dto).collect();

    Ok((StatusCode::OK, Json(pending_dto)))
}
