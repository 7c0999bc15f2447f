use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    model::{
        api::ErrorDto,
        auth::{
            AccessTokenDto, OtpSentDto, RefreshTokenDto, RequestOtpDto, TokenPairDto,
            VerifyLoginDto, VerifyRegistrationDto,
        },
    },
    server::{error::AppError, service::auth::AuthService, state::AppState},
};

/// Tag for grouping auth endpoints in OpenAPI documentation
pub static AUTH_TAG: &str = "auth";

fn auth_service(state: &AppState) -> AuthService<'_> {
    AuthService::new(
        &state.db,
        &state.tokens,
        state.gateways.sms.as_ref(),
        state.otp,
    )
}

fn otp_sent(state: &AppState) -> OtpSentDto {
    OtpSentDto {
        message: "Verification code sent".to_string(),
        expires_in_minutes: state.otp.expire_minutes,
    }
}

/// Send a registration code by SMS.
///
/// Creates a pending user for an unknown phone number. Requests are rate limited per
/// client.
///
/// # Access Control
/// - `Public` - No access token required
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `payload` - Phone number to send the code to
///
/// # Returns
/// - `200 OK` - Verification code sent
/// - `400 Bad Request` - Malformed phone or phone already registered
/// - `429 Too Many Requests` - Too many code requests from this address
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/auth/register/request-otp",
    tag = AUTH_TAG,
    request_body = RequestOtpDto,
    responses(
        (status = 200, description = "Verification code sent", body = OtpSentDto),
        (status = 400, description = "Malformed phone or phone already registered", body = ErrorDto),
        (status = 429, description = "Too many code requests from this address"),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn request_registration_otp(
    State(state): State<AppState>,
    Json(payload): Json<RequestOtpDto>,
) -> Result<impl IntoResponse, AppError> {
    auth_service(&state)
        .request_registration_otp(&payload.phone_number)
        .await?;

    Ok((StatusCode::OK, Json(otp_sent(&state))))
}

/// Verify a registration code and sign in.
///
/// A correct code activates the pending user and returns an access and refresh token pair.
/// Each code allows at most three attempts.
///
/// # Access Control
/// - `Public` - No access token required
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `payload` - Phone number, code and full name
///
/// # Returns
/// - `201 Created` - Registration completed
/// - `400 Bad Request` - Invalid code, blank name, or no pending registration
/// - `429 Too Many Requests` - Too many attempts from this address
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/auth/register/verify-otp",
    tag = AUTH_TAG,
    request_body = VerifyRegistrationDto,
    responses(
        (status = 201, description = "Registration completed", body = TokenPairDto),
        (status = 400, description = "Invalid code, blank name, or no pending registration", body = ErrorDto),
        (status = 429, description = "Too many attempts from this address"),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn verify_registration(
    State(state): State<AppState>,
    Json(payload): Json<VerifyRegistrationDto>,
) -> Result<impl IntoResponse, AppError> {
    let issued = auth_service(&state)
        .verify_registration(&payload.phone_number, &payload.code, &payload.full_name)
        .await?;

    Ok((StatusCode::CREATED, Json(issued.into_dto())))
}

/// Send a login code by SMS.
///
/// Requests are rate limited per client.
///
/// # Access Control
/// - `Public` - No access token required
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `payload` - Phone number to send the code to
///
/// # Returns
/// - `200 OK` - Verification code sent
/// - `400 Bad Request` - Malformed phone number
/// - `403 Forbidden` - Account is blocked
/// - `404 Not Found` - Phone number not registered
/// - `429 Too Many Requests` - Too many code requests from this address
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/auth/login/request-otp",
    tag = AUTH_TAG,
    request_body = RequestOtpDto,
    responses(
        (status = 200, description = "Verification code sent", body = OtpSentDto),
        (status = 400, description = "Malformed phone number", body = ErrorDto),
        (status = 403, description = "Account is blocked", body = ErrorDto),
        (status = 404, description = "Phone number not registered", body = ErrorDto),
        (status = 429, description = "Too many code requests from this address"),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn request_login_otp(
    State(state): State<AppState>,
    Json(payload): Json<RequestOtpDto>,
) -> Result<impl IntoResponse, AppError> {
    auth_service(&state)
        .request_login_otp(&payload.phone_number)
        .await?;

    Ok((StatusCode::OK, Json(otp_sent(&state))))
}

/// Verify a login code and sign in.
///
/// Blocked and deactivated users are refused with 403.
///
/// # Access Control
/// - `Public` - No access token required
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `payload` - Phone number and code
///
/// # Returns
/// - `200 OK` - Logged in
/// - `400 Bad Request` - Invalid or expired code
/// - `403 Forbidden` - Account is blocked
/// - `404 Not Found` - Phone number not registered
/// - `429 Too Many Requests` - Too many attempts from this address
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/auth/login/verify-otp",
    tag = AUTH_TAG,
    request_body = VerifyLoginDto,
    responses(
        (status = 200, description = "Logged in", body = TokenPairDto),
        (status = 400, description = "Invalid or expired code", body = ErrorDto),
        (status = 403, description = "Account is blocked", body = ErrorDto),
        (status = 404, description = "Phone number not registered", body = ErrorDto),
        (status = 429, description = "Too many attempts from this address"),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn verify_login(
    State(state): State<AppState>,
    Json(payload): Json<VerifyLoginDto>,
) -> Result<impl IntoResponse, AppError> {
    let issued = auth_service(&state)
        .verify_login(&payload.phone_number, &payload.code)
        .await?;

    Ok((StatusCode::OK, Json(issued.into_dto())))
}

/// Exchange a refresh token for a new access token.
///
/// The refresh token itself is not rotated; clients keep using it until it expires.
///
/// # Access Control
/// - `Public` - No access token required
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `payload` - Refresh token from the last sign-in
///
/// # Returns
/// - `200 OK` - New access token
/// - `401 Unauthorized` - Invalid or expired refresh token
/// - `403 Forbidden` - Account is blocked
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = AUTH_TAG,
    request_body = RefreshTokenDto,
    responses(
        (status = 200, description = "New access token", body = AccessTokenDto),
        (status = 401, description = "Invalid or expired refresh token", body = ErrorDto),
        (status = 403, description = "Account is blocked", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenDto>,
) -> Result<impl IntoResponse, AppError> {
    let (access_token, expires_in) = auth_service(&state)
        .refresh(&payload.refresh_token)
        .await?;

    Ok((
        StatusCode::OK,
        Json(AccessTokenDto {
            access_token,
            token_type: "bearer".to_string(),
            expires_in,
        }),
    ))
}
