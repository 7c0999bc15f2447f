use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::model::api::ErrorDto;

#[derive(Error, Debug)]
pub enum AuthError {
    /// No `Authorization: Bearer` header was sent with the request.
    ///
    /// Results in a 401 Unauthorized response.
    #[error("Missing bearer token")]
    MissingToken,

    /// The token failed signature or expiry validation, or is of the wrong kind
    /// (a refresh token presented as an access token and vice versa).
    ///
    /// Results in a 401 Unauthorized response.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The one-time password is wrong, expired, already used, or its attempts are exhausted.
    ///
    /// Results in a 400 Bad Request response.
    #[error("Invalid or expired verification code")]
    InvalidOtp,

    /// The token references a user ID that no longer exists.
    ///
    /// Results in a 401 Unauthorized response.
    #[error("User {0} from token not found in database")]
    UserNotInDatabase(i32),

    /// The user has been blocked by an administrator.
    ///
    /// Results in a 403 Forbidden response.
    #[error("User {0} is blocked")]
    UserBlocked(i32),

    /// The user lacks the permission required by the endpoint.
    ///
    /// Results in a 403 Forbidden response.
    ///
    /// # Fields
    /// - User ID that was denied
    /// - Description of the missing permission, logged server-side only
    #[error("User {0} denied access: {1}")]
    AccessDenied(i32, String),
}

/// Converts authentication errors into HTTP responses.
///
/// - `MissingToken` / `InvalidToken` / `UserNotInDatabase` → 401 Unauthorized
/// - `InvalidOtp` → 400 Bad Request
/// - `UserBlocked` / `AccessDenied` → 403 Forbidden
///
/// All errors are logged at debug level for diagnostics while keeping client-facing messages
/// generic to avoid information leakage.
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        tracing::debug!("{}", self);

        let (status, message) = match self {
            Self::MissingToken | Self::InvalidToken | Self::UserNotInDatabase(_) => {
                (StatusCode::UNAUTHORIZED, "Could not validate credentials")
            }
            Self::InvalidOtp => (StatusCode::BAD_REQUEST, "Invalid or expired verification code"),
            Self::UserBlocked(_) => (StatusCode::FORBIDDEN, "Account is blocked"),
            Self::AccessDenied(_, _) => (StatusCode::FORBIDDEN, "Insufficient permissions"),
        };

        (
            status,
            Json(ErrorDto {
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}
