use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    model::{
        api::ErrorDto,
        emergency::{
            CreateEmergencyAlertDto, CreateEmergencyContactDto, EmergencyAlertDto,
            EmergencyContactDto, QuickSosDto, ResolveAlertDto, UpdateEmergencyContactDto,
        },
    },
    server::{
        error::AppError,
        middleware::{auth::AuthGuard, token::BearerToken},
        model::emergency::{
            CreateEmergencyAlertParams, CreateEmergencyContactParams, UpdateEmergencyContactParams,
        },
        service::emergency::EmergencyService,
        state::AppState,
    },
};

/// Tag for grouping emergency endpoints in OpenAPI documentation
pub static EMERGENCY_TAG: &str = "emergency";

/// Add an emergency contact.
///
/// At most five contacts are kept. The first contact becomes primary.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can manage their emergency contacts
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `payload` - Contact name, phone and relationship
///
/// # Returns
/// - `201 Created` - Contact added
/// - `400 Bad Request` - Invalid phone, blank fields, or contact limit reached
/// - `401 Unauthorized` - Missing or invalid token
/// - `409 Conflict` - Phone number already in the contact list
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/emergency/contacts",
    tag = EMERGENCY_TAG,
    security(("bearer_auth" = [])),
    request_body = CreateEmergencyContactDto,
    responses(
        (status = 201, description = "Contact added", body = EmergencyContactDto),
        (status = 400, description = "Invalid phone, blank fields, or contact limit reached", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 409, description = "Phone number already in the contact list", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn create_contact(
    State(state): State<AppState>,
    bearer: BearerToken,
    Json(payload): Json<CreateEmergencyContactDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let contact = EmergencyService::new(&state.db)
        .create_contact(CreateEmergencyContactParams::from_dto(user.id, payload))
        .await?;

    Ok((StatusCode::CREATED, Json(contact.into_dto())))
}

/// List emergency contacts.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can view their emergency contacts
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
///
/// # Returns
/// - `200 OK` - Emergency contacts, primary first
/// - `401 Unauthorized` - Missing or invalid token
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/emergency/contacts",
    tag = EMERGENCY_TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Emergency contacts, primary first", body = Vec<EmergencyContactDto>),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_contacts(
    State(state): State<AppState>,
    bearer: BearerToken,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let contacts = EmergencyService::new(&state.db).get_contacts(user.id).await?;
    let contacts_dto: Vec<EmergencyContactDto> =
        contacts.into_iter().map(|contact| contact.into_dto()).collect();

    Ok((StatusCode::OK, Json(contacts_dto)))
}

/// Update an emergency contact.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can manage their emergency contacts
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Contact ID
/// - `payload` - Contact fields to change
///
/// # Returns
/// - `200 OK` - Contact updated
/// - `400 Bad Request` - Invalid phone or blank fields
/// - `401 Unauthorized` - Missing or invalid token
/// - `404 Not Found` - Contact not found
/// - `409 Conflict` - Phone number already in the contact list
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    patch,
    path = "/emergency/contacts/{id}",
    tag = EMERGENCY_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Contact ID")
    ),
    request_body = UpdateEmergencyContactDto,
    responses(
        (status = 200, description = "Contact updated", body = EmergencyContactDto),
        (status = 400, description = "Invalid phone or blank fields", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 404, description = "Contact not found", body = ErrorDto),
        (status = 409, description = "Phone number already in the contact list", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn update_contact(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateEmergencyContactDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let contact = EmergencyService::new(&state.db)
        .update_contact(user.id, id, UpdateEmergencyContactParams::from_dto(payload))
        .await?;

    Ok((StatusCode::OK, Json(contact.into_dto())))
}

/// Delete an emergency contact.
///
/// Removing the primary contact promotes the oldest remaining one.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can manage their emergency contacts
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Contact ID
///
/// # Returns
/// - `204 No Content` - Contact removed
/// - `401 Unauthorized` - Missing or invalid token
/// - `404 Not Found` - Contact not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    delete,
    path = "/emergency/contacts/{id}",
    tag = EMERGENCY_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Contact ID")
    ),
    responses(
        (status = 204, description = "Contact removed"),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 404, description = "Contact not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn delete_contact(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    EmergencyService::new(&state.db)
        .delete_contact(user.id, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Make an emergency contact primary.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can manage their emergency contacts
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Contact ID
///
/// # Returns
/// - `200 OK` - Contact is now primary
/// - `401 Unauthorized` - Missing or invalid token
/// - `404 Not Found` - Contact not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/emergency/contacts/{id}/set-primary",
    tag = EMERGENCY_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Contact ID")
    ),
    responses(
        (status = 200, description = "Contact is now primary", body = EmergencyContactDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 404, description = "Contact not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn set_primary_contact(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let contact = EmergencyService::new(&state.db)
        .set_primary(user.id, id)
        .await?;

    Ok((StatusCode::OK, Json(contact.into_dto())))
}

/// Raise an emergency alert.
///
/// Every emergency contact receives an SMS right away. `sos` and `harassment` alerts also
/// reach every active administrator, and an alert tied to a trip notifies the other people
/// on that trip.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can raise alerts
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `payload` - Alert type, optional trip, location and description
///
/// # Returns
/// - `201 Created` - Alert raised and contacts notified
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - Caller is not on the referenced trip
/// - `404 Not Found` - Trip not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/emergency/alerts",
    tag = EMERGENCY_TAG,
    security(("bearer_auth" = [])),
    request_body = CreateEmergencyAlertDto,
    responses(
        (status = 201, description = "Alert raised and contacts notified", body = EmergencyAlertDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "Caller is not on the referenced trip", body = ErrorDto),
        (status = 404, description = "Trip not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn create_alert(
    State(state): State<AppState>,
    bearer: BearerToken,
    Json(payload): Json<CreateEmergencyAlertDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let params = CreateEmergencyAlertParams::from_dto(user.id, payload);
    let alert = EmergencyService::new(&state.db)
        .create_alert(&user, params)
        .await?;

    Ok((StatusCode::CREATED, Json(alert.into_dto())))
}

/// Raise an SOS alert with a single call.
///
/// Shortcut for an `sos` alert with an optional location.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can raise alerts
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `payload` - Optional trip and location
///
/// # Returns
/// - `201 Created` - SOS alert raised
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - Caller is not on the referenced trip
/// - `404 Not Found` - Trip not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/emergency/sos",
    tag = EMERGENCY_TAG,
    security(("bearer_auth" = [])),
    request_body = QuickSosDto,
    responses(
        (status = 201, description = "SOS alert raised", body = EmergencyAlertDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "Caller is not on the referenced trip", body = ErrorDto),
        (status = 404, description = "Trip not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn quick_sos(
    State(state): State<AppState>,
    bearer: BearerToken,
    Json(payload): Json<QuickSosDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let params = CreateEmergencyAlertParams::quick_sos(user.id, payload);
    let alert = EmergencyService::new(&state.db)
        .create_alert(&user, params)
        .await?;

    Ok((StatusCode::CREATED, Json(alert.into_dto())))
}

/// List the caller's emergency alerts.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can view their alerts
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
///
/// # Returns
/// - `200 OK` - Alerts raised by the signed-in user, newest first
/// - `401 Unauthorized` - Missing or invalid token
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/emergency/alerts",
    tag = EMERGENCY_TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Alerts raised by the signed-in user, newest first", body = Vec<EmergencyAlertDto>),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_my_alerts(
    State(state): State<AppState>,
    bearer: BearerToken,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let alerts = EmergencyService::new(&state.db).get_my_alerts(user.id).await?;
    let alerts_dto: Vec<EmergencyAlertDto> =
        alerts.into_iter().map(|alert| alert.into_dto()).collect();

    Ok((StatusCode::OK, Json(alerts_dto)))
}

/// Get one of the caller's emergency alerts.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can view their alerts
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Alert ID
///
/// # Returns
/// - `200 OK` - The alert
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - Caller is neither the owner nor an admin
/// - `404 Not Found` - Alert not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/emergency/alerts/{id}",
    tag = EMERGENCY_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Alert ID")
    ),
    responses(
        (status = 200, description = "The alert", body = EmergencyAlertDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "Caller is neither the owner nor an admin", body = ErrorDto),
        (status = 404, description = "Alert not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_alert(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let alert = EmergencyService::new(&state.db).get_alert(&user, id).await?;

    Ok((StatusCode::OK, Json(alert.into_dto())))
}

/// Resolve an emergency alert.
///
/// Emergency contacts are told the user is safe.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can resolve their alerts
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Alert ID
/// - `payload` - Optional resolution note
///
/// # Returns
/// - `200 OK` - Alert resolved and contacts informed
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - Caller is neither the owner nor an admin
/// - `404 Not Found` - Alert not found
/// - `409 Conflict` - Alert already resolved
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/emergency/alerts/{id}/resolve",
    tag = EMERGENCY_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Alert ID")
    ),
    request_body = ResolveAlertDto,
    responses(
        (status = 200, description = "Alert resolved and contacts informed", body = EmergencyAlertDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "Caller is neither the owner nor an admin", body = ErrorDto),
        (status = 404, description = "Alert not found", body = ErrorDto),
        (status = 409, description = "Alert already resolved", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn resolve_alert(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
    Json(payload): Json<ResolveAlertDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let alert = EmergencyService::new(&state.db)
        .resolve_alert(&user, id, payload.resolution_note)
        .await?;

    Ok((StatusCode::OK, Json(alert.into_dto())))
}
