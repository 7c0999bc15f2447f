use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    model::{
        api::ErrorDto,
        negotiation::{
            AutoAcceptRuleDto, BulkRespondDto, BulkRespondResultDto, CounterOfferDto,
            NegotiationDto, NegotiationListQuery, NegotiationPageDto, OpenNegotiationDto,
            PriceRecommendationDto, PriceRecommendationQuery, RespondOfferDto,
        },
    },
    server::{
        error::AppError,
        middleware::{
            auth::{AuthGuard, Permission},
            token::BearerToken,
        },
        model::negotiation::{AutoAcceptRule, OpenNegotiationParams},
        service::negotiation::NegotiationService,
        state::AppState,
    },
};

/// Tag for grouping negotiation endpoints in OpenAPI documentation
pub static NEGOTIATION_TAG: &str = "negotiations";

/// Open a price negotiation on a trip.
///
/// When the driver's auto-accept rule covers the offered price the negotiation is accepted
/// immediately and the response already carries the booking id.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can open negotiations
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `payload` - Trip ID, seat count, offered price and optional message
///
/// # Returns
/// - `201 Created` - Negotiation opened, possibly auto-accepted
/// - `400 Bad Request` - Trip not negotiable, own trip, or invalid price or seats
/// - `401 Unauthorized` - Missing or invalid token
/// - `404 Not Found` - Trip not found
/// - `409 Conflict` - Open negotiation or booking already exists
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/negotiations",
    tag = NEGOTIATION_TAG,
    security(("bearer_auth" = [])),
    request_body = OpenNegotiationDto,
    responses(
        (status = 201, description = "Negotiation opened, possibly auto-accepted", body = NegotiationDto),
        (status = 400, description = "Trip not negotiable, own trip, or invalid price or seats", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 404, description = "Trip not found", body = ErrorDto),
        (status = 409, description = "Open negotiation or booking already exists", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn open_negotiation(
    State(state): State<AppState>,
    bearer: BearerToken,
    Json(payload): Json<OpenNegotiationDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let negotiation = NegotiationService::new(&state.db)
        .open(OpenNegotiationParams::from_dto(user.id, payload))
        .await?;

    Ok((StatusCode::CREATED, Json(negotiation.into_dto())))
}

/// List negotiations the caller opened.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can view their negotiations
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `query` - Optional status filter and pagination
///
/// # Returns
/// - `200 OK` - Negotiations opened by the signed-in passenger
/// - `401 Unauthorized` - Missing or invalid token
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/negotiations/my-offers",
    tag = NEGOTIATION_TAG,
    security(("bearer_auth" = [])),
    params(NegotiationListQuery),
    responses(
        (status = 200, description = "Negotiations opened by the signed-in passenger", body = NegotiationPageDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_my_offers(
    State(state): State<AppState>,
    bearer: BearerToken,
    Query(query): Query<NegotiationListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let page = NegotiationService::new(&state.db)
        .get_my_offers(user.id, query.status, query.page, query.entries.clamp(1, 100))
        .await?;

    Ok((StatusCode::OK, Json(page.into_dto())))
}

/// List negotiations on the caller's trips.
///
/// # Access Control
/// - `Driver` - Only drivers can view negotiations on their trips
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `query` - Optional status filter and pagination
///
/// # Returns
/// - `200 OK` - Negotiations on the signed-in driver's trips
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - User is not a driver
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/negotiations/received-offers",
    tag = NEGOTIATION_TAG,
    security(("bearer_auth" = [])),
    params(NegotiationListQuery),
    responses(
        (status = 200, description = "Negotiations on the signed-in driver's trips", body = NegotiationPageDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "User is not a driver", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_received_offers(
    State(state): State<AppState>,
    bearer: BearerToken,
    Query(query): Query<NegotiationListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[Permission::Driver])
        .await?;

    let page = NegotiationService::new(&state.db)
        .get_received_offers(user.id, query.status, query.page, query.entries.clamp(1, 100))
        .await?;

    Ok((StatusCode::OK, Json(page.into_dto())))
}

/// List negotiations on one trip.
///
/// # Access Control
/// - `Driver` - Only drivers can view negotiations on trips they drive
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `trip_id` - Trip ID
///
/// # Returns
/// - `200 OK` - Every negotiation on the trip
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - Caller does not drive this trip
/// - `404 Not Found` - Trip not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/negotiations/trip/{trip_id}",
    tag = NEGOTIATION_TAG,
    security(("bearer_auth" = [])),
    params(
        ("trip_id" = i32, Path, description = "Trip ID")
    ),
    responses(
        (status = 200, description = "Every negotiation on the trip", body = Vec<NegotiationDto>),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "Caller does not drive this trip", body = ErrorDto),
        (status = 404, description = "Trip not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_trip_negotiations(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(trip_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[Permission::Driver])
        .await?;

    let negotiations = NegotiationService::new(&state.db)
        .get_for_trip(user.id, trip_id)
        .await?;
    let negotiations_dto: Vec<NegotiationDto> = negotiations
        .into_iter()
        .map(|negotiation| negotiation.into_dto())
        .collect();

    Ok((StatusCode::OK, Json(negotiations_dto)))
}

/// Get the caller's auto-accept rule.
///
/// # Access Control
/// - `Driver` - Only drivers can read their auto-accept rule
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
///
/// # Returns
/// - `200 OK` - The driver's auto-accept rule
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - User is not a driver
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/negotiations/auto-accept-rule",
    tag = NEGOTIATION_TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The driver's auto-accept rule", body = AutoAcceptRuleDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "User is not a driver", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_auto_accept_rule(
    State(state): State<AppState>,
    bearer: BearerToken,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[Permission::Driver])
        .await?;

    let rule = NegotiationService::new(&state.db)
        .get_auto_accept_rule(user.id)
        .await?;

    Ok((StatusCode::OK, Json(rule.into_dto())))
}

/// Create or replace the caller's auto-accept rule.
///
/// Opening offers at or above the rule's threshold are accepted without the driver.
///
/// # Access Control
/// - `Driver` - Only drivers can configure auto-accept
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `payload` - Rule settings (enabled flag, minimum percentage, maximum discount)
///
/// # Returns
/// - `200 OK` - Rule saved
/// - `400 Bad Request` - Percentage outside 1..=100 or negative discount
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - User is not a driver
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    put,
    path = "/negotiations/auto-accept-rule",
    tag = NEGOTIATION_TAG,
    security(("bearer_auth" = [])),
    request_body = AutoAcceptRuleDto,
    responses(
        (status = 200, description = "Rule saved", body = AutoAcceptRuleDto),
        (status = 400, description = "Percentage outside 1..=100 or negative discount", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "User is not a driver", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn update_auto_accept_rule(
    State(state): State<AppState>,
    bearer: BearerToken,
    Json(payload): Json<AutoAcceptRuleDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[Permission::Driver])
        .await?;

    let rule = NegotiationService::new(&state.db)
        .update_auto_accept_rule(user.id, AutoAcceptRule::from_dto(payload))
        .await?;

    Ok((StatusCode::OK, Json(rule.into_dto())))
}

/// Recommend a seat price for a route.
///
/// The recommendation averages comparable trips and falls back to a base price when there
/// is no history.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can request price recommendations
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `query` - Route and comfort level to price
///
/// # Returns
/// - `200 OK` - Suggested seat price for the route
/// - `401 Unauthorized` - Missing or invalid token
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/negotiations/price-recommendation",
    tag = NEGOTIATION_TAG,
    security(("bearer_auth" = [])),
    params(PriceRecommendationQuery),
    responses(
        (status = 200, description = "Suggested seat price for the route", body = PriceRecommendationDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_price_recommendation(
    State(state): State<AppState>,
    bearer: BearerToken,
    Query(query): Query<PriceRecommendationQuery>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let recommendation = NegotiationService::new(&state.db)
        .recommend_price(&query.from_location, &query.to_location, query.comfort_level)
        .await?;

    Ok((StatusCode::OK, Json(recommendation.into_dto())))
}

/// Get a negotiation with its offers.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can view negotiations they take part in
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Negotiation ID
///
/// # Returns
/// - `200 OK` - The negotiation with its offer history
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - Caller is not a party to the negotiation
/// - `404 Not Found` - Negotiation not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/negotiations/{id}",
    tag = NEGOTIATION_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Negotiation ID")
    ),
    responses(
        (status = 200, description = "The negotiation with its offer history", body = NegotiationDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "Caller is not a party to the negotiation", body = ErrorDto),
        (status = 404, description = "Negotiation not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_negotiation(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let negotiation = NegotiationService::new(&state.db).get(user.id, id).await?;

    Ok((StatusCode::OK, Json(negotiation.into_dto())))
}

/// Answer the head offer with a new price.
///
/// Only the party who did not make the head offer may counter. An expired head offer
/// expires the whole negotiation and the request fails with 409.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can counter in negotiations they take part in
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Negotiation ID
/// - `payload` - Counter price per seat and optional message
///
/// # Returns
/// - `200 OK` - Counter offer recorded
/// - `400 Bad Request` - Invalid price
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - Not the caller's turn or not a party
/// - `404 Not Found` - Negotiation not found
/// - `409 Conflict` - Negotiation already resolved or expired
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/negotiations/{id}/counter",
    tag = NEGOTIATION_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Negotiation ID")
    ),
    request_body = CounterOfferDto,
    responses(
        (status = 200, description = "Counter offer recorded", body = NegotiationDto),
        (status = 400, description = "Invalid price", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "Not the caller's turn or not a party", body = ErrorDto),
        (status = 404, description = "Negotiation not found", body = ErrorDto),
        (status = 409, description = "Negotiation already resolved or expired", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn counter_offer(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
    Json(payload): Json<CounterOfferDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let negotiation = NegotiationService::new(&state.db)
        .counter(user.id, id, payload.price, payload.message)
        .await?;

    Ok((StatusCode::OK, Json(negotiation.into_dto())))
}

/// Accept the head offer.
///
/// Accepting books the seats at the agreed price in the same transaction.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can accept offers made to them
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Negotiation ID
/// - `payload` - Optional message to the other party
///
/// # Returns
/// - `200 OK` - Offer accepted and booking created
/// - `400 Bad Request` - Not enough seats left on the trip
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - Not the caller's turn or not a party
/// - `404 Not Found` - Negotiation not found
/// - `409 Conflict` - Negotiation already resolved or expired
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/negotiations/{id}/accept",
    tag = NEGOTIATION_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Negotiation ID")
    ),
    request_body = RespondOfferDto,
    responses(
        (status = 200, description = "Offer accepted and booking created", body = NegotiationDto),
        (status = 400, description = "Not enough seats left on the trip", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "Not the caller's turn or not a party", body = ErrorDto),
        (status = 404, description = "Negotiation not found", body = ErrorDto),
        (status = 409, description = "Negotiation already resolved or expired", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn accept_offer(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
    Json(payload): Json<RespondOfferDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let negotiation = NegotiationService::new(&state.db)
        .accept(user.id, id, payload.message)
        .await?;

    Ok((StatusCode::OK, Json(negotiation.into_dto())))
}

/// Reject the head offer.
///
/// Rejecting closes the negotiation.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can reject offers made to them
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Negotiation ID
/// - `payload` - Optional message to the other party
///
/// # Returns
/// - `200 OK` - Offer rejected, negotiation closed
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - Not the caller's turn or not a party
/// - `404 Not Found` - Negotiation not found
/// - `409 Conflict` - Negotiation already resolved or expired
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/negotiations/{id}/reject",
    tag = NEGOTIATION_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Negotiation ID")
    ),
    request_body = RespondOfferDto,
    responses(
        (status = 200, description = "Offer rejected, negotiation closed", body = NegotiationDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "Not the caller's turn or not a party", body = ErrorDto),
        (status = 404, description = "Negotiation not found", body = ErrorDto),
        (status = 409, description = "Negotiation already resolved or expired", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn reject_offer(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
    Json(payload): Json<RespondOfferDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let negotiation = NegotiationService::new(&state.db)
        .reject(user.id, id, payload.message)
        .await?;

    Ok((StatusCode::OK, Json(negotiation.into_dto())))
}

/// Withdraw from a negotiation.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can cancel negotiations they opened
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Negotiation ID
///
/// # Returns
/// - `200 OK` - Negotiation withdrawn by the passenger
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - Caller is not the passenger
/// - `404 Not Found` - Negotiation not found
/// - `409 Conflict` - Negotiation already resolved
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/negotiations/{id}/cancel",
    tag = NEGOTIATION_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Negotiation ID")
    ),
    responses(
        (status = 200, description = "Negotiation withdrawn by the passenger", body = NegotiationDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "Caller is not the passenger", body = ErrorDto),
        (status = 404, description = "Negotiation not found", body = ErrorDto),
        (status = 409, description = "Negotiation already resolved", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn cancel_negotiation(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let negotiation = NegotiationService::new(&state.db).cancel(user.id, id).await?;

    Ok((StatusCode::OK, Json(negotiation.into_dto())))
}

/// Accept or reject several negotiations at once.
///
/// Each negotiation is answered in its own transaction. A failure on one does not undo the
/// others, and the response lists which ids succeeded.
///
/// # Access Control
/// - `Driver` - Only drivers can answer negotiations on their trips
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `payload` - Negotiation IDs, the answer and an optional message
///
/// # Returns
/// - `200 OK` - Per-chain results of the bulk answer
/// - `400 Bad Request` - No IDs or more than 20
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - Caller is not a driver
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/negotiations/bulk-respond",
    tag = NEGOTIATION_TAG,
    security(("bearer_auth" = [])),
    request_body = BulkRespondDto,
    responses(
        (status = 200, description = "Per-chain results of the bulk answer", body = BulkRespondResultDto),
        (status = 400, description = "No IDs or more than 20", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "Caller is not a driver", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn bulk_respond(
    State(state): State<AppState>,
    bearer: BearerToken,
    Json(payload): Json<BulkRespondDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[Permission::Driver])
        .await?;

    let outcome = NegotiationService::new(&state.db)
        .bulk_respond(
            user.id,
            &payload.negotiation_ids,
            payload.answer,
            payload.message,
        )
        .await?;

    Ok((StatusCode::OK, Json(outcome.into_dto())))
}
