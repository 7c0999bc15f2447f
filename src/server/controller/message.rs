use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    model::{
        api::ErrorDto,
        message::{
            ChatMessageDto, DirectMessageDto, SendMessageDto, ThreadDetailDto, ThreadSummaryDto,
        },
        notification::UnreadCountDto,
    },
    server::{
        error::AppError,
        middleware::{auth::AuthGuard, token::BearerToken},
        service::message::MessageService,
        state::AppState,
    },
};

/// Tag for grouping message endpoints in OpenAPI documentation
pub static MESSAGE_TAG: &str = "messages";

/// List the caller's conversations.
///
/// Each entry carries the last message and the caller's unread count.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can view their conversations
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
///
/// # Returns
/// - `200 OK` - Threads of the signed-in user, latest activity first
/// - `401 Unauthorized` - Missing or invalid token
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/messages/threads",
    tag = MESSAGE_TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Threads of the signed-in user, latest activity first", body = Vec<ThreadSummaryDto>),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_threads(
    State(state): State<AppState>,
    bearer: BearerToken,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let threads = MessageService::new(&state.db).get_threads(user.id).await?;
    let threads_dto: Vec<ThreadSummaryDto> =
        threads.into_iter().map(|thread| thread.into_dto()).collect();

    Ok((StatusCode::OK, Json(threads_dto)))
}

/// Get a conversation with its messages.
///
/// Reading a thread marks it read for the caller.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can read conversations they take part in
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Thread ID
///
/// # Returns
/// - `200 OK` - Thread with every message, oldest first
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - Caller is not a participant
/// - `404 Not Found` - Thread not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/messages/threads/{id}",
    tag = MESSAGE_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Thread ID")
    ),
    responses(
        (status = 200, description = "Thread with every message, oldest first", body = ThreadDetailDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "Caller is not a participant", body = ErrorDto),
        (status = 404, description = "Thread not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_thread(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let thread = MessageService::new(&state.db).get_thread(user.id, id).await?;

    Ok((StatusCode::OK, Json(thread.into_dto())))
}

/// Send a message to a conversation.
///
/// Messages are trimmed and limited to 2000 characters. Other participants are notified.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can write to conversations they take part in
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Thread ID
/// - `payload` - Message text and type
///
/// # Returns
/// - `201 Created` - Message sent
/// - `400 Bad Request` - Empty or oversized message
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - Caller is not a participant
/// - `404 Not Found` - Thread not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/messages/threads/{id}",
    tag = MESSAGE_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Thread ID")
    ),
    request_body = SendMessageDto,
    responses(
        (status = 201, description = "Message sent", body = ChatMessageDto),
        (status = 400, description = "Empty or oversized message", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "Caller is not a participant", body = ErrorDto),
        (status = 404, description = "Thread not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn send_message(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
    Json(payload): Json<SendMessageDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let message = MessageService::new(&state.db)
        .send(user.id, id, &payload.content, payload.message_type)
        .await?;

    Ok((StatusCode::CREATED, Json(message.into_dto())))
}

/// Mark a conversation as read.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can update their read marker
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Thread ID
///
/// # Returns
/// - `204 No Content` - Thread marked read
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - Caller is not a participant
/// - `404 Not Found` - Thread not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/messages/threads/{id}/read",
    tag = MESSAGE_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Thread ID")
    ),
    responses(
        (status = 204, description = "Thread marked read"),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "Caller is not a participant", body = ErrorDto),
        (status = 404, description = "Thread not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn mark_thread_read(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    MessageService::new(&state.db).mark_read(user.id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Open or join the conversation of a trip.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can join conversations of trips they drive or
///   booked
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `trip_id` - Trip ID
///
/// # Returns
/// - `200 OK` - The trip's thread, joined by the caller
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - Caller neither drives nor holds a confirmed booking
/// - `404 Not Found` - Trip not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/messages/trips/{trip_id}/conversation",
    tag = MESSAGE_TAG,
    security(("bearer_auth" = [])),
    params(
        ("trip_id" = i32, Path, description = "Trip ID")
    ),
    responses(
        (status = 200, description = "The trip's thread, joined by the caller", body = ThreadDetailDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "Caller neither drives nor holds a confirmed booking", body = ErrorDto),
        (status = 404, description = "Trip not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn start_trip_conversation(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(trip_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let thread = MessageService::new(&state.db)
        .start_trip_conversation(user.id, trip_id)
        .await?;

    Ok((StatusCode::OK, Json(thread.into_dto())))
}

/// Count unread messages.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can count their unread messages
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
///
/// # Returns
/// - `200 OK` - Unread messages across all threads
/// - `401 Unauthorized` - Missing or invalid token
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    get,
    path = "/messages/unread-count",
    tag = MESSAGE_TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Unread messages across all threads", body = UnreadCountDto),
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

    let unread_count = MessageService::new(&state.db).unread_count(user.id).await?;

    Ok((StatusCode::OK, Json(UnreadCountDto { unread_count })))
}

/// Send a direct message to another user.
///
/// Reuses the existing direct conversation between the two users or creates one.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can message users they shared a booking with
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `user_id` - User to write to
/// - `payload` - Message text
///
/// # Returns
/// - `201 Created` - Direct thread with the opening message
/// - `400 Bad Request` - Messaging yourself, or an empty or oversized message
/// - `401 Unauthorized` - Missing or invalid token
/// - `403 Forbidden` - The users never shared a booking
/// - `404 Not Found` - User not found
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    post,
    path = "/messages/users/{user_id}/conversation",
    tag = MESSAGE_TAG,
    security(("bearer_auth" = [])),
    params(
        ("user_id" = i32, Path, description = "User to write to")
    ),
    request_body = DirectMessageDto,
    responses(
        (status = 201, description = "Direct thread with the opening message", body = ThreadDetailDto),
        (status = 400, description = "Messaging yourself, or an empty or oversized message", body = ErrorDto),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 403, description = "The users never shared a booking", body = ErrorDto),
        (status = 404, description = "User not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn start_direct_conversation(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(user_id): Path<i32>,
    Json(payload): Json<DirectMessageDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    let thread = MessageService::new(&state.db)
        .start_direct_conversation(user.id, user_id, &payload.content)
        .await?;

    Ok((StatusCode::CREATED, Json(thread.into_dto())))
}

/// Delete a message.
///
/// The message is hidden from every participant.
///
/// # Access Control
/// - `Authenticated` - Any signed-in user can delete messages they sent
///
/// # Arguments
/// - `state` - Application state containing the database connection
/// - `bearer` - Access token from the `Authorization` header
/// - `id` - Message ID
///
/// # Returns
/// - `204 No Content` - Message deleted
/// - `401 Unauthorized` - Missing or invalid token
/// - `404 Not Found` - Message not found or not sent by the caller
/// - `500 Internal Server Error` - Internal server error
#[utoipa::path(
    delete,
    path = "/messages/{id}",
    tag = MESSAGE_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Message ID")
    ),
    responses(
        (status = 204, description = "Message deleted"),
        (status = 401, description = "Missing or invalid token", body = ErrorDto),
        (status = 404, description = "Message not found or not sent by the caller", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn delete_message(
    State(state): State<AppState>,
    bearer: BearerToken,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &state.tokens, &bearer)
        .require(&[])
        .await?;

    MessageService::new(&state.db)
        .delete_message(user.id, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
