use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use lectern_core::AppError;
use lectern_models::{
    Message, MessageFilterParams, MessageId, PaginatedMessagesResponse, SendMessageDto,
};

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::messages::service::MessageService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/messages",
    request_body = SendMessageDto,
    responses(
        (status = 201, description = "Message sent", body = Message),
        (status = 400, description = "Cannot message yourself", body = ErrorResponse),
        (status = 404, description = "Recipient not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Messages"
)]
#[instrument(skip(state, dto))]
pub async fn send_message(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<SendMessageDto>,
) -> Result<(StatusCode, Json<Message>), AppError> {
    let message = MessageService::send_message(&state.db, &auth_user.caller()?, dto).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

#[utoipa::path(
    get,
    path = "/api/messages",
    params(MessageFilterParams),
    responses(
        (status = 200, description = "Messages the caller sent or received", body = PaginatedMessagesResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Messages"
)]
#[instrument(skip(state))]
pub async fn get_messages(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<MessageFilterParams>,
) -> Result<Json<PaginatedMessagesResponse>, AppError> {
    let messages = MessageService::list_messages(&state.db, &auth_user.caller()?, filters).await?;
    Ok(Json(messages))
}

#[utoipa::path(
    get,
    path = "/api/messages/{id}",
    params(("id" = MessageId, Path, description = "Message ID")),
    responses(
        (status = 200, description = "Message", body = Message),
        (status = 404, description = "Message not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Messages"
)]
#[instrument(skip(state))]
pub async fn get_message(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<MessageId>,
) -> Result<Json<Message>, AppError> {
    let message = MessageService::find_visible(&state.db, &auth_user.caller()?, id).await?;
    Ok(Json(message))
}

#[utoipa::path(
    post,
    path = "/api/messages/{id}/read",
    params(("id" = MessageId, Path, description = "Message ID")),
    responses(
        (status = 200, description = "Message marked read", body = Message),
        (status = 403, description = "Not the receiver", body = ErrorResponse),
        (status = 404, description = "Message not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Messages"
)]
#[instrument(skip(state))]
pub async fn mark_message_read(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<MessageId>,
) -> Result<Json<Message>, AppError> {
    let message = MessageService::mark_read(&state.db, &auth_user.caller()?, id).await?;
    Ok(Json(message))
}

#[utoipa::path(
    delete,
    path = "/api/messages/{id}",
    params(("id" = MessageId, Path, description = "Message ID")),
    responses(
        (status = 204, description = "Message deleted"),
        (status = 404, description = "Message not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Messages"
)]
#[instrument(skip(state))]
pub async fn delete_message(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<MessageId>,
) -> Result<StatusCode, AppError> {
    MessageService::delete_message(&state.db, &auth_user.caller()?, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
