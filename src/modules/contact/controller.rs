use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use lectern_core::AppError;
use lectern_models::{
    ContactMessage, ContactMessageFilterParams, ContactMessageId, CreateContactMessageDto,
    PaginatedContactMessagesResponse, UpdateContactMessageDto,
};

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::contact::service::ContactService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = CreateContactMessageDto,
    responses(
        (status = 201, description = "Message received", body = ContactMessage),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Contact"
)]
#[instrument(skip(state, dto))]
pub async fn create_contact_message(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateContactMessageDto>,
) -> Result<(StatusCode, Json<ContactMessage>), AppError> {
    let message = ContactService::create_message(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

#[utoipa::path(
    get,
    path = "/api/contact",
    params(ContactMessageFilterParams),
    responses(
        (status = 200, description = "Contact inbox", body = PaginatedContactMessagesResponse),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Contact"
)]
#[instrument(skip(state))]
pub async fn get_contact_messages(
    State(state): State<AppState>,
    Query(filters): Query<ContactMessageFilterParams>,
) -> Result<Json<PaginatedContactMessagesResponse>, AppError> {
    let messages = ContactService::list_messages(&state.db, filters).await?;
    Ok(Json(messages))
}

#[utoipa::path(
    put,
    path = "/api/contact/{id}",
    params(("id" = ContactMessageId, Path, description = "Contact message ID")),
    request_body = UpdateContactMessageDto,
    responses(
        (status = 200, description = "Contact message updated", body = ContactMessage),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Contact message not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Contact"
)]
#[instrument(skip(state))]
pub async fn update_contact_message(
    State(state): State<AppState>,
    Path(id): Path<ContactMessageId>,
    Json(dto): Json<UpdateContactMessageDto>,
) -> Result<Json<ContactMessage>, AppError> {
    let message = ContactService::update_message(&state.db, id, dto).await?;
    Ok(Json(message))
}

#[utoipa::path(
    delete,
    path = "/api/contact/{id}",
    params(("id" = ContactMessageId, Path, description = "Contact message ID")),
    responses(
        (status = 204, description = "Contact message deleted"),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Contact message not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Contact"
)]
#[instrument(skip(state))]
pub async fn delete_contact_message(
    State(state): State<AppState>,
    Path(id): Path<ContactMessageId>,
) -> Result<StatusCode, AppError> {
    ContactService::delete_message(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
