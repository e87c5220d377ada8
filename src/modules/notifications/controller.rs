use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use lectern_core::AppError;
use lectern_models::{
    CreateNotificationDto, MessageResponse, Notification, NotificationFilterParams,
    NotificationId, PaginatedNotificationsResponse,
};

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::notifications::service::NotificationService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/notifications",
    params(NotificationFilterParams),
    responses(
        (status = 200, description = "The caller's notifications", body = PaginatedNotificationsResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
#[instrument(skip(state))]
pub async fn get_notifications(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<NotificationFilterParams>,
) -> Result<Json<PaginatedNotificationsResponse>, AppError> {
    let notifications =
        NotificationService::list_notifications(&state.db, &auth_user.caller()?, filters).await?;
    Ok(Json(notifications))
}

#[utoipa::path(
    get,
    path = "/api/notifications/{id}",
    params(("id" = NotificationId, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification", body = Notification),
        (status = 404, description = "Notification not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
#[instrument(skip(state))]
pub async fn get_notification(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<NotificationId>,
) -> Result<Json<Notification>, AppError> {
    let notification =
        NotificationService::find_visible(&state.db, &auth_user.caller()?, id).await?;
    Ok(Json(notification))
}

#[utoipa::path(
    post,
    path = "/api/notifications",
    request_body = CreateNotificationDto,
    responses(
        (status = 201, description = "Notification sent", body = Notification),
        (status = 403, description = "Tutor or admin only", body = ErrorResponse),
        (status = 404, description = "Recipient not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
#[instrument(skip(state, dto))]
pub async fn create_notification(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateNotificationDto>,
) -> Result<(StatusCode, Json<Notification>), AppError> {
    let notification =
        NotificationService::create_notification(&state.db, &auth_user.caller()?, dto).await?;
    Ok((StatusCode::CREATED, Json(notification)))
}

#[utoipa::path(
    post,
    path = "/api/notifications/{id}/read",
    params(("id" = NotificationId, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification marked read", body = Notification),
        (status = 404, description = "Notification not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
#[instrument(skip(state))]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<NotificationId>,
) -> Result<Json<Notification>, AppError> {
    let notification = NotificationService::mark_read(&state.db, &auth_user.caller()?, id).await?;
    Ok(Json(notification))
}

#[utoipa::path(
    post,
    path = "/api/notifications/read-all",
    responses(
        (status = 200, description = "All notifications marked read", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
#[instrument(skip(state))]
pub async fn mark_all_notifications_read(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<MessageResponse>, AppError> {
    let updated = NotificationService::mark_all_read(&state.db, &auth_user.caller()?).await?;
    Ok(Json(MessageResponse {
        message: format!("{updated} notifications marked as read"),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/notifications/{id}",
    params(("id" = NotificationId, Path, description = "Notification ID")),
    responses(
        (status = 204, description = "Notification deleted"),
        (status = 404, description = "Notification not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
#[instrument(skip(state))]
pub async fn delete_notification(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<NotificationId>,
) -> Result<StatusCode, AppError> {
    NotificationService::delete_notification(&state.db, &auth_user.caller()?, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
