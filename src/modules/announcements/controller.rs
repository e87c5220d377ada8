use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use lectern_core::AppError;
use lectern_models::{
    Announcement, AnnouncementFilterParams, AnnouncementId, CreateAnnouncementDto,
    PaginatedAnnouncementsResponse, UpdateAnnouncementDto,
};

use crate::middleware::auth::AuthUser;
use crate::modules::announcements::service::AnnouncementService;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/announcements",
    params(AnnouncementFilterParams),
    responses(
        (status = 200, description = "Announcements addressed to the caller", body = PaginatedAnnouncementsResponse)
    ),
    tag = "Announcements"
)]
#[instrument(skip(state))]
pub async fn get_announcements(
    State(state): State<AppState>,
    auth_user: Option<AuthUser>,
    Query(filters): Query<AnnouncementFilterParams>,
) -> Result<Json<PaginatedAnnouncementsResponse>, AppError> {
    let caller = auth_user.map(|u| u.caller()).transpose()?;
    let announcements =
        AnnouncementService::list_announcements(&state.db, caller.as_ref(), filters).await?;
    Ok(Json(announcements))
}

#[utoipa::path(
    get,
    path = "/api/announcements/{id}",
    params(("id" = AnnouncementId, Path, description = "Announcement ID")),
    responses(
        (status = 200, description = "Announcement", body = Announcement),
        (status = 404, description = "Announcement not found", body = ErrorResponse)
    ),
    tag = "Announcements"
)]
#[instrument(skip(state))]
pub async fn get_announcement(
    State(state): State<AppState>,
    auth_user: Option<AuthUser>,
    Path(id): Path<AnnouncementId>,
) -> Result<Json<Announcement>, AppError> {
    let caller = auth_user.map(|u| u.caller()).transpose()?;
    let announcement =
        AnnouncementService::get_announcement(&state.db, caller.as_ref(), id).await?;
    Ok(Json(announcement))
}

#[utoipa::path(
    post,
    path = "/api/announcements",
    request_body = CreateAnnouncementDto,
    responses(
        (status = 201, description = "Announcement created", body = Announcement),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Announcements"
)]
#[instrument(skip(state, dto))]
pub async fn create_announcement(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateAnnouncementDto>,
) -> Result<(StatusCode, Json<Announcement>), AppError> {
    let announcement =
        AnnouncementService::create_announcement(&state.db, &auth_user.caller()?, dto).await?;
    Ok((StatusCode::CREATED, Json(announcement)))
}

#[utoipa::path(
    put,
    path = "/api/announcements/{id}",
    params(("id" = AnnouncementId, Path, description = "Announcement ID")),
    request_body = UpdateAnnouncementDto,
    responses(
        (status = 200, description = "Announcement updated", body = Announcement),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Announcement not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Announcements"
)]
#[instrument(skip(state, dto))]
pub async fn update_announcement(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<AnnouncementId>,
    ValidatedJson(dto): ValidatedJson<UpdateAnnouncementDto>,
) -> Result<Json<Announcement>, AppError> {
    let announcement =
        AnnouncementService::update_announcement(&state.db, &auth_user.caller()?, id, dto).await?;
    Ok(Json(announcement))
}

#[utoipa::path(
    delete,
    path = "/api/announcements/{id}",
    params(("id" = AnnouncementId, Path, description = "Announcement ID")),
    responses(
        (status = 204, description = "Announcement deleted"),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Announcement not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Announcements"
)]
#[instrument(skip(state))]
pub async fn delete_announcement(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<AnnouncementId>,
) -> Result<StatusCode, AppError> {
    AnnouncementService::delete_announcement(&state.db, &auth_user.caller()?, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
